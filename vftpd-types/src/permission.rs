/// The access lattice. Ordering is the decision rule for "does this
/// permission satisfy this requirement": `p.satisfies(required) == p >= required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i64)]
pub enum Permission {
    Revoked = 0,
    Read = 1,
    Write = 2,
    GrantRead = 3,
    GrantWrite = 4,
    GrantGrant = 5,
}

impl Default for Permission {
    fn default() -> Self {
        Permission::Revoked
    }
}

impl Permission {
    pub fn can_read(self) -> bool {
        self >= Permission::Read
    }

    pub fn can_write(self) -> bool {
        self >= Permission::Write
    }

    pub fn can_grant(self) -> bool {
        self >= Permission::GrantGrant
    }

    pub fn satisfies(self, required: Permission) -> bool {
        self >= required
    }
}

impl TryFrom<i64> for Permission {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Permission::Revoked),
            1 => Ok(Permission::Read),
            2 => Ok(Permission::Write),
            3 => Ok(Permission::GrantRead),
            4 => Ok(Permission::GrantWrite),
            5 => Ok(Permission::GrantGrant),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_lattice() {
        assert!(Permission::Revoked < Permission::Read);
        assert!(Permission::Read < Permission::Write);
        assert!(Permission::Write < Permission::GrantRead);
        assert!(Permission::GrantRead < Permission::GrantWrite);
        assert!(Permission::GrantWrite < Permission::GrantGrant);
    }

    #[test]
    fn capability_predicates() {
        assert!(!Permission::Read.can_write());
        assert!(Permission::Write.can_read());
        assert!(Permission::GrantGrant.can_grant());
        assert!(!Permission::GrantWrite.can_grant());
    }

    #[test]
    fn rejects_out_of_range_integers() {
        assert_eq!(Permission::try_from(6), Err(6));
        assert_eq!(Permission::try_from(-1), Err(-1));
        assert_eq!(Permission::try_from(5), Ok(Permission::GrantGrant));
    }
}
