use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use vftpd_types::{build_forest, AccessForest, Permission};

use crate::access::AccessSource;
use crate::user::{UserSource, ARCHWIZARD, ELDER, JUNIOR_ARCH};
use crate::UserRepository;

/// Resolves `(user, path) -> Permission` against a TTL-cached permission
/// forest. The forest is held behind an `Arc` swapped under `rebuild`, the
/// discipline §5 prefers over a plain `RwLock` around the whole forest:
/// readers on the hot path never block each other, and a concurrent miss
/// collapses into a single rebuild rather than a thundering herd.
pub struct Authorizer<A: AccessSource, S: UserSource> {
    access: A,
    users: Arc<UserRepository<S>>,
    ttl: i64,
    forest: RwLock<Arc<AccessForest>>,
    last_refresh: AtomicI64,
    rebuild: Mutex<()>,
}

impl<A: AccessSource, S: UserSource> Authorizer<A, S> {
    pub fn new(access: A, users: Arc<UserRepository<S>>, ttl: u64) -> Self {
        Authorizer {
            access,
            users,
            ttl: ttl as i64,
            forest: RwLock::new(Arc::new(AccessForest::new())),
            last_refresh: AtomicI64::new(i64::MIN),
            rebuild: Mutex::new(()),
        }
    }

    /// `resolve(user, path) >= required`.
    pub fn has_permission(&self, user: &str, path: &str, required: Permission) -> bool {
        self.resolve_permission(user, path) >= required
    }

    pub fn can_read(&self, user: &str, path: &str) -> bool {
        self.resolve_permission(user, path).can_read()
    }

    pub fn can_write(&self, user: &str, path: &str) -> bool {
        self.resolve_permission(user, path).can_write()
    }

    pub fn can_grant(&self, user: &str, path: &str) -> bool {
        self.resolve_permission(user, path).can_grant()
    }

    /// Resolve the permission `user` has on `path`, per §4.6's six-step
    /// precedence: implicit rules, user tree, groups, default tree, absent
    /// default.
    pub fn resolve_permission(&self, user: &str, path: &str) -> Permission {
        let segments = normalize_path(path);
        let forest = self.current_forest();

        if let Some(implicit) = implicit_permission(user, &segments) {
            return implicit;
        }

        if let Some(tree) = forest.get(user) {
            let resolved = tree.walk(&segments);
            if resolved != Permission::Revoked {
                return resolved;
            }
        }

        for group in self.resolve_groups(user) {
            if let Some(tree) = forest.get(&group) {
                let resolved = tree.walk(&segments);
                if resolved != Permission::Revoked {
                    return resolved;
                }
            }
        }

        match forest.get("*") {
            Some(default_tree) => default_tree.walk(&segments),
            None => Permission::Revoked,
        }
    }

    /// The user's explicit `"?"`-declared groups, in order, followed by any
    /// implicit level-based group that actually exists in the forest.
    pub fn resolve_groups(&self, user: &str) -> Vec<String> {
        let forest = self.current_forest();
        let mut groups: Vec<String> = forest
            .get(user)
            .map(|tree| tree.groups.clone())
            .unwrap_or_default();

        if let Ok(loaded) = self.users.get(user) {
            let level = loaded.level;
            let implicit = if level >= ARCHWIZARD {
                Some("Arch_full")
            } else if level >= JUNIOR_ARCH && level != ELDER {
                Some("Arch_junior")
            } else {
                None
            };
            if let Some(group) = implicit {
                if forest.contains_key(group) && !groups.iter().any(|g| g == group) {
                    groups.push(group.to_string());
                }
            }
        }

        groups
    }

    fn current_forest(&self) -> Arc<AccessForest> {
        let now = proxmox_time::epoch_i64();
        let last = self.last_refresh.load(Ordering::Acquire);
        if last != i64::MIN && now - last < self.ttl {
            return self.forest.read().unwrap().clone();
        }

        // Collapse concurrent misses into a single rebuild: whoever gets
        // the lock first reloads; everyone else observes its result (or,
        // if it failed and this is the very first load, the still-empty
        // forest, which resolves every query to `Revoked` per §7).
        let _guard = self.rebuild.lock().unwrap();
        let last = self.last_refresh.load(Ordering::Acquire);
        if last != i64::MIN && now - last < self.ttl {
            return self.forest.read().unwrap().clone();
        }

        match self.access.load_access_map().map_err(anyhow::Error::from).and_then(|value| {
            build_forest(&value).map_err(anyhow::Error::from)
        }) {
            Ok(rebuilt) => {
                let rebuilt = Arc::new(rebuilt);
                *self.forest.write().unwrap() = rebuilt.clone();
                self.last_refresh.store(now, Ordering::Release);
                rebuilt
            }
            Err(err) => {
                log::warn!("access map reload failed, retaining previous forest: {err}");
                self.forest.read().unwrap().clone()
            }
        }
    }
}

/// Collapse `.`/`//`, strip a leading `/`, split into segments. The root
/// path is the empty segment list.
fn normalize_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(String::from)
        .collect()
}

/// Implicit rules checked before any tree is consulted (§4.6 step 2). The
/// open-dir rule uses the length-3 interpretation: `/players/x/open` grants
/// `Read`, but `/players/x/open/sub` falls through to the trees, per the
/// documented resolution of the upstream inconsistency.
fn implicit_permission(user: &str, segments: &[String]) -> Option<Permission> {
    if segments.len() >= 2 && segments[0] == "players" && segments[1] == user {
        return Some(Permission::GrantGrant);
    }
    if segments.len() == 3 && segments[0] == "players" && segments[2] == "open" {
        return Some(Permission::Read);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessLoadError, AccessSource};
    use crate::error::UserLoadError;
    use crate::user::User;
    use vftpd_objparser::{parse_strict, Value};

    struct FixedAccessSource(String);

    impl AccessSource for FixedAccessSource {
        fn load_access_map(&self) -> Result<Value, AccessLoadError> {
            let obj = parse_strict(&self.0).expect("fixture parses");
            Ok(obj.get("access_map").cloned().expect("has access_map"))
        }
    }

    struct FixedUserSource(Vec<(&'static str, i64)>);

    impl UserSource for FixedUserSource {
        fn load_user(&self, username: &str) -> Result<User, UserLoadError> {
            self.0
                .iter()
                .find(|(name, _)| *name == username)
                .map(|(name, level)| User {
                    username: name.to_string(),
                    password_hash: String::new(),
                    level: *level,
                })
                .ok_or(UserLoadError::NotFound)
        }
    }

    const SCENARIO: &str = r#"access_map ([5|"*":([5|".":1,"*":0,"characters":1,"data":0,"log":2,"players":([2|".":1,"*":0])]),"knubo":([2|"?":({1|"Arch_full"}),"players":([1|"knubo":([2|".":1,"*":2])])]),"frogo":([2|"?":({1|"Arch_full"}),"players":([1|"frogo":([3|".":1,"*":0,"com":([2|".":2,"*":2])])])]),"dios":([1|"*":5]),"Arch_full":([2|"players":([1|"*":3]),"log":2])])"#;

    fn fixture() -> Authorizer<FixedAccessSource, FixedUserSource> {
        let users = FixedUserSource(vec![("knubo", 45), ("frogo", 45), ("dios", 1), ("tundra", 1)]);
        let repo = Arc::new(UserRepository::new(users, 60));
        Authorizer::new(FixedAccessSource(SCENARIO.to_string()), repo, 60)
    }

    #[test]
    fn default_tree_covers_unlisted_user() {
        let authz = fixture();
        assert_eq!(authz.resolve_permission("tundra", "/"), Permission::Read);
        assert_eq!(
            authz.resolve_permission("tundra", "/data/notes"),
            Permission::Revoked
        );
        assert_eq!(
            authz.resolve_permission("tundra", "/log/driver"),
            Permission::Write
        );
    }

    #[test]
    fn open_dir_implicit_rule_is_length_three_only() {
        let authz = fixture();
        assert_eq!(
            authz.resolve_permission("tundra", "/players/random/open"),
            Permission::Read
        );
        assert_eq!(
            authz.resolve_permission("tundra", "/players/random/open/file.txt"),
            Permission::Revoked
        );
    }

    #[test]
    fn group_membership_grants_via_arch_full() {
        let authz = fixture();
        assert_eq!(
            authz.resolve_permission("knubo", "/players/mousepad/workroom.c"),
            Permission::GrantRead
        );
    }

    #[test]
    fn matched_child_revoked_is_authoritative_over_group() {
        let authz = fixture();
        assert_eq!(
            authz.resolve_permission("frogo", "/players/frogo/workroom.c"),
            Permission::Revoked
        );
    }

    #[test]
    fn wildcard_principal_grants_everywhere() {
        let authz = fixture();
        assert_eq!(
            authz.resolve_permission("dios", "/anything/here"),
            Permission::GrantGrant
        );
    }

    #[test]
    fn implicit_self_ownership_overrides_everything() {
        let authz = fixture();
        assert_eq!(
            authz.resolve_permission("frogo", "/players/frogo/com/anything"),
            Permission::GrantGrant
        );
    }

    #[test]
    fn has_permission_matches_resolve_ordering() {
        let authz = fixture();
        assert!(authz.has_permission("tundra", "/", Permission::Revoked));
        assert!(!authz.has_permission("tundra", "/data/notes", Permission::Read));
    }

    #[test]
    fn resolve_groups_combines_explicit_and_implicit() {
        let authz = fixture();
        assert_eq!(authz.resolve_groups("knubo"), vec!["Arch_full".to_string()]);
    }

    #[test]
    fn first_load_failure_denies_everything() {
        struct FailingSource;
        impl AccessSource for FailingSource {
            fn load_access_map(&self) -> Result<Value, AccessLoadError> {
                Err(AccessLoadError::MissingAccessMap)
            }
        }
        let users = FixedUserSource(vec![]);
        let repo = Arc::new(UserRepository::new(users, 60));
        let authz = Authorizer::new(FailingSource, repo, 60);
        assert_eq!(
            authz.resolve_permission("anyone", "/anything"),
            Permission::Revoked
        );
    }
}
