use argon2::{Algorithm, Argon2, Params, Version};
use subtle::ConstantTimeEq;

use crate::error::VerifyError;

const ARGON2ID_PREFIX: &str = "$argon2id$";

/// Verify `password` against `stored`, auto-dispatching on the stored
/// hash's shape: a 13-byte, `$`-free string is legacy DES-crypt; a
/// `$argon2id$`-prefixed string is PHC-encoded argon2id. Anything else,
/// or a genuine mismatch, collapses to the single [`VerifyError::VerificationFailed`].
pub fn verify_password(password: &str, stored: &str) -> Result<(), VerifyError> {
    if stored.len() == 13 && !stored.contains('$') {
        verify_unix_crypt(password, stored)
    } else if let Some(rest) = stored.strip_prefix(ARGON2ID_PREFIX) {
        verify_argon2id(password, rest)
    } else {
        Err(VerifyError::VerificationFailed)
    }
}

fn verify_unix_crypt(password: &str, stored: &str) -> Result<(), VerifyError> {
    let salt = &stored[0..2];
    let computed =
        pwhash::unix_crypt::crypt(password, salt).map_err(|_| VerifyError::VerificationFailed)?;
    if computed.len() != stored.len() {
        return Err(VerifyError::VerificationFailed);
    }
    if bool::from(computed.as_bytes().ct_eq(stored.as_bytes())) {
        Ok(())
    } else {
        Err(VerifyError::VerificationFailed)
    }
}

/// `rest` is everything after the `$argon2id$` prefix:
/// `[v=N$]m=M,t=T,p=P$SALT_B64$HASH_B64`.
fn verify_argon2id(password: &str, rest: &str) -> Result<(), VerifyError> {
    let mut segments = rest.split('$');

    let first = segments.next().ok_or(VerifyError::VerificationFailed)?;
    let (version, params_segment) = if let Some(v) = first.strip_prefix("v=") {
        let version: u32 = v.parse().map_err(|_| VerifyError::VerificationFailed)?;
        let params_segment = segments.next().ok_or(VerifyError::VerificationFailed)?;
        (version, params_segment)
    } else {
        (19, first)
    };
    let version = match version {
        16 => Version::V0x10,
        19 => Version::V0x13,
        _ => return Err(VerifyError::VerificationFailed),
    };

    let (m, t, p) = parse_params(params_segment)?;

    let salt_b64 = segments.next().ok_or(VerifyError::VerificationFailed)?;
    let hash_b64 = segments.next().ok_or(VerifyError::VerificationFailed)?;
    if segments.next().is_some() {
        return Err(VerifyError::VerificationFailed);
    }

    let salt = base64::decode_config(salt_b64, base64::STANDARD_NO_PAD)
        .map_err(|_| VerifyError::VerificationFailed)?;
    let expected = base64::decode_config(hash_b64, base64::STANDARD_NO_PAD)
        .map_err(|_| VerifyError::VerificationFailed)?;

    let params =
        Params::new(m, t, p, Some(expected.len())).map_err(|_| VerifyError::VerificationFailed)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, version, params);

    let mut computed = vec![0u8; expected.len()];
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut computed)
        .map_err(|_| VerifyError::VerificationFailed)?;

    if bool::from(computed.as_slice().ct_eq(expected.as_slice())) {
        Ok(())
    } else {
        Err(VerifyError::VerificationFailed)
    }
}

fn parse_params(segment: &str) -> Result<(u32, u32, u32), VerifyError> {
    let mut m = None;
    let mut t = None;
    let mut p = None;
    for kv in segment.split(',') {
        let (key, value) = kv.split_once('=').ok_or(VerifyError::VerificationFailed)?;
        let value: u32 = value.parse().map_err(|_| VerifyError::VerificationFailed)?;
        match key {
            "m" => m = Some(value),
            "t" => t = Some(value),
            "p" => p = Some(value),
            _ => return Err(VerifyError::VerificationFailed),
        }
    }
    match (m, t, p) {
        (Some(m), Some(t), Some(p)) => Ok((m, t, p)),
        _ => Err(VerifyError::VerificationFailed),
    }
}

/// A fixed, never-issued argon2id hash used by the [`Authenticator`](crate::Authenticator)
/// to equalize timing when a username does not exist. Its password is never
/// supplied by a real caller.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dnNwb29sb3RoZXJhcmVudGhlcmU$V5K5vQK0lHb0iuWMdEPQUhXWBOrL0pxFnz1W2pMzXqk";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unrecognized_shape() {
        assert_eq!(
            verify_password("whatever", "not-a-real-hash"),
            Err(VerifyError::VerificationFailed)
        );
    }

    #[test]
    fn unix_crypt_round_trip() {
        let hash = pwhash::unix_crypt::crypt("hunter2", "ab").unwrap();
        assert!(verify_password("hunter2", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn dummy_hash_is_well_formed_argon2id() {
        assert!(DUMMY_HASH.starts_with(ARGON2ID_PREFIX));
        // exercising the verifier against it should fail, never panic.
        assert!(verify_password("whatever", DUMMY_HASH).is_err());
    }
}
