use thiserror::Error;

/// Failure modes of loading a single character file. Never exposed across
/// the [`Authenticator`](crate::Authenticator) boundary directly — it is
/// always collapsed into [`AuthError`]. Character files are parsed
/// leniently (`vftpd_objparser::parse_lenient`), so a malformed record
/// never aborts the load with a hard [`ParseError`](vftpd_objparser::ParseError);
/// there is no `Parse` variant here because nothing ever constructs one.
#[derive(Debug, Error)]
pub enum UserLoadError {
    #[error("user not found")]
    NotFound,
    #[error("stored password field is missing or not a string")]
    InvalidHash,
    #[error("io error reading character file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single verifier invocation. Internal only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("password verification failed")]
    VerificationFailed,
}

/// The single opaque failure the [`Authenticator`](crate::Authenticator) is
/// allowed to return. It is constructed by hand from the internal error
/// families above (`UserLoadError`, `VerifyError`) — deliberately never via
/// `#[from]` — so a more specific variant can never leak across the boundary.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("invalid credentials")]
pub struct AuthError;
