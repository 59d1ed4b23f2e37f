//! `vftpd-core`: the authentication and authorization core for a MUD-backed
//! FTP daemon.
//!
//! This umbrella crate re-exports the three library crates that do the
//! actual work so a caller only needs one dependency:
//!
//! - [`vftpd_objparser`] — the line-oriented object-dump parser.
//! - [`vftpd_types`] — the permission lattice and access-tree forest.
//! - [`vftpd_config`] — user loading, password verification,
//!   `Authenticator`, and `Authorizer`, composed from the two crates
//!   above plus file-backed sources and TTL caches.
//!
//! The FTP protocol state machine, TLS termination, and the virtual
//! filesystem rooted at the world directory are not this crate's concern;
//! it answers two questions — "who is this?" and "what may they do here?"
//! — and nothing else.

pub use vftpd_config::{
    AccessLoadError, AccessSource, AuthError, Authenticator, Authorizer, Config, FileAccessSource,
    FileUserSource, User, UserLoadError, UserRepository, UserSource, VerifyError, ADMINISTRATOR,
    ARCHWIZARD, ELDER, JUNIOR_ARCH, MORTAL_FIRST, WIZARD,
};
pub use vftpd_objparser::{
    parse_lenient, parse_strict, LenientResult, Object, ParseCause, ParseError, Value,
};
pub use vftpd_types::{build_forest, AccessForest, AccessNode, AccessTree, Permission, TreeBuildError};
