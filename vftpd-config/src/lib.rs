//! User loading, password verification, authentication, and path
//! authorization for the MUD-backed FTP core.
//!
//! This crate composes [`vftpd_objparser`] (the object-dump parser) and
//! [`vftpd_types`] (the permission lattice and access trees) into the five
//! runtime components described by the core: [`UserSource`]/[`UserRepository`],
//! [`PasswordVerifier`], [`Authenticator`], and [`Authorizer`] (which owns
//! its own [`AccessSource`]-backed cache).

mod access;
mod authenticator;
mod authorizer;
mod config;
mod error;
mod password;
mod repository;
mod user;

pub use access::{AccessLoadError, AccessSource, FileAccessSource};
pub use authenticator::Authenticator;
pub use authorizer::Authorizer;
pub use config::Config;
pub use error::{AuthError, UserLoadError, VerifyError};
pub use password::verify_password;
pub use repository::UserRepository;
pub use user::{FileUserSource, User, UserSource, ADMINISTRATOR, ARCHWIZARD, ELDER, JUNIOR_ARCH,
    MORTAL_FIRST, WIZARD};
