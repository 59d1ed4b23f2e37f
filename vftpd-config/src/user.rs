use std::path::{Path, PathBuf};

use vftpd_objparser::{parse_lenient, Value};

use crate::error::UserLoadError;

/// Named rungs of the level ladder referenced by the authorization engine's
/// implicit-group rules (§4.6). Levels between named rungs are ordinary
/// mortal/wizard levels with no special meaning to this crate.
pub const MORTAL_FIRST: i64 = 1;
pub const WIZARD: i64 = 31;
pub const JUNIOR_ARCH: i64 = 40;
pub const ELDER: i64 = 42;
pub const ARCHWIZARD: i64 = 45;
pub const ADMINISTRATOR: i64 = 50;

/// A materialized character record: just enough to authenticate and
/// authorize, never the full game object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub level: i64,
}

/// Resolves a username to a [`User`], however the backing store does that.
pub trait UserSource {
    fn load_user(&self, username: &str) -> Result<User, UserLoadError>;
}

/// Loads character files from `<root>/<first-letter>/<username>.o`.
pub struct FileUserSource {
    root: PathBuf,
}

impl FileUserSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileUserSource { root: root.into() }
    }

    fn path_for(&self, username: &str) -> Option<PathBuf> {
        let first = username.chars().next()?.to_ascii_lowercase();
        let mut path = self.root.clone();
        path.push(first.to_string());
        path.push(format!("{username}.o"));
        Some(path)
    }
}

impl UserSource for FileUserSource {
    fn load_user(&self, username: &str) -> Result<User, UserLoadError> {
        if username.is_empty() {
            return Err(UserLoadError::NotFound);
        }
        let path = self.path_for(username).ok_or(UserLoadError::NotFound)?;
        load_user_from_path(&path, username)
    }
}

fn load_user_from_path(path: &Path, username: &str) -> Result<User, UserLoadError> {
    let raw = match proxmox_sys::fs::file_get_contents(path) {
        Ok(data) => data,
        Err(err) => {
            if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
                if io_err.kind() == std::io::ErrorKind::NotFound {
                    return Err(UserLoadError::NotFound);
                }
            }
            return Err(UserLoadError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                err.to_string(),
            )));
        }
    };
    let text = String::from_utf8_lossy(&raw);

    // Character files are parsed leniently: a bad record elsewhere in the
    // object shouldn't stop us from extracting the password and level.
    let parsed = parse_lenient(&text);

    let password_hash = match parsed.object.get("password") {
        Some(Value::Str(s)) => s.clone(),
        _ => return Err(UserLoadError::InvalidHash),
    };

    let level = match parsed.object.get("level") {
        Some(Value::Int(i)) => *i,
        Some(Value::Float(f, _)) => *f as i64,
        _ => MORTAL_FIRST,
    };

    Ok(User {
        username: username.to_string(),
        password_hash,
        level,
    })
}
