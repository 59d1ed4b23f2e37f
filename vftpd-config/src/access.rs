use std::path::{Path, PathBuf};

use thiserror::Error;

use vftpd_objparser::{parse_strict, ParseError, Value};

/// Failure modes of loading the access map file.
#[derive(Debug, Error)]
pub enum AccessLoadError {
    #[error("io error reading access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed access file: {0}")]
    Parse(#[from] ParseError),
    #[error("access file has no top-level 'access_map' key")]
    MissingAccessMap,
    #[error("'access_map' is not an object")]
    NotAMap,
}

/// Resolves the raw access map `Value`, however the backing store does
/// that. Building the permission forest out of that value is the
/// [`vftpd_types::build_forest`] step, kept separate so this trait stays
/// about I/O alone.
pub trait AccessSource {
    fn load_access_map(&self) -> Result<Value, AccessLoadError>;
}

/// Loads the access map from a single file. Unlike character files, the
/// access map is parsed in strict mode (§9): a malformed access map is a
/// deployment bug, not something to paper over by dropping bad records.
pub struct FileAccessSource {
    path: PathBuf,
}

impl FileAccessSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAccessSource { path: path.into() }
    }
}

impl AccessSource for FileAccessSource {
    fn load_access_map(&self) -> Result<Value, AccessLoadError> {
        load_access_map_from_path(&self.path)
    }
}

fn load_access_map_from_path(path: &Path) -> Result<Value, AccessLoadError> {
    let raw = proxmox_sys::fs::file_get_contents(path).map_err(|err| {
        match err.downcast::<std::io::Error>() {
            Ok(io_err) => AccessLoadError::Io(io_err),
            Err(err) => AccessLoadError::Io(std::io::Error::new(std::io::ErrorKind::Other, err.to_string())),
        }
    })?;
    let text = String::from_utf8_lossy(&raw);
    let mut object = parse_strict(&text)?;

    match object.remove("access_map") {
        Some(value @ Value::Map(_)) => Ok(value),
        Some(_) => Err(AccessLoadError::NotAMap),
        None => Err(AccessLoadError::MissingAccessMap),
    }
}
