use std::path::PathBuf;

use anyhow::{Context, Error};

const VAR_CHARACTER_DIR: &str = "VFTPD_CHARACTER_DIR";
const VAR_ACCESS_FILE: &str = "VFTPD_ACCESS_FILE";
const VAR_CHARACTER_CACHE_SECS: &str = "VFTPD_CHARACTER_CACHE_SECS";
const VAR_ACCESS_CACHE_SECS: &str = "VFTPD_ACCESS_CACHE_SECS";

const DEFAULT_CHARACTER_CACHE_SECS: u64 = 60;
const DEFAULT_ACCESS_CACHE_SECS: u64 = 15;

/// Deployment configuration for the core, mirroring exactly the four keys
/// the core recognizes: where character files and the access map live, and
/// how long the two caches in front of them may serve stale data.
#[derive(Debug, Clone)]
pub struct Config {
    pub character_dir_path: PathBuf,
    pub access_file_path: PathBuf,
    pub character_cache_time: u64,
    pub access_cache_time: u64,
}

impl Config {
    /// Load configuration from the process environment, the way this
    /// lineage's own client tooling reads deployment secrets and paths
    /// rather than through a generic file-format deserializer.
    ///
    /// `VFTPD_CHARACTER_DIR` and `VFTPD_ACCESS_FILE` are required; the two
    /// `*_CACHE_SECS` variables default to 60s and 15s respectively.
    pub fn from_env() -> Result<Self, Error> {
        let character_dir_path = required_path(VAR_CHARACTER_DIR)?;
        let access_file_path = required_path(VAR_ACCESS_FILE)?;
        let character_cache_time = optional_secs(VAR_CHARACTER_CACHE_SECS, DEFAULT_CHARACTER_CACHE_SECS)?;
        let access_cache_time = optional_secs(VAR_ACCESS_CACHE_SECS, DEFAULT_ACCESS_CACHE_SECS)?;

        Ok(Config {
            character_dir_path,
            access_file_path,
            character_cache_time,
            access_cache_time,
        })
    }
}

fn required_path(var: &str) -> Result<PathBuf, Error> {
    let value = std::env::var(var).with_context(|| format!("missing required env var {var}"))?;
    Ok(PathBuf::from(value))
}

fn optional_secs(var: &str, default: u64) -> Result<u64, Error> {
    match std::env::var(var) {
        Ok(value) => value
            .parse::<u64>()
            .with_context(|| format!("{var} is not a valid number of seconds: {value:?}")),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(std::env::VarError::NotUnicode(_)) => {
            anyhow::bail!("{var} contains non-unicode data")
        }
    }
}
