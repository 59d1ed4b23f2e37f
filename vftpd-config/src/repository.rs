use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::UserLoadError;
use crate::user::{User, UserSource};

struct CachedUser {
    user: User,
    loaded_at: i64,
}

/// A TTL cache in front of a [`UserSource`]. Character files rarely change
/// mid-session, so repeated lookups for the same username within
/// `cache_time` seconds are served from memory instead of re-reading and
/// re-parsing the file.
pub struct UserRepository<S: UserSource> {
    source: S,
    cache_time: u64,
    entries: RwLock<HashMap<String, CachedUser>>,
}

impl<S: UserSource> UserRepository<S> {
    pub fn new(source: S, cache_time: u64) -> Self {
        UserRepository {
            source,
            cache_time,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the user, refreshing from the source if the cached entry is
    /// missing or has outlived `cache_time`.
    pub fn get(&self, username: &str) -> Result<User, UserLoadError> {
        if let Some(user) = self.cached_if_fresh(username) {
            return Ok(user);
        }
        self.refresh(username)
    }

    /// Force a reload from the source regardless of cache freshness,
    /// updating the cache with the result.
    pub fn refresh(&self, username: &str) -> Result<User, UserLoadError> {
        let user = self.source.load_user(username)?;
        let loaded_at = proxmox_time::epoch_i64();
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            username.to_string(),
            CachedUser {
                user: user.clone(),
                loaded_at,
            },
        );
        Ok(user)
    }

    /// True if the user exists, without forcing a fresh read any more than
    /// `get` would.
    pub fn exists(&self, username: &str) -> bool {
        self.get(username).is_ok()
    }

    fn cached_if_fresh(&self, username: &str) -> Option<User> {
        let entries = self.entries.read().unwrap();
        let cached = entries.get(username)?;
        let now = proxmox_time::epoch_i64();
        if now - cached.loaded_at < self.cache_time as i64 {
            Some(cached.user.clone())
        } else {
            None
        }
    }
}
