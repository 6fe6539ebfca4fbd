//! Brute-force protection: lockout policy and its persisted expiry

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::KioskConfig;
use crate::error::{KioskError, Result};

/// Lockout policy for failed PIN attempts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lockout
    max_attempts: u32,
    /// How long PIN entry stays suspended
    duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            duration: Duration::from_secs(5 * 60),
        }
    }
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, duration: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            duration,
        }
    }

    pub fn from_config(config: &KioskConfig) -> Self {
        Self::new(config.max_pin_attempts, config.lockout_duration())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether this many consecutive failures triggers a lockout
    pub fn should_lock(&self, failed_attempts: u32) -> bool {
        failed_attempts >= self.max_attempts
    }

    /// Attempts left before lockout
    pub fn attempts_remaining(&self, failed_attempts: u32) -> u32 {
        self.max_attempts.saturating_sub(failed_attempts)
    }

    /// Human-readable lockout length
    pub fn description(&self) -> String {
        let secs = self.duration.as_secs();
        if secs < 60 {
            format!("{} seconds", secs)
        } else if secs < 3600 {
            format!("{} minutes", secs / 60)
        } else {
            format!("{} hours", secs / 3600)
        }
    }
}

/// Persistence for the lockout expiry
///
/// Only the expiry timestamp survives a restart; the attempt counter does not.
pub trait LockoutStore: Send + Sync {
    fn load(&self) -> Result<Option<DateTime<Utc>>>;
    fn save(&self, until: Option<DateTime<Utc>>) -> Result<()>;
}

/// On-disk record format
#[derive(Debug, Serialize, Deserialize)]
struct LockoutRecord {
    lockout_until: DateTime<Utc>,
}

/// Lockout expiry stored as JSON in the kiosk storage directory
#[derive(Debug, Clone)]
pub struct FileLockoutStore {
    path: PathBuf,
}

impl FileLockoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockoutStore for FileLockoutStore {
    fn load(&self) -> Result<Option<DateTime<Utc>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let record: LockoutRecord = serde_json::from_str(&contents)?;
        Ok(Some(record.lockout_until))
    }

    fn save(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        match until {
            Some(lockout_until) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let contents = serde_json::to_string_pretty(&LockoutRecord { lockout_until })?;
                fs::write(&self.path, contents)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
                }
            }
            None => {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                }
            }
        }
        Ok(())
    }
}

/// Lockout expiry held in memory (tests, demos)
#[derive(Debug, Default)]
pub struct MemoryLockoutStore {
    until: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryLockoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lockout(until: DateTime<Utc>) -> Self {
        Self {
            until: Mutex::new(Some(until)),
        }
    }
}

impl LockoutStore for MemoryLockoutStore {
    fn load(&self) -> Result<Option<DateTime<Utc>>> {
        self.until
            .lock()
            .map(|guard| *guard)
            .map_err(|e| KioskError::Storage(e.to_string()))
    }

    fn save(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        let mut guard = self
            .until
            .lock()
            .map_err(|e| KioskError::Storage(e.to_string()))?;
        *guard = until;
        Ok(())
    }
}

impl<S: LockoutStore + ?Sized> LockoutStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<DateTime<Utc>>> {
        (**self).load()
    }

    fn save(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        (**self).save(until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert!(!policy.should_lock(2));
        assert!(policy.should_lock(3));
        assert_eq!(policy.attempts_remaining(1), 2);
        assert_eq!(policy.attempts_remaining(5), 0);
        assert_eq!(policy.description(), "5 minutes");
    }

    #[test]
    fn test_policy_from_config() {
        let config = KioskConfig {
            max_pin_attempts: 5,
            lockout_secs: 600,
            ..KioskConfig::default()
        };
        let policy = LockoutPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.description(), "10 minutes");
    }

    #[test]
    fn test_file_store_roundtrip_and_erase() {
        let dir = tempdir().unwrap();
        let store = FileLockoutStore::new(dir.path().join("state").join("lockout.json"));
        assert_eq!(store.load().unwrap(), None);

        let until = DateTime::from_timestamp(1_800_000_000, 0).unwrap();
        store.save(Some(until)).unwrap();
        assert_eq!(store.load().unwrap(), Some(until));

        // A second store on the same path sees the record, as after a restart
        let reopened = FileLockoutStore::new(store.path());
        assert_eq!(reopened.load().unwrap(), Some(until));

        store.save(None).unwrap();
        assert!(!store.path().exists());
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lockout.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileLockoutStore::new(&path).load().is_err());
    }
}
