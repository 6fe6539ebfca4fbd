//! Kiosk configuration
//!
//! Loads operator settings from a TOML file. Every field has a default so a
//! partial (or missing) file still yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buttons::ButtonSlot;
use crate::error::{KioskError, Result};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "kiosk.toml";

/// Directory name under the platform config/data dirs
const APP_DIR_NAME: &str = "atm-kiosk";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV_VAR: &str = "ATM_KIOSK_CONFIG";

/// Longest PIN, account number or typed amount; keeps amounts within `u64`
pub const MAX_ENTRY_DIGITS: usize = 18;

/// Kiosk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Digits in a PIN and in an account number
    pub pin_digits: usize,

    /// Consecutive wrong PINs before lockout
    pub max_pin_attempts: u32,

    /// Lockout duration (seconds)
    pub lockout_secs: u64,

    /// Inactivity countdown for authenticated sessions (seconds)
    pub session_timeout_secs: u64,

    /// Remaining seconds at which the timer raises its warning
    pub timer_warning_secs: u64,

    /// How long a success message stays before returning to the menu (seconds)
    pub confirmation_delay_secs: u64,

    /// Largest amount accepted for any single operation
    pub max_withdraw: u64,

    /// Quick-pick amounts offered on the transaction screens
    pub preset_amounts: Vec<u64>,

    /// Directory holding the persisted lockout and log file
    pub storage_dir: PathBuf,

    /// Simulated latency of the in-memory gateway (milliseconds)
    pub gateway_latency_ms: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            pin_digits: 6,
            max_pin_attempts: 3,
            lockout_secs: 5 * 60,
            session_timeout_secs: 5 * 60,
            timer_warning_secs: 30,
            confirmation_delay_secs: 5,
            max_withdraw: 1_000_000,
            preset_amounts: vec![20, 40, 60, 100, 200],
            storage_dir: default_storage_dir(),
            gateway_latency_ms: 300,
        }
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl KioskConfig {
    /// Configuration for tests: no latency, storage in the working directory
    pub fn testing() -> Self {
        Self {
            storage_dir: PathBuf::from("."),
            gateway_latency_ms: 0,
            ..Self::default()
        }
    }

    /// Default configuration file path
    ///
    /// `$ATM_KIOSK_CONFIG` wins, otherwise `<config_dir>/atm-kiosk/kiosk.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| KioskError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| KioskError::Config(e.to_string()))?;
        fs::write(path, contents)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject settings the state machines cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.pin_digits == 0 {
            return Err(KioskError::Config("pin_digits must be at least 1".into()));
        }
        if self.pin_digits > MAX_ENTRY_DIGITS {
            return Err(KioskError::Config(format!(
                "pin_digits must be at most {}",
                MAX_ENTRY_DIGITS
            )));
        }
        if self.max_pin_attempts == 0 {
            return Err(KioskError::Config(
                "max_pin_attempts must be at least 1".into(),
            ));
        }
        if self.lockout_secs == 0 {
            return Err(KioskError::Config("lockout_secs must be at least 1".into()));
        }
        if self.preset_amounts.is_empty() {
            return Err(KioskError::Config("preset_amounts must not be empty".into()));
        }
        if self.preset_amounts.len() > ButtonSlot::PRESET_SLOTS.len() {
            return Err(KioskError::Config(format!(
                "at most {} preset amounts fit on the keypad",
                ButtonSlot::PRESET_SLOTS.len()
            )));
        }
        if self.preset_amounts.contains(&0) {
            return Err(KioskError::Config("preset amounts must be positive".into()));
        }
        if self.timer_warning_secs >= self.session_timeout_secs {
            return Err(KioskError::Config(
                "timer_warning_secs must be below session_timeout_secs".into(),
            ));
        }
        Ok(())
    }

    pub fn lockout_duration(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_secs(self.confirmation_delay_secs)
    }

    pub fn gateway_latency(&self) -> Duration {
        Duration::from_millis(self.gateway_latency_ms)
    }

    /// Path of the persisted lockout record
    pub fn lockout_file(&self) -> PathBuf {
        self.storage_dir.join("lockout.json")
    }

    /// Path of the kiosk log file
    pub fn log_file(&self) -> PathBuf {
        self.storage_dir.join("kiosk.log")
    }
}
