//! Application configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock demo setup. Native builds read the TOML file named by
//! `ALEO_WALLET_UI_CONFIG` when it is set.

use std::time::Duration;

use aleo_adapter::{DecryptPermission, Network};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "ALEO_WALLET_UI_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    pub network: Network,
    pub decrypt_permission: DecryptPermission,
    pub programs: Vec<String>,
    pub log_capacity: usize,
    pub timings: Timings,
    pub defaults: FormDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Aleo app".to_string(),
            network: Network::TestnetBeta,
            decrypt_permission: DecryptPermission::OnChainHistory,
            programs: vec!["credits.aleo".to_string()],
            log_capacity: crate::activity_log::DEFAULT_CAPACITY,
            timings: Timings::default(),
            defaults: FormDefaults::default(),
        }
    }
}

/// Delays used by the connection choreography, in milliseconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Between `select` and `connect`.
    pub connect_settle_ms: u64,
    /// Before the second detection probe.
    pub detection_retry_ms: u64,
    /// Between a successful connection and the modal closing.
    pub modal_close_ms: u64,
    /// Adapter polling period of the UI.
    pub observe_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            connect_settle_ms: 100,
            detection_retry_ms: 500,
            modal_close_ms: 500,
            observe_interval_ms: 250,
        }
    }
}

impl Timings {
    pub fn connect_settle(&self) -> Duration {
        Duration::from_millis(self.connect_settle_ms)
    }

    pub fn detection_retry(&self) -> Duration {
        Duration::from_millis(self.detection_retry_ms)
    }

    pub fn modal_close(&self) -> Duration {
        Duration::from_millis(self.modal_close_ms)
    }

    pub fn observe_interval(&self) -> Duration {
        Duration::from_millis(self.observe_interval_ms)
    }
}

/// Initial values of the action forms.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub program_id: String,
    pub function_id: String,
    pub fee: String,
    pub amount: String,
    pub receiver: String,
    pub message: String,
    pub record_status: String,
    pub history_event_type: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            program_id: "credits.aleo".to_string(),
            function_id: "transfer_public".to_string(),
            fee: "100000".to_string(),
            amount: "100000".to_string(),
            receiver: "aleo12jhkt3q85u5peer0mc4g3kjk6mpfp9rwp8nl89prrah09ncq0qxq9un40c".to_string(),
            message: "Hello Aleo!".to_string(),
            record_status: "spent".to_string(),
            history_event_type: "execute".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read the file named by [`CONFIG_PATH_ENV`], or fall back to defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Read { path, source })?;
                Self::from_toml(&contents)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::default())
    }
}
