//! # Terminal Configuration
//!
//! Configuration for the register binary.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VEGA_DB_PATH=/data/vega.db                                         │
//! │     VEGA_CASHIER_ID=alice                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vega-pos/terminal.toml (Linux)                           │
//! │     ~/Library/Application Support/com.vega.pos/terminal.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./vega.db, 800ms camera window, 300ms wedge window                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Register 1"
//!
//! [scanner]
//! camera_device = 0
//! camera_debounce_ms = 800
//! wedge_debounce_ms = 300
//!
//! [database]
//! path = "./vega.db"
//!
//! [session]
//! cashier_id = "cashier-1"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vega_core::validation::validate_required;

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Configuration for this register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    pub id: String,

    /// Human-readable device name (e.g., "Register 1").
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_name() -> String {
    "Register 1".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: Uuid::new_v4().to_string(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Scanner Configuration
// =============================================================================

/// Scan pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Camera device index for the capture worker.
    #[serde(default)]
    pub camera_device: u32,

    /// Debounce window for camera scans (milliseconds).
    /// Default: 800. A barcode decodes on every frame, so the window has
    /// to cover many frame periods.
    #[serde(default = "default_camera_debounce")]
    pub camera_debounce_ms: u64,

    /// Debounce window for wedge/manual entry (milliseconds).
    /// Default: 300. Wedge scanners fire once per trigger pull, so a
    /// shorter window only has to absorb double-triggers.
    #[serde(default = "default_wedge_debounce")]
    pub wedge_debounce_ms: u64,
}

fn default_camera_debounce() -> u64 {
    800
}

fn default_wedge_debounce() -> u64 {
    300
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            camera_device: 0,
            camera_debounce_ms: default_camera_debounce(),
            wedge_debounce_ms: default_wedge_debounce(),
        }
    }
}

impl ScannerConfig {
    /// Camera debounce window as a Duration.
    pub fn camera_window(&self) -> Duration {
        Duration::from_millis(self.camera_debounce_ms)
    }

    /// Wedge debounce window as a Duration.
    pub fn wedge_window(&self) -> Duration {
        Duration::from_millis(self.wedge_debounce_ms)
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./vega.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cashier identifier stamped on committed tickets.
    #[serde(default = "default_cashier_id")]
    pub cashier_id: String,
}

fn default_cashier_id() -> String {
    "cashier-1".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            cashier_id: default_cashier_id(),
        }
    }
}

// =============================================================================
// Main Terminal Configuration
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Device-specific configuration.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Scan pipeline settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Database location.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session defaults.
    #[serde(default)]
    pub session: SessionConfig,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (terminal.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| SessionError::Config(e.to_string()))?;
                config = toml::from_str(&contents)
                    .map_err(|e| SessionError::Config(e.to_string()))?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        validate_required("device.id", &self.device.id)
            .map_err(|e| SessionError::Config(e.to_string()))?;
        validate_required("session.cashier_id", &self.session.cashier_id)
            .map_err(|e| SessionError::Config(e.to_string()))?;
        if self.scanner.camera_debounce_ms == 0 || self.scanner.wedge_debounce_ms == 0 {
            return Err(SessionError::Config(
                "debounce windows must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("VEGA_DEVICE_ID") {
            debug!(device_id = %id, "Overriding device ID from environment");
            self.device.id = id;
        }

        if let Ok(name) = std::env::var("VEGA_DEVICE_NAME") {
            self.device.name = name;
        }

        if let Ok(path) = std::env::var("VEGA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(id) = std::env::var("VEGA_CASHIER_ID") {
            self.session.cashier_id = id;
        }

        if let Ok(ms) = std::env::var("VEGA_CAMERA_DEBOUNCE_MS") {
            if let Ok(parsed) = ms.parse::<u64>() {
                self.scanner.camera_debounce_ms = parsed;
            }
        }

        if let Ok(ms) = std::env::var("VEGA_WEDGE_DEBOUNCE_MS") {
            if let Ok(parsed) = ms.parse::<u64>() {
                self.scanner.wedge_debounce_ms = parsed;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "vega", "pos")
            .map(|dirs| dirs.config_dir().join("terminal.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TerminalConfig::default();
        assert!(!config.device.id.is_empty()); // Auto-generated
        assert_eq!(config.scanner.camera_debounce_ms, 800);
        assert_eq!(config.scanner.wedge_debounce_ms, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = TerminalConfig::default();
        config.device.id = String::new();
        assert!(config.validate().is_err());

        let mut config = TerminalConfig::default();
        config.scanner.wedge_debounce_ms = 0;
        assert!(config.validate().is_err());

        // Whitespace-only ids are as useless as empty ones.
        let mut config = TerminalConfig::default();
        config.session.cashier_id = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TerminalConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scanner]"));

        let parsed: TerminalConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.scanner.camera_debounce_ms, 800);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let parsed: TerminalConfig = toml::from_str(
            r#"
            [session]
            cashier_id = "alice"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.session.cashier_id, "alice");
        assert_eq!(parsed.scanner.camera_debounce_ms, 800);
    }
}
