//! System configuration

use crate::core::{Coordinate, DIGEST_ITERATIONS, RSSI_WINDOW};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading or validating configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Reading the configuration file failed
    Io { path: String, details: String },
    /// The configuration file is not valid JSON for the expected schema
    Parse { details: String },
    /// A parameter value is outside its valid range
    Invalid { parameter: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, details } => {
                write!(f, "cannot read configuration {}: {}", path, details)
            }
            ConfigError::Parse { details } => write!(f, "invalid configuration: {}", details),
            ConfigError::Invalid { parameter, reason } => {
                write!(f, "invalid configuration parameter {}: {}", parameter, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Message-bus connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    /// Broker hostname or address
    pub broker: String,
    /// Broker port
    pub port: u16,
    /// Wildcard topic carrying BLE scan results
    pub topic: String,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            broker: "192.168.31.124".to_string(),
            port: 1883,
            topic: "/ble/scannedDevices/#".to_string(),
            client_id: "ble-locator".to_string(),
            keep_alive_secs: 60,
        }
    }
}

/// One provisioned anchor receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorEntry {
    /// Stable anchor identifier as broadcast by the firmware
    pub id: String,
    /// X coordinate (meters)
    pub x: f64,
    /// Y coordinate (meters)
    pub y: f64,
}

impl AnchorEntry {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

/// Positioning core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositioningSettings {
    /// RSSI smoothing window capacity per anchor
    pub history_window: usize,
    /// Provisioned anchors and their fixed coordinates
    pub anchors: Vec<AnchorEntry>,
}

impl Default for PositioningSettings {
    fn default() -> Self {
        Self {
            history_window: RSSI_WINDOW,
            anchors: vec![
                AnchorEntry {
                    id: "ESP32-01".to_string(),
                    x: 0.0,
                    y: 0.0,
                },
                AnchorEntry {
                    id: "ESP32-02".to_string(),
                    x: 8.0,
                    y: 0.0,
                },
                AnchorEntry {
                    id: "ESP32-03".to_string(),
                    x: 4.0,
                    y: 4.0,
                },
            ],
        }
    }
}

/// Output sealing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// PEM-encoded RSA public key used to seal outgoing records
    pub public_key_path: PathBuf,
    /// Where to write the DER form of the key at startup; skipped if unset
    pub der_export_path: Option<PathBuf>,
    /// SHA-512 chain length applied to a record before encryption
    pub digest_iterations: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            public_key_path: PathBuf::from("public_key.pem"),
            der_export_path: Some(PathBuf::from("key.der")),
            digest_iterations: DIGEST_ITERATIONS,
        }
    }
}

/// CSV telemetry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Whether observation and position logs are written at all
    pub enabled: bool,
    /// Per-reading observation log
    pub observation_log: PathBuf,
    /// Sealed position log
    pub position_log: PathBuf,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            observation_log: PathBuf::from("data.csv"),
            position_log: PathBuf::from("position.csv"),
        }
    }
}

/// Complete system configuration.
///
/// Anchor coordinates and the history window are the only parameters the
/// positioning core consumes; everything else configures the glue around
/// it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub mqtt: MqttSettings,
    #[serde(default)]
    pub positioning: PositioningSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl SystemConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            details: e.to_string(),
        })
    }

    /// Check parameter ranges and cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker.is_empty() {
            return Err(ConfigError::Invalid {
                parameter: "mqtt.broker".to_string(),
                reason: "broker address must not be empty".to_string(),
            });
        }
        if self.mqtt.topic.is_empty() {
            return Err(ConfigError::Invalid {
                parameter: "mqtt.topic".to_string(),
                reason: "scan topic must not be empty".to_string(),
            });
        }
        if self.positioning.history_window == 0 {
            return Err(ConfigError::Invalid {
                parameter: "positioning.history_window".to_string(),
                reason: "smoothing window must hold at least one sample".to_string(),
            });
        }
        if self.positioning.anchors.is_empty() {
            return Err(ConfigError::Invalid {
                parameter: "positioning.anchors".to_string(),
                reason: "at least one anchor must be provisioned".to_string(),
            });
        }
        for (index, anchor) in self.positioning.anchors.iter().enumerate() {
            if anchor.id.is_empty() {
                return Err(ConfigError::Invalid {
                    parameter: format!("positioning.anchors[{}].id", index),
                    reason: "anchor id must not be empty".to_string(),
                });
            }
            let duplicates = self
                .positioning
                .anchors
                .iter()
                .filter(|other| other.id == anchor.id)
                .count();
            if duplicates > 1 {
                return Err(ConfigError::Invalid {
                    parameter: "positioning.anchors".to_string(),
                    reason: format!("anchor id {} is registered more than once", anchor.id),
                });
            }
        }
        if self.security.digest_iterations == 0 {
            return Err(ConfigError::Invalid {
                parameter: "security.digest_iterations".to_string(),
                reason: "digest chain must run at least once".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SystemConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.positioning.history_window, RSSI_WINDOW);
        assert_eq!(config.positioning.anchors.len(), 3);
        assert_eq!(config.mqtt.topic, "/ble/scannedDevices/#");
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = SystemConfig::default();
        config.positioning.history_window = 0;

        let error = config.validate().unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_duplicate_anchor_ids_rejected() {
        let mut config = SystemConfig::default();
        config.positioning.anchors[1].id = "ESP32-01".to_string();

        let error = config.validate().unwrap_err();
        let message = error.to_string();
        assert!(message.contains("ESP32-01"));
    }

    #[test]
    fn test_empty_anchor_set_rejected() {
        let mut config = SystemConfig::default();
        config.positioning.anchors.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_digest_iterations_rejected() {
        let mut config = SystemConfig::default();
        config.security.digest_iterations = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file_roundtrip() {
        let config = SystemConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SystemConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.mqtt.broker, config.mqtt.broker);
        assert_eq!(loaded.positioning.anchors.len(), 3);
    }

    #[test]
    fn test_partial_file_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"mqtt": {"broker": "localhost", "port": 1883,
            "topic": "/ble/scannedDevices/#", "client_id": "test",
            "keep_alive_secs": 30}}"#)
            .unwrap();

        let loaded = SystemConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.mqtt.broker, "localhost");
        assert_eq!(loaded.positioning.history_window, RSSI_WINDOW);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let error = SystemConfig::load_from_file("/nonexistent/config.json").unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let error = SystemConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}
