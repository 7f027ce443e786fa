//! Driver configuration.
//!
//! Curve shape, port map, button map and tick interval are all fixed at
//! construction time; this module only loads them from a TOML file in the
//! user config directory (or hands out the defaults when no file exists).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::curve::{ControlPoint, CurveTable};
use crate::driver::poller::PortMap;
use crate::driver::sample::ButtonMap;

const CONFIG_DIR: &str = "padstream";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no user config directory available")]
    NoConfigDir,
}

/// The four Bezier control points defining the response curve shape.
///
/// Swapping in a differently shaped curve (a non-linear deadzone, say) is
/// purely a matter of changing these points; the evaluation never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub a: ControlPoint,
    pub b: ControlPoint,
    pub c: ControlPoint,
    pub d: ControlPoint,
}

impl CurveConfig {
    pub fn table(&self) -> CurveTable {
        CurveTable::build(self.a, self.b, self.c, self.d)
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            a: ControlPoint::new(0, 0),
            b: ControlPoint::new(0, 0),
            c: ControlPoint::new(128, 32767),
            d: ControlPoint::new(128, 32767),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub tick_interval_ms: u64,
    pub port_map: PortMap,
    pub button_map: ButtonMap,
    pub curve: CurveConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            port_map: PortMap::default(),
            button_map: ButtonMap::default(),
            curve: CurveConfig::default(),
        }
    }
}

impl DriverConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        debug!("Loading driver config from {}", path.display());
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load the config file, falling back to the defaults when it is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => {
                info!("Loaded driver config");
                config
            }
            Err(e) => {
                warn!("Using default driver config ({e})");
                Self::default()
            }
        }
    }

    pub fn store(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(&path, raw)?;
        info!("Stored driver config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = DriverConfig::default();
        let raw = toml::to_string_pretty(&config).expect("default config serializes");
        let parsed: DriverConfig = toml::from_str(&raw).expect("serialized config parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: DriverConfig =
            toml::from_str("tick_interval_ms = 8\n").expect("partial config parses");
        assert_eq!(parsed.tick_interval_ms, 8);
        assert_eq!(parsed.port_map, PortMap::default());
        assert_eq!(parsed.curve, CurveConfig::default());
    }

    #[test]
    fn default_curve_config_builds_full_range_table() {
        let table = DriverConfig::default().curve.table();
        assert_eq!(table.lookup(255), 32767);
        assert_eq!(table.lookup(0), -32767);
        assert_eq!(table.lookup(128), 0);
    }

    #[test]
    fn custom_curve_points_parse() {
        let raw = r#"
            [curve]
            a = { x = 0, y = 0 }
            b = { x = 96, y = 0 }
            c = { x = 128, y = 32767 }
            d = { x = 128, y = 32767 }
        "#;
        let parsed: DriverConfig = toml::from_str(raw).expect("curve section parses");
        assert_eq!(parsed.curve.b, ControlPoint::new(96, 0));
    }
}
