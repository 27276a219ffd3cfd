//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/route-picker/config.toml

pub mod defaults;

use crate::constants::view::MAX_ZOOM;
use crate::error::{Error, Result};
use crate::geo::{self, GeoPoint, ValidationRule};
use crate::selection::Role;
use crate::surface::LineStyle;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Routing server endpoints
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Map view settings
    #[serde(default)]
    pub map: MapConfig,

    /// Route overlay style
    #[serde(default)]
    pub route: RouteConfig,

    /// Selection behavior
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Routing server endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the routing server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Closest-node endpoint, relative to the base URL
    #[serde(default = "default_closest_path")]
    pub closest_path: String,

    /// Route endpoint, relative to the base URL
    #[serde(default = "default_route_path")]
    pub route_path: String,

    /// Upper bound for a single request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lng")]
    pub center_lng: f64,

    /// Zoom of the initial view
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Zoom used when flying to a new marker
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,
}

/// Route overlay style
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_route_color")]
    pub color: String,

    #[serde(default = "default_route_weight")]
    pub weight: u32,

    #[serde(default = "default_route_opacity")]
    pub opacity: f64,
}

/// Selection behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Role assigned by the first map click
    #[serde(default)]
    pub first_role: Role,

    /// Coordinate validation rule for clicks and form entries
    #[serde(default)]
    pub validation: ValidationRule,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_closest_path() -> String {
    DEFAULT_CLOSEST_PATH.to_string()
}
fn default_route_path() -> String {
    DEFAULT_ROUTE_PATH.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_center_lat() -> f64 {
    DEFAULT_CENTER_LAT
}
fn default_center_lng() -> f64 {
    DEFAULT_CENTER_LNG
}
fn default_initial_zoom() -> u8 {
    DEFAULT_INITIAL_ZOOM
}
fn default_focus_zoom() -> u8 {
    DEFAULT_FOCUS_ZOOM
}
fn default_route_color() -> String {
    DEFAULT_ROUTE_COLOR.to_string()
}
fn default_route_weight() -> u32 {
    DEFAULT_ROUTE_WEIGHT
}
fn default_route_opacity() -> f64 {
    DEFAULT_ROUTE_OPACITY
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            closest_path: default_closest_path(),
            route_path: default_route_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            initial_zoom: default_initial_zoom(),
            focus_zoom: default_focus_zoom(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            color: default_route_color(),
            weight: default_route_weight(),
            opacity: default_route_opacity(),
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl MapConfig {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lng)
    }
}

impl RouteConfig {
    pub fn style(&self) -> LineStyle {
        LineStyle {
            color: self.color.clone(),
            weight: self.weight,
            opacity: self.opacity,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.lookup.base_url.trim().is_empty() {
            return Err(Error::Config("lookup.base_url must not be empty".to_string()));
        }
        if self.lookup.timeout_ms == 0 {
            return Err(Error::Config("lookup.timeout_ms must be positive".to_string()));
        }
        geo::validate(self.map.center_lat, self.map.center_lng)
            .map_err(|e| Error::Config(format!("map center: {}", e)))?;
        for (key, zoom) in [
            ("map.initial_zoom", self.map.initial_zoom),
            ("map.focus_zoom", self.map.focus_zoom),
        ] {
            if zoom > MAX_ZOOM {
                return Err(Error::Config(format!(
                    "{} must be at most {}, got {}",
                    key, MAX_ZOOM, zoom
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.route.opacity) {
            return Err(Error::Config(format!(
                "route.opacity must be within [0, 1], got {}",
                self.route.opacity
            )));
        }
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["lookup", "base_url"] => Some(self.lookup.base_url.clone()),
            ["lookup", "closest_path"] => Some(self.lookup.closest_path.clone()),
            ["lookup", "route_path"] => Some(self.lookup.route_path.clone()),
            ["lookup", "timeout_ms"] => Some(self.lookup.timeout_ms.to_string()),

            ["map", "center_lat"] => Some(self.map.center_lat.to_string()),
            ["map", "center_lng"] => Some(self.map.center_lng.to_string()),
            ["map", "initial_zoom"] => Some(self.map.initial_zoom.to_string()),
            ["map", "focus_zoom"] => Some(self.map.focus_zoom.to_string()),

            ["route", "color"] => Some(self.route.color.clone()),
            ["route", "weight"] => Some(self.route.weight.to_string()),
            ["route", "opacity"] => Some(self.route.opacity.to_string()),

            ["selection", "first_role"] => Some(self.selection.first_role.to_string()),
            ["selection", "validation"] => Some(self.selection.validation.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong; the config is
    /// left unchanged in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["lookup", "base_url"] => updated.lookup.base_url = value.to_string(),
            ["lookup", "closest_path"] => updated.lookup.closest_path = value.to_string(),
            ["lookup", "route_path"] => updated.lookup.route_path = value.to_string(),
            ["lookup", "timeout_ms"] => updated.lookup.timeout_ms = parse_value(key, value)?,

            ["map", "center_lat"] => updated.map.center_lat = parse_value(key, value)?,
            ["map", "center_lng"] => updated.map.center_lng = parse_value(key, value)?,
            ["map", "initial_zoom"] => updated.map.initial_zoom = parse_value(key, value)?,
            ["map", "focus_zoom"] => updated.map.focus_zoom = parse_value(key, value)?,

            ["route", "color"] => updated.route.color = value.to_string(),
            ["route", "weight"] => updated.route.weight = parse_value(key, value)?,
            ["route", "opacity"] => updated.route.opacity = parse_value(key, value)?,

            ["selection", "first_role"] => {
                updated.selection.first_role = value.parse().map_err(Error::Config)?;
            }
            ["selection", "validation"] => {
                updated.selection.validation = value.parse().map_err(Error::Config)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "lookup.base_url",
            "lookup.closest_path",
            "lookup.route_path",
            "lookup.timeout_ms",
            "map.center_lat",
            "map.center_lng",
            "map.initial_zoom",
            "map.focus_zoom",
            "route.color",
            "route.weight",
            "route.opacity",
            "selection.first_role",
            "selection.validation",
        ]
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.lookup.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.lookup.closest_path, "closest_neighbour");
        assert_eq!(config.lookup.timeout_ms, 5000);
        assert_eq!(config.map.focus_zoom, 10);
        assert_eq!(config.route.color, "#ff7800");
        assert_eq!(config.selection.first_role, Role::Source);
        assert_eq!(config.selection.validation, ValidationRule::Geographic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("route.weight"), Some("5".to_string()));

        config.set("route.weight", "8").unwrap();
        assert_eq!(config.get("route.weight"), Some("8".to_string()));

        config.set("selection.first_role", "dest").unwrap();
        assert_eq!(config.selection.first_role, Role::Destination);
        assert_eq!(config.get("selection.first_role"), Some("destination".to_string()));

        config.set("selection.validation", "non_negative").unwrap();
        assert_eq!(config.selection.validation, ValidationRule::NonNegative);
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value_leaves_config_unchanged() {
        let mut config = Config::default();
        assert!(config.set("lookup.timeout_ms", "soon").is_err());
        assert!(config.set("lookup.timeout_ms", "0").is_err());
        assert!(config.set("route.opacity", "1.5").is_err());
        assert!(config.set("map.focus_zoom", "30").is_err());
        assert!(config.set("selection.first_role", "via").is_err());

        assert_eq!(config.lookup.timeout_ms, 5000);
        assert_eq!(config.route.opacity, 0.65);
        assert_eq!(config.map.focus_zoom, 10);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.lookup.base_url = "http://routing.local:9000".to_string();
        config.selection.first_role = Role::Destination;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.lookup.base_url, "http://routing.local:9000");
        assert_eq!(loaded.selection.first_role, Role::Destination);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from(&temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[lookup]\ntimeout_ms = 250\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.lookup.timeout_ms, 250);
        assert_eq!(loaded.lookup.route_path, "route");
        assert_eq!(loaded.route.weight, 5);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[map]\ncenter_lat = 120.0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[lookup]"));
        assert!(toml.contains("[map]"));
        assert!(toml.contains("[route]"));
        assert!(toml.contains("[selection]"));
        assert!(toml.contains("first_role = \"source\""));
    }

    #[test]
    fn test_style_and_timeout() {
        let config = Config::default();
        assert_eq!(config.route.style(), LineStyle::default());
        assert_eq!(config.lookup.timeout(), Duration::from_secs(5));
        assert_eq!(config.map.center(), GeoPoint::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG));
    }

    #[test]
    fn test_available_keys() {
        let keys = Config::available_keys();
        let config = Config::default();
        for key in &keys {
            assert!(config.get(key).is_some(), "{}", key);
        }
    }
}
