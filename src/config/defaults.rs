//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, style, view};

/// Default routing server base URL
pub const DEFAULT_BASE_URL: &str = api::DEFAULT_BASE_URL;

/// Default closest-node endpoint path
pub const DEFAULT_CLOSEST_PATH: &str = api::CLOSEST_NODE_PATH;

/// Default route endpoint path
pub const DEFAULT_ROUTE_PATH: &str = api::ROUTE_PATH;

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = api::DEFAULT_TIMEOUT_MS;

/// Default initial map center
pub const DEFAULT_CENTER_LAT: f64 = view::INITIAL_CENTER_LAT;
pub const DEFAULT_CENTER_LNG: f64 = view::INITIAL_CENTER_LNG;

/// Default initial zoom
pub const DEFAULT_INITIAL_ZOOM: u8 = view::INITIAL_ZOOM;

/// Default zoom when flying to a new marker
pub const DEFAULT_FOCUS_ZOOM: u8 = view::FOCUS_ZOOM;

/// Default route line style
pub const DEFAULT_ROUTE_COLOR: &str = style::ROUTE_COLOR;
pub const DEFAULT_ROUTE_WEIGHT: u32 = style::ROUTE_WEIGHT;
pub const DEFAULT_ROUTE_OPACITY: f64 = style::ROUTE_OPACITY;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "route-picker";
