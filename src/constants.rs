//! Centralized constants for the route-picker crate
//!
//! Display and transport constants shared by the configuration defaults and
//! the rendering components.

/// Map view constants
pub mod view {
    /// Initial map center latitude (Stuttgart)
    pub const INITIAL_CENTER_LAT: f64 = 48.77490788045187;

    /// Initial map center longitude (Stuttgart)
    pub const INITIAL_CENTER_LNG: f64 = 9.17959213256836;

    /// Zoom level of the initial view
    pub const INITIAL_ZOOM: u8 = 8;

    /// Zoom level used when flying to a freshly placed marker
    pub const FOCUS_ZOOM: u8 = 10;

    /// Largest zoom level the tile layer serves
    pub const MAX_ZOOM: u8 = 18;
}

/// Route overlay style
pub mod style {
    /// Line color
    pub const ROUTE_COLOR: &str = "#ff7800";

    /// Line width in pixels
    pub const ROUTE_WEIGHT: u32 = 5;

    /// Line opacity
    pub const ROUTE_OPACITY: f64 = 0.65;
}

/// Lookup service endpoints
pub mod api {
    /// Default base URL of the routing server
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

    /// Closest-node lookup path
    pub const CLOSEST_NODE_PATH: &str = "closest_neighbour";

    /// Route query path
    pub const ROUTE_PATH: &str = "route";

    /// Upper bound for a single lookup or route request in milliseconds
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!("route-picker/", env!("CARGO_PKG_VERSION"));
}
