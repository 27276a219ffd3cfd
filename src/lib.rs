//! route-picker: Interactive Route Endpoint Selection
//!
//! A library and CLI tool for picking a source and a destination on a map,
//! snapping both to the nearest nodes of a routing graph and drawing the
//! route a routing server computes between them.
//!
//! ## Features
//!
//! - Click-to-select with alternating source/destination roles
//! - Closest-node and route lookups over HTTP
//! - Latest-gesture-wins handling of out-of-order responses
//! - In-memory map surface exported as GeoJSON
//! - Actor-style session driver + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use route_picker::{Config, GeoJsonSurface, GeoPoint, HttpResolver, MapSession};
//!
//! let config = Config::default();
//! let resolver = HttpResolver::from_config(&config.lookup).unwrap();
//! let mut session = MapSession::new(GeoJsonSurface::new(), resolver, &config);
//!
//! // Draw a route the server already computed
//! let path = vec![GeoPoint::new(48.77, 9.18), GeoPoint::new(48.78, 9.19)];
//! let route = session.show_route(1234.5, path).unwrap();
//! println!("Route: {} m", route.distance_meters());
//!
//! let collection = session.surface().to_feature_collection();
//! println!("{}", serde_json::to_string_pretty(&collection).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod markers;
pub mod resolver;
pub mod route;
pub mod selection;
pub mod session;
pub mod surface;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geo::{GeoPoint, ValidationRule};
pub use resolver::{HttpResolver, NodeResolver, ResolvedNode, RouteSource};
pub use route::{RouteGeometry, RouteResponse};
pub use selection::Role;
pub use session::MapSession;
pub use surface::{GeoJsonSurface, MapSurface};
