//! Map display surface
//!
//! The five operations the selection and routing components need from a
//! mapping widget. Any widget exposing them can host a session.

pub mod geojson;

use crate::constants::style::{ROUTE_COLOR, ROUTE_OPACITY, ROUTE_WEIGHT};
use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

pub use geojson::GeoJsonSurface;

/// Opaque handle to a marker placed on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Opaque handle to a line placed on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineHandle(pub u64);

/// Fixed style of the route overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: ROUTE_COLOR.to_string(),
            weight: ROUTE_WEIGHT,
            opacity: ROUTE_OPACITY,
        }
    }
}

/// Operations a mapping widget must offer
pub trait MapSurface {
    /// Place a marker with a popup label
    fn add_marker(&mut self, point: GeoPoint, label: &str) -> MarkerHandle;

    /// Remove a marker; unknown handles are ignored
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Draw a connected line through `points`
    fn add_line(&mut self, points: &[GeoPoint], style: &LineStyle, label: &str) -> LineHandle;

    /// Remove a line; unknown handles are ignored
    fn remove_line(&mut self, handle: LineHandle);

    /// Center (or fly) the view to `point` at `zoom`
    fn center_on(&mut self, point: GeoPoint, zoom: u8);
}
