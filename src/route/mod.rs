//! Route overlay rendering
//!
//! At most one route is displayed at a time. A new route replaces the old
//! one wholesale; an invalid route is rejected before anything on the
//! surface changes.

use crate::error::{Error, Result};
use crate::geo::{self, GeoPoint};
use crate::surface::{LineHandle, LineStyle, MapSurface};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Route payload as returned by the route query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Total length in meters
    pub distance: f64,
    /// Ordered `[lat, lng]` pairs
    pub path: Vec<[f64; 2]>,
}

/// A validated route: distance plus at least two points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    distance_meters: f64,
    path: Vec<GeoPoint>,
}

impl RouteGeometry {
    /// Validate a distance and path
    pub fn new(distance_meters: f64, path: Vec<GeoPoint>) -> Result<Self> {
        if path.len() < 2 {
            return Err(Error::InvalidPath(format!(
                "A route needs at least 2 points, got {}",
                path.len()
            )));
        }
        if !distance_meters.is_finite() || distance_meters < 0.0 {
            return Err(Error::InvalidPath(format!(
                "Invalid route distance: {}",
                distance_meters
            )));
        }
        for (i, p) in path.iter().enumerate() {
            geo::validate(p.lat, p.lng)
                .map_err(|e| Error::InvalidPath(format!("Point {}: {}", i, e)))?;
        }
        Ok(Self {
            distance_meters,
            path,
        })
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }
}

impl TryFrom<RouteResponse> for RouteGeometry {
    type Error = Error;

    fn try_from(response: RouteResponse) -> Result<Self> {
        let path = response
            .path
            .into_iter()
            .map(|[lat, lng]| GeoPoint::new(lat, lng))
            .collect();
        Self::new(response.distance, path)
    }
}

/// Owns the displayed route and its line handle
#[derive(Debug, Default)]
pub struct RouteRenderer {
    style: LineStyle,
    current: Option<(RouteGeometry, LineHandle)>,
}

impl RouteRenderer {
    /// Create a renderer drawing with `style`
    pub fn new(style: LineStyle) -> Self {
        Self {
            style,
            current: None,
        }
    }

    /// Replace the displayed route
    pub fn show_route<S: MapSurface>(
        &mut self,
        surface: &mut S,
        distance: f64,
        path: Vec<GeoPoint>,
    ) -> Result<&RouteGeometry> {
        let geometry = RouteGeometry::new(distance, path)?;
        Ok(self.show_geometry(surface, geometry))
    }

    /// Replace the displayed route with an already validated geometry
    pub fn show_geometry<S: MapSurface>(
        &mut self,
        surface: &mut S,
        geometry: RouteGeometry,
    ) -> &RouteGeometry {
        self.clear_route(surface);

        let label = format!("distance: {} m", geometry.distance_meters);
        let handle = surface.add_line(&geometry.path, &self.style, &label);
        debug!(
            "Displayed route of {} m through {} points",
            geometry.distance_meters,
            geometry.path.len()
        );

        let (geometry, _) = self.current.insert((geometry, handle));
        geometry
    }

    /// Remove the displayed route, if any
    pub fn clear_route<S: MapSurface>(&mut self, surface: &mut S) {
        if let Some((_, handle)) = self.current.take() {
            surface.remove_line(handle);
        }
    }

    pub fn current(&self) -> Option<&RouteGeometry> {
        self.current.as_ref().map(|(geometry, _)| geometry)
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::GeoJsonSurface;
    use approx::assert_relative_eq;

    fn points(pairs: &[(f64, f64)]) -> Vec<GeoPoint> {
        pairs.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()
    }

    #[test]
    fn test_show_route() {
        let mut surface = GeoJsonSurface::new();
        let mut renderer = RouteRenderer::default();

        let shown = renderer
            .show_route(&mut surface, 1200.5, points(&[(48.0, 9.0), (48.1, 9.2)]))
            .unwrap();
        assert_relative_eq!(shown.distance_meters(), 1200.5);

        assert_eq!(surface.line_count(), 1);
        let line = surface.lines().next().unwrap();
        assert_eq!(line.label, "distance: 1200.5 m");
        assert_eq!(line.style, LineStyle::default());
    }

    #[test]
    fn test_new_route_replaces_old() {
        let mut surface = GeoJsonSurface::new();
        let mut renderer = RouteRenderer::default();

        renderer
            .show_route(
                &mut surface,
                1200.5,
                points(&[(48.0, 9.0), (48.05, 9.1), (48.1, 9.2)]),
            )
            .unwrap();
        renderer
            .show_route(&mut surface, 800.0, points(&[(48.1, 9.2), (48.0, 9.0)]))
            .unwrap();

        assert_eq!(surface.line_count(), 1);
        let line = surface.lines().next().unwrap();
        assert_eq!(line.points, points(&[(48.1, 9.2), (48.0, 9.0)]));
        assert_relative_eq!(renderer.current().unwrap().distance_meters(), 800.0);
    }

    #[test]
    fn test_invalid_route_keeps_existing() {
        let mut surface = GeoJsonSurface::new();
        let mut renderer = RouteRenderer::default();
        renderer
            .show_route(&mut surface, 10.0, points(&[(48.0, 9.0), (48.1, 9.2)]))
            .unwrap();

        let result = renderer.show_route(&mut surface, 5.0, points(&[(48.0, 9.0)]));
        assert!(matches!(result, Err(Error::InvalidPath(_))));

        assert_eq!(surface.line_count(), 1);
        assert_relative_eq!(renderer.current().unwrap().distance_meters(), 10.0);
    }

    #[test]
    fn test_invalid_points_rejected() {
        assert!(RouteGeometry::new(1.0, points(&[(48.0, 9.0), (95.0, 9.0)])).is_err());
        assert!(RouteGeometry::new(-1.0, points(&[(48.0, 9.0), (48.1, 9.0)])).is_err());
        assert!(RouteGeometry::new(f64::NAN, points(&[(48.0, 9.0), (48.1, 9.0)])).is_err());
        assert!(RouteGeometry::new(0.0, Vec::new()).is_err());
    }

    #[test]
    fn test_clear_route_is_idempotent() {
        let mut surface = GeoJsonSurface::new();
        let mut renderer = RouteRenderer::default();

        renderer.clear_route(&mut surface);
        renderer
            .show_route(&mut surface, 10.0, points(&[(48.0, 9.0), (48.1, 9.2)]))
            .unwrap();

        renderer.clear_route(&mut surface);
        renderer.clear_route(&mut surface);
        assert_eq!(surface.line_count(), 0);
        assert!(renderer.current().is_none());
    }

    #[test]
    fn test_from_response() {
        let response: RouteResponse =
            serde_json::from_str(r#"{"distance": 42.0, "path": [[48.0, 9.0], [48.1, 9.2]]}"#)
                .unwrap();
        let geometry = RouteGeometry::try_from(response).unwrap();
        assert_eq!(geometry.path()[1], GeoPoint::new(48.1, 9.2));
    }
}
