//! In-memory surface rendered as GeoJSON
//!
//! Keeps the current layers and view, and renders them as a
//! `FeatureCollection` that a Leaflet page can load with `L.geoJSON`.

use super::{LineHandle, LineStyle, MapSurface, MarkerHandle};
use crate::geo::GeoPoint;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use std::collections::BTreeMap;

/// A marker currently on the surface
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    pub point: GeoPoint,
    pub label: String,
}

/// A line currently on the surface
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub points: Vec<GeoPoint>,
    pub style: LineStyle,
    pub label: String,
}

/// Current view of the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: GeoPoint,
    pub zoom: u8,
}

/// Surface that keeps its layers in memory
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    markers: BTreeMap<MarkerHandle, MarkerLayer>,
    lines: BTreeMap<LineHandle, LineLayer>,
    view: Option<View>,
    next_id: u64,
}

impl GeoJsonSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Markers in placement order
    pub fn markers(&self) -> impl Iterator<Item = &MarkerLayer> {
        self.markers.values()
    }

    /// Lines in placement order
    pub fn lines(&self) -> impl Iterator<Item = &LineLayer> {
        self.lines.values()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&MarkerLayer> {
        self.markers.get(&handle)
    }

    pub fn line(&self, handle: LineHandle) -> Option<&LineLayer> {
        self.lines.get(&handle)
    }

    pub fn view(&self) -> Option<View> {
        self.view
    }

    /// Render every layer as a GeoJSON `FeatureCollection`
    ///
    /// GeoJSON positions are `[lng, lat]`.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let markers = self.markers().map(|m| {
            let mut feature = Feature::from(Geometry::new(Value::Point(position(m.point))));
            feature.set_property("popup", m.label.clone());
            feature
        });

        let lines = self.lines().map(|l| {
            let positions = l.points.iter().copied().map(position).collect();
            let mut feature = Feature::from(Geometry::new(Value::LineString(positions)));
            feature.set_property("popup", l.label.clone());
            feature.set_property("color", l.style.color.clone());
            feature.set_property("weight", l.style.weight);
            feature.set_property("opacity", l.style.opacity);
            feature
        });

        FeatureCollection {
            bbox: None,
            features: markers.chain(lines).collect(),
            foreign_members: None,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn position(point: GeoPoint) -> Vec<f64> {
    vec![point.lng, point.lat]
}

impl MapSurface for GeoJsonSurface {
    fn add_marker(&mut self, point: GeoPoint, label: &str) -> MarkerHandle {
        let handle = MarkerHandle(self.next_id());
        self.markers.insert(
            handle,
            MarkerLayer {
                point,
                label: label.to_string(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn add_line(&mut self, points: &[GeoPoint], style: &LineStyle, label: &str) -> LineHandle {
        let handle = LineHandle(self.next_id());
        self.lines.insert(
            handle,
            LineLayer {
                points: points.to_vec(),
                style: style.clone(),
                label: label.to_string(),
            },
        );
        handle
    }

    fn remove_line(&mut self, handle: LineHandle) {
        self.lines.remove(&handle);
    }

    fn center_on(&mut self, point: GeoPoint, zoom: u8) {
        self.view = Some(View {
            center: point,
            zoom,
        });
    }
}
