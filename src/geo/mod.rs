//! Geographic points and their validation
//!
//! Every coordinate that enters the crate (map click, form entry, lookup
//! response, route payload) passes through one of the functions here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point without validating it
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Rule applied on top of the finiteness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Latitude in [-90, 90], longitude in [-180, 180]
    #[default]
    Geographic,
    /// Geographic bounds and no negative component on either axis
    NonNegative,
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geographic => write!(f, "geographic"),
            Self::NonNegative => write!(f, "non_negative"),
        }
    }
}

impl std::str::FromStr for ValidationRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geographic" | "geo" => Ok(Self::Geographic),
            "non_negative" | "non-negative" | "nonnegative" => Ok(Self::NonNegative),
            _ => Err(format!("Unknown validation rule: {}", s)),
        }
    }
}

/// Validate a coordinate pair with the geographic rule
pub fn validate(lat: f64, lng: f64) -> Result<GeoPoint> {
    validate_with(lat, lng, ValidationRule::Geographic)
}

/// Validate a coordinate pair with an explicit rule
///
/// Zero is a valid value on both axes under every rule.
pub fn validate_with(lat: f64, lng: f64, rule: ValidationRule) -> Result<GeoPoint> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(Error::InvalidCoordinate(format!(
            "({}, {}) is not a finite coordinate",
            lat, lng
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidCoordinate(format!(
            "Latitude {} is out of range [-90, 90]",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidCoordinate(format!(
            "Longitude {} is out of range [-180, 180]",
            lng
        )));
    }
    if rule == ValidationRule::NonNegative && (lat < 0.0 || lng < 0.0) {
        return Err(Error::InvalidCoordinate(format!(
            "({}, {}) has a negative component",
            lat, lng
        )));
    }
    Ok(GeoPoint { lat, lng })
}

/// Parse and validate text from a point-entry form
pub fn parse_point(lat: &str, lng: &str, rule: ValidationRule) -> Result<GeoPoint> {
    let lat = parse_axis("latitude", lat)?;
    let lng = parse_axis("longitude", lng)?;
    validate_with(lat, lng, rule)
}

fn parse_axis(axis: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::InvalidCoordinate(format!("Missing {}", axis)));
    }
    text.parse()
        .map_err(|_| Error::InvalidCoordinate(format!("Invalid {}: {}", axis, text)))
}
