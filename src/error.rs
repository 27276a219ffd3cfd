//! Error types for route-picker

use crate::selection::Role;
use thiserror::Error;

/// Main error type for route-picker operations
///
/// Every variant is terminal at the boundary where it occurs: a failed
/// operation leaves markers, the active role and the displayed route as
/// they were.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("No neighbouring node near ({lat}, {lng})")]
    NoNeighbourFound { lat: f64, lng: f64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("No {0} node selected yet")]
    MissingEndpoint(Role),

    #[error("No route between nodes {src} and {dst}")]
    NoRouteFound { src: u64, dst: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("{0} gesture(s) failed")]
    GesturesFailed(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable code shown alongside user-facing notices
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidCoordinate(_) => "INVALID_COORDINATE",
            Error::NoNeighbourFound { .. } => "NO_NEIGHBOUR_FOUND",
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::InvalidPath(_) => "INVALID_PATH",
            Error::MissingEndpoint(_) => "MISSING_ENDPOINT",
            Error::NoRouteFound { .. } => "NO_ROUTE_FOUND",
            Error::Config(_) => "CONFIG_ERROR",
            Error::SessionClosed => "SESSION_CLOSED",
            Error::GesturesFailed(_) => "GESTURES_FAILED",
            Error::Io(_) | Error::Json(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same gesture may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type alias for route-picker operations
pub type Result<T> = std::result::Result<T, Error>;
