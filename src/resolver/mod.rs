//! Closest-node and route lookups
//!
//! Both lookups are single-shot async operations. Nothing here cancels or
//! de-duplicates requests; the session decides whether a response is still
//! wanted when it arrives.

pub mod http;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::route::RouteResponse;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

pub use http::HttpResolver;

/// A routing graph node snapped from a raw coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub point: GeoPoint,
    pub node_id: u64,
}

/// Trait for closest-node lookup backends
pub trait NodeResolver: Send + Sync {
    /// Snap `point` to the nearest routable node
    ///
    /// Fails with `NoNeighbourFound` when the service has nothing near the
    /// point and with `Transport` when the request itself fails.
    fn resolve_closest(&self, point: GeoPoint) -> impl Future<Output = Result<ResolvedNode>> + Send;
}

/// Trait for route query backends
pub trait RouteSource: Send + Sync {
    /// Fetch the route between two resolved nodes
    fn fetch_route(&self, src: u64, dst: u64) -> impl Future<Output = Result<RouteResponse>> + Send;
}

/// Bound `fut` by `limit`, reporting expiry as a transport failure
pub async fn with_timeout<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Transport(format!(
            "Request timed out after {} ms",
            limit.as_millis()
        ))),
    }
}
