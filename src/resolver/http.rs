//! HTTP lookup backend
//!
//! Talks to the routing server:
//! - `GET {base}/closest_neighbour?lat=..&lng=..` -> `{lat, lng, id}` or a falsy body
//! - `GET {base}/route?src=..&dst=..` -> `{distance, path: [[lat, lng], ...]}` or a falsy body

use crate::config::LookupConfig;
use crate::constants::api::USER_AGENT;
use crate::error::{Error, Result};
use crate::geo::{self, GeoPoint};
use crate::resolver::{NodeResolver, ResolvedNode, RouteSource};
use crate::route::RouteResponse;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the closest-node and route endpoints
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: reqwest::Client,
    base_url: String,
    closest_path: String,
    route_path: String,
}

/// Closest-node response body
#[derive(Debug, Deserialize)]
struct NodeWire {
    lat: f64,
    lng: f64,
    id: u64,
}

impl HttpResolver {
    /// Create a resolver for `base_url` with the default endpoint paths
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&LookupConfig {
            base_url: base_url.to_string(),
            ..LookupConfig::default()
        })
    }

    /// Create a resolver from the `[lookup]` config section
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            closest_path: config.closest_path.trim_matches('/').to_string(),
            route_path: config.route_path.trim_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a GET request and decode the body
    ///
    /// Returns `None` for an empty body or a falsy JSON value.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Option<Value>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Transport(format!(
                "{} returned status: {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response from {}: {}", url, e)))?;

        parse_body(&body)
    }
}

/// Decode a response body, mapping falsy values to `None`
fn parse_body(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::Transport(format!("Failed to parse response: {}", e)))?;
    Ok(if is_falsy(&value) { None } else { Some(value) })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl NodeResolver for HttpResolver {
    async fn resolve_closest(&self, point: GeoPoint) -> Result<ResolvedNode> {
        let url = self.endpoint(&self.closest_path);
        debug!("Resolving closest node to ({})", point);

        let query = [("lat", point.lat.to_string()), ("lng", point.lng.to_string())];
        let Some(value) = self.get_json(&url, &query).await? else {
            return Err(Error::NoNeighbourFound {
                lat: point.lat,
                lng: point.lng,
            });
        };

        let node: NodeWire = serde_json::from_value(value)
            .map_err(|e| Error::Transport(format!("Unexpected closest-node response: {}", e)))?;
        let resolved = geo::validate(node.lat, node.lng)
            .map_err(|e| Error::Transport(format!("Closest-node response: {}", e)))?;

        debug!("Resolved ({}) to node {} at ({})", point, node.id, resolved);
        Ok(ResolvedNode {
            point: resolved,
            node_id: node.id,
        })
    }
}

impl RouteSource for HttpResolver {
    async fn fetch_route(&self, src: u64, dst: u64) -> Result<RouteResponse> {
        let url = self.endpoint(&self.route_path);
        debug!("Requesting route {} -> {}", src, dst);

        let query = [("src", src.to_string()), ("dst", dst.to_string())];
        let Some(value) = self.get_json(&url, &query).await? else {
            return Err(Error::NoRouteFound { src, dst });
        };

        serde_json::from_value(value)
            .map_err(|e| Error::Transport(format!("Unexpected route response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn_server(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn closest(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        let lat: f64 = q["lat"].parse().unwrap();
        let lng: f64 = q["lng"].parse().unwrap();
        if lat == 0.0 && lng == 0.0 {
            return Json(Value::Null);
        }
        Json(json!({ "lat": lat + 0.001, "lng": lng - 0.001, "id": 4711 }))
    }

    async fn route(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
        if q["src"] == q["dst"] {
            return Json(json!(false));
        }
        Json(json!({
            "distance": 1200.5,
            "path": [[48.0, 9.0], [48.05, 9.1], [48.1, 9.2]],
        }))
    }

    fn mock_router() -> Router {
        Router::new()
            .route("/closest_neighbour", get(closest))
            .route("/route", get(route))
            .route("/broken/closest_neighbour", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/garbage/closest_neighbour", get(|| async { "not json" }))
    }

    #[tokio::test]
    async fn test_resolve_closest() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&base).unwrap();

        let node = resolver
            .resolve_closest(GeoPoint::new(48.0, 9.0))
            .await
            .unwrap();
        assert_eq!(node.node_id, 4711);
        assert!((node.point.lat - 48.001).abs() < 1e-9);
        assert!((node.point.lng - 8.999).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_resolve_closest_no_neighbour() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&base).unwrap();

        let result = resolver.resolve_closest(GeoPoint::new(0.0, 0.0)).await;
        assert!(matches!(result, Err(Error::NoNeighbourFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_closest_server_error() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&format!("{}/broken", base)).unwrap();

        let result = resolver.resolve_closest(GeoPoint::new(48.0, 9.0)).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_resolve_closest_undecodable_body() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&format!("{}/garbage/", base)).unwrap();

        let result = resolver.resolve_closest(GeoPoint::new(48.0, 9.0)).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resolver = HttpResolver::new(&format!("http://{}", addr)).unwrap();
        let result = resolver.resolve_closest(GeoPoint::new(48.0, 9.0)).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_fetch_route() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&base).unwrap();

        let route = resolver.fetch_route(1, 2).await.unwrap();
        assert_eq!(route.distance, 1200.5);
        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[2], [48.1, 9.2]);
    }

    #[tokio::test]
    async fn test_fetch_route_none() {
        let base = spawn_server(mock_router()).await;
        let resolver = HttpResolver::new(&base).unwrap();

        let result = resolver.fetch_route(3, 3).await;
        assert!(matches!(result, Err(Error::NoRouteFound { src: 3, dst: 3 })));
    }

    #[test]
    fn test_parse_body_falsy_values() {
        for body in ["", "  ", "null", "false", "0", "\"\"", "[]", "{}"] {
            assert!(parse_body(body.as_bytes()).unwrap().is_none(), "{}", body);
        }
        assert!(parse_body(b"{\"id\": 1}").unwrap().is_some());
        assert!(parse_body(b"{").is_err());
    }
}
