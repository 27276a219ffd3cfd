//! Map session
//!
//! `MapSession` is the single owner of everything a map page mutates: the
//! display surface, the selection state, the role markers and the route
//! overlay. It is built when the map is initialized and torn down with it.
//!
//! Lookups are split in three steps so several can be in flight while state
//! is only ever touched through `&mut self`:
//!
//! 1. `begin_click` / `begin_submit` validate input and issue a ticket
//! 2. `lookup` returns a `'static` future performing the request
//! 3. `complete_lookup` applies the response, unless a newer ticket exists
//!
//! `pick` and `submit` run the three steps back to back. The route round
//! trip follows the same pattern with `begin_route` / `fetch_route` /
//! `complete_route`.

pub mod driver;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{self, GeoPoint, ValidationRule};
use crate::markers::{MarkerRegistry, RoleMarker};
use crate::resolver::{with_timeout, NodeResolver, ResolvedNode, RouteSource};
use crate::route::{RouteGeometry, RouteRenderer, RouteResponse};
use crate::selection::{Role, SelectionMachine, Ticket};
use crate::surface::MapSurface;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A lookup that has been validated and ticketed but not yet sent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
    pub ticket: Ticket,
    pub point: GeoPoint,
}

/// A route request between the two resolved nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequest {
    pub seq: u64,
    pub src: u64,
    pub dst: u64,
}

/// Result of completing a request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The response was applied
    Applied(T),
    /// A newer request superseded this one; nothing changed
    Stale { seq: u64 },
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Stale { .. } => None,
        }
    }
}

/// State of one interactive map
#[derive(Debug)]
pub struct MapSession<S, R> {
    surface: S,
    resolver: Arc<R>,
    selection: SelectionMachine,
    markers: MarkerRegistry,
    renderer: RouteRenderer,
    validation: ValidationRule,
    timeout: Duration,
    route_issued: u64,
    route_current: Option<u64>,
}

impl<S: MapSurface, R> MapSession<S, R> {
    /// Initialize a session and center the surface on the configured view
    pub fn new(surface: S, resolver: R, config: &Config) -> Self {
        Self::with_shared_resolver(surface, Arc::new(resolver), config)
    }

    /// Like `new`, sharing a resolver with other sessions
    pub fn with_shared_resolver(mut surface: S, resolver: Arc<R>, config: &Config) -> Self {
        surface.center_on(config.map.center(), config.map.initial_zoom);

        Self {
            surface,
            resolver,
            selection: SelectionMachine::new(config.selection.first_role),
            markers: MarkerRegistry::new(config.map.focus_zoom),
            renderer: RouteRenderer::new(config.route.style()),
            validation: config.selection.validation,
            timeout: config.lookup.timeout(),
            route_issued: 0,
            route_current: None,
        }
    }

    /// Role the next map click is assigned to
    pub fn active_role(&self) -> Role {
        self.selection.active_role()
    }

    pub fn marker(&self, role: Role) -> Option<&RoleMarker> {
        self.markers.get(role)
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn route(&self) -> Option<&RouteGeometry> {
        self.renderer.current()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear the session down, handing back the surface as it is
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Validate a map click and ticket it for the active role
    pub fn begin_click(&mut self, lat: f64, lng: f64) -> Result<Lookup> {
        let point = geo::validate_with(lat, lng, self.validation)?;
        let ticket = self.selection.issue_toggle();
        debug!("Click at ({}) for {} (seq {})", point, ticket.target.role(), ticket.seq);
        Ok(Lookup { ticket, point })
    }

    /// Validate a point-entry form and ticket it for `role`
    pub fn begin_submit(&mut self, role: Role, lat: &str, lng: &str) -> Result<Lookup> {
        let point = geo::parse_point(lat, lng, self.validation)?;
        let ticket = self.selection.issue_manual(role);
        debug!("Form entry ({}) for {} (seq {})", point, role, ticket.seq);
        Ok(Lookup { ticket, point })
    }

    /// Apply a lookup response
    ///
    /// A failed lookup for the current ticket is returned as the error and
    /// leaves markers and the active role untouched. Responses for older
    /// tickets are dropped whether they succeeded or not.
    pub fn complete_lookup(
        &mut self,
        ticket: Ticket,
        result: Result<ResolvedNode>,
    ) -> Result<Outcome<RoleMarker>> {
        if !self.selection.is_current(&ticket) {
            debug!("Discarding stale lookup response (seq {})", ticket.seq);
            return Ok(Outcome::Stale { seq: ticket.seq });
        }

        let node = match result {
            Ok(node) => node,
            Err(e) => {
                self.selection.invalidate();
                return Err(e);
            }
        };

        match self.selection.apply(&ticket, node) {
            Some(assignment) => {
                let marker = *self.markers.assign(&mut self.surface, assignment);
                info!(
                    "{} set to node {:?} at ({})",
                    marker.role, marker.node_id, marker.point
                );
                Ok(Outcome::Applied(marker))
            }
            None => Ok(Outcome::Stale { seq: ticket.seq }),
        }
    }

    /// Ticket a route request between the resolved source and destination
    pub fn begin_route(&mut self) -> Result<RouteRequest> {
        let src = self
            .markers
            .node_id(Role::Source)
            .ok_or(Error::MissingEndpoint(Role::Source))?;
        let dst = self
            .markers
            .node_id(Role::Destination)
            .ok_or(Error::MissingEndpoint(Role::Destination))?;

        self.route_issued += 1;
        self.route_current = Some(self.route_issued);
        Ok(RouteRequest {
            seq: self.route_issued,
            src,
            dst,
        })
    }

    /// Apply a route response, unless a newer route request exists
    pub fn complete_route(
        &mut self,
        request: RouteRequest,
        result: Result<RouteResponse>,
    ) -> Result<Outcome<RouteGeometry>> {
        if self.route_current != Some(request.seq) {
            debug!("Discarding stale route response (seq {})", request.seq);
            return Ok(Outcome::Stale { seq: request.seq });
        }
        self.route_current = None;

        let geometry = RouteGeometry::try_from(result?)?;
        let shown = self.renderer.show_geometry(&mut self.surface, geometry);
        info!(
            "Route {} -> {}: {} m",
            request.src,
            request.dst,
            shown.distance_meters()
        );
        Ok(Outcome::Applied(shown.clone()))
    }

    /// Display an already fetched route, superseding any pending request
    pub fn show_route(&mut self, distance: f64, path: Vec<GeoPoint>) -> Result<&RouteGeometry> {
        let shown = self.renderer.show_route(&mut self.surface, distance, path)?;
        self.route_current = None;
        Ok(shown)
    }

    /// Display a route payload as received from the route endpoint
    pub fn show_route_response(&mut self, response: RouteResponse) -> Result<&RouteGeometry> {
        let geometry = RouteGeometry::try_from(response)?;
        self.route_current = None;
        Ok(self.renderer.show_geometry(&mut self.surface, geometry))
    }

    /// Remove the displayed route, if any
    pub fn clear_route(&mut self) {
        self.renderer.clear_route(&mut self.surface);
    }

    /// Remove markers and route and forget every outstanding request
    pub fn reset(&mut self) {
        self.markers.clear(&mut self.surface);
        self.renderer.clear_route(&mut self.surface);
        self.selection.reset();
        self.route_current = None;
        info!("Session reset");
    }
}

impl<S: MapSurface, R: NodeResolver + 'static> MapSession<S, R> {
    /// Future performing `lookup`, bounded by the configured timeout
    pub fn lookup(
        &self,
        lookup: Lookup,
    ) -> impl Future<Output = (Ticket, Result<ResolvedNode>)> + Send + 'static {
        let resolver = Arc::clone(&self.resolver);
        let limit = self.timeout;
        async move {
            let result = with_timeout(limit, resolver.resolve_closest(lookup.point)).await;
            (lookup.ticket, result)
        }
    }

    /// Resolve a map click and assign it to the active role
    pub async fn pick(&mut self, lat: f64, lng: f64) -> Result<Outcome<RoleMarker>> {
        let lookup = self.begin_click(lat, lng)?;
        let (ticket, result) = self.lookup(lookup).await;
        self.complete_lookup(ticket, result)
    }

    /// Resolve a form entry and assign it to `role`
    pub async fn submit(&mut self, role: Role, lat: &str, lng: &str) -> Result<Outcome<RoleMarker>> {
        let lookup = self.begin_submit(role, lat, lng)?;
        let (ticket, result) = self.lookup(lookup).await;
        self.complete_lookup(ticket, result)
    }
}

impl<S: MapSurface, R: RouteSource + 'static> MapSession<S, R> {
    /// Future fetching the route for `request`, bounded by the configured timeout
    pub fn fetch_route(
        &self,
        request: RouteRequest,
    ) -> impl Future<Output = (RouteRequest, Result<RouteResponse>)> + Send + 'static {
        let resolver = Arc::clone(&self.resolver);
        let limit = self.timeout;
        async move {
            let result = with_timeout(limit, resolver.fetch_route(request.src, request.dst)).await;
            (request, result)
        }
    }

    /// Fetch and display the route between the two selected nodes
    pub async fn calc_route(&mut self) -> Result<Outcome<RouteGeometry>> {
        let request = self.begin_route()?;
        let (request, result) = self.fetch_route(request).await;
        self.complete_route(request, result)
    }
}
