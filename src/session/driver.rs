//! Event loop for a map session
//!
//! Runs a `MapSession` inside one tokio task. User gestures arrive as
//! commands, lookups run concurrently in a `JoinSet`, and their responses
//! are applied one at a time on the session task. Outcomes and failures are
//! published as `Event`s for the UI to display.

use super::{MapSession, Outcome, RouteRequest};
use crate::error::{Error, Result};
use crate::markers::RoleMarker;
use crate::resolver::{NodeResolver, ResolvedNode, RouteSource};
use crate::route::RouteResponse;
use crate::selection::{Role, Ticket};
use crate::surface::MapSurface;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

const COMMAND_BUFFER: usize = 64;

/// User gesture or UI action
#[derive(Debug)]
pub enum Command {
    /// Map click
    Click { lat: f64, lng: f64 },
    /// Point-entry form for an explicit role
    Submit { role: Role, lat: String, lng: String },
    /// Request the route between the selected nodes
    CalcRoute,
    /// Display an already fetched route
    ShowRoute(RouteResponse),
    ClearRoute,
    /// Drop markers, route and every in-flight request
    Reset,
    /// Reply once no request is in flight
    Settle(oneshot::Sender<()>),
}

/// User-visible failure
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

/// Something the UI should reflect
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MarkerPlaced(RoleMarker),
    RouteShown { distance_meters: f64, points: usize },
    RouteCleared,
    /// A lookup response arrived after a newer gesture was issued
    LookupDiscarded { seq: u64 },
    /// A route response arrived after a newer route request was issued
    RouteDiscarded { seq: u64 },
    Reset,
    Notice(Notice),
}

enum Completion {
    Lookup(Ticket, Result<ResolvedNode>),
    Route(RouteRequest, Result<RouteResponse>),
}

/// Sending side of a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub async fn click(&self, lat: f64, lng: f64) -> Result<()> {
        self.send(Command::Click { lat, lng }).await
    }

    pub async fn submit(
        &self,
        role: Role,
        lat: impl Into<String>,
        lng: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::Submit {
            role,
            lat: lat.into(),
            lng: lng.into(),
        })
        .await
    }

    pub async fn calc_route(&self) -> Result<()> {
        self.send(Command::CalcRoute).await
    }

    pub async fn show_route(&self, route: RouteResponse) -> Result<()> {
        self.send(Command::ShowRoute(route)).await
    }

    pub async fn clear_route(&self) -> Result<()> {
        self.send(Command::ClearRoute).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(Command::Reset).await
    }

    /// Wait until every request issued so far has been applied or dropped
    pub async fn settle(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Settle(tx)).await?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}

/// Start the event loop for `session`
///
/// The loop ends once every `SessionHandle` is dropped; requests still in
/// flight at that point are aborted and the session is returned through the
/// join handle.
pub fn spawn<S, R>(
    session: MapSession<S, R>,
) -> (
    SessionHandle,
    mpsc::UnboundedReceiver<Event>,
    JoinHandle<MapSession<S, R>>,
)
where
    S: MapSurface + Send + 'static,
    R: NodeResolver + RouteSource + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(session, command_rx, event_tx));
    (
        SessionHandle {
            commands: command_tx,
        },
        event_rx,
        task,
    )
}

async fn run<S, R>(
    mut session: MapSession<S, R>,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
) -> MapSession<S, R>
where
    S: MapSurface + Send + 'static,
    R: NodeResolver + RouteSource + 'static,
{
    let mut inflight: JoinSet<Completion> = JoinSet::new();
    let mut waiters: Vec<oneshot::Sender<()>> = Vec::new();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                handle_command(&mut session, command, &mut inflight, &mut waiters, &events);
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                match joined {
                    Ok(completion) => apply_completion(&mut session, completion, &events),
                    Err(e) if e.is_cancelled() => debug!("In-flight request cancelled"),
                    Err(e) => {
                        let err = Error::Transport(format!("Request task failed: {}", e));
                        notify(&events, &err);
                    }
                }
            }
        }

        if inflight.is_empty() {
            for waiter in waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    if !inflight.is_empty() {
        debug!("Aborting {} in-flight requests", inflight.len());
    }
    inflight.abort_all();
    session
}

fn handle_command<S, R>(
    session: &mut MapSession<S, R>,
    command: Command,
    inflight: &mut JoinSet<Completion>,
    waiters: &mut Vec<oneshot::Sender<()>>,
    events: &mpsc::UnboundedSender<Event>,
) where
    S: MapSurface,
    R: NodeResolver + RouteSource + 'static,
{
    match command {
        Command::Click { lat, lng } => match session.begin_click(lat, lng) {
            Ok(lookup) => {
                let fut = session.lookup(lookup);
                inflight.spawn(async move {
                    let (ticket, result) = fut.await;
                    Completion::Lookup(ticket, result)
                });
            }
            Err(e) => notify(events, &e),
        },
        Command::Submit { role, lat, lng } => match session.begin_submit(role, &lat, &lng) {
            Ok(lookup) => {
                let fut = session.lookup(lookup);
                inflight.spawn(async move {
                    let (ticket, result) = fut.await;
                    Completion::Lookup(ticket, result)
                });
            }
            Err(e) => notify(events, &e),
        },
        Command::CalcRoute => match session.begin_route() {
            Ok(request) => {
                let fut = session.fetch_route(request);
                inflight.spawn(async move {
                    let (request, result) = fut.await;
                    Completion::Route(request, result)
                });
            }
            Err(e) => notify(events, &e),
        },
        Command::ShowRoute(route) => match session.show_route_response(route) {
            Ok(shown) => emit(
                events,
                Event::RouteShown {
                    distance_meters: shown.distance_meters(),
                    points: shown.path().len(),
                },
            ),
            Err(e) => notify(events, &e),
        },
        Command::ClearRoute => {
            session.clear_route();
            emit(events, Event::RouteCleared);
        }
        Command::Reset => {
            inflight.abort_all();
            session.reset();
            emit(events, Event::Reset);
        }
        Command::Settle(waiter) => waiters.push(waiter),
    }
}

fn apply_completion<S, R>(
    session: &mut MapSession<S, R>,
    completion: Completion,
    events: &mpsc::UnboundedSender<Event>,
) where
    S: MapSurface,
{
    match completion {
        Completion::Lookup(ticket, result) => match session.complete_lookup(ticket, result) {
            Ok(Outcome::Applied(marker)) => emit(events, Event::MarkerPlaced(marker)),
            Ok(Outcome::Stale { seq }) => emit(events, Event::LookupDiscarded { seq }),
            Err(e) => notify(events, &e),
        },
        Completion::Route(request, result) => match session.complete_route(request, result) {
            Ok(Outcome::Applied(shown)) => emit(
                events,
                Event::RouteShown {
                    distance_meters: shown.distance_meters(),
                    points: shown.path().len(),
                },
            ),
            Ok(Outcome::Stale { seq }) => emit(events, Event::RouteDiscarded { seq }),
            Err(e) => notify(events, &e),
        },
    }
}

fn notify(events: &mpsc::UnboundedSender<Event>, err: &Error) {
    warn!("{}", err);
    emit(events, Event::Notice(Notice::from(err)));
}

fn emit(events: &mpsc::UnboundedSender<Event>, event: Event) {
    if events.send(event).is_err() {
        debug!("Event receiver dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::testing::FakeResolver;
    use crate::surface::GeoJsonSurface;
    use std::time::Duration;

    fn start(
        resolver: FakeResolver,
    ) -> (
        SessionHandle,
        mpsc::UnboundedReceiver<Event>,
        JoinHandle<MapSession<GeoJsonSurface, FakeResolver>>,
    ) {
        let session = MapSession::new(GeoJsonSurface::new(), resolver, &Config::default());
        spawn(session)
    }

    fn drain(events: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_click_then_click() {
        let (handle, mut events, task) = start(FakeResolver::new());

        handle.click(48.0, 9.0).await.unwrap();
        handle.settle().await.unwrap();
        handle.click(48.1, 9.2).await.unwrap();
        handle.settle().await.unwrap();

        let placed: Vec<Role> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::MarkerPlaced(m) => Some(m.role),
                _ => None,
            })
            .collect();
        assert_eq!(placed, vec![Role::Source, Role::Destination]);

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.active_role(), Role::Source);
        assert_eq!(session.surface().marker_count(), 2);
    }

    #[tokio::test]
    async fn test_latest_gesture_wins() {
        let resolver = FakeResolver::new().delay(48.0, 9.0, Duration::from_millis(200));
        let (handle, mut events, task) = start(resolver);

        handle.click(48.0, 9.0).await.unwrap();
        handle.click(48.1, 9.2).await.unwrap();
        handle.settle().await.unwrap();

        let events = drain(&mut events);
        assert!(events.contains(&Event::LookupDiscarded { seq: 1 }));
        let placed: Vec<&RoleMarker> = events
            .iter()
            .filter_map(|e| match e {
                Event::MarkerPlaced(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].role, Role::Source);
        assert!((placed[0].point.lat - 48.101).abs() < 1e-9);

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.surface().marker_count(), 1);
        assert_eq!(session.active_role(), Role::Destination);
    }

    #[tokio::test]
    async fn test_failures_become_notices() {
        let resolver = FakeResolver::new().miss(0.0, 0.0);
        let (handle, mut events, task) = start(resolver);

        handle.click(0.0, 0.0).await.unwrap();
        handle.click(95.0, 9.0).await.unwrap();
        handle.calc_route().await.unwrap();
        handle.settle().await.unwrap();

        // the lookup may finish before or after the other two commands
        let mut codes: Vec<&'static str> = drain(&mut events)
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(n) => Some(n.code),
                _ => None,
            })
            .collect();
        codes.sort_unstable();
        assert_eq!(
            codes,
            vec!["INVALID_COORDINATE", "MISSING_ENDPOINT", "NO_NEIGHBOUR_FOUND"]
        );

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.active_role(), Role::Source);
        assert_eq!(session.surface().marker_count(), 0);
    }

    #[tokio::test]
    async fn test_route_round_trip() {
        let resolver = FakeResolver::new().route(1, 2, 1200.5, &[[48.0, 9.0], [48.1, 9.2]]);
        let (handle, mut events, task) = start(resolver);

        handle.submit(Role::Source, "48.0", "9.0").await.unwrap();
        handle.settle().await.unwrap();
        handle.submit(Role::Destination, "48.1", "9.2").await.unwrap();
        handle.settle().await.unwrap();
        handle.calc_route().await.unwrap();
        handle.settle().await.unwrap();

        assert!(drain(&mut events).contains(&Event::RouteShown {
            distance_meters: 1200.5,
            points: 2,
        }));

        handle.clear_route().await.unwrap();
        handle.settle().await.unwrap();
        drop(handle);
        let surface = task.await.unwrap().into_surface();
        assert_eq!(surface.line_count(), 0);
        assert_eq!(surface.marker_count(), 2);
    }

    #[tokio::test]
    async fn test_superseded_route_is_reported_as_route() {
        let resolver = FakeResolver::new().route(1, 2, 500.0, &[[48.0, 9.0], [48.1, 9.2]]);
        let (handle, mut events, task) = start(resolver);

        handle.submit(Role::Source, "48.0", "9.0").await.unwrap();
        handle.settle().await.unwrap();
        handle.submit(Role::Destination, "48.1", "9.2").await.unwrap();
        handle.settle().await.unwrap();
        drain(&mut events);

        handle.calc_route().await.unwrap();
        handle.calc_route().await.unwrap();
        handle.settle().await.unwrap();

        let events = drain(&mut events);
        assert!(events.contains(&Event::RouteDiscarded { seq: 1 }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::LookupDiscarded { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::RouteShown { .. }))
                .count(),
            1
        );

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.surface().line_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_drops_inflight_lookups() {
        let resolver = FakeResolver::new().delay(48.0, 9.0, Duration::from_millis(100));
        let (handle, mut events, task) = start(resolver);

        handle.click(48.0, 9.0).await.unwrap();
        handle.reset().await.unwrap();
        handle.settle().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        let events = drain(&mut events);
        assert!(events.contains(&Event::Reset));
        assert!(!events.iter().any(|e| matches!(e, Event::MarkerPlaced(_))));

        drop(handle);
        let session = task.await.unwrap();
        assert_eq!(session.surface().marker_count(), 0);
        assert_eq!(session.active_role(), Role::Source);
    }

    #[tokio::test]
    async fn test_show_invalid_route() {
        let (handle, mut events, task) = start(FakeResolver::new());

        handle
            .show_route(RouteResponse {
                distance: 3.0,
                path: vec![[48.0, 9.0]],
            })
            .await
            .unwrap();
        handle.settle().await.unwrap();

        let events = drain(&mut events);
        assert!(matches!(&events[..], [Event::Notice(n)] if n.code == "INVALID_PATH"));

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_session() {
        let (handle, _events, task) = start(FakeResolver::new());
        task.abort();
        let _ = task.await;

        assert!(matches!(
            handle.click(48.0, 9.0).await,
            Err(Error::SessionClosed)
        ));
    }
}
