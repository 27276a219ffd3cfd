//! Pick command handler
//!
//! Replays map gestures against the routing server and prints the
//! resulting markers and route.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolver::HttpResolver;
use crate::selection::Role;
use crate::session::driver::{self, Event, SessionHandle};
use crate::session::MapSession;
use crate::surface::GeoJsonSurface;
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Pick command arguments
#[derive(Args)]
pub struct PickArgs {
    /// Source point as "lat,lng" (form entry)
    #[arg(long, allow_hyphen_values = true)]
    pub src: Option<String>,

    /// Destination point as "lat,lng" (form entry)
    #[arg(long, allow_hyphen_values = true)]
    pub dst: Option<String>,

    /// Map click as "lat,lng"; alternates source and destination
    #[arg(long, allow_hyphen_values = true)]
    pub click: Vec<String>,

    /// Request the route once both nodes are resolved
    #[arg(long)]
    pub route: bool,

    /// Output format: geojson or text
    #[arg(long, short = 'f', default_value = "geojson")]
    pub format: String,

    /// Routing server base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Config file to use instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Output format of the pick command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    GeoJson,
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geojson" | "json" => Ok(Self::GeoJson),
            "text" => Ok(Self::Text),
            _ => Err(format!("Unknown format: {}. Available: geojson, text", s)),
        }
    }
}

/// A gesture replayed against the session
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Submit(Role, String, String),
    Click(String),
}

/// Run the pick command
pub async fn run(args: PickArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let format: OutputFormat = args.format.parse().map_err(Error::Config)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = &args.base_url {
        config.lookup.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.lookup.timeout_ms = timeout_ms;
    }
    config.validate()?;

    let gestures = gestures(&args)?;
    if gestures.is_empty() {
        return Err(Error::Config(
            "Nothing to pick: pass --src/--dst or --click".to_string(),
        ));
    }

    info!(
        "route-picker v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.lookup.base_url
    );

    let resolver = HttpResolver::from_config(&config.lookup)?;
    let session = MapSession::new(GeoJsonSurface::new(), resolver, &config);
    let (handle, mut events, task) = driver::spawn(session);

    replay(&handle, &gestures, args.route).await?;
    drop(handle);

    let session = task
        .await
        .map_err(|e| Error::Transport(format!("Session task failed: {}", e)))?;

    let mut notices = 0;
    while let Ok(event) = events.try_recv() {
        if let Event::Notice(notice) = event {
            notices += 1;
            eprintln!("Notice [{}]: {}", notice.code, notice.message);
        }
    }

    match format {
        OutputFormat::GeoJson => {
            let collection = session.surface().to_feature_collection();
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
        OutputFormat::Text => print!("{}", summary(&session)),
    }

    outcome(notices)
}

/// Fail the command once any gesture produced a notice
fn outcome(notices: usize) -> Result<()> {
    if notices > 0 {
        return Err(Error::GesturesFailed(notices));
    }
    Ok(())
}

/// Gestures in replay order: form entries first, then clicks
fn gestures(args: &PickArgs) -> Result<Vec<Gesture>> {
    let mut out = Vec::new();
    for (role, text) in [(Role::Source, &args.src), (Role::Destination, &args.dst)] {
        if let Some(text) = text {
            let (lat, lng) = split_pair(text)?;
            out.push(Gesture::Submit(role, lat, lng));
        }
    }
    out.extend(args.click.iter().cloned().map(Gesture::Click));
    Ok(out)
}

fn split_pair(text: &str) -> Result<(String, String)> {
    text.split_once(',')
        .map(|(lat, lng)| (lat.to_string(), lng.to_string()))
        .ok_or_else(|| Error::InvalidCoordinate(format!("Expected \"lat,lng\", got \"{}\"", text)))
}

/// Malformed click text becomes NaN so the session rejects it with a notice
fn click_coords(text: &str) -> (f64, f64) {
    let parse = |s: &str| s.trim().parse().unwrap_or(f64::NAN);
    match text.split_once(',') {
        Some((lat, lng)) => (parse(lat), parse(lng)),
        None => (f64::NAN, f64::NAN),
    }
}

/// Send each gesture and wait for it to settle before the next one
async fn replay(handle: &SessionHandle, gestures: &[Gesture], route: bool) -> Result<()> {
    for gesture in gestures {
        match gesture {
            Gesture::Submit(role, lat, lng) => handle.submit(*role, lat, lng).await?,
            Gesture::Click(text) => {
                let (lat, lng) = click_coords(text);
                handle.click(lat, lng).await?
            }
        }
        handle.settle().await?;
    }

    if route {
        handle.calc_route().await?;
        handle.settle().await?;
    }
    Ok(())
}

/// Human-readable summary of markers and route
fn summary(session: &MapSession<GeoJsonSurface, HttpResolver>) -> String {
    let mut out = String::new();
    for role in [Role::Source, Role::Destination] {
        match session.marker(role) {
            Some(marker) => {
                let node = marker
                    .node_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!("{:<12} {} (node {})\n", role, marker.point, node));
            }
            None => out.push_str(&format!("{:<12} not set\n", role)),
        }
    }
    match session.route() {
        Some(route) => out.push_str(&format!(
            "{:<12} {} m over {} points\n",
            "route",
            route.distance_meters(),
            route.path().len()
        )),
        None => out.push_str(&format!("{:<12} none\n", "route")),
    }
    out
}
