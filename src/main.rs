//! route-picker CLI entry point
//!
//! Node picking and route rendering against a routing server

use route_picker::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
