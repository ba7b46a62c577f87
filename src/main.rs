//! Restricted static-file server for the VirtueMachine repository.
//!
//! Serves a fixed allowlist of repository paths over HTTP, redirects the bare
//! root to the web client, and refuses everything else. Read-only by design:
//! no sessions, no uploads, no dynamic content.

use std::{net::SocketAddr, process, sync::Arc};
use tracing::{Level, info};

use vmserve::cli::Cli;
use vmserve::handlers;
use vmserve::resolve::ENTRY_PATH;
use vmserve::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize structured logging with INFO level as default
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args: Cli = argh::from_env();

    // A bad root means nothing can ever be served; fail before listening.
    let root_dir = match args.root.canonicalize() {
        Ok(dir) if dir.is_dir() => dir,
        Ok(dir) => {
            eprintln!("Root is not a directory: {}", dir.display());
            process::exit(1);
        }
        Err(err) => {
            eprintln!("Root does not exist: {} ({})", args.root.display(), err);
            process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        root_dir: root_dir.clone(),
    });
    let app = handlers::app(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Cannot bind {}: {}", addr, err);
            process::exit(1);
        }
    };

    info!("Serving repository root: {}", root_dir.display());
    info!(
        "Serving VirtueMachine at http://{}{} (allowlisted paths only)",
        addr, ENTRY_PATH
    );

    axum::serve(listener, app).await.unwrap();
}
