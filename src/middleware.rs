//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use nanoid::nanoid;
use std::time::Instant;
use tracing::info;

use crate::colors::colored_id;

/// Correlation ID assigned to each request, carried in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Arrival instant of a request, carried in request extensions for latency
/// reporting.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Assigns each request a short colored ID and logs the request line
///
/// The ID and arrival time ride along in request extensions so the handler can
/// tag its completion log with the same ID and a latency figure.
pub async fn log_requests(mut req: Request<Body>, next: Next) -> Response {
    let id = nanoid!(5);
    let method = req.method().clone();
    let uri = req.uri().clone();

    req.extensions_mut().insert(RequestId(id.clone()));
    req.extensions_mut().insert(RequestStart(Instant::now()));

    info!("{} → {} {}", colored_id(&id), method, uri.path());
    next.run(req).await
}
