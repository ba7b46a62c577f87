//! HTTP request handlers.

use axum::{
    Router,
    body::Body,
    extract::{Extension, Path, State, rejection::PathRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    response::Response,
    routing::get,
};
use owo_colors::OwoColorize;
use std::{sync::Arc, time::Instant};
use tokio::fs;
use tracing::{info, warn};

use crate::colors::{colored_id, colored_status};
use crate::middleware::{RequestId, RequestStart, log_requests};
use crate::resolve::{self, ENTRY_PATH};
use crate::state::AppState;

/// Identification string sent in the `Server` header of every response.
pub const SERVER_IDENT: &str = "VirtueMachineHTTP/1.0";

/// Builds the application router
///
/// The bare root gets its own route so it can redirect without touching the
/// filesystem; every other path funnels into [`serve_repo`]. Methods other than
/// GET/HEAD are answered 405 by the method router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(redirect_root))
        .route("/{*path}", get(serve_repo))
        .layer(axum_middleware::from_fn(log_requests))
        .with_state(state)
}

/// Redirects the bare root to the web client entry point
///
/// Deliberately independent of filesystem state: the redirect is issued even if
/// the entry point itself would 404.
pub async fn redirect_root(
    Extension(RequestId(id)): Extension<RequestId>,
    Extension(RequestStart(start_time)): Extension<RequestStart>,
) -> Response {
    let mut response = status_only(StatusCode::FOUND);
    response
        .headers_mut()
        .insert(header::LOCATION, HeaderValue::from_static(ENTRY_PATH));
    finish(&id, start_time, response)
}

/// Serves one repository file per request, or one terminal error status
///
/// The pipeline is: decode, resolve against the allowlist, substitute
/// `index.html` for directories, detect the content type, then send the
/// bytes. GET and HEAD share everything up to the body; HEAD sends the same
/// headers over an empty body. Any rejection from the resolver collapses into
/// 403 so a probing client cannot tell a blocked path from a malformed one.
pub async fn serve_repo(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(id)): Extension<RequestId>,
    Extension(RequestStart(start_time)): Extension<RequestStart>,
    method: Method,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    // The wildcard capture arrives percent-decoded; a path that cannot be
    // decoded is refused like any other bad path.
    let Ok(Path(rest)) = path else {
        return finish(&id, start_time, status_only(StatusCode::FORBIDDEN));
    };
    let req_path = format!("/{}", rest);

    let Some(mut candidate) = resolve::resolve_target(&state.root_dir, &req_path).await else {
        return finish(&id, start_time, status_only(StatusCode::FORBIDDEN));
    };

    // Directories are never listed; either they carry an index.html or the
    // request is refused.
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        if index.is_file() {
            candidate = index;
        } else {
            return finish(&id, start_time, status_only(StatusCode::FORBIDDEN));
        }
    }

    if !candidate.is_file() {
        return finish(&id, start_time, status_only(StatusCode::NOT_FOUND));
    }

    let mime_type = mime_guess::from_path(&candidate).first_or_octet_stream();

    let response = if method == Method::HEAD {
        match fs::metadata(&candidate).await {
            Ok(meta) => file_response(mime_type.as_ref(), meta.len(), Body::empty()),
            Err(err) => {
                warn!("{} stat failed for {}: {}", colored_id(&id), req_path, err);
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    } else {
        match fs::read(&candidate).await {
            Ok(content) => {
                let len = content.len() as u64;
                file_response(mime_type.as_ref(), len, Body::from(content))
            }
            Err(err) => {
                warn!("{} read failed for {}: {}", colored_id(&id), req_path, err);
                status_only(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    };
    finish(&id, start_time, response)
}

/// Builds a 200 response with the fixed success header set.
fn file_response(mime_type: &str, len: u64, body: Body) -> Response {
    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime_type).unwrap(),
    );
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    // Repository content changes underfoot during development; tell caches to
    // keep nothing.
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_IDENT));
    response
}

/// Builds a bodyless response carrying only a status and the server ident.
fn status_only(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_IDENT));
    response
}

/// Logs the completion line for a request and passes the response through.
fn finish(id: &str, start_time: Instant, response: Response) -> Response {
    let latency = start_time.elapsed();
    info!(
        "{} ← {} {} ({}ms)",
        colored_id(id),
        "FILE".green(),
        colored_status(response.status()),
        latency.as_millis()
    );
    response
}
