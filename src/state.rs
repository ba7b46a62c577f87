//! Shared application state.

use std::path::PathBuf;

/// Immutable state shared by every request handler
///
/// Built once at startup and never mutated afterwards, so handlers can share it
/// through an `Arc` without any locking.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonicalized repository root; nothing outside it is ever served
    pub root_dir: PathBuf,
}
