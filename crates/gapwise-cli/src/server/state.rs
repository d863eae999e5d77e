//! Application state for the web server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gapwise::Gapwise;

/// Default cap on request bodies. Validation requests carry the whole dataset.
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline used by every request; holds configuration only.
    pub gapwise: Arc<Gapwise>,
    /// When the server started.
    pub started_at: DateTime<Utc>,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl AppState {
    /// Create new application state with the default pipeline.
    pub fn new() -> Self {
        Self::with_gapwise(Gapwise::new())
    }

    /// Create application state around a configured pipeline.
    pub fn with_gapwise(gapwise: Gapwise) -> Self {
        Self {
            gapwise: Arc::new(gapwise),
            started_at: Utc::now(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Set the largest accepted request body, in bytes.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
