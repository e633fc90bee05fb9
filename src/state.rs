//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the database pool and the parsed configuration; everything else
//! (project files, scene state) is read fresh per request, so there is no
//! in-memory cache to invalidate.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;

/// Shared application state. Clone is required by Axum; inner fields are
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
