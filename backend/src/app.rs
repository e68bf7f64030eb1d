//! Application state and HTTP router construction.
//!
//! Used by `main` and by the HTTP-level tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::LibrisSchema;
use crate::graphql::http::{graphiql, graphql_handler};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: LibrisSchema,
}

/// Build the full Axum router: health endpoints, /graphql and layers
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(crate::api::health::router())
        .route("/graphql", get(graphiql).post(graphql_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
