//! addrbook-server library
//!
//! Address book HTTP service: CRUD over postal addresses plus a
//! distance-based query. Exposed as a library so integration tests can
//! drive the router directly.

use addrbook_common::{Error, Result};
use axum::http::{HeaderValue, Method};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod search;
pub mod store;

pub use crate::api::ListPolicy;
pub use crate::error::{ApiError, ApiResult};
use crate::store::AddressRepository;

/// Application state shared across HTTP handlers
///
/// The store handle is passed in explicitly; nothing in the service
/// reaches for a process-wide connection.
#[derive(Clone)]
pub struct AppState {
    /// Address store
    pub repo: Arc<dyn AddressRepository>,
    /// Empty-store behavior of `GET /address`
    pub list_policy: ListPolicy,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(repo: Arc<dyn AddressRepository>, list_policy: ListPolicy) -> Self {
        Self {
            repo,
            list_policy,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::welcome))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::address_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for browser clients on the configured origins
///
/// Credentials are allowed, so request headers are mirrored rather than
/// answered with a wildcard.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|e| {
                Error::InvalidInput(format!("Invalid CORS origin '{}': {}", origin, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
