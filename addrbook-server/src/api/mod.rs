//! HTTP API handlers for addrbook-server

pub mod addresses;
pub mod buildinfo;
pub mod extract;
pub mod health;

pub use addresses::{address_routes, ListPolicy};
pub use buildinfo::get_build_info;
pub use health::health_routes;

use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to Address Book Application" }))
}
