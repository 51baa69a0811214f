//! Address endpoints
//!
//! - `POST   /address`              create (first_line must be unused)
//! - `GET    /address`              list all
//! - `GET    /address/coordinates`  proximity query
//! - `GET    /address/:id`          fetch one
//! - `PUT    /address/:id`          full replacement
//! - `DELETE /address/:id`          remove
//!
//! Malformed bodies, query strings and ids are 400s with the usual error
//! envelope. Storage failures are logged here with the operation name
//! (and id when there is one) and answered with a generic message.

use addrbook_common::config::ApiConfig;
use addrbook_common::db::{Address, AddressFields};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use std::fmt::Display;
use tracing::{error, info, warn};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::search::find_within_reach;
use crate::store::{DeleteOutcome, StoreError};
use crate::{ApiError, ApiResult, AppState};

const NOT_FOUND_MESSAGE: &str = "No address found";

/// How `GET /address` answers when the store is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPolicy {
    /// Empty store is a 404 "No address found"
    EmptyIsNotFound,
    /// Empty store is a 200 with `[]`
    EmptyIsOk,
}

impl ListPolicy {
    pub fn from_config(config: &ApiConfig) -> Self {
        if config.empty_list_is_not_found {
            ListPolicy::EmptyIsNotFound
        } else {
            ListPolicy::EmptyIsOk
        }
    }

    fn check(self, addresses: Vec<Address>) -> ApiResult<Vec<Address>> {
        if addresses.is_empty() && self == ListPolicy::EmptyIsNotFound {
            warn!("No address found");
            return Err(ApiError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        }
        Ok(addresses)
    }
}

/// Query string for `GET /address/coordinates`
#[derive(Debug, Deserialize)]
pub struct ProximityQuery {
    /// Threshold in kilometres
    pub distance: f64,
    pub latitude: f64,
    pub longitude: f64,
}

fn internal_error(operation: &str, id: Option<i64>, cause: impl Display) -> ApiError {
    match id {
        Some(id) => error!("{} failed for address {}: {}", operation, id, cause),
        None => error!("{} failed: {}", operation, cause),
    }
    ApiError::Internal("Internal server error".to_string())
}

/// Constraint violations get their own public message; anything else is generic
fn store_error(operation: &str, id: Option<i64>, err: StoreError) -> ApiError {
    match err {
        StoreError::ConstraintViolation(cause) => {
            match id {
                Some(id) => error!(
                    "{}: database integrity error for address {}: {}",
                    operation, id, cause
                ),
                None => error!("{}: database integrity error: {}", operation, cause),
            }
            ApiError::Internal("Database integrity error".to_string())
        }
        other => internal_error(operation, id, other),
    }
}

fn not_found(id: i64) -> ApiError {
    warn!("Address with ID {} not found", id);
    ApiError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

/// POST /address
///
/// The first_line lookup only gives a friendly 409 for the common case.
/// Two concurrent creates can both pass it; the store's unique constraint
/// then rejects the loser, which surfaces as a 500 integrity error.
pub async fn create_address(
    State(state): State<AppState>,
    ApiJson(fields): ApiJson<AddressFields>,
) -> ApiResult<(StatusCode, Json<Address>)> {
    let existing = state
        .repo
        .get_by_first_line(&fields.first_line)
        .await
        .map_err(|e| internal_error("create_address", None, e))?;

    if existing.is_some() {
        warn!("Address already exists: {:?}", fields.first_line);
        return Err(ApiError::Conflict("Address already exists".to_string()));
    }

    let address = state
        .repo
        .create(fields)
        .await
        .map_err(|e| store_error("create_address", None, e))?;

    info!("Address with ID {} created", address.id);
    Ok((StatusCode::CREATED, Json(address)))
}

/// GET /address
pub async fn list_addresses(State(state): State<AppState>) -> ApiResult<Json<Vec<Address>>> {
    let addresses = state
        .repo
        .list_all()
        .await
        .map_err(|e| internal_error("list_addresses", None, e))?;

    state.list_policy.check(addresses).map(Json)
}

/// GET /address/:id
pub async fn get_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Address>> {
    state
        .repo
        .get_by_id(id)
        .await
        .map_err(|e| internal_error("get_address", Some(id), e))?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// PUT /address/:id
pub async fn update_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<AddressFields>,
) -> ApiResult<Json<Address>> {
    let updated = state
        .repo
        .update(id, fields)
        .await
        .map_err(|e| store_error("update_address", Some(id), e))?
        .ok_or_else(|| not_found(id))?;

    info!("Address with ID {} updated", id);
    Ok(Json(updated))
}

/// DELETE /address/:id
pub async fn delete_address(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    match state.repo.delete(id).await {
        DeleteOutcome::Deleted => {
            info!("Address with ID {} deleted", id);
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteOutcome::Failed(reason) => {
            warn!("Failed to delete address with ID {}: {}", id, reason);
            Err(ApiError::BadRequest(reason))
        }
        DeleteOutcome::NotFound => Err(not_found(id)),
    }
}

/// GET /address/coordinates?distance=&latitude=&longitude=
///
/// Returns addresses at least `distance` km from the point. No match is
/// a 200 with `[]`.
pub async fn find_addresses(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProximityQuery>,
) -> ApiResult<Json<Vec<Address>>> {
    let addresses = find_within_reach(
        &*state.repo,
        query.distance,
        query.latitude,
        query.longitude,
    )
    .await
    .map_err(|e| internal_error("find_addresses", None, e))?;

    Ok(Json(addresses))
}

/// Build address routes
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/address", get(list_addresses).post(create_address))
        .route("/address/coordinates", get(find_addresses))
        .route(
            "/address/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
}
