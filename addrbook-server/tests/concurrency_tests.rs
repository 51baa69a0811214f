//! Concurrent request tests over an on-disk SQLite database
//!
//! The first_line pre-check is not atomic with the insert. When two
//! creates race, exactly one succeeds and the other is rejected either by
//! the pre-check (409) or by the store's unique constraint (500).

use addrbook_common::db::init_database;
use addrbook_server::store::{AddressRepository, SqliteAddressRepository};
use addrbook_server::{build_router, AppState, ListPolicy};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn disk_app() -> (TempDir, Router, Arc<SqliteAddressRepository>) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("addrbook.db"))
        .await
        .expect("Should create database");
    let repo = Arc::new(SqliteAddressRepository::new(pool));
    let app = build_router(AppState::new(repo.clone(), ListPolicy::EmptyIsOk));
    (temp_dir, app, repo)
}

fn create_request(first_line: &str) -> Request<Body> {
    let body = json!({
        "first_line": first_line,
        "second_line": "",
        "phone": "555-0100",
        "pincode": "75001",
        "latitude": 48.8566,
        "longitude": 2.3522,
    });
    Request::builder()
        .method("POST")
        .uri("/address")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_racing_creates_with_same_first_line() {
    let (_temp_dir, app, repo) = disk_app().await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                app.oneshot(create_request("1 Rue de Rivoli"))
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1, "statuses: {:?}", statuses);
    assert!(
        statuses.iter().all(|s| *s == StatusCode::CREATED
            || *s == StatusCode::CONFLICT
            || *s == StatusCode::INTERNAL_SERVER_ERROR),
        "statuses: {:?}",
        statuses
    );
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_distinct_creates_get_distinct_ids() {
    let (_temp_dir, app, repo) = disk_app().await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.oneshot(create_request(&format!("{} Rue de Rivoli", i)))
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let ids: HashSet<i64> = repo.list_all().await.unwrap().iter().map(|a| a.id).collect();
    assert_eq!(ids.len(), 16);
}
