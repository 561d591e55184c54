//! HTTP API tests
//!
//! Drives the full router with in-process requests against an in-memory
//! database loaded with the reference dataset. No network, no files.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tania_common::catalog_db::CatalogDb;
use taniad::{seed, server};
use tower::ServiceExt;

fn seeded_app() -> Router {
    let db = CatalogDb::open_in_memory().unwrap();
    seed::seed(&db).unwrap();
    server::app(Arc::new(server::AppState::new(db)))
}

fn empty_app() -> Router {
    let db = CatalogDb::open_in_memory().unwrap();
    server::app(Arc::new(server::AppState::new(db)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_counts() {
    let (status, body) = get(seeded_app(), "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["counts"]["provinces"], 5);
    assert_eq!(body["counts"]["pests"], 6);
}

#[tokio::test]
async fn health_works_on_empty_database() {
    let (status, body) = get(empty_app(), "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["pests"], 0);
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[tokio::test]
async fn children_of_province_are_regencies() {
    let (status, body) = get(seeded_app(), "/v1/map/children?province_id=1").await;
    assert_eq!(status, StatusCode::OK);
    let children = body.as_array().unwrap();
    assert_eq!(children.len(), 3);
    assert!(children[0]["name"].as_str().unwrap().contains("Regency"));
}

#[tokio::test]
async fn children_of_regency_are_districts() {
    let (status, body) = get(seeded_app(), "/v1/map/children?regency_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn children_without_parent_is_unprocessable() {
    let (status, body) = get(seeded_app(), "/v1/map/children").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"].as_array().is_some());
}

#[tokio::test]
async fn children_of_unknown_province_is_unprocessable() {
    let (status, body) = get(seeded_app(), "/v1/map/children?province_id=9999").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "province_id");
}

#[tokio::test]
async fn distributions_default_to_current_year() {
    let (status, body) = get(seeded_app(), "/v1/map/distributions?province_id=1").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    // One row per commodity for the province in the current year.
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["province"]["name"], "West Java");
}

#[tokio::test]
async fn distributions_reject_year_before_2000() {
    let (status, body) = get(seeded_app(), "/v1/map/distributions?year=1999").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "year");
}

#[tokio::test]
async fn distributions_reject_future_year() {
    let (status, _) = get(seeded_app(), "/v1/map/distributions?year=9999").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn distributions_reject_unknown_commodity() {
    let (status, body) = get(seeded_app(), "/v1/map/distributions?commodity_id=404").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "commodity_id");
}

#[tokio::test]
async fn map_home_bundles_dropdowns_and_facts() {
    let (status, body) = get(seeded_app(), "/v1/map/home").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provinces"].as_array().unwrap().len(), 5);
    assert_eq!(body["commodities"].as_array().unwrap().len(), 5);
    // 5 provinces x 5 commodities fits under the home cap of 100.
    assert_eq!(body["distributions"].as_array().unwrap().len(), 25);
}

// ---------------------------------------------------------------------------
// Pest search and chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pest_search_by_symptom_text() {
    let (status, body) = post(
        seeded_app(),
        "/v1/pest/search",
        json!({"symptoms": "hopperburn"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pests = body.as_array().unwrap();
    assert_eq!(pests.len(), 1);
    assert_eq!(pests[0]["name"], "Brown Planthopper");
}

#[tokio::test]
async fn pest_search_filters_by_type() {
    let (status, body) = post(seeded_app(), "/v1/pest/search", json!({"type": "disease"})).await;
    assert_eq!(status, StatusCode::OK);
    for pest in body.as_array().unwrap() {
        assert_eq!(pest["type"], "disease");
    }
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn pest_search_results_sorted_by_name() {
    let (status, body) = post(seeded_app(), "/v1/pest/search", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort_by_key(|n| n.to_lowercase());
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 6);
}

#[tokio::test]
async fn pest_search_rejects_bad_type_and_unknown_commodity_together() {
    let (status, body) = post(
        seeded_app(),
        "/v1/pest/search",
        json!({"type": "fungus", "commodity_id": 404}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"type"));
    assert!(fields.contains(&"commodity_id"));
}

#[tokio::test]
async fn chat_answers_leaf_spot() {
    let (status, body) = post(
        seeded_app(),
        "/v1/pest/chat",
        json!({"message": "My rice has leaf spots"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().contains("fungal"));
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn chat_rejects_empty_message() {
    let (status, body) = post(seeded_app(), "/v1/pest/chat", json!({"message": ""})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "message");
}

#[tokio::test]
async fn recent_pests_capped_and_newest_first() {
    let (status, body) = get(seeded_app(), "/v1/pests/recent").await;
    assert_eq!(status, StatusCode::OK);
    let pests = body["pests"].as_array().unwrap();
    assert_eq!(pests.len(), 6);
    // Seed spaces creation times a day apart; the last entry is newest.
    assert_eq!(pests[0]["name"], "Coffee Berry Borer");
    assert_eq!(body["commodities"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn pest_detail_and_not_found() {
    let app = seeded_app();
    let (status, body) = get(app.clone(), "/v1/pests/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["symptoms"].as_array().unwrap().len() > 0);

    let (status, _) = get(app, "/v1/pests/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[tokio::test]
async fn commodity_listing_is_paginated_with_categories() {
    let (status, body) = get(seeded_app(), "/v1/commodities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commodities"]["total"], 5);
    assert_eq!(body["commodities"]["page"], 1);
    assert_eq!(body["commodities"]["per_page"], 12);
    let categories: Vec<&str> = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["food crop", "horticulture", "plantation"]);
}

#[tokio::test]
async fn commodity_search_matches_scientific_name() {
    let (status, body) = get(seeded_app(), "/v1/commodities?search=oryza").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["commodities"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Rice");
    assert!(!items[0]["varieties"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn commodity_page_past_the_end_is_empty_not_an_error() {
    let (status, body) = get(seeded_app(), "/v1/commodities?page=40").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commodities"]["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["commodities"]["total"], 5);
}

#[tokio::test]
async fn variety_listing_rejects_unknown_commodity_filter() {
    let (status, body) = get(seeded_app(), "/v1/varieties?commodity_id=404").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["field"], "commodity_id");
}

#[tokio::test]
async fn variety_detail_carries_its_commodity() {
    let (status, body) = get(seeded_app(), "/v1/varieties/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "IR64");
    assert_eq!(body["commodity"]["name"], "Rice");
}

#[tokio::test]
async fn commodity_detail_includes_distribution_facts() {
    let (status, body) = get(seeded_app(), "/v1/commodities/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rice");
    assert!(!body["distributions"].as_array().unwrap().is_empty());
}
