//! API routes for taniad
//!
//! Every endpoint is a stateless request -> validate -> filter -> respond
//! cycle over the catalog store. Validation failures map to 422 with a
//! structured field-error body; store failures map to a generic 500.

use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use std::sync::Arc;
use tania_common::catalog_db::DistributionFilter;
use tania_common::symptom_matcher::PestFilter;
use tania_common::{
    chatbot, ChatRequest, ChatResponse, ChildrenQuery, CommodityDetail, CommodityListQuery,
    CommodityListResponse, DistributionDetail, DistributionQuery, ErrorBody, FieldError,
    GeoSummary, HealthResponse, MapHomeResponse, Page, Pest, PestSearchRequest,
    RecentPestsResponse, ValidationError, Validator, VarietyListQuery, VarietyListResponse,
    VarietyWithCommodity, HOME_MAP_LIMIT, MAP_LIMIT, MIN_YEAR, PAGE_SIZE,
};
use tracing::{error, info};

type AppStateArc = Arc<AppState>;
type ErrorResponse = (StatusCode, Json<ErrorBody>);

/// Pest detection page shows the six newest catalog entries.
const RECENT_PESTS: u32 = 6;

fn unprocessable(err: ValidationError) -> ErrorResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            message: "validation failed".to_string(),
            errors: err.errors,
        }),
    )
}

/// Store/IO failures surface as a generic signal, never internal detail.
fn internal(e: anyhow::Error) -> ErrorResponse {
    error!("  Store error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: "internal error".to_string(),
            errors: Vec::new(),
        }),
    )
}

fn not_found(what: &str, id: i64) -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: format!("{} {} not found", what, id),
            errors: Vec::new(),
        }),
    )
}

fn current_year() -> i64 {
    chrono::Utc::now().year() as i64
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(
    State(state): State<AppStateArc>,
) -> Result<Json<HealthResponse>, ErrorResponse> {
    let db = state.db.lock().await;
    let counts = db.counts().map_err(internal)?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        counts,
    }))
}

// ============================================================================
// Map Routes
// ============================================================================

pub fn map_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/map/children", get(geo_children))
        .route("/v1/map/distributions", get(filter_distributions))
        .route("/v1/map/home", get(map_home))
}

/// Children of a geographic unit: `?province_id=` lists regencies,
/// `?regency_id=` lists districts. Province takes precedence when both
/// are supplied, matching the original controller.
async fn geo_children(
    State(state): State<AppStateArc>,
    Query(query): Query<ChildrenQuery>,
) -> Result<Json<Vec<GeoSummary>>, ErrorResponse> {
    let db = state.db.lock().await;

    if let Some(province_id) = query.province_id {
        let mut v = Validator::new();
        v.exists(
            "province_id",
            db.province_exists(province_id).map_err(internal)?,
        );
        v.finish().map_err(unprocessable)?;
        return db.regencies_of(province_id).map(Json).map_err(internal);
    }

    if let Some(regency_id) = query.regency_id {
        let mut v = Validator::new();
        v.exists(
            "regency_id",
            db.regency_exists(regency_id).map_err(internal)?,
        );
        v.finish().map_err(unprocessable)?;
        return db.districts_of(regency_id).map(Json).map_err(internal);
    }

    Err(unprocessable(ValidationError::single(
        "province_id",
        "either province_id or regency_id is required",
    )))
}

/// Filtered distribution facts, capped at 200, relations attached.
/// `year` defaults to the current calendar year.
async fn filter_distributions(
    State(state): State<AppStateArc>,
    Query(query): Query<DistributionQuery>,
) -> Result<Json<Vec<DistributionDetail>>, ErrorResponse> {
    let db = state.db.lock().await;

    let mut v = Validator::new();
    if let Some(id) = query.commodity_id {
        v.exists("commodity_id", db.commodity_exists(id).map_err(internal)?);
    }
    if let Some(id) = query.province_id {
        v.exists("province_id", db.province_exists(id).map_err(internal)?);
    }
    if let Some(id) = query.regency_id {
        v.exists("regency_id", db.regency_exists(id).map_err(internal)?);
    }
    if let Some(id) = query.district_id {
        v.exists("district_id", db.district_exists(id).map_err(internal)?);
    }
    if let Some(year) = query.year {
        v.in_range("year", year, MIN_YEAR, current_year());
    }
    v.finish().map_err(unprocessable)?;

    let filter = DistributionFilter {
        commodity_id: query.commodity_id,
        province_id: query.province_id,
        regency_id: query.regency_id,
        district_id: query.district_id,
        year: query.year.unwrap_or_else(current_year),
    };
    db.filter_distributions(&filter, MAP_LIMIT)
        .map(Json)
        .map_err(internal)
}

/// Map home payload: province and commodity dropdowns plus the current
/// year's distributions, capped at 100.
async fn map_home(
    State(state): State<AppStateArc>,
) -> Result<Json<MapHomeResponse>, ErrorResponse> {
    let db = state.db.lock().await;

    let filter = DistributionFilter {
        year: current_year(),
        ..Default::default()
    };
    Ok(Json(MapHomeResponse {
        provinces: db.provinces_summary().map_err(internal)?,
        commodities: db.commodity_summaries().map_err(internal)?,
        distributions: db
            .filter_distributions(&filter, HOME_MAP_LIMIT)
            .map_err(internal)?,
    }))
}

// ============================================================================
// Pest Routes
// ============================================================================

pub fn pest_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/pest/search", post(pest_search))
        .route("/v1/pest/chat", post(pest_chat))
        .route("/v1/pests/recent", get(recent_pests))
        .route("/v1/pests/:id", get(get_pest))
}

/// Symptom search. All constraint failures are collected into one 422,
/// as the original validator reports them.
///
/// Compatibility quirk, preserved on purpose: a request with no filters
/// at all returns the entire pest table ordered by name.
async fn pest_search(
    State(state): State<AppStateArc>,
    Json(req): Json<PestSearchRequest>,
) -> Result<Json<Vec<Pest>>, ErrorResponse> {
    let db = state.db.lock().await;

    let mut errors: Vec<FieldError> = Vec::new();
    let filter = match PestFilter::from_request(&req) {
        Ok(filter) => Some(filter),
        Err(e) => {
            errors.extend(e.errors);
            None
        }
    };
    if let Some(id) = req.commodity_id {
        if !db.commodity_exists(id).map_err(internal)? {
            errors.push(FieldError {
                field: "commodity_id".to_string(),
                message: "does not reference an existing record".to_string(),
            });
        }
    }
    if !errors.is_empty() {
        return Err(unprocessable(ValidationError { errors }));
    }

    let filter = filter.unwrap_or_default();
    if filter.is_empty() {
        info!("  Unfiltered pest search, returning full catalog");
    }
    db.search_pests(&filter).map(Json).map_err(internal)
}

/// Keyword chat responder. Pure decision table, no state between calls.
async fn pest_chat(
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    chatbot::respond(&req).map(Json).map_err(unprocessable)
}

async fn recent_pests(
    State(state): State<AppStateArc>,
) -> Result<Json<RecentPestsResponse>, ErrorResponse> {
    let db = state.db.lock().await;
    Ok(Json(RecentPestsResponse {
        pests: db.recent_pests(RECENT_PESTS).map_err(internal)?,
        commodities: db.commodity_names().map_err(internal)?,
    }))
}

async fn get_pest(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<Pest>, ErrorResponse> {
    let db = state.db.lock().await;
    db.get_pest(id)
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Pest", id))
}

// ============================================================================
// Catalog Routes
// ============================================================================

pub fn catalog_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/commodities", get(list_commodities))
        .route("/v1/commodities/:id", get(get_commodity))
        .route("/v1/varieties", get(list_varieties))
        .route("/v1/varieties/:id", get(get_variety))
}

async fn list_commodities(
    State(state): State<AppStateArc>,
    Query(query): Query<CommodityListQuery>,
) -> Result<Json<CommodityListResponse>, ErrorResponse> {
    let db = state.db.lock().await;

    let page = query.page.unwrap_or(1).max(1);
    let (items, total) = db
        .commodities_page(
            query.search.as_deref(),
            query.category.as_deref(),
            page,
            PAGE_SIZE,
        )
        .map_err(internal)?;

    Ok(Json(CommodityListResponse {
        commodities: Page::new(items, total, page),
        categories: db.categories().map_err(internal)?,
    }))
}

async fn get_commodity(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<CommodityDetail>, ErrorResponse> {
    let db = state.db.lock().await;
    db.get_commodity(id)
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Commodity", id))
}

async fn list_varieties(
    State(state): State<AppStateArc>,
    Query(query): Query<VarietyListQuery>,
) -> Result<Json<VarietyListResponse>, ErrorResponse> {
    let db = state.db.lock().await;

    if let Some(id) = query.commodity_id {
        let mut v = Validator::new();
        v.exists("commodity_id", db.commodity_exists(id).map_err(internal)?);
        v.finish().map_err(unprocessable)?;
    }

    let page = query.page.unwrap_or(1).max(1);
    let (items, total) = db
        .varieties_page(query.search.as_deref(), query.commodity_id, page, PAGE_SIZE)
        .map_err(internal)?;

    Ok(Json(VarietyListResponse {
        varieties: Page::new(items, total, page),
    }))
}

async fn get_variety(
    State(state): State<AppStateArc>,
    Path(id): Path<i64>,
) -> Result<Json<VarietyWithCommodity>, ErrorResponse> {
    let db = state.db.lock().await;
    db.get_variety(id)
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Variety", id))
}
