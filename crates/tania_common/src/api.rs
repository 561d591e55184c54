//! Request/response wire types shared by taniad and tanictl.

use crate::models::{
    CommoditySummary, CommodityWithVarieties, DistributionDetail, GeoSummary, IdName, Pest,
    VarietyWithCommodity,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog listings paginate 12 records per page, like the original site.
pub const PAGE_SIZE: u32 = 12;

/// Map queries cap at 200 rows; the home page variant at 100.
pub const MAP_LIMIT: u32 = 200;
pub const HOME_MAP_LIMIT: u32 = 100;

/// Oldest accepted distribution year.
pub const MIN_YEAR: i64 = 2000;

// ============================================================================
// Pest search and chat
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PestSearchRequest {
    pub symptoms: Option<String>,
    pub commodity_id: Option<i64>,
    /// "pest" or "disease"; anything else fails validation.
    #[serde(rename = "type")]
    pub pest_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for forward compatibility with the original client;
    /// never consumed by the responder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub suggestions: Vec<String>,
}

/// Pest detection page payload: recent entries plus the commodity dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPestsResponse {
    pub pests: Vec<Pest>,
    pub commodities: Vec<IdName>,
}

// ============================================================================
// Map
// ============================================================================

/// Query string for `/v1/map/children`. Exactly one of the two must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildrenQuery {
    pub province_id: Option<i64>,
    pub regency_id: Option<i64>,
}

/// Query string for `/v1/map/distributions`. All filters optional, ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionQuery {
    pub commodity_id: Option<i64>,
    pub province_id: Option<i64>,
    pub regency_id: Option<i64>,
    pub district_id: Option<i64>,
    /// Defaults to the current calendar year when omitted.
    pub year: Option<i64>,
}

/// Map home page payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapHomeResponse {
    pub provinces: Vec<GeoSummary>,
    pub commodities: Vec<CommoditySummary>,
    pub distributions: Vec<DistributionDetail>,
}

// ============================================================================
// Catalog listings
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommodityListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarietyListQuery {
    pub search: Option<String>,
    pub commodity_id: Option<i64>,
    pub page: Option<u32>,
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32) -> Self {
        Self {
            items,
            total,
            page,
            per_page: PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityListResponse {
    pub commodities: Page<CommodityWithVarieties>,
    /// Distinct categories, ordered, for the filter dropdown.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarietyListResponse {
    pub varieties: Page<VarietyWithCommodity>,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCounts {
    pub provinces: u64,
    pub regencies: u64,
    pub districts: u64,
    pub commodities: u64,
    pub varieties: u64,
    pub pests: u64,
    pub distributions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub counts: TableCounts,
}

/// Structured 422 payload: which fields failed and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub errors: Vec<crate::validation::FieldError>,
}
