//! Domain models for the agricultural catalog.
//!
//! Rows mirror the relational schema in [`crate::catalog_db`]. JSON columns
//! (symptoms, boundaries, growing conditions, ...) are kept as
//! `serde_json::Value` or typed lists so they round-trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Pest / Disease
// ============================================================================

/// The two-value catalog type: insect pest or plant disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PestType {
    Pest,
    Disease,
}

impl PestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PestType::Pest => "pest",
            PestType::Disease => "disease",
        }
    }

    /// Parse the wire/database representation. Anything outside the
    /// enumeration is rejected, never silently coerced.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pest" => Some(PestType::Pest),
            "disease" => Some(PestType::Disease),
            _ => None,
        }
    }
}

/// A pest or disease catalog entry with identification and control guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pest {
    pub id: i64,
    pub name: String,
    pub scientific_name: Option<String>,
    #[serde(rename = "type")]
    pub pest_type: PestType,
    pub description: Option<String>,
    /// Ordered list of observable symptoms.
    pub symptoms: Vec<String>,
    /// Commodity ids this pest/disease is known to affect.
    pub affected_commodities: Vec<i64>,
    pub control_methods: Vec<String>,
    pub insecticide_recommendations: Vec<String>,
    pub image_url: Option<String>,
    pub environmental_factors: Vec<String>,
    /// Unix epoch seconds; drives the "recent pests" listing.
    pub created_at: i64,
}

// ============================================================================
// Commodity and Variety
// ============================================================================

/// An agricultural crop type (Rice, Coffee, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commodity {
    pub id: i64,
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    /// Food crop, horticulture, plantation, etc.
    pub category: String,
    pub image_url: Option<String>,
    pub growing_conditions: Option<Value>,
    pub harvest_info: Option<Value>,
}

/// Slim commodity projection for dropdowns and the map page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommoditySummary {
    pub id: i64,
    pub name: String,
    pub category: String,
}

/// Minimal id/name pair for filter dropdowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdName {
    pub id: i64,
    pub name: String,
}

/// A named cultivar of a commodity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variety {
    pub id: i64,
    pub commodity_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub agronomic_traits: Option<Value>,
    pub pest_susceptibility: Option<Value>,
    pub maturity_days: Option<i64>,
    pub potential_yield: Option<f64>,
    pub yield_unit: String,
    pub image_url: Option<String>,
}

/// Commodity with its varieties attached (catalog listing shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityWithVarieties {
    #[serde(flatten)]
    pub commodity: Commodity,
    pub varieties: Vec<Variety>,
}

/// Variety with its parent commodity attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarietyWithCommodity {
    #[serde(flatten)]
    pub variety: Variety,
    pub commodity: Option<CommoditySummary>,
}

/// Commodity detail page shape: varieties plus production distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityDetail {
    #[serde(flatten)]
    pub commodity: Commodity,
    pub varieties: Vec<Variety>,
    pub distributions: Vec<DistributionDetail>,
}

// ============================================================================
// Geography
// ============================================================================

/// One node of the province → regency → district hierarchy.
///
/// `parent_id` is None for provinces, the province id for regencies and the
/// regency id for districts. Boundaries are opaque GeoJSON, stored but
/// never processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoUnit {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub boundaries: Option<Value>,
}

/// Projection used for children listings and map dropdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
}

// ============================================================================
// Distribution facts
// ============================================================================

/// A yearly production/area fact for a commodity in one geographic unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    pub id: i64,
    pub commodity_id: i64,
    pub province_id: Option<i64>,
    pub regency_id: Option<i64>,
    pub district_id: Option<i64>,
    pub area_hectares: Option<f64>,
    pub production_tons: Option<f64>,
    /// Stored as seeded; see [`Distribution::derived_productivity`].
    pub productivity: Option<f64>,
    pub year: i64,
    pub environmental_data: Option<Value>,
}

impl Distribution {
    /// Productivity in tons/hectare, derived only from a validated
    /// positive area. Returns None when area is missing or non-positive.
    pub fn derived_productivity(&self) -> Option<f64> {
        match (self.production_tons, self.area_hectares) {
            (Some(tons), Some(area)) if area > 0.0 => Some(tons / area),
            _ => None,
        }
    }
}

/// Distribution with its related records attached (map display shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionDetail {
    #[serde(flatten)]
    pub distribution: Distribution,
    pub commodity: Option<CommoditySummary>,
    pub province: Option<GeoSummary>,
    pub regency: Option<GeoSummary>,
    pub district: Option<GeoSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pest_type_parses_only_the_two_values() {
        assert_eq!(PestType::parse("pest"), Some(PestType::Pest));
        assert_eq!(PestType::parse("disease"), Some(PestType::Disease));
        assert_eq!(PestType::parse("fungus"), None);
        assert_eq!(PestType::parse(""), None);
    }

    #[test]
    fn pest_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PestType::Disease).unwrap(),
            "\"disease\""
        );
    }

    #[test]
    fn productivity_requires_positive_area() {
        let mut d = Distribution {
            id: 1,
            commodity_id: 1,
            province_id: Some(1),
            regency_id: None,
            district_id: None,
            area_hectares: Some(100.0),
            production_tons: Some(550.0),
            productivity: None,
            year: 2024,
            environmental_data: None,
        };
        assert_eq!(d.derived_productivity(), Some(5.5));

        d.area_hectares = Some(0.0);
        assert_eq!(d.derived_productivity(), None);

        d.area_hectares = None;
        assert_eq!(d.derived_productivity(), None);
    }
}
