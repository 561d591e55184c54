//! Symptom matcher for the pest/disease search.
//!
//! Matching is a pure substring test over three fields, unit-testable in
//! isolation from storage: the lowercased query must appear in the
//! record's lowercased name, description, or serialized symptoms list.
//! Filters are combined with logical AND.

use crate::api::PestSearchRequest;
use crate::models::{Pest, PestType};
use crate::validation::{ValidationError, Validator};

/// Hard cap on the symptom description, matching the original validator.
pub const MAX_SYMPTOMS_LEN: usize = 500;

/// A validated, normalized search. The symptom text is pre-lowercased.
#[derive(Debug, Clone, Default)]
pub struct PestFilter {
    pub symptoms: Option<String>,
    pub commodity_id: Option<i64>,
    pub pest_type: Option<PestType>,
}

impl PestFilter {
    /// Validate the storage-free constraints of a search request: symptom
    /// length and type enumeration. Referential existence of
    /// `commodity_id` is checked by the caller against the store.
    pub fn from_request(req: &PestSearchRequest) -> Result<Self, ValidationError> {
        let mut v = Validator::new();

        if let Some(symptoms) = &req.symptoms {
            v.max_len("symptoms", symptoms, MAX_SYMPTOMS_LEN);
        }

        let pest_type = match &req.pest_type {
            Some(raw) => {
                let parsed = PestType::parse(raw);
                if parsed.is_none() {
                    v.fail("type", "must be one of: pest, disease");
                }
                parsed
            }
            None => None,
        };

        v.finish()?;

        Ok(Self {
            symptoms: req
                .symptoms
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_lowercase()),
            commodity_id: req.commodity_id,
            pest_type,
        })
    }

    /// True when no filter was supplied at all. Such a search returns the
    /// entire table; see the handler for the compatibility note.
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_none() && self.commodity_id.is_none() && self.pest_type.is_none()
    }
}

/// The three-field substring predicate. `query` must be lowercase.
pub fn matches_symptom(pest: &Pest, query: &str) -> bool {
    if pest.name.to_lowercase().contains(query) {
        return true;
    }
    if let Some(description) = &pest.description {
        if description.to_lowercase().contains(query) {
            return true;
        }
    }
    // The original matches against the serialized JSON of the symptom
    // list, not the individual entries; keep that shape.
    let serialized = serde_json::to_string(&pest.symptoms).unwrap_or_default();
    serialized.to_lowercase().contains(query)
}

/// Full filter: all supplied conditions must hold.
pub fn matches(pest: &Pest, filter: &PestFilter) -> bool {
    if let Some(query) = &filter.symptoms {
        if !matches_symptom(pest, query) {
            return false;
        }
    }
    if let Some(commodity_id) = filter.commodity_id {
        if !pest.affected_commodities.contains(&commodity_id) {
            return false;
        }
    }
    if let Some(pest_type) = filter.pest_type {
        if pest.pest_type != pest_type {
            return false;
        }
    }
    true
}
