//! Tania Common - Shared types and storage for the Tania catalog service.
//!
//! Domain models, the SQLite catalog store, request validation, the
//! symptom matcher, and the keyword chat responder. Everything here is
//! read-only at query time; mutation happens only through seeding.

pub mod api;
pub mod catalog_db;
pub mod chatbot;
pub mod config;
pub mod models;
pub mod symptom_matcher;
pub mod validation;

pub use api::*;
pub use models::*;
pub use validation::{FieldError, ValidationError, Validator};
