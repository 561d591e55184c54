//! Tania daemon library - exposes modules for testing.

pub mod routes;
pub mod seed;
pub mod server;
