//! Shared types and models for the AgriTriFusion crop management demo
//!
//! This crate contains the domain types and the pure, I/O-free prediction
//! logic shared between the backend, the browser front end (via WASM),
//! and the test suites.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
