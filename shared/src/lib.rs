//! Shared types and growth rules for Fair Weather Friend
//!
//! This crate contains the plant/garden data model and the pure growth
//! calculators used by the backend, the refresh job, and the mobile client
//! (via WASM).

pub mod format;
pub mod growth;
pub mod models;
pub mod types;
pub mod validation;

pub use format::*;
pub use growth::*;
pub use models::*;
pub use types::*;
pub use validation::*;
