//! Core domain layer for the marketing intelligence dashboard.
//!
//! Holds the campaign/business record models, KPI calculations, error
//! definitions, display formatting, and CLI settings shared by the data,
//! runtime and UI crates.

pub mod error;
pub mod formatting;
pub mod metrics;
pub mod models;
pub mod settings;
