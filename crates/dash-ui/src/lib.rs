//! Terminal UI layer for the marketing dashboard.
//!
//! Provides themes, reusable components (header, spend-share bar, KPI
//! indicators), the live overview view, aggregate table views, and the main
//! application event loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod overview_view;
pub mod table_view;
pub mod themes;

pub use dash_core as core;
