//! RelateScore - consent-gated relationship reflection scoring.
//!
//! Turns questionnaire reflections into per-category scores, keeps them in
//! dual-consent threads, and summarises a thread's history as an
//! outlier-dampened point estimate plus a recency-weighted trend.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod scoring;
pub mod store;

pub use analysis::{compute_dashboard, dampened_aggregate, ema, rgi_from_categories};
pub use error::{RelateError, Result};
pub use models::{Category, CategoryScores, CategoryWeights, DashboardSnapshot, Reflection, Thread};
pub use scoring::{score_categories, ScoringStrategy};
pub use store::{JsonFileStore, ThreadStore};
