//! Repository layer: SQL text and the functions that run it.

pub mod analytics_repo;

pub use analytics_repo::AnalyticsRepo;
