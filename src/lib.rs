//! textenrich - document enrichment backed by a remote text analytics service.
//!
//! Core library: the API client, the document model, enrichment stages and
//! the pipeline runner.

pub mod api;
pub mod config;
pub mod enrich;
pub mod models;
