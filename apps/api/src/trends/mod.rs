// Trends catalog: loading, relevance scoring, and catalog endpoints.

pub mod handlers;
pub mod loader;
pub mod models;
pub mod scoring;
