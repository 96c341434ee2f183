pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod display;
pub mod history;
pub mod ingestion;
pub mod snapshot;
pub mod store;
