//! Library root for the `dados_ingest` crate.
//!
//! A small HTTP service that stamps incoming JSON objects with their arrival
//! time and appends them to a JSON array file.

// Core error handling
pub mod errors;

// Records and their persistence
pub mod record;
pub mod store;

// Configuration & CLI
pub mod cli;
pub mod config;
pub mod logging;

// Web server interface
pub mod app_state;
pub mod web;

pub use app_state::AppState;
pub use config::{ListingErrors, ServiceConfig};
pub use errors::{IngestError, IngestResult};
pub use record::{Collection, Record};
pub use store::JsonFileStore;
pub use web::build_router;
