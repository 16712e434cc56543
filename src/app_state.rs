use std::sync::Arc;

use crate::config::ListingErrors;
use crate::store::JsonFileStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonFileStore>,
    pub listing_errors: ListingErrors,
}

impl AppState {
    pub fn new(store: JsonFileStore, listing_errors: ListingErrors) -> Self {
        Self {
            store: Arc::new(store),
            listing_errors,
        }
    }
}
