//! Shared application state.

use std::sync::Arc;

use abhilekh_search::SearchRouter;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SearchRouter>,
    /// Include collaborator error detail in 500 bodies (development only)
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(router: Arc<SearchRouter>, expose_errors: bool) -> Self {
        Self {
            router,
            expose_errors,
        }
    }
}
