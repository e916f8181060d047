//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ListsCommand, ListsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub lists: Arc<dyn ListsCommand>,
    pub lists_query: Arc<dyn ListsQuery>,
}

impl HttpState {
    /// Construct state from the list command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lists::domain::ports::{FixtureListsCommand, FixtureListsQuery};
    /// use lists::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureListsCommand), Arc::new(FixtureListsQuery));
    /// let _query = state.lists_query.clone();
    /// ```
    pub fn new(lists: Arc<dyn ListsCommand>, lists_query: Arc<dyn ListsQuery>) -> Self {
        Self { lists, lists_query }
    }
}
