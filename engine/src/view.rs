//! Read-only view handed to the rendering layer.
//!
//! The view borrows the catalog's records, so consumers can render or
//! serialize them but never mutate the underlying store.

use crate::{Entity, PageToken};
use serde::Serialize;

/// A point-in-time view of a catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView<'a, T: Entity> {
    /// Records in display order
    pub records: &'a [T],
    /// Whether a page fetch is outstanding
    pub loading: bool,
    /// Message of the most recent failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the remote has no further pages
    pub exhausted: bool,
    /// Token of the next page to fetch
    pub next_page: PageToken,
    /// Mutations still waiting for the remote
    pub pending_mutations: usize,
}

impl<T: Entity> CatalogView<'_, T> {
    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
