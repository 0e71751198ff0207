//! Remote collection gateways.
//!
//! A gateway is the network boundary of a session: paged fetch plus create,
//! update and delete over one record type. Timeouts and transport details
//! belong here, not in the engine.

mod http;

pub use http::{HttpGateway, Resource};

use async_trait::async_trait;
use stockroom_engine::{error::Result, Entity, PageToken, RecordId};

/// Paged CRUD access to a remote collection.
#[async_trait]
pub trait Gateway<T: Entity>: Send + Sync {
    /// Fetch one page. An empty page means there are no further records.
    async fn fetch_page(&self, token: PageToken) -> Result<Vec<T>>;

    /// Create a record; the remote returns it with its assigned identity.
    async fn create(&self, draft: &T::Draft) -> Result<T>;

    /// Update a record; the remote returns its canonical form.
    async fn update(&self, id: RecordId, patch: &T::Patch) -> Result<T>;

    /// Delete a record.
    async fn delete(&self, id: RecordId) -> Result<()>;
}
