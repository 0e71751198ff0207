//! Sync session - drives a catalog against a remote gateway.
//!
//! The session is the boundary the rendering layer talks to. Each operation
//! takes the catalog lock only long enough to obtain a page token or a
//! proposal, releases it for the remote call, and takes it again to apply the
//! outcome. Page fetches are therefore serialized by the cursor's in-flight
//! flag while mutations run concurrently with each other and with fetches.

use crate::gateway::Gateway;
use std::sync::Arc;
use stockroom_engine::{
    error::Result, Catalog, CatalogView, Entity, Error, PageOutcome, PageToken, Proposal,
    Reattach, RecordId, RemoteRequest, Resolution, Timestamp, UpdateFailurePolicy,
};
use tokio::sync::Mutex;

/// Shared handle to one synchronized collection.
pub struct SyncSession<T: Entity, G> {
    catalog: Arc<Mutex<Catalog<T>>>,
    gateway: Arc<G>,
}

impl<T: Entity, G> Clone for SyncSession<T, G> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<T: Entity, G: Gateway<T>> SyncSession<T, G> {
    /// Create a session with an empty catalog.
    pub fn new(gateway: G) -> Self {
        Self::with_update_policy(gateway, UpdateFailurePolicy::default())
    }

    pub fn with_update_policy(gateway: G, policy: UpdateFailurePolicy) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(Catalog::with_update_policy(policy))),
            gateway: Arc::new(gateway),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Copy of the ordered records.
    pub async fn snapshot(&self) -> Vec<T> {
        self.catalog.lock().await.snapshot().to_vec()
    }

    /// Whether a page fetch is outstanding.
    pub async fn loading(&self) -> bool {
        self.catalog.lock().await.is_loading()
    }

    /// The last failure, if the most recent operation failed.
    pub async fn error(&self) -> Option<Error> {
        self.catalog.lock().await.error().cloned()
    }

    pub async fn is_exhausted(&self) -> bool {
        self.catalog.lock().await.is_exhausted()
    }

    pub async fn pending_mutations(&self) -> usize {
        self.catalog.lock().await.mutations().pending_count()
    }

    /// Run `f` against a consistent view of the catalog.
    pub async fn view<R>(&self, f: impl FnOnce(CatalogView<'_, T>) -> R) -> R {
        let catalog = self.catalog.lock().await;
        f(catalog.view())
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Fetch the next page unless one is in flight or the collection is exhausted.
    pub async fn request_next_page(&self) -> Result<PageOutcome> {
        let token = self.catalog.lock().await.begin_page();
        self.fetch(token).await
    }

    /// Feed a boundary-visibility signal from the viewport.
    pub async fn signal_near_end(&self, near_end: bool) -> Result<PageOutcome> {
        let token = self.catalog.lock().await.signal_proximity(near_end);
        if near_end && token.is_none() {
            tracing::debug!("Proximity signal suppressed");
        }
        self.fetch(token).await
    }

    /// "Load more": the end of the list is visible.
    pub async fn request_more(&self) -> Result<PageOutcome> {
        self.signal_near_end(true).await
    }

    /// Move the proximity observer to the current last record.
    pub async fn observe_last(&self) -> Option<Reattach> {
        let reattach = self.catalog.lock().await.observe_last();
        if let Some(Reattach { detached, attached }) = reattach {
            tracing::debug!(?detached, ?attached, "Proximity observer re-attached");
        }
        reattach
    }

    async fn fetch(&self, token: Option<PageToken>) -> Result<PageOutcome> {
        let Some(token) = token else {
            return Ok(PageOutcome::Skipped);
        };

        let fetched = self.gateway.fetch_page(token).await;

        let mut catalog = self.catalog.lock().await;
        match fetched {
            Ok(records) => {
                let outcome = catalog.complete_page(token, records)?;
                match outcome {
                    PageOutcome::Appended(appended) => tracing::info!(
                        token,
                        appended,
                        total = catalog.snapshot().len(),
                        "Page appended"
                    ),
                    PageOutcome::Exhausted => tracing::info!(token, "Collection exhausted"),
                    PageOutcome::Skipped => {}
                }
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(token, error = %err, "Page fetch failed");
                catalog.fail_page(token, err.clone())?;
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a record.
    ///
    /// Pass `client_id` only when the identity is known before the remote
    /// assigns it; otherwise the record appears once the remote confirms.
    pub async fn propose_create(
        &self,
        draft: T::Draft,
        client_id: Option<RecordId>,
    ) -> Result<Resolution<T>> {
        let proposal = self
            .catalog
            .lock()
            .await
            .propose_create(draft, client_id, now())?;
        self.execute(proposal).await
    }

    /// Replace a record with an edited version.
    pub async fn propose_update(&self, record: T) -> Result<Resolution<T>> {
        let proposal = self.catalog.lock().await.propose_update(record, now());
        self.execute(proposal).await
    }

    /// Delete a record.
    pub async fn propose_delete(&self, id: RecordId) -> Result<Resolution<T>> {
        let proposal = self.catalog.lock().await.propose_delete(id, now());
        self.execute(proposal).await
    }

    async fn execute(&self, proposal: Proposal<T>) -> Result<Resolution<T>> {
        let Proposal {
            mutation_id,
            request,
        } = proposal;

        let outcome = match &request {
            RemoteRequest::Create(draft) => self.gateway.create(draft).await.map(Some),
            RemoteRequest::Update { id, patch } => {
                self.gateway.update(*id, patch).await.map(Some)
            }
            RemoteRequest::Delete(id) => self.gateway.delete(*id).await.map(|()| None),
        };

        let mut catalog = self.catalog.lock().await;
        match outcome {
            Ok(record) => {
                let resolution = catalog.confirm(mutation_id, record)?;
                tracing::info!(
                    mutation_id,
                    kind = ?resolution.kind,
                    record_id = ?resolution.record.as_ref().map(|r| r.id()).or(resolution.target_id),
                    "Mutation confirmed"
                );
                Ok(resolution)
            }
            Err(err) => {
                let resolution = catalog.fail_mutation(mutation_id, err.clone())?;
                tracing::warn!(
                    mutation_id,
                    kind = ?resolution.kind,
                    state = ?resolution.state,
                    record_id = ?resolution.target_id,
                    error = %err,
                    "Mutation failed"
                );
                Err(err)
            }
        }
    }
}

fn now() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
