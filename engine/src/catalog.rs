//! Catalog - the owned state of one synchronized collection.
//!
//! A catalog bundles the dedup store, the page cursor, the proximity trigger
//! and the mutation coordinator together with the loading and last-error state
//! a rendering layer reads. It performs no IO: callers obtain page tokens and
//! remote requests from it, run them, and report the outcome back.

use crate::{
    cursor::PageCursor,
    error::Result,
    mutation::{MutationCoordinator, Proposal, Resolution, UpdateFailurePolicy},
    store::DedupStore,
    trigger::{ProximityTrigger, Reattach},
    view::CatalogView,
    Entity, Error, MutationId, PageToken, RecordId, Timestamp,
};

/// Outcome of a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// No fetch was issued (already in flight, or exhausted)
    Skipped,
    /// A page arrived; the count is how many records were new
    Appended(usize),
    /// The page was empty; no further fetches will be issued
    Exhausted,
}

/// The main state holder for one remote collection.
#[derive(Debug, Clone)]
pub struct Catalog<T: Entity> {
    store: DedupStore<T>,
    cursor: PageCursor,
    trigger: ProximityTrigger,
    mutations: MutationCoordinator<T>,
    /// Last failure, cleared by the next success
    error: Option<Error>,
}

impl<T: Entity> Default for Catalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Catalog<T> {
    /// Create an empty catalog with the default update failure policy.
    pub fn new() -> Self {
        Self::with_update_policy(UpdateFailurePolicy::default())
    }

    pub fn with_update_policy(policy: UpdateFailurePolicy) -> Self {
        Self {
            store: DedupStore::new(),
            cursor: PageCursor::new(),
            trigger: ProximityTrigger::new(),
            mutations: MutationCoordinator::new(policy),
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Ordered records for rendering.
    pub fn snapshot(&self) -> &[T] {
        self.store.snapshot()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.store.get(id)
    }

    /// Whether a page fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.cursor.is_in_flight()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// The most recent failure, if the last operation failed.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn store(&self) -> &DedupStore<T> {
        &self.store
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn trigger(&self) -> &ProximityTrigger {
        &self.trigger
    }

    pub fn mutations(&self) -> &MutationCoordinator<T> {
        &self.mutations
    }

    /// Serializable view for the rendering layer.
    pub fn view(&self) -> CatalogView<'_, T> {
        CatalogView {
            records: self.store.snapshot(),
            loading: self.cursor.is_in_flight(),
            error: self.error.as_ref().map(Error::to_string),
            exhausted: self.cursor.is_exhausted(),
            next_page: self.cursor.next_token(),
            pending_mutations: self.mutations.pending_count(),
        }
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Start fetching the next page, if allowed.
    pub fn begin_page(&mut self) -> Option<PageToken> {
        self.cursor.begin()
    }

    /// Feed a boundary-visibility signal to the proximity trigger.
    pub fn signal_proximity(&mut self, near_end: bool) -> Option<PageToken> {
        self.trigger.signal(near_end, &mut self.cursor)
    }

    /// Re-attach the proximity observer to the current last record.
    ///
    /// Nothing moves while a page is loading.
    pub fn observe_last(&mut self) -> Option<Reattach> {
        if self.cursor.is_in_flight() {
            return None;
        }
        self.trigger.observe(self.store.last_id())
    }

    /// Apply a fetched page.
    pub fn complete_page(&mut self, token: PageToken, records: Vec<T>) -> Result<PageOutcome> {
        self.cursor.complete(token, records.len())?;
        self.error = None;

        if records.is_empty() {
            return Ok(PageOutcome::Exhausted);
        }
        Ok(PageOutcome::Appended(self.store.merge_append(records)))
    }

    /// Record a failed page fetch. The same token will be retried.
    pub fn fail_page(&mut self, token: PageToken, error: Error) -> Result<()> {
        self.cursor.fail(token)?;
        self.error = Some(error);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn propose_create(
        &mut self,
        draft: T::Draft,
        client_id: Option<RecordId>,
        now: Timestamp,
    ) -> Result<Proposal<T>> {
        self.mutations
            .propose_create(&mut self.store, draft, client_id, now)
            .inspect_err(|e| self.error = Some(e.clone()))
    }

    pub fn propose_update(&mut self, record: T, now: Timestamp) -> Proposal<T> {
        self.mutations.propose_update(&mut self.store, record, now)
    }

    pub fn propose_delete(&mut self, id: RecordId, now: Timestamp) -> Proposal<T> {
        self.mutations.propose_delete(&mut self.store, id, now)
    }

    /// Resolve a mutation the remote accepted.
    pub fn confirm(
        &mut self,
        mutation_id: MutationId,
        response: Option<T>,
    ) -> Result<Resolution<T>> {
        let resolution = self
            .mutations
            .confirm(&mut self.store, mutation_id, response)?;
        self.error = None;
        Ok(resolution)
    }

    /// Resolve a mutation the remote rejected; the error becomes the current one.
    pub fn fail_mutation(
        &mut self,
        mutation_id: MutationId,
        error: Error,
    ) -> Result<Resolution<T>> {
        let resolution = self.mutations.fail(&mut self.store, mutation_id, &error)?;
        self.error = Some(error);
        Ok(resolution)
    }
}
