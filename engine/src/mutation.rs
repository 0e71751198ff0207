//! Optimistic mutation coordinator.
//!
//! Every create, update or delete is applied to the local store first, then
//! handed to the caller as a [`RemoteRequest`]. When the remote call resolves
//! the caller reports back with [`MutationCoordinator::confirm`] or
//! [`MutationCoordinator::fail`], and the coordinator either merges the
//! authoritative record or undoes its optimistic change.
//!
//! # States
//!
//! ```text
//! Proposed ──confirm──▶ RemoteConfirmed
//!    │
//!    └──────fail──────▶ RolledBack   (local change undone)
//!                       Failed       (update kept, see UpdateFailurePolicy)
//! ```
//!
//! Mutations are independent of each other: several may be pending at once and
//! they resolve in any order.

use crate::{
    error::Result,
    store::{DedupStore, Slot},
    Entity, Error, MutationId, RecordId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Lifecycle state of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    /// Applied locally, remote call outstanding
    Proposed,
    /// Remote accepted; local state holds the authoritative record
    RemoteConfirmed,
    /// Remote rejected; local state restored
    RolledBack,
    /// Remote rejected; optimistic local state kept
    Failed,
}

/// What to do with an optimistic update when the remote rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateFailurePolicy {
    /// Keep the edited record and only surface the error
    #[default]
    KeepOptimistic,
    /// Put the pre-edit record back
    RestorePrevious,
}

/// The remote call the caller must perform for a proposal.
#[derive(Debug, Clone)]
pub enum RemoteRequest<T: Entity> {
    Create(T::Draft),
    Update { id: RecordId, patch: T::Patch },
    Delete(RecordId),
}

/// A mutation accepted by the coordinator, waiting for its remote outcome.
#[derive(Debug, Clone)]
pub struct Proposal<T: Entity> {
    pub mutation_id: MutationId,
    pub request: RemoteRequest<T>,
}

/// How to undo an optimistic change.
#[derive(Debug, Clone)]
enum Undo<T> {
    /// Nothing was applied locally
    Nothing,
    /// Put `previous` back under `id`, or drop `id` if there was none
    Revert { id: RecordId, previous: Option<T> },
    /// Re-insert a removed record into its former slot
    Reinsert { slot: Slot, record: T },
}

/// A mutation waiting for remote resolution.
#[derive(Debug, Clone)]
pub struct PendingMutation<T: Entity> {
    pub id: MutationId,
    pub kind: MutationKind,
    /// Record targeted; for a create, the client-known identity if any
    pub target_id: Option<RecordId>,
    /// Record applied optimistically
    pub proposed: Option<T>,
    /// When it was proposed (milliseconds since epoch)
    pub submitted_at: Timestamp,
    undo: Undo<T>,
}

/// Terminal outcome of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T: Entity> {
    pub mutation_id: MutationId,
    pub kind: MutationKind,
    pub state: MutationState,
    pub target_id: Option<RecordId>,
    /// Authoritative record merged on confirmation
    pub record: Option<T>,
}

/// Applies optimistic mutations and reconciles them with remote outcomes.
#[derive(Debug, Clone)]
pub struct MutationCoordinator<T: Entity> {
    pending: BTreeMap<MutationId, PendingMutation<T>>,
    next_id: MutationId,
    update_policy: UpdateFailurePolicy,
}

impl<T: Entity> Default for MutationCoordinator<T> {
    fn default() -> Self {
        Self::new(UpdateFailurePolicy::default())
    }
}

impl<T: Entity> MutationCoordinator<T> {
    pub fn new(update_policy: UpdateFailurePolicy) -> Self {
        Self {
            pending: BTreeMap::new(),
            next_id: 1,
            update_policy,
        }
    }

    pub fn update_policy(&self) -> UpdateFailurePolicy {
        self.update_policy
    }

    /// Propose creating a record.
    ///
    /// With a client-known identity the provisional record is visible
    /// immediately. Without one nothing is applied and the record appears only
    /// once the remote confirms it.
    pub fn propose_create(
        &mut self,
        store: &mut DedupStore<T>,
        draft: T::Draft,
        client_id: Option<RecordId>,
        now: Timestamp,
    ) -> Result<Proposal<T>> {
        T::validate_draft(&draft)?;

        let (proposed, undo) = match client_id {
            Some(id) => {
                let provisional = T::from_draft(id, &draft);
                let previous = store.upsert(provisional.clone());
                (Some(provisional), Undo::Revert { id, previous })
            }
            None => (None, Undo::Nothing),
        };

        let mutation_id = self.track(MutationKind::Create, client_id, proposed, now, undo);
        Ok(Proposal {
            mutation_id,
            request: RemoteRequest::Create(draft),
        })
    }

    /// Propose replacing a record with an edited version.
    ///
    /// The full record is applied locally; the remote receives its patch form.
    pub fn propose_update(
        &mut self,
        store: &mut DedupStore<T>,
        record: T,
        now: Timestamp,
    ) -> Proposal<T> {
        let id = record.id();
        let patch = record.to_patch();
        let previous = store.upsert(record.clone());

        let mutation_id = self.track(
            MutationKind::Update,
            Some(id),
            Some(record),
            now,
            Undo::Revert { id, previous },
        );
        Proposal {
            mutation_id,
            request: RemoteRequest::Update { id, patch },
        }
    }

    /// Propose deleting a record.
    ///
    /// The removed record is cached so it can be re-inserted if the remote
    /// rejects the delete.
    pub fn propose_delete(
        &mut self,
        store: &mut DedupStore<T>,
        id: RecordId,
        now: Timestamp,
    ) -> Proposal<T> {
        let undo = match store.remove(id) {
            Some((slot, record)) => Undo::Reinsert { slot, record },
            None => Undo::Nothing,
        };

        let mutation_id = self.track(MutationKind::Delete, Some(id), None, now, undo);
        Proposal {
            mutation_id,
            request: RemoteRequest::Delete(id),
        }
    }

    /// Resolve a mutation the remote accepted.
    ///
    /// `response` is the record returned by the remote for a create or update.
    pub fn confirm(
        &mut self,
        store: &mut DedupStore<T>,
        mutation_id: MutationId,
        response: Option<T>,
    ) -> Result<Resolution<T>> {
        let pending = self.take(mutation_id)?;

        match (pending.kind, &response) {
            (MutationKind::Create, Some(record)) => {
                // Re-keyed by the remote: whatever the provisional identity
                // displaced comes back before the server record is merged.
                if pending.target_id.is_some_and(|id| id != record.id()) {
                    self.undo(store, pending.undo);
                }
                store.upsert(record.clone());
            }
            (MutationKind::Update, Some(record)) => self.write_back(store, record.clone()),
            (MutationKind::Create | MutationKind::Update, None) => {}
            (MutationKind::Delete, _) => {
                if let Some(id) = pending.target_id {
                    store.remove(id);
                }
            }
        }

        Ok(Resolution {
            mutation_id,
            kind: pending.kind,
            state: MutationState::RemoteConfirmed,
            target_id: pending.target_id,
            record: response,
        })
    }

    /// Resolve a mutation the remote rejected.
    ///
    /// A `NotFound` on update or delete means the local entry is stale, so it
    /// is dropped instead of restored.
    pub fn fail(
        &mut self,
        store: &mut DedupStore<T>,
        mutation_id: MutationId,
        error: &Error,
    ) -> Result<Resolution<T>> {
        let pending = self.take(mutation_id)?;

        let stale = error.is_not_found() && pending.kind != MutationKind::Create;
        let state = if stale {
            if let Some(id) = pending.target_id {
                store.remove(id);
            }
            MutationState::RolledBack
        } else if pending.kind == MutationKind::Update
            && self.update_policy == UpdateFailurePolicy::KeepOptimistic
        {
            MutationState::Failed
        } else {
            self.undo(store, pending.undo);
            MutationState::RolledBack
        };

        Ok(Resolution {
            mutation_id,
            kind: pending.kind,
            state,
            target_id: pending.target_id,
            record: None,
        })
    }

    /// Get a pending mutation.
    pub fn get(&self, mutation_id: MutationId) -> Option<&PendingMutation<T>> {
        self.pending.get(&mutation_id)
    }

    /// Pending mutations in proposal order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingMutation<T>> {
        self.pending.values()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn track(
        &mut self,
        kind: MutationKind,
        target_id: Option<RecordId>,
        proposed: Option<T>,
        submitted_at: Timestamp,
        undo: Undo<T>,
    ) -> MutationId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(
            id,
            PendingMutation {
                id,
                kind,
                target_id,
                proposed,
                submitted_at,
                undo,
            },
        );
        id
    }

    fn take(&mut self, mutation_id: MutationId) -> Result<PendingMutation<T>> {
        self.pending
            .remove(&mutation_id)
            .ok_or(Error::UnknownMutation(mutation_id))
    }

    fn undo(&mut self, store: &mut DedupStore<T>, undo: Undo<T>) {
        match undo {
            Undo::Nothing => {}
            Undo::Revert {
                previous: Some(previous),
                ..
            } => self.write_back(store, previous),
            Undo::Revert { id, previous: None } => {
                store.remove(id);
            }
            Undo::Reinsert { slot, record } => store.restore(slot, record),
        }
    }

    /// Put a record back under an identity that already existed locally.
    ///
    /// If a pending delete has removed the identity meanwhile, the record
    /// replaces that delete's cached copy instead, so it only reappears if
    /// the delete is rolled back. Otherwise the identity is gone for good and
    /// nothing is written.
    fn write_back(&mut self, store: &mut DedupStore<T>, record: T) {
        let id = record.id();
        if store.contains(id) {
            store.upsert(record);
            return;
        }

        let cached = self
            .pending
            .values_mut()
            .rev()
            .find_map(|pending| match &mut pending.undo {
                Undo::Reinsert { record: cached, .. } if cached.id() == id => Some(cached),
                _ => None,
            });
        if let Some(cached) = cached {
            *cached = record;
        }
    }
}
