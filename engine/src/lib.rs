//! # Stockroom Engine
//!
//! An incremental collection synchronization engine for catalog front ends.
//!
//! This crate holds the state logic that sits between a paginated REST
//! collection and a rendering layer: it materializes pages into one
//! deduplicated ordered list, decides when the next page may be fetched, and
//! applies create/update/delete optimistically while the remote call is
//! outstanding.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine hands out page tokens and remote requests; the
//!   caller performs them and reports the outcome back
//! - **Deterministic**: timestamps are supplied by the caller
//! - **Testable**: pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! Anything implementing [`Entity`]: a server-assigned identity plus the
//! draft and patch payload shapes the remote accepts. [`Product`] and
//! [`Transaction`] are provided.
//!
//! ### Dedup Merge Store
//!
//! [`DedupStore`] keeps records in arrival order with pairwise distinct
//! identities. Collisions replace in place; nothing is ever re-sorted.
//!
//! ### Page Cursor and Proximity Trigger
//!
//! [`PageCursor`] tracks the next page token, whether a fetch is in flight and
//! whether the collection is exhausted. [`ProximityTrigger`] turns a
//! "near the end of the list" signal into at most one outstanding request.
//!
//! ### Optimistic Mutations
//!
//! [`MutationCoordinator`] applies mutations locally first and reconciles them
//! once the remote confirms or rejects them:
//! - create: visible immediately only when the identity is known up front
//! - update: kept on failure by default ([`UpdateFailurePolicy`])
//! - delete: re-inserted at its old position on failure
//!
//! ## Quick Start
//!
//! ```rust
//! use stockroom_engine::{Catalog, PageOutcome, Product, RemoteRequest};
//!
//! let mut catalog: Catalog<Product> = Catalog::new();
//!
//! // 1. The viewport reports that the end of the list is visible
//! let token = catalog.signal_proximity(true).unwrap();
//! assert_eq!(token, 1);
//!
//! // 2. The caller fetches the page and feeds it back
//! let page: Vec<Product> = serde_json::from_str(
//!     r#"[{"id": 1, "title": "Lamp"}, {"id": 2, "title": "Desk"}]"#,
//! ).unwrap();
//! assert_eq!(catalog.complete_page(token, page).unwrap(), PageOutcome::Appended(2));
//!
//! // 3. Delete optimistically; the remote call is the caller's job
//! let proposal = catalog.propose_delete(1, 1706745600000);
//! assert!(matches!(proposal.request, RemoteRequest::Delete(1)));
//! assert_eq!(catalog.snapshot().len(), 1);
//!
//! // 4. The remote rejected it: the record comes back
//! let err = stockroom_engine::Error::Transport("connection reset".into());
//! catalog.fail_mutation(proposal.mutation_id, err).unwrap();
//! assert_eq!(catalog.snapshot().len(), 2);
//! ```

pub mod catalog;
pub mod cursor;
pub mod error;
pub mod mutation;
pub mod product;
pub mod record;
pub mod schema;
pub mod store;
pub mod transaction;
pub mod trigger;
pub mod view;

// Re-export main types at crate root
pub use catalog::{Catalog, PageOutcome};
pub use cursor::{PageCursor, FIRST_PAGE};
pub use error::Error;
pub use mutation::{
    MutationCoordinator, MutationKind, MutationState, PendingMutation, Proposal, RemoteRequest,
    Resolution, UpdateFailurePolicy,
};
pub use product::{Product, ProductDraft, ProductPatch};
pub use record::Entity;
pub use schema::{DraftSchema, FieldDef, FieldType};
pub use store::{DedupStore, Slot};
pub use transaction::{Transaction, TransactionDraft, TransactionPatch};
pub use trigger::{ProximityTrigger, Reattach};
pub use view::CatalogView;

/// Type aliases for clarity
pub type RecordId = u64;
pub type PageToken = u32;
pub type MutationId = u64;
pub type Timestamp = u64;
