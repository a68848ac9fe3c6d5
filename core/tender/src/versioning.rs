//! Snapshot-before-write versioning of tenders and bids.
//!
//! Every content change copies the current row into the entity's history
//! table under its current version, then writes the change together with
//! `version + 1`. Rollback never rewrites history: it restores an old
//! snapshot's content as the next version.
mod mutator;
mod store;

pub use mutator::{apply_edit, apply_rollback, MutationError};
pub use store::{FieldMask, Versioned, VersionedEntityStore};
