use crate::db::{EntityKind, StoreError};

/// Partial update where every field is optional.
pub trait FieldMask {
    fn is_empty(&self) -> bool;
}

pub trait Versioned {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn version(&self) -> i32;
    /// Lifecycle state name, reported when content changes are refused.
    fn state(&self) -> String;
    fn accepts_changes(&self) -> bool;
}

/// Storage capability of one versioned entity kind.
///
/// Implementations are bound to an open transaction; the mutator calls
/// `snapshot` first and relies on the transaction to undo it when a later
/// step fails.
pub trait VersionedEntityStore {
    type Entity: Versioned;
    type Snapshot;
    type Patch: FieldMask;

    /// Copies the current row into history under its current version and
    /// returns it.
    fn snapshot(&self, id: &str) -> Result<Self::Entity, StoreError>;

    /// Exact snapshot of `version`, or `StoreError::SnapshotNotFound`.
    fn fetch(&self, id: &str, version: i32) -> Result<Self::Snapshot, StoreError>;

    /// Writes the present fields of `patch` and bumps the version, provided the
    /// row is still at `current.version()`.
    fn update(&self, current: &Self::Entity, patch: &Self::Patch)
        -> Result<Self::Entity, StoreError>;

    /// Writes the versioned fields of `snapshot` as `current.version() + 1`.
    fn restore(
        &self,
        current: &Self::Entity,
        snapshot: &Self::Snapshot,
    ) -> Result<Self::Entity, StoreError>;
}
