use crate::db::{EntityKind, StoreError};
use crate::versioning::{FieldMask, Versioned, VersionedEntityStore};

#[derive(thiserror::Error, Debug)]
pub enum MutationError {
    #[error("Nothing to change.")]
    EmptyPatch,
    #[error("{kind} [{id}] is {state} and can't be changed.")]
    Frozen {
        kind: EntityKind,
        id: String,
        state: String,
    },
    #[error(transparent)]
    Store(StoreError),
}

impl<E: Into<StoreError>> From<E> for MutationError {
    fn from(e: E) -> Self {
        MutationError::Store(e.into())
    }
}

fn ensure_accepts_changes<T: Versioned>(entity: &T) -> Result<(), MutationError> {
    match entity.accepts_changes() {
        true => Ok(()),
        false => Err(MutationError::Frozen {
            kind: T::KIND,
            id: entity.id().to_string(),
            state: entity.state(),
        }),
    }
}

/// Must run inside a transaction: a refusal after `snapshot` relies on
/// rollback to discard the history row.
pub fn apply_edit<S: VersionedEntityStore>(
    store: &S,
    id: &str,
    patch: &S::Patch,
) -> Result<S::Entity, MutationError> {
    if patch.is_empty() {
        return Err(MutationError::EmptyPatch);
    }

    let current = store.snapshot(id)?;
    ensure_accepts_changes(&current)?;

    let updated = store.update(&current, patch)?;
    log::debug!(
        "{} [{}] edited, version {} -> {}.",
        S::Entity::KIND,
        id,
        current.version(),
        updated.version()
    );
    Ok(updated)
}

pub fn apply_rollback<S: VersionedEntityStore>(
    store: &S,
    id: &str,
    target: i32,
) -> Result<S::Entity, MutationError> {
    let current = store.snapshot(id)?;
    ensure_accepts_changes(&current)?;

    let snapshot = store.fetch(id, target)?;
    let restored = store.restore(&current, &snapshot)?;
    log::info!(
        "{} [{}] rolled back to version {}, now at version {}.",
        S::Entity::KIND,
        id,
        target,
        restored.version()
    );
    Ok(restored)
}
