use crate::db::{DbError, StoreError};
use crate::versioning::MutationError;
use crate::workflow::decision::DecisionError;
use crate::workflow::permission::PermissionError;
use crate::workflow::transition::{InvalidTransition, StatusError};

/// Errors returned by `TenderService`. Each variant maps to one HTTP status.
#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    UserNotExist(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Tender [{0}] doesn't accept this operation, because it isn't published.")]
    TenderClosed(String),
    #[error("{0}")]
    DependencyMissing(String),
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl From<PermissionError> for WorkflowError {
    fn from(e: PermissionError) -> Self {
        match e {
            PermissionError::UserNotExist(_) => WorkflowError::UserNotExist(e.to_string()),
            PermissionError::Denied(_) => WorkflowError::PermissionDenied(e.to_string()),
            PermissionError::Identity(_) => WorkflowError::StoreFailure(e.to_string()),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(..) | StoreError::SnapshotNotFound(..) => {
                WorkflowError::NotFound(e.to_string())
            }
            StoreError::VersionMismatch(..) | StoreError::Duplicate(_) => {
                WorkflowError::Conflict(e.to_string())
            }
            StoreError::DependencyMissing(_) => WorkflowError::DependencyMissing(e.to_string()),
            StoreError::Db(_) => WorkflowError::StoreFailure(e.to_string()),
        }
    }
}

impl From<DbError> for WorkflowError {
    fn from(e: DbError) -> Self {
        WorkflowError::from(StoreError::from(e))
    }
}

impl From<InvalidTransition> for WorkflowError {
    fn from(e: InvalidTransition) -> Self {
        WorkflowError::Conflict(e.to_string())
    }
}

impl From<StatusError> for WorkflowError {
    fn from(e: StatusError) -> Self {
        match e {
            StatusError::Transition(e) => e.into(),
            StatusError::Store(e) => e.into(),
        }
    }
}

impl From<MutationError> for WorkflowError {
    fn from(e: MutationError) -> Self {
        match e {
            MutationError::EmptyPatch | MutationError::Frozen { .. } => {
                WorkflowError::Conflict(e.to_string())
            }
            MutationError::Store(e) => e.into(),
        }
    }
}

impl From<DecisionError> for WorkflowError {
    fn from(e: DecisionError) -> Self {
        match e {
            DecisionError::AlreadyDecided { .. } | DecisionError::BidFinished(..) => {
                WorkflowError::Conflict(e.to_string())
            }
            DecisionError::TenderClosed(id) => WorkflowError::TenderClosed(id),
            DecisionError::Transition(e) => e.into(),
            DecisionError::Store(e) => e.into(),
        }
    }
}
