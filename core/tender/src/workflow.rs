pub mod decision;
pub mod error;
pub mod permission;
pub mod transition;

pub use decision::{quorum, submit_decision, DecisionError, DecisionStore};
pub use error::WorkflowError;
pub use permission::{Caller, PermissionError, PermissionGuard};
pub use transition::{check_transition, InvalidTransition, Lifecycle, StatusError};
