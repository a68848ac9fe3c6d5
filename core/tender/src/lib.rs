#[macro_use]
extern crate diesel;

pub mod config;
mod db;
pub mod identity;
pub mod rest_api;
pub mod service;
pub mod testing;
mod utils;
pub mod versioning;
pub mod workflow;

pub use config::Config;
pub use db::{EntityKind, StoreError};
pub use identity::{IdentityApi, IdentityDb, IdentityError};
pub use service::{Page, TenderInitError, TenderService};
pub use workflow::WorkflowError;
