use tf_model::{OrganizationId, UserId};
use tf_persistence::DbExecutor;

use crate::db::dao::IdentityDao;

#[derive(thiserror::Error, Debug)]
pub enum IdentityError {
    #[error("Identity lookup failed: {0}.")]
    Lookup(String),
}

/// Wraps the employee and organization directory. It is necessary to mock
/// identity in tests.
#[async_trait::async_trait(?Send)]
pub trait IdentityApi: Send + Sync {
    async fn resolve_user(&self, username: &str) -> Result<Option<UserId>, IdentityError>;
    async fn user_exists(&self, user_id: &str) -> Result<bool, IdentityError>;
    async fn is_responsible_for(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<bool, IdentityError>;
    /// Ordered by organization id.
    async fn organizations_of(&self, user_id: &str)
        -> Result<Vec<OrganizationId>, IdentityError>;
}

/// Reads identity from the `employee` and `organization_responsible` tables.
#[derive(Clone)]
pub struct IdentityDb {
    db: DbExecutor,
}

impl IdentityDb {
    pub fn new(db: DbExecutor) -> Self {
        IdentityDb { db }
    }
}

fn lookup_error(e: impl std::fmt::Display) -> IdentityError {
    IdentityError::Lookup(e.to_string())
}

#[async_trait::async_trait(?Send)]
impl IdentityApi for IdentityDb {
    async fn resolve_user(&self, username: &str) -> Result<Option<UserId>, IdentityError> {
        Ok(self
            .db
            .as_dao::<IdentityDao>()
            .employee_by_username(username)
            .await
            .map_err(lookup_error)?
            .map(|employee| employee.id))
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool, IdentityError> {
        self.db
            .as_dao::<IdentityDao>()
            .employee_exists(user_id)
            .await
            .map_err(lookup_error)
    }

    async fn is_responsible_for(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<bool, IdentityError> {
        self.db
            .as_dao::<IdentityDao>()
            .is_responsible(user_id, organization_id)
            .await
            .map_err(lookup_error)
    }

    async fn organizations_of(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrganizationId>, IdentityError> {
        self.db
            .as_dao::<IdentityDao>()
            .organizations_of(user_id)
            .await
            .map_err(lookup_error)
    }
}
