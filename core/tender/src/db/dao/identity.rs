use diesel::dsl::exists;
use diesel::{select, ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};

use tf_model::{OrganizationId, UserId};
use tf_persistence::{do_with_transaction, readonly_transaction, AsDao, PoolType, SqlTimestamp};

use crate::db::model::Employee;
use crate::db::schema::employee::dsl as employee;
use crate::db::schema::organization::dsl as organization;
use crate::db::schema::organization_responsible::dsl as responsible;
use crate::db::StoreResult;

pub struct IdentityDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for IdentityDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> IdentityDao<'c> {
    pub async fn employee_by_username(&self, username: &str) -> StoreResult<Option<Employee>> {
        let username = username.to_string();
        readonly_transaction(self.pool, "employee_by_username", move |conn| {
            Ok(employee::employee
                .filter(employee::username.eq(&username))
                .first::<Employee>(conn)
                .optional()?)
        })
        .await
    }

    pub async fn employee_exists(&self, user_id: &str) -> StoreResult<bool> {
        let user_id = user_id.to_string();
        readonly_transaction(self.pool, "employee_exists", move |conn| {
            Ok(select(exists(employee::employee.find(&user_id))).get_result::<bool>(conn)?)
        })
        .await
    }

    pub async fn is_responsible(&self, user_id: &str, organization_id: &str) -> StoreResult<bool> {
        let user_id = user_id.to_string();
        let organization_id = organization_id.to_string();
        readonly_transaction(self.pool, "employee_is_responsible", move |conn| {
            Ok(select(exists(
                responsible::organization_responsible
                    .filter(responsible::user_id.eq(&user_id))
                    .filter(responsible::organization_id.eq(&organization_id)),
            ))
            .get_result::<bool>(conn)?)
        })
        .await
    }

    pub async fn organizations_of(&self, user_id: &str) -> StoreResult<Vec<OrganizationId>> {
        let user_id = user_id.to_string();
        readonly_transaction(self.pool, "employee_organizations", move |conn| {
            Ok(responsible::organization_responsible
                .filter(responsible::user_id.eq(&user_id))
                .select(responsible::organization_id)
                .order(responsible::organization_id.asc())
                .load::<OrganizationId>(conn)?)
        })
        .await
    }

    pub async fn insert_employee(
        &self,
        id: &str,
        username: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> StoreResult<UserId> {
        let id = id.to_string();
        let username = username.to_string();
        let first_name = first_name.map(str::to_string);
        let last_name = last_name.map(str::to_string);
        do_with_transaction(self.pool, "employee_insert", move |conn| {
            diesel::insert_into(employee::employee)
                .values((
                    employee::id.eq(&id),
                    employee::username.eq(&username),
                    employee::first_name.eq(&first_name),
                    employee::last_name.eq(&last_name),
                    employee::created_at.eq(SqlTimestamp::now()),
                ))
                .execute(conn)?;
            Ok(id)
        })
        .await
    }

    pub async fn insert_organization(
        &self,
        id: &str,
        name: &str,
        organization_type: Option<&str>,
    ) -> StoreResult<OrganizationId> {
        let id = id.to_string();
        let name = name.to_string();
        let organization_type = organization_type.map(str::to_string);
        do_with_transaction(self.pool, "organization_insert", move |conn| {
            diesel::insert_into(organization::organization)
                .values((
                    organization::id.eq(&id),
                    organization::name.eq(&name),
                    organization::organization_type.eq(&organization_type),
                    organization::created_at.eq(SqlTimestamp::now()),
                ))
                .execute(conn)?;
            Ok(id)
        })
        .await
    }

    pub async fn make_responsible(&self, organization_id: &str, user_id: &str) -> StoreResult<()> {
        let organization_id = organization_id.to_string();
        let user_id = user_id.to_string();
        do_with_transaction(self.pool, "responsible_insert", move |conn| {
            diesel::insert_into(responsible::organization_responsible)
                .values((
                    responsible::organization_id.eq(&organization_id),
                    responsible::user_id.eq(&user_id),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
