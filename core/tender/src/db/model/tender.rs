use chrono::NaiveDateTime;

use tf_model::{
    OrganizationId, ServiceType, Tender as ClientTender, TenderEdit, TenderId, TenderStatus,
};

use crate::db::model::utc;
use crate::db::schema::tender;

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "tender"]
pub struct Tender {
    pub id: TenderId,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: OrganizationId,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub creator_username: String,
}

/// Row of `tender_version`: the tender as it was before `version + 1` was
/// written.
#[derive(Clone, Debug, Queryable)]
pub struct TenderSnapshot {
    pub tender_id: TenderId,
    pub version: i32,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: OrganizationId,
    pub created_at: NaiveDateTime,
    pub creator_username: String,
}

#[derive(AsChangeset)]
#[table_name = "tender"]
pub struct TenderChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub service_type: Option<ServiceType>,
}

impl<'a> From<&'a TenderEdit> for TenderChanges<'a> {
    fn from(edit: &'a TenderEdit) -> Self {
        TenderChanges {
            name: edit.name.as_deref(),
            description: edit.description.as_deref(),
            service_type: edit.service_type,
        }
    }
}

impl<'a> From<&'a TenderSnapshot> for TenderChanges<'a> {
    fn from(snapshot: &'a TenderSnapshot) -> Self {
        TenderChanges {
            name: Some(&snapshot.name),
            description: Some(&snapshot.description),
            service_type: Some(snapshot.service_type),
        }
    }
}

impl Tender {
    pub fn into_client(self) -> ClientTender {
        ClientTender {
            id: self.id,
            name: self.name,
            description: self.description,
            service_type: self.service_type,
            status: self.status,
            organization_id: self.organization_id,
            version: self.version,
            created_at: utc(self.created_at),
        }
    }
}
