use chrono::NaiveDateTime;

use tf_model::UserId;

#[derive(Clone, Debug, Queryable)]
pub struct Employee {
    pub id: UserId,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
}
