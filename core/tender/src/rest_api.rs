//! Tender REST endpoints.
//!
//! Handlers validate the request, call `TenderService` and map results to
//! http responses. No workflow logic lives here.

use actix_web::error::InternalError;
use actix_web::web::{JsonConfig, PathConfig, QueryConfig};
use actix_web::{HttpResponse, Scope};
use serde::Deserialize;

use tf_model::{
    BidDecision, BidEdit, BidStatus, ErrorMessage, NewBid, NewTender, ServiceType, TenderEdit,
    TenderStatus,
};

use crate::config::PaginationConfig;
use crate::service::Page;
use crate::workflow::WorkflowError;

mod bids;
mod common;
mod error;
mod tenders;

pub const API_SCOPE: &str = "/api";

const MAX_USERNAME_LEN: usize = 50;
const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;
const MAX_FEEDBACK_LEN: usize = 500;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

pub fn register_endpoints(scope: Scope) -> Scope {
    let scope = common::register_endpoints(scope);
    let scope = tenders::register_endpoints(scope);
    bids::register_endpoints(scope)
}

/// `/api` scope with all endpoints and extractor error handlers.
pub fn api_scope() -> Scope {
    register_endpoints(
        Scope::new(API_SCOPE)
            .app_data(path_config())
            .app_data(query_config())
            .app_data(json_config()),
    )
}

fn bad_request(reason: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorMessage::new(reason))
}

pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|err, _req| {
        let response = bad_request(format!("Invalid path: {}", err));
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(format!("Invalid query: {}", err));
        InternalError::from_response(err, response).into()
    })
}

pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(format!("Invalid body: {}", err));
        InternalError::from_response(err, response).into()
    })
}

#[derive(Deserialize)]
pub struct PathTender {
    pub tender_id: String,
}

#[derive(Deserialize)]
pub struct PathTenderVersion {
    pub tender_id: String,
    pub version: i32,
}

#[derive(Deserialize)]
pub struct PathBid {
    pub bid_id: String,
}

#[derive(Deserialize)]
pub struct PathBidVersion {
    pub bid_id: String,
    pub version: i32,
}

#[derive(Deserialize)]
pub struct QueryUsername {
    pub username: String,
}

#[derive(Deserialize)]
pub struct QueryUserPage {
    pub username: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct QueryTenderStatus {
    pub status: TenderStatus,
    pub username: String,
}

#[derive(Deserialize)]
pub struct QueryBidStatus {
    pub status: BidStatus,
    pub username: String,
}

#[derive(Deserialize)]
pub struct QueryDecision {
    pub decision: BidDecision,
    pub username: String,
}

#[derive(Deserialize)]
pub struct QueryFeedback {
    #[serde(rename = "bidFeedback")]
    pub bid_feedback: String,
    pub username: String,
}

#[derive(Deserialize)]
pub struct QueryReviews {
    #[serde(rename = "authorUsername")]
    pub author_username: String,
    #[serde(rename = "requesterUsername")]
    pub requester_username: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query of `GET /tenders`. `service_type` may repeat, which the serde
/// extractor can't express.
#[derive(Debug, Default, PartialEq)]
pub struct QueryTenders {
    pub service_types: Vec<ServiceType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl QueryTenders {
    pub fn parse(query: &str) -> Result<Self, ApiError> {
        let mut parsed = QueryTenders::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "service_type" => parsed.service_types.push(value.parse().map_err(|_| {
                    ApiError::BadRequest(format!("unknown service_type [{}]", value))
                })?),
                "limit" => parsed.limit = Some(parse_number("limit", &value)?),
                "offset" => parsed.offset = Some(parse_number("offset", &value)?),
                _ => {}
            }
        }
        Ok(parsed)
    }
}

fn parse_number(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a number, got [{}]", field, value)))
}

pub fn page(
    limit: Option<i64>,
    offset: Option<i64>,
    config: &PaginationConfig,
) -> Result<Page, ApiError> {
    let limit = limit.unwrap_or(config.page_limit_default);
    let offset = offset.unwrap_or(0);
    if limit < 1 {
        return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
    }
    if offset < 0 {
        return Err(ApiError::BadRequest("offset can't be negative".to_string()));
    }
    Ok(Page {
        limit: limit.min(config.page_limit_max),
        offset,
    })
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} can't be empty", field)));
    }
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{} is longer than {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn check_username(username: &str) -> Result<(), ApiError> {
    check_len("username", username, MAX_USERNAME_LEN)
}

pub fn check_uuid(field: &str, value: &str) -> Result<(), ApiError> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest(format!("{} [{}] isn't a valid uuid", field, value)))
}

pub fn check_version(version: i32) -> Result<(), ApiError> {
    match version >= 1 {
        true => Ok(()),
        false => Err(ApiError::BadRequest(format!(
            "version must be at least 1, got {}",
            version
        ))),
    }
}

pub fn check_feedback(feedback: &str) -> Result<(), ApiError> {
    check_len("bidFeedback", feedback, MAX_FEEDBACK_LEN)
}

pub fn check_new_tender(tender: &NewTender) -> Result<(), ApiError> {
    check_len("name", &tender.name, MAX_NAME_LEN)?;
    check_len("description", &tender.description, MAX_DESCRIPTION_LEN)?;
    check_uuid("organizationId", &tender.organization_id)?;
    check_len("creatorUsername", &tender.creator_username, MAX_USERNAME_LEN)
}

pub fn check_tender_edit(edit: &TenderEdit) -> Result<(), ApiError> {
    if let Some(name) = &edit.name {
        check_len("name", name, MAX_NAME_LEN)?;
    }
    if let Some(description) = &edit.description {
        check_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    Ok(())
}

pub fn check_new_bid(bid: &NewBid) -> Result<(), ApiError> {
    check_len("name", &bid.name, MAX_NAME_LEN)?;
    check_len("description", &bid.description, MAX_DESCRIPTION_LEN)?;
    check_uuid("tenderId", &bid.tender_id)?;
    check_uuid("authorId", &bid.author_id)
}

pub fn check_bid_edit(edit: &BidEdit) -> Result<(), ApiError> {
    if let Some(name) = &edit.name {
        check_len("name", name, MAX_NAME_LEN)?;
    }
    if let Some(description) = &edit.description {
        check_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn pagination() -> PaginationConfig {
        PaginationConfig {
            page_limit_default: 5,
            page_limit_max: 100,
        }
    }

    #[test]
    fn test_parse_repeated_service_types() {
        let query =
            QueryTenders::parse("service_type=Delivery&service_type=Construction&limit=2").unwrap();
        assert_eq!(
            query.service_types,
            vec![ServiceType::Delivery, ServiceType::Construction]
        );
        assert_eq!(query.limit, Some(2));
        assert_eq!(query.offset, None);
    }

    #[test_case("service_type=Cooking" ; "unknown service type")]
    #[test_case("limit=ten" ; "limit not a number")]
    #[test_case("offset=-" ; "offset not a number")]
    fn test_parse_invalid_tenders_query(query: &str) {
        assert!(matches!(
            QueryTenders::parse(query),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test_case(None, None => Some((5, 0)) ; "defaults")]
    #[test_case(Some(1), Some(7) => Some((1, 7)) ; "explicit")]
    #[test_case(Some(1000), None => Some((100, 0)) ; "clamped to max")]
    #[test_case(Some(0), None => None ; "zero limit")]
    #[test_case(None, Some(-1) => None ; "negative offset")]
    fn test_page(limit: Option<i64>, offset: Option<i64>) -> Option<(i64, i64)> {
        page(limit, offset, &pagination())
            .ok()
            .map(|page| (page.limit, page.offset))
    }

    #[test]
    fn test_text_limits() {
        assert!(check_username("alice").is_ok());
        assert!(check_username("").is_err());
        assert!(check_username(&"a".repeat(51)).is_err());

        let edit = BidEdit {
            name: Some("b".repeat(101)),
            description: None,
        };
        assert!(check_bid_edit(&edit).is_err());
        assert!(check_bid_edit(&BidEdit::default()).is_ok());
    }

    #[test]
    fn test_check_uuid_and_version() {
        assert!(check_uuid("tenderId", "3fa85f64-5717-4562-b3fc-2c963f66afa6").is_ok());
        assert!(check_uuid("tenderId", "not-a-uuid").is_err());
        assert!(check_version(1).is_ok());
        assert!(check_version(0).is_err());
    }
}
