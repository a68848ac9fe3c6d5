use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpResponse, Scope};
use std::sync::Arc;

use tf_model::{BidEdit, NewBid};
use tf_std_utils::LogErr;

use super::{
    check_bid_edit, check_feedback, check_new_bid, check_username, check_uuid, check_version,
    page, ApiError, PathBid, PathBidVersion, PathTender, QueryBidStatus, QueryDecision,
    QueryFeedback, QueryReviews, QueryUserPage, QueryUsername,
};
use crate::service::TenderService;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(create_bid)
        .service(user_bids)
        .service(tender_bids)
        .service(bid_reviews)
        .service(get_status)
        .service(set_status)
        .service(edit_bid)
        .service(submit_decision)
        .service(submit_feedback)
        .service(rollback_bid)
}

#[actix_web::post("/bids/new")]
async fn create_bid(
    service: Data<Arc<TenderService>>,
    body: Json<NewBid>,
) -> Result<HttpResponse, ApiError> {
    let bid = body.into_inner();
    check_new_bid(&bid).log_warn()?;
    let bid = service.create_bid(bid).await.log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}

#[actix_web::get("/bids/my")]
async fn user_bids(
    service: Data<Arc<TenderService>>,
    query: Query<QueryUserPage>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    check_username(&query.username).log_warn()?;
    let page = page(query.limit, query.offset, &service.config().pagination).log_warn()?;
    let bids = service.user_bids(&query.username, page).await.log_err()?;
    Ok(HttpResponse::Ok().json(bids))
}

#[actix_web::get("/bids/{tender_id}/list")]
async fn tender_bids(
    service: Data<Arc<TenderService>>,
    path: Path<PathTender>,
    query: Query<QueryUserPage>,
) -> Result<HttpResponse, ApiError> {
    let tender_id = path.into_inner().tender_id;
    let query = query.into_inner();
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let page = page(query.limit, query.offset, &service.config().pagination).log_warn()?;
    let bids = service
        .tender_bids(&tender_id, &query.username, page)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bids))
}

#[actix_web::get("/bids/{tender_id}/reviews")]
async fn bid_reviews(
    service: Data<Arc<TenderService>>,
    path: Path<PathTender>,
    query: Query<QueryReviews>,
) -> Result<HttpResponse, ApiError> {
    let tender_id = path.into_inner().tender_id;
    let query = query.into_inner();
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_username(&query.author_username).log_warn()?;
    check_username(&query.requester_username).log_warn()?;
    let page = page(query.limit, query.offset, &service.config().pagination).log_warn()?;
    let reviews = service
        .bid_reviews(
            &tender_id,
            &query.author_username,
            &query.requester_username,
            page,
        )
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(reviews))
}

#[actix_web::get("/bids/{bid_id}/status")]
async fn get_status(
    service: Data<Arc<TenderService>>,
    path: Path<PathBid>,
    query: Query<QueryUsername>,
) -> Result<HttpResponse, ApiError> {
    let bid_id = path.into_inner().bid_id;
    check_uuid("bidId", &bid_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let status = service.bid_status(&bid_id, &query.username).await.log_err()?;
    Ok(HttpResponse::Ok().json(status))
}

#[actix_web::put("/bids/{bid_id}/status")]
async fn set_status(
    service: Data<Arc<TenderService>>,
    path: Path<PathBid>,
    query: Query<QueryBidStatus>,
) -> Result<HttpResponse, ApiError> {
    let bid_id = path.into_inner().bid_id;
    check_uuid("bidId", &bid_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let bid = service
        .set_bid_status(&bid_id, &query.username, query.status)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}

#[actix_web::patch("/bids/{bid_id}/edit")]
async fn edit_bid(
    service: Data<Arc<TenderService>>,
    path: Path<PathBid>,
    query: Query<QueryUsername>,
    body: Json<BidEdit>,
) -> Result<HttpResponse, ApiError> {
    let bid_id = path.into_inner().bid_id;
    let edit = body.into_inner();
    check_uuid("bidId", &bid_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    check_bid_edit(&edit).log_warn()?;
    let bid = service
        .edit_bid(&bid_id, &query.username, edit)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}

#[actix_web::put("/bids/{bid_id}/submit_decision")]
async fn submit_decision(
    service: Data<Arc<TenderService>>,
    path: Path<PathBid>,
    query: Query<QueryDecision>,
) -> Result<HttpResponse, ApiError> {
    let bid_id = path.into_inner().bid_id;
    check_uuid("bidId", &bid_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let bid = service
        .submit_decision(&bid_id, &query.username, query.decision)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}

#[actix_web::put("/bids/{bid_id}/feedback")]
async fn submit_feedback(
    service: Data<Arc<TenderService>>,
    path: Path<PathBid>,
    query: Query<QueryFeedback>,
) -> Result<HttpResponse, ApiError> {
    let bid_id = path.into_inner().bid_id;
    check_uuid("bidId", &bid_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    check_feedback(&query.bid_feedback).log_warn()?;
    let bid = service
        .submit_feedback(&bid_id, &query.username, &query.bid_feedback)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}

#[actix_web::put("/bids/{bid_id}/rollback/{version}")]
async fn rollback_bid(
    service: Data<Arc<TenderService>>,
    path: Path<PathBidVersion>,
    query: Query<QueryUsername>,
) -> Result<HttpResponse, ApiError> {
    let PathBidVersion { bid_id, version } = path.into_inner();
    check_uuid("bidId", &bid_id).log_warn()?;
    check_version(version).log_warn()?;
    check_username(&query.username).log_warn()?;
    let bid = service
        .rollback_bid(&bid_id, version, &query.username)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(bid))
}
