use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpRequest, HttpResponse, Scope};
use std::sync::Arc;

use tf_model::{NewTender, TenderEdit};
use tf_std_utils::LogErr;

use super::{
    check_new_tender, check_tender_edit, check_username, check_uuid, check_version, page,
    ApiError, PathTender, PathTenderVersion, QueryTenderStatus, QueryTenders, QueryUserPage,
    QueryUsername,
};
use crate::service::TenderService;

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(list_tenders)
        .service(create_tender)
        .service(user_tenders)
        .service(get_status)
        .service(set_status)
        .service(edit_tender)
        .service(rollback_tender)
}

#[actix_web::get("/tenders")]
async fn list_tenders(
    service: Data<Arc<TenderService>>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let query = QueryTenders::parse(req.query_string()).log_warn()?;
    let page = page(query.limit, query.offset, &service.config().pagination).log_warn()?;
    let tenders = service
        .list_tenders(query.service_types, page)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(tenders))
}

#[actix_web::post("/tenders/new")]
async fn create_tender(
    service: Data<Arc<TenderService>>,
    body: Json<NewTender>,
) -> Result<HttpResponse, ApiError> {
    let tender = body.into_inner();
    check_new_tender(&tender).log_warn()?;
    let tender = service.create_tender(tender).await.log_err()?;
    Ok(HttpResponse::Ok().json(tender))
}

#[actix_web::get("/tenders/my")]
async fn user_tenders(
    service: Data<Arc<TenderService>>,
    query: Query<QueryUserPage>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    check_username(&query.username).log_warn()?;
    let page = page(query.limit, query.offset, &service.config().pagination).log_warn()?;
    let tenders = service
        .user_tenders(&query.username, page)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(tenders))
}

#[actix_web::get("/tenders/{tender_id}/status")]
async fn get_status(
    service: Data<Arc<TenderService>>,
    path: Path<PathTender>,
    query: Query<QueryUsername>,
) -> Result<HttpResponse, ApiError> {
    let tender_id = path.into_inner().tender_id;
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let status = service
        .tender_status(&tender_id, &query.username)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(status))
}

#[actix_web::put("/tenders/{tender_id}/status")]
async fn set_status(
    service: Data<Arc<TenderService>>,
    path: Path<PathTender>,
    query: Query<QueryTenderStatus>,
) -> Result<HttpResponse, ApiError> {
    let tender_id = path.into_inner().tender_id;
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    let tender = service
        .set_tender_status(&tender_id, &query.username, query.status)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(tender))
}

#[actix_web::patch("/tenders/{tender_id}/edit")]
async fn edit_tender(
    service: Data<Arc<TenderService>>,
    path: Path<PathTender>,
    query: Query<QueryUsername>,
    body: Json<TenderEdit>,
) -> Result<HttpResponse, ApiError> {
    let tender_id = path.into_inner().tender_id;
    let edit = body.into_inner();
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_username(&query.username).log_warn()?;
    check_tender_edit(&edit).log_warn()?;
    let tender = service
        .edit_tender(&tender_id, &query.username, edit)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(tender))
}

#[actix_web::put("/tenders/{tender_id}/rollback/{version}")]
async fn rollback_tender(
    service: Data<Arc<TenderService>>,
    path: Path<PathTenderVersion>,
    query: Query<QueryUsername>,
) -> Result<HttpResponse, ApiError> {
    let PathTenderVersion { tender_id, version } = path.into_inner();
    check_uuid("tenderId", &tender_id).log_warn()?;
    check_version(version).log_warn()?;
    check_username(&query.username).log_warn()?;
    let tender = service
        .rollback_tender(&tender_id, version, &query.username)
        .await
        .log_err()?;
    Ok(HttpResponse::Ok().json(tender))
}
