use actix_web::{HttpResponse, Responder, Scope};

pub fn register_endpoints(scope: Scope) -> Scope {
    scope.service(ping)
}

#[actix_web::get("/ping")]
async fn ping() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
