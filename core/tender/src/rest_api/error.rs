use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use tf_model::ErrorMessage;

use super::ApiError;
use crate::workflow::WorkflowError;

const INTERNAL_REASON: &str = "Internal server error.";

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::UserNotExist(_) => StatusCode::UNAUTHORIZED,
            WorkflowError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            WorkflowError::NotFound(_) | WorkflowError::DependencyMissing(_) => {
                StatusCode::NOT_FOUND
            }
            WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            WorkflowError::TenderClosed(_) => StatusCode::BAD_REQUEST,
            WorkflowError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store details go to the log only.
        let reason = match self {
            WorkflowError::StoreFailure(_) => INTERNAL_REASON.to_string(),
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorMessage::new(reason))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Workflow(e) => e.status_code(),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Workflow(e) => e.error_response(),
            ApiError::BadRequest(_) => {
                HttpResponse::BadRequest().json(ErrorMessage::new(self.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(WorkflowError::UserNotExist("x".into()) => 401)]
    #[test_case(WorkflowError::PermissionDenied("x".into()) => 403)]
    #[test_case(WorkflowError::NotFound("x".into()) => 404)]
    #[test_case(WorkflowError::DependencyMissing("x".into()) => 404)]
    #[test_case(WorkflowError::Conflict("x".into()) => 409)]
    #[test_case(WorkflowError::TenderClosed("x".into()) => 400)]
    #[test_case(WorkflowError::StoreFailure("x".into()) => 500)]
    fn test_status_codes(e: WorkflowError) -> u16 {
        ApiError::from(e).error_response().status().as_u16()
    }

    #[test]
    fn test_bad_request() {
        let e = ApiError::BadRequest("limit must be at least 1".into());
        assert_eq!(e.error_response().status(), StatusCode::BAD_REQUEST);
    }
}
