use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(format!("Not found: {}", what)),
            DomainError::InvalidRequest(msg) => AppError::BadRequest(msg),
            DomainError::PermissionDenied(msg) => AppError::Forbidden(msg),
            DomainError::Storage(msg) | DomainError::Notification(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: &str| serde_json::json!({ "error": msg });
        match self {
            AppError::NotFound(msg) => HttpResponse::NotFound().json(body(msg)),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(body(msg)),
            AppError::Forbidden(msg) => HttpResponse::Forbidden().json(body(msg)),
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                HttpResponse::InternalServerError().json(body("Internal server error"))
            }
        }
    }
}
