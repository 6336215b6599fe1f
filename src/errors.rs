use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use derive_more::derive::{Display, Error as DeriveMoreError};

#[derive(Debug, Error)]
pub enum AppError{
    #[error("Cant bind to the Socket")]
    SocketBind,
    #[error("Cant connect to the DB")]
    DbConnect,
    #[error("Cant start the server")]
    ServerStart,
    #[error("Missing configuration: {0}")]
    Config(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal Server Error")]
    Database(#[from] sqlx::Error),
    #[error("Internal Server Error")]
    Io(#[from] std::io::Error),
    #[error("Internal Server Error")]
    InternalError
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }
}

/// JSON body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, Display, DeriveMoreError, Serialize, Deserialize)]
#[display("error :{}", error)]
pub struct CustomError{
    pub error:String
}

impl CustomError {
    pub fn new(error: impl Into<String>) -> Self {
        CustomError { error: error.into() }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        match self {
            AppError::Database(e) => tracing::error!(error = %e, "database error"),
            AppError::Io(e) => tracing::error!(error = %e, "io error"),
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(CustomError::new(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DbConnect => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServerStart => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SocketBind => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::not_found("Course").to_string(), "Course not found");
        assert_eq!(AppError::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
