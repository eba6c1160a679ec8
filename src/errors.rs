use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures raised by a `Store` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
            if write_error.code == DUPLICATE_KEY_CODE {
                return StoreError::Duplicate(write_error.message.clone());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The four failure kinds the service layer raises.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Registration(String),

    #[error("{0}")]
    Booking(String),

    #[error("{0}")]
    DatabaseOperation(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::DatabaseOperation(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Service(err.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Service(ServiceError::Authentication(_)) => StatusCode::UNAUTHORIZED,
            AppError::Service(ServiceError::Registration(_)) => StatusCode::BAD_REQUEST,
            AppError::Service(ServiceError::Booking(_)) => StatusCode::BAD_REQUEST,
            AppError::Service(ServiceError::DatabaseOperation(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_http_statuses() {
        let cases = [
            (ServiceError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Registration("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Booking("x".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::DatabaseOperation("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn store_errors_surface_as_database_operation_errors() {
        let err: ServiceError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, ServiceError::DatabaseOperation(ref msg) if msg.contains("connection reset")));
    }
}
