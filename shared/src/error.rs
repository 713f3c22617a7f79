use thiserror::Error;
use validator::ValidationErrors;
use serde_json::Error as JsonError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum SharedError {
    /// A record in the attempt log breaks a data invariant. The whole
    /// request is aborted so no partial statistics are produced.
    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord {
        row: usize,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SharedError {
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl actix_web::ResponseError for SharedError {
    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            SharedError::MalformedRecord { .. } => actix_web::HttpResponse::UnprocessableEntity().json(self),
            SharedError::Validation(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::NotFound(_) => actix_web::HttpResponse::NotFound().json(self),
            SharedError::BadRequest(_) => actix_web::HttpResponse::BadRequest().json(self),
            SharedError::Conversion(_) => actix_web::HttpResponse::UnprocessableEntity().json(self),
            SharedError::Io(_) => actix_web::HttpResponse::InternalServerError().json(self),
            SharedError::Internal(_) => actix_web::HttpResponse::InternalServerError().json(self),
        }
    }
}

impl From<ValidationErrors> for SharedError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonError> for SharedError {
    fn from(error: JsonError) -> Self {
        Self::Conversion(error.to_string())
    }
}

impl From<csv::Error> for SharedError {
    fn from(error: csv::Error) -> Self {
        let row = error
            .position()
            .map(|pos| pos.record() as usize)
            .unwrap_or(0);
        match error.kind() {
            csv::ErrorKind::Io(_) => Self::Io(error.to_string()),
            _ => Self::MalformedRecord {
                row,
                reason: error.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for SharedError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SharedError>;
