use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use shared::SharedError;
use std::fmt;

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// Offending row of the attempt log, for malformed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl ApiError {
    pub fn new(error: &str, message: &str, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
            row: None,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BAD_REQUEST", message, 400)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NOT_FOUND", message, 404)
    }

    pub fn malformed_record(row: usize, message: &str) -> Self {
        Self {
            row: Some(row),
            ..Self::new("MALFORMED_RECORD", message, 422)
        }
    }

    pub fn unprocessable(message: &str) -> Self {
        Self::new("UNPROCESSABLE_DATA", message, 422)
    }

    pub fn storage_error(message: &str) -> Self {
        Self::new("STORAGE_ERROR", message, 500)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("INTERNAL_ERROR", message, 500)
    }

    pub fn validation_error(message: &str) -> Self {
        Self::new("VALIDATION_ERROR", message, 400)
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = match actix_web::http::StatusCode::from_u16(self.status_code) {
            Ok(status) => status,
            Err(_) => {
                log::warn!("Invalid status code {}, defaulting to 500", self.status_code);
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        HttpResponse::build(status).json(self)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::MalformedRecord { row, reason } => Self::malformed_record(row, &reason),
            SharedError::Validation(message) => Self::validation_error(&message),
            SharedError::NotFound(message) => Self::not_found(&message),
            SharedError::BadRequest(message) => Self::bad_request(&message),
            SharedError::Conversion(message) => Self::unprocessable(&message),
            SharedError::Io(message) => Self::storage_error(&message),
            SharedError::Internal(message) => Self::internal_error(&message),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_error(&format!("JSON error: {}", err))
    }
}
