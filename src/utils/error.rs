use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Credentials or required settings missing/invalid. Fatal at startup.
    Configuration(String),
    /// The spreadsheet identifier does not resolve to a remote document.
    DocumentNotFound { spreadsheet_id: String, cause: String },
    Validation(String),
    /// Operation called in an order that breaks the handle's invariants.
    State(String),
    NotFound(String),
    /// Remote call failed after the document was resolved.
    Upstream { status: Option<u16>, message: String },
}

impl AppError {
    pub fn document_not_found(spreadsheet_id: &str, cause: impl ToString) -> Self {
        AppError::DocumentNotFound {
            spreadsheet_id: spreadsheet_id.to_string(),
            cause: cause.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::DocumentNotFound { spreadsheet_id, cause } => write!(
                f,
                "Document not found: sheet with id {} was not found ({})",
                spreadsheet_id, cause
            ),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::State(msg) => write!(f, "State error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Upstream { status: Some(code), message } => {
                write!(f, "Remote service error ({}): {}", code, message)
            }
            AppError::Upstream { status: None, message } => {
                write!(f, "Remote service error: {}", message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DocumentNotFound { .. } | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::State(_) => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "response_success": false,
            "response_message": self.to_string(),
        }))
    }
}
