use actix_multipart::MultipartError;
use actix_web::{
    error::{PayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use validator::ValidationErrors;

#[derive(Debug, Display)]
pub enum AppError {
    #[display("{_0}")]
    Validation(String),

    #[display("{_0}")]
    PayloadTooLarge(String),

    #[display("{message}")]
    RemoteService {
        message: String,
        details: Option<String>,
    },

    #[display("{_0}")]
    Persistence(String),

    #[display("Internal server error: {_0}")]
    Internal(String),
}

impl AppError {
    /// Generic remote failure; the cause is only logged.
    pub fn remote(message: impl Into<String>) -> Self {
        AppError::RemoteService { message: message.into(), details: None }
    }

    /// Generic remote failure that also carries the cause back to the caller.
    pub fn remote_with_details(message: impl Into<String>, details: impl ToString) -> Self {
        AppError::RemoteService {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            AppError::RemoteService { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::RemoteService { message, details: Some(details) } => {
                serde_json::json!({
                    "error": message,
                    "details": details
                })
            }
            _ => serde_json::json!({"error": self.to_string()}),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RemoteService { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("{field}: valor inválido"))
                })
            })
            .collect::<Vec<_>>();
        messages.sort();

        AppError::Validation(messages.join(", "))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::Payload(PayloadError::Overflow) => {
                AppError::PayloadTooLarge("El archivo excede el tamaño máximo permitido".to_string())
            }
            MultipartError::ContentTypeIncompatible => {
                AppError::Validation("La solicitud debe ser multipart/form-data".to_string())
            }
            _ => AppError::Validation("La solicitud de subida no es válida".to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

/// Failures talking to the media host.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum GatewayError {
    #[display("Media host unreachable: {_0}")]
    Transport(String),

    #[display("Media host returned {status}: {message}")]
    Api { status: u16, message: String },

    #[display("Unexpected media host response: {_0}")]
    Decode(String),

    #[display("Invalid media host request: {_0}")]
    InvalidRequest(String),

    #[display("Incomplete media host response: {_0}")]
    IncompleteResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if err.is_builder() {
            GatewayError::InvalidRequest(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Failures of the client-side key-value persistence.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
    #[display("Failed to read local storage: {_0}")]
    Read(String),

    #[display("Failed to write local storage: {_0}")]
    Write(String),

    #[display("Stored value is corrupt: {_0}")]
    Corrupt(String),

    #[display("No record at index {index} (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[display("Video library is no longer running")]
    Closed,
}
