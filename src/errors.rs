use actix_web::{
    error::ResponseError,
    http::{header::{ContentType, RETRY_AFTER}, StatusCode},
    HttpResponse,
};
use derive_more::Display;

/// Why a contact payload was refused. The messages stay generic so a
/// caller only learns "identity" versus "length".
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[display("Please provide a valid name and email.")]
    MissingIdentity,

    #[display("Please shorten one or more fields and try again.")]
    TooLong,
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display("Email service is not configured.")]
    NotConfigured,

    #[display("Too many requests. Please try again soon.")]
    RateLimited { retry_after_secs: u64 },

    #[display("{_0}")]
    Validation(ValidationFailure),

    #[display("Unable to send your request: {_0}")]
    Dispatch(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());

        if let AppError::RateLimited { retry_after_secs } = self {
            builder.insert_header((RETRY_AFTER, retry_after_secs.to_string()));
        }

        builder.json(serde_json::json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        AppError::Validation(failure)
    }
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

/// Failure to reach the contact endpoint at all.
#[derive(Debug, Display)]
pub enum TransportError {
    #[display("{_0}")]
    Network(String),

    #[display("Invalid endpoint: {_0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidEndpoint(err.to_string())
    }
}
