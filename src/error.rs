use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("exactly one of 'base_amount' and 'foreign_amount' must be set")]
    AmbiguousAmount,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid rate: {0}")]
    InvalidRate(String),
    #[error("{0}")]
    Validation(String),
    #[error("currency {} does not exist in the database", quoted(.0))]
    CurrencyNotFound(Vec<String>),
    #[error("no rate available for {0}")]
    NoRateFound(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("rate for {0} already exists: date, side, base and quote currency must be unique collectively")]
    DuplicateRate(String),
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("database error: {0}")]
    DbError(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("server error: {0}")]
    Server(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

/// Caller-facing classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    ConflictError,
    IntegrityError,
    InternalError,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::AmbiguousAmount
            | AppError::InvalidAmount(_)
            | AppError::InvalidRate(_)
            | AppError::Validation(_) => ErrorKind::ValidationError,
            AppError::CurrencyNotFound(_) | AppError::NoRateFound(_) | AppError::NotFound(_) => {
                ErrorKind::NotFoundError
            }
            AppError::DuplicateRate(_) => ErrorKind::ConflictError,
            AppError::Integrity(_) => ErrorKind::IntegrityError,
            AppError::DbError(_) | AppError::Config(_) | AppError::Server(_) => {
                ErrorKind::InternalError
            }
        }
    }
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => match self.kind() {
                ErrorKind::ValidationError | ErrorKind::NotFoundError | ErrorKind::ConflictError => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::IntegrityError | ErrorKind::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

fn quoted(codes: &[String]) -> String {
    codes
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("{self:?}");
            String::from("internal server error")
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        match value.as_database_error() {
            Some(e) if e.is_foreign_key_violation() || e.is_unique_violation() => {
                Self::Integrity(e.to_string())
            }
            _ => Self::DbError(value.to_string()),
        }
    }
}
impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::DbError(value.to_string())
    }
}
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(value: axum::extract::rejection::JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}
