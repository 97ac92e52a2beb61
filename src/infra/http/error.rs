use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sightline_api_types::Envelope;

use crate::application::error::ErrorReport;
use crate::application::pagination::PageQueryError;
use crate::application::principal::AuthError;
use crate::application::reads::ReadError;
use crate::application::tickets::TicketReadError;
use crate::application::writes::WriteError;
use crate::cache::CacheError;

/// Uniform failure response: a status code, a client-safe message and a
/// diagnostic report picked up by the logging middleware.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, report: ErrorReport) -> Self {
        Self {
            status,
            message: message.into(),
            report,
        }
    }

    pub fn internal(source: &'static str, error: &dyn std::error::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error",
            ErrorReport::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, error),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = Envelope::error(self.status.as_u16(), self.message);
        let mut response = (self.status, Json(envelope)).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<ReadError> for ApiError {
    fn from(error: ReadError) -> Self {
        match &error {
            ReadError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "sight not found",
                ErrorReport::from_error("sightline::reads", StatusCode::NOT_FOUND, &error),
            ),
            ReadError::Validation(_) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error.to_string(),
                ErrorReport::from_error(
                    "sightline::reads",
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &error,
                ),
            ),
            ReadError::Store(_) | ReadError::Encode { .. } => {
                Self::internal("sightline::reads", &error)
            }
        }
    }
}

impl From<TicketReadError> for ApiError {
    fn from(error: TicketReadError) -> Self {
        match &error {
            TicketReadError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "ticket not found",
                ErrorReport::from_error("sightline::tickets", StatusCode::NOT_FOUND, &error),
            ),
            TicketReadError::Store(_) | TicketReadError::Encode { .. } => {
                Self::internal("sightline::tickets", &error)
            }
        }
    }
}

impl From<WriteError> for ApiError {
    fn from(error: WriteError) -> Self {
        match &error {
            WriteError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "sight not found",
                ErrorReport::from_error("sightline::writes", StatusCode::NOT_FOUND, &error),
            ),
            WriteError::Store(_) | WriteError::Encode { .. } => {
                Self::internal("sightline::writes", &error)
            }
        }
    }
}

impl From<PageQueryError> for ApiError {
    fn from(error: PageQueryError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            error.to_string(),
            ErrorReport::from_error(
                "sightline::pagination",
                StatusCode::UNPROCESSABLE_ENTITY,
                &error,
            ),
        )
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Missing | AuthError::Invalid => Self::new(
                StatusCode::UNAUTHORIZED,
                "could not validate credentials",
                ErrorReport::from_error("sightline::auth", StatusCode::UNAUTHORIZED, &error),
            ),
            AuthError::Forbidden => Self::new(
                StatusCode::FORBIDDEN,
                "not enough permissions",
                ErrorReport::from_error("sightline::auth", StatusCode::FORBIDDEN, &error),
            ),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(error: CacheError) -> Self {
        Self::internal("sightline::cache", &error)
    }
}
