use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    proxy::ProxyError,
    state::{
        party::PartyError,
        registry::{RegistryError, RelocationError},
    },
};

/// Coarse classification of a failed party operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown party or server.
    NotFound,
    /// Already in a party, already leading one, or duplicate member.
    Conflict,
    /// Caller is not the leader of the party it acts on.
    Unauthorized,
    /// Malformed identifier or missing parameter.
    InvalidArgument,
    /// Referenced player is not part of the target party.
    NotAMember,
    /// The proxy could not be reached.
    Unavailable,
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Requested party or server was not found.
    #[error("{0}")]
    NotFound(String),
    /// Operation conflicts with existing membership.
    #[error("{0}")]
    Conflict(String),
    /// Caller lacks leadership for a privileged operation.
    #[error("{0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("{0}")]
    InvalidInput(String),
    /// Player is not a member of the party involved.
    #[error("{0}")]
    NotAMember(String),
    /// Proxy backend is unavailable.
    #[error("proxy unavailable")]
    Unavailable(#[source] ProxyError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Unauthorized(_) => ErrorKind::Unauthorized,
            ServiceError::InvalidInput(_) => ErrorKind::InvalidArgument,
            ServiceError::NotAMember(_) => ErrorKind::NotAMember,
            ServiceError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<RegistryError> for ServiceError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::PartyNotFound(_) | RegistryError::ServerNotFound(_) => {
                ServiceError::NotFound(message)
            }
            RegistryError::AlreadyInParty(_)
            | RegistryError::AlreadyLeads(_)
            | RegistryError::Membership(PartyError::DuplicateMember(_)) => {
                ServiceError::Conflict(message)
            }
            RegistryError::NotLeader(_) => ServiceError::Unauthorized(message),
            RegistryError::NotInParty(_)
            | RegistryError::Membership(PartyError::InvalidMember(_))
            | RegistryError::Membership(PartyError::UnknownMember(_)) => {
                ServiceError::NotAMember(message)
            }
        }
    }
}

impl From<RelocationError> for ServiceError {
    fn from(err: RelocationError) -> Self {
        match err {
            RelocationError::Registry(err) => err.into(),
            RelocationError::Proxy(source) => ServiceError::Unavailable(source),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Application-level errors that are converted to HTTP responses.
///
/// Every party rule violation is reported as `400 Bad Request`; only a
/// missing proxy backend gets its own status.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request: invalid input or a rejected party operation.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(message) | AppError::ServiceUnavailable(message) => message,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            error: self.message(),
        });

        (status, payload).into_response()
    }
}
