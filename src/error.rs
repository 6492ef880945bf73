use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{ErrorResponse, FieldIssue};
use crate::services::{IdentityError, StoreError};

/// Failure of a request-level action
///
/// Every variant maps to one HTTP status and a tagged failure body.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Authentication required")]
    Unauthenticated(#[source] IdentityError),

    #[error("Identity provider unavailable")]
    IdentityUnavailable(#[source] IdentityError),

    #[error("Administrator access required")]
    Forbidden,

    #[error("Validation failed")]
    Validation(Vec<FieldIssue>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Store(#[from] StoreError),
}

impl From<IdentityError> for ActionError {
    fn from(err: IdentityError) -> Self {
        if err.is_rejection() {
            ActionError::Unauthenticated(err)
        } else {
            ActionError::IdentityUnavailable(err)
        }
    }
}

impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        ActionError::Validation(field_issues(&errors))
    }
}

/// Flatten validator output into a stable, field-sorted list
pub fn field_issues(errors: &ValidationErrors) -> Vec<FieldIssue> {
    let mut issues: Vec<FieldIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldIssue {
                field: field.to_string(),
                code: err.code.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field)),
            })
        })
        .collect();

    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

impl ResponseError for ActionError {
    fn status_code(&self) -> StatusCode {
        match self {
            ActionError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ActionError::Forbidden => StatusCode::FORBIDDEN,
            ActionError::Validation(_) | ActionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::Conflict(_) => StatusCode::CONFLICT,
            ActionError::IdentityUnavailable(_) | ActionError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ActionError::Store(err) => tracing::error!("Store failure: {}", err),
            ActionError::IdentityUnavailable(err) => {
                tracing::error!("Identity verification failed: {}", err)
            }
            ActionError::Unauthenticated(err) => tracing::debug!("Rejected caller: {}", err),
            _ => {}
        }

        let details = match self {
            ActionError::Validation(issues) => Some(issues.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
            details,
        })
    }
}
