use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure modes of the webhook ingestion pipeline.
///
/// Every variant terminates the request with an HTTP response; nothing
/// here propagates past the handler. Response bodies stay generic so
/// verification internals are never echoed back to the caller.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// One or more svix headers absent or empty. Rejected before the body
    /// is looked at.
    #[error("missing svix headers")]
    MissingHeaders,

    /// Signature did not verify against the raw body.
    #[error("signature verification failed")]
    InvalidSignature,

    /// Verified body did not decode as an event envelope.
    #[error("malformed event payload")]
    MalformedPayload,

    /// A `user.created` event arrived with no email addresses. Upstream
    /// defect; the request fails closed so the provider redelivers.
    #[error("event carried no email address")]
    EmptyEmailList,

    /// The persistence call failed after verification succeeded.
    #[error("error creating user")]
    Store(#[source] anyhow::Error),
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::MissingHeaders
            | WebhookError::InvalidSignature
            | WebhookError::MalformedPayload => StatusCode::BAD_REQUEST,
            WebhookError::EmptyEmailList | WebhookError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
