use axum::response::{IntoResponse, Response};
use http::header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderValue, StatusCode};

use crate::expiry::ExpiryFailure;
use crate::token::DecodeError;
use crate::verify::VerifyFailure;

/// The reason a request was turned away by the gate.
///
/// The `Display` output of each variant is exactly the body written to the client, so nothing about the underlying
/// failure leaks into the response.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("No Token Detect")]
    NoToken,
    #[error("Invalid Token")]
    MalformedToken,
    #[error("Verify Error")]
    VerifyError,
    #[error("Expired Token")]
    Expired,
}

impl Rejection {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Rejection::NoToken => StatusCode::UNAUTHORIZED,
            Rejection::MalformedToken | Rejection::VerifyError => StatusCode::BAD_REQUEST,
            Rejection::Expired => StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [
                (
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            ],
            self.to_string(),
        )
            .into_response()
    }
}

/// Everything that can go wrong while checking a single request.
///
/// Only [`GateError::rejection`] is ever shown to the client; the error itself goes to diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Verify(#[from] VerifyFailure),
    #[error(transparent)]
    Expiry(#[from] ExpiryFailure),
    #[error("token payload cannot be carried in a header value")]
    UnforwardablePayload(#[source] http::header::InvalidHeaderValue),
}

impl GateError {
    pub fn rejection(&self) -> Rejection {
        match self {
            GateError::Decode(decode_error) => decode_error.rejection(),
            GateError::Verify(_) => Rejection::VerifyError,
            GateError::Expiry(_) => Rejection::Expired,
            GateError::UnforwardablePayload(_) => Rejection::MalformedToken,
        }
    }
}

/// Errors raised while building a [`TokenGate`](crate::TokenGate). A gate is never created from a configuration
/// that produced one of these.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unsupported algorithm `{0}`")]
    UnknownAlgorithm(String),
    #[error("failed to parse RSA public key: {reason}")]
    InvalidPublicKey { reason: String },
    #[error("HMAC algorithm {0} requires a non-empty shared secret")]
    EmptySecret(&'static str),
    #[error("invalid injection header name `{0}`")]
    InvalidHeaderName(String, #[source] http::header::InvalidHeaderName),
}
