//! Bearer token authorization gate for [`axum`](https://docs.rs/axum) and other
//! [`tower`](https://docs.rs/tower)-based services.
//!
//! ## Overview
//!
//! The gate sits in front of a service and inspects every request's `Authorization: Bearer <token>` header. The token
//! is a compact [JSON Web Signature](https://datatracker.ietf.org/doc/html/rfc7515) (`<header>.<payload>.<signature>`)
//! and is checked against a single, statically configured key and algorithm:
//!
//! 1. the three segments are base64url-decoded and the header and payload parsed as JSON objects,
//! 2. the header's `crit` list may only name standard header parameters and its `alg` must equal the configured one,
//! 3. the signature is verified over the exact bytes received (RSA PKCS#1 v1.5 or HMAC, with SHA-256/384/512),
//! 4. the payload's `exp` claim must lie in the future.
//!
//! Accepted requests are forwarded with `Authorization` removed and the token's raw JSON payload placed, byte for byte,
//! in an injection header (`injectedPayload` by default). Rejected requests never reach the inner service and get a
//! plain-text response instead:
//!
//! | Failure                      | Status | Body              |
//! |------------------------------|--------|-------------------|
//! | no bearer token              | 401    | `No Token Detect` |
//! | token cannot be decoded      | 400    | `Invalid Token`   |
//! | signature or header rejected | 400    | `Verify Error`    |
//! | token expired                | 451    | `Expired Token`   |
//!
//! Routes can be exempted through named exception rules. A `full` rule lets matching requests through untouched, a
//! `refresh` rule still verifies the token but ignores its expiration (typically for a token refresh endpoint). When
//! both kinds match the same request, `full` wins.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use axum::routing::{get, put};
//! use axum_bearer_gate::{ExceptionRule, GateConfig, TokenGateLayer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GateConfig::default()
//!         .with_algorithm("HS256")
//!         .with_key("a shared secret")
//!         .with_exception("health", ExceptionRule::full("GET", "/health"))
//!         .with_exception("renew", ExceptionRule::refresh("PUT", "/token"));
//!
//!     let router = axum::Router::new()
//!         .route("/health", get(|| async { "ok" }))
//!         .route("/token", put(|| async { "renewed" }))
//!         .route("/protected", get(|| async { "Hello World!" }))
//!         .layer(TokenGateLayer::from_config(config)?);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```
//!
//! Hosts that are not built on `tower` can call [`TokenGate::authorize_headers`] directly; it is synchronous and
//! performs no I/O.
//!
//! ## Diagnostics
//!
//! Why a request was rejected is reported to a [`Diagnostics`] sink and never to the client. The default sink emits
//! [`tracing`](https://docs.rs/tracing) events; setting [`GateConfig::debug`] raises them from `DEBUG` to `INFO`.

pub use algorithm::{Algorithm, HashAlgorithm, Scheme};
pub use config::{ExceptionRule, GateConfig, RuleKind, UnknownRuleKind, DEFAULT_PUBLIC_KEY};
pub use diagnostics::{Diagnostics, GateEvent, RequestContext, TracingDiagnostics};
pub use error::{ConfigError, GateError, Rejection};
pub use exceptions::{RouteDecision, RouteExceptions};
pub use expiry::{Clock, ExpirationPolicy, ExpiryFailure, FixedClock, SystemClock};
pub use gate::{Passage, TokenGate, TokenGateBuilder};
pub use key::VerificationKey;
pub use layer::{TokenGateLayer, TokenGateService};
pub use token::{
    decode_bearer, decode_token, DecodeError, DecodedToken, Segment, TokenHeader, TokenPayload,
};
pub use verify::{verify_signature, verify_token, VerifyFailure};

mod algorithm;
mod config;
mod diagnostics;
mod error;
mod exceptions;
mod expiry;
mod gate;
mod key;
mod layer;
mod token;
mod verify;

#[cfg(test)]
mod test_support;
