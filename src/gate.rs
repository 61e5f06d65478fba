use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use percent_encoding::percent_decode_str;

use crate::algorithm::{Algorithm, Scheme};
use crate::config::{GateConfig, DEFAULT_PUBLIC_KEY};
use crate::diagnostics::{Diagnostics, GateEvent, RequestContext, TracingDiagnostics};
use crate::error::{ConfigError, GateError, Rejection};
use crate::exceptions::{RouteDecision, RouteExceptions};
use crate::expiry::{Clock, ExpirationPolicy, SystemClock};
use crate::key::VerificationKey;
use crate::layer::TokenGateLayer;
use crate::token::decode_bearer;
use crate::verify::verify_token;

/// How a request made it through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Passage {
    /// A `full` exception rule matched; the request was left untouched.
    Bypassed,
    /// The token verified; `Authorization` was replaced by the injection header.
    Verified { expiry_relaxed: bool },
}

/// Builder for a [`TokenGate`], letting the host swap the clock and the diagnostics sink.
pub struct TokenGateBuilder {
    config: GateConfig,
    clock: Option<Arc<dyn Clock>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl TokenGateBuilder {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            clock: None,
            diagnostics: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Validates the algorithm, key and injection header. A gate is only returned if all of them are usable.
    pub fn build(self) -> Result<TokenGate, ConfigError> {
        let config = self.config;
        let algorithm: Algorithm = config.algorithm_name().parse()?;

        let key_material = if config.key.is_empty() && algorithm.scheme() == Scheme::RsaPkcs1v15 {
            DEFAULT_PUBLIC_KEY
        } else {
            config.key.as_str()
        };
        let key = VerificationKey::for_algorithm(algorithm, key_material)?;

        let inject_header_name = config.inject_header_name();
        let inject_header = HeaderName::from_bytes(inject_header_name.as_bytes())
            .map_err(|e| ConfigError::InvalidHeaderName(inject_header_name.to_string(), e))?;

        let diagnostics: Arc<dyn Diagnostics> = match self.diagnostics {
            Some(diagnostics) => diagnostics,
            None => Arc::new(TracingDiagnostics::new(config.debug)),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        tracing::debug!(
            %algorithm,
            inject_header = %inject_header,
            exceptions = config.exceptions.len(),
            "token gate configured"
        );

        Ok(TokenGate {
            inner: Arc::new(GateInner {
                algorithm,
                key,
                inject_header,
                exceptions: RouteExceptions::new(config.exceptions),
                expiration: ExpirationPolicy::new(config.leeway),
                clock,
                diagnostics,
            }),
        })
    }
}

/// The verification engine. Cheap to clone; all clones share the same immutable configuration.
#[derive(Clone)]
pub struct TokenGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    algorithm: Algorithm,
    key: VerificationKey,
    inject_header: HeaderName,
    exceptions: RouteExceptions,
    expiration: ExpirationPolicy,
    clock: Arc<dyn Clock>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TokenGate {
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: GateConfig) -> TokenGateBuilder {
        TokenGateBuilder::new(config)
    }

    pub fn layer(&self) -> TokenGateLayer {
        TokenGateLayer::new(self.clone())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    pub fn inject_header(&self) -> &HeaderName {
        &self.inner.inject_header
    }

    /// Runs the gate over request `parts`, rewriting its headers when the token is accepted.
    ///
    /// Exception rules see the percent-decoded path. The client address is taken from axum's
    /// `ConnectInfo<SocketAddr>` extension when the server was started with connect info.
    pub fn authorize(&self, parts: &mut Parts) -> Result<Passage, Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let path = percent_decode_str(parts.uri.path()).decode_utf8_lossy();
        let request = RequestContext {
            peer,
            method: &parts.method,
            path: &path,
        };
        self.pass(request, &mut parts.headers)
    }

    /// Same as [`TokenGate::authorize`], for hosts that keep method, path and headers apart.
    ///
    /// `path` is matched against the exception rules as given, so it should already be percent-decoded. On rejection
    /// `headers` is left as it was.
    pub fn authorize_headers(
        &self,
        method: &Method,
        path: &str,
        headers: &mut HeaderMap,
    ) -> Result<Passage, Rejection> {
        let request = RequestContext {
            peer: None,
            method,
            path,
        };
        self.pass(request, headers)
    }

    fn pass(&self, request: RequestContext<'_>, headers: &mut HeaderMap) -> Result<Passage, Rejection> {
        let inner = &*self.inner;

        let relaxed_by = match inner.exceptions.evaluate(request.method, request.path) {
            RouteDecision::Bypass { rule } => {
                inner
                    .diagnostics
                    .record(request, GateEvent::Bypassed { rule: &rule });
                return Ok(Passage::Bypassed);
            }
            RouteDecision::RelaxExpiry { rule } => Some(rule),
            RouteDecision::Enforce => None,
        };

        match self.check_token(headers, relaxed_by.is_none()) {
            Ok(claims) => {
                headers.remove(AUTHORIZATION);
                headers.insert(inner.inject_header.clone(), claims);
                inner.diagnostics.record(
                    request,
                    GateEvent::Forwarded {
                        relaxed_by: relaxed_by.as_deref(),
                    },
                );
                Ok(Passage::Verified {
                    expiry_relaxed: relaxed_by.is_some(),
                })
            }
            Err(error) => {
                let rejection = error.rejection();
                inner.diagnostics.record(
                    request,
                    GateEvent::Rejected {
                        rejection,
                        error: &error,
                    },
                );
                Err(rejection)
            }
        }
    }

    /// Decodes and verifies the bearer token, returning the raw payload ready to be injected.
    fn check_token(&self, headers: &HeaderMap, enforce_expiry: bool) -> Result<HeaderValue, GateError> {
        let inner = &*self.inner;
        let token = decode_bearer(headers.get(AUTHORIZATION))?;
        verify_token(&token, inner.algorithm, &inner.key)?;
        if enforce_expiry {
            inner
                .expiration
                .check(token.payload().expires_at(), inner.clock.now_secs())?;
        }
        HeaderValue::from_bytes(token.raw_payload()).map_err(GateError::UnforwardablePayload)
    }
}
