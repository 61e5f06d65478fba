use std::task::{Context, Poll};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tower::Layer;
use tower_service::Service;

use crate::config::GateConfig;
use crate::error::ConfigError;
use crate::gate::TokenGate;

/// `tower` layer putting a [`TokenGate`] in front of a service.
#[derive(Clone)]
pub struct TokenGateLayer {
    gate: TokenGate,
}

impl TokenGateLayer {
    pub fn new(gate: TokenGate) -> Self {
        Self { gate }
    }

    pub fn from_config(config: GateConfig) -> Result<Self, ConfigError> {
        TokenGate::new(config).map(Self::new)
    }
}

impl<S> Layer<S> for TokenGateLayer {
    type Service = TokenGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenGateService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TokenGateService<S> {
    inner: S,
    gate: TokenGate,
}

impl<S> Service<Request> for TokenGateService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let (mut parts, body) = req.into_parts();
        if let Err(rejection) = self.gate.authorize(&mut parts) {
            return Box::pin(async move { Ok(rejection.into_response()) });
        }
        let req = Request::from_parts(parts, body);

        // Call the service that was driven to readiness, leaving a fresh clone in its place.
        // See https://docs.rs/tower/latest/tower/trait.Service.html#be-careful-when-cloning-inner-services
        let inner_clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner_clone);
        Box::pin(async move { inner.call(req).await })
    }
}
