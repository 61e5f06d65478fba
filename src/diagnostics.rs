use std::fmt;
use std::net::SocketAddr;

use http::Method;

use crate::error::{GateError, Rejection};

/// The request a diagnostic event is about.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Client address, when the host recorded one (axum's `ConnectInfo<SocketAddr>`).
    pub peer: Option<SocketAddr>,
    pub method: &'a Method,
    pub path: &'a str,
}

/// Something that happened to one request while passing the gate.
#[derive(Debug)]
pub enum GateEvent<'a> {
    /// A `full` exception rule let the request through unchecked.
    Bypassed { rule: &'a str },
    /// The token checked out and the request was handed on.
    Forwarded { relaxed_by: Option<&'a str> },
    Rejected {
        rejection: Rejection,
        error: &'a GateError,
    },
}

/// Operator-facing sink for per-request diagnostics. Nothing written here ever reaches the client.
pub trait Diagnostics: Send + Sync {
    fn record(&self, request: RequestContext<'_>, event: GateEvent<'_>);
}

/// Writes gate events as `tracing` events.
///
/// Rejections and pass-throughs are logged at `DEBUG`, or at `INFO` when `verbose` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics {
    verbose: bool,
}

impl TracingDiagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Diagnostics for TracingDiagnostics {
    fn record(&self, request: RequestContext<'_>, event: GateEvent<'_>) {
        let message = EventMessage(&event);
        let peer = request.peer.map(tracing::field::display);
        if self.verbose {
            tracing::info!(peer, method = %request.method, path = request.path, "{message}");
        } else {
            tracing::debug!(peer, method = %request.method, path = request.path, "{message}");
        }
    }
}

struct EventMessage<'a, 'b>(&'a GateEvent<'b>);

impl fmt::Display for EventMessage<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            GateEvent::Bypassed { rule } => write!(f, "serving exempt url (rule `{rule}`)"),
            GateEvent::Forwarded { relaxed_by: None } => f.write_str("token accepted"),
            GateEvent::Forwarded {
                relaxed_by: Some(rule),
            } => write!(f, "token accepted, expiration ignored (rule `{rule}`)"),
            GateEvent::Rejected { rejection, error } => {
                write!(f, "rejected with {rejection:?}: {error}")
            }
        }
    }
}
