use std::collections::BTreeMap;

use http::Method;
use serde::Deserialize;

/// Public key used when no key is configured for an RSA algorithm.
pub const DEFAULT_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAuKijNSLvTJqPV+H/MfoR
I/EkasKIYBTujUTjN5nxrw6q7acJlyq5pzb1MMMQqe/h1ACMmoWJ9dLHJqVMFz+h
Nkx99eWkXDj2agTjnh6VetG6owdC0yYiN2nm5eFsLtj8HBPhKF+5WguLUXoeNhOc
0zdEfI6UkyLp+xmKVzrs7wXmBVaz0nV69drIYo8RI1+AUzHKJVOuWwykpcH+wk8P
GvxXGw7CzM2NWAF5B9OUB+InAFApXx8FLZ0jQOAvCJcPZ7So7isxIyCD5RlhbcId
35ZmzwBuOlskdyswX78yGc46aEAWFDUkMfrXZEy+RGoj0KunXwKKufh+bHYsKmvC
ywIDAQAB
-----END PUBLIC KEY-----";

pub const DEFAULT_ALGORITHM: &str = "RS256";

pub const DEFAULT_INJECT_HEADER: &str = "injectedPayload";

/// Configuration of a [`TokenGate`](crate::TokenGate) as supplied by the host.
///
/// Empty strings fall back to the defaults, so a host can pass through whatever its own configuration format gave it.
///
/// ```
/// use axum_bearer_gate::GateConfig;
///
/// let config: GateConfig = serde_json::from_str(r#"{
///     "alg": "HS256",
///     "key": "shared-secret",
///     "exceptions": {
///         "login": { "url": "/login", "method": "POST" },
///         "refresh": { "url": "/token/refresh", "method": "PUT", "type": "refresh" }
///     }
/// }"#).unwrap();
/// assert_eq!(config.inject_header, "injectedPayload");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    /// PEM-encoded RSA public key, or the raw shared secret for HMAC algorithms.
    pub key: String,
    pub alg: String,
    /// Header that receives the token's raw JSON payload on forwarded requests.
    pub inject_header: String,
    /// Raises per-request diagnostics from `DEBUG` to `INFO`. Never changes what the gate does.
    pub debug: bool,
    #[serde(alias = "white")]
    pub exceptions: BTreeMap<String, ExceptionRule>,
    /// Seconds a token stays acceptable past its `exp`.
    pub leeway: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            alg: DEFAULT_ALGORITHM.to_string(),
            inject_header: DEFAULT_INJECT_HEADER.to_string(),
            debug: false,
            exceptions: BTreeMap::new(),
            leeway: 0,
        }
    }
}

impl GateConfig {
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_algorithm(mut self, alg: impl Into<String>) -> Self {
        self.alg = alg.into();
        self
    }

    pub fn with_inject_header(mut self, header: impl Into<String>) -> Self {
        self.inject_header = header.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_exception(mut self, name: impl Into<String>, rule: ExceptionRule) -> Self {
        self.exceptions.insert(name.into(), rule);
        self
    }

    pub(crate) fn algorithm_name(&self) -> &str {
        if self.alg.is_empty() {
            DEFAULT_ALGORITHM
        } else {
            &self.alg
        }
    }

    pub(crate) fn inject_header_name(&self) -> &str {
        if self.inject_header.is_empty() {
            DEFAULT_INJECT_HEADER
        } else {
            &self.inject_header
        }
    }
}

/// What a matching exception rule does to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum RuleKind {
    /// Skip verification entirely.
    #[default]
    Full,
    /// Verify the token but ignore its expiration.
    Refresh,
}

#[derive(thiserror::Error, Debug)]
#[error("unknown exception rule type `{0}`, expected `full` or `refresh`")]
pub struct UnknownRuleKind(String);

impl TryFrom<String> for RuleKind {
    type Error = UnknownRuleKind;

    fn try_from(kind: String) -> Result<Self, Self::Error> {
        if kind.is_empty() || kind.eq_ignore_ascii_case("full") {
            Ok(RuleKind::Full)
        } else if kind.eq_ignore_ascii_case("refresh") {
            Ok(RuleKind::Refresh)
        } else {
            Err(UnknownRuleKind(kind))
        }
    }
}

/// A method + path pair that is exempt from some or all of the checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExceptionRule {
    pub url: String,
    pub method: String,
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
}

impl ExceptionRule {
    pub fn full(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            kind: RuleKind::Full,
        }
    }

    pub fn refresh(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            kind: RuleKind::Refresh,
        }
    }

    /// Both method and path compare case-insensitively; the path must otherwise match exactly.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.eq_ignore_ascii_case(method.as_str()) && self.url.eq_ignore_ascii_case(path)
    }
}
