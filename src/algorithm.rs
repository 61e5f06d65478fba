use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Digest used by an [`Algorithm`], both for HMAC and for hashing the signing input before an RSA check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

/// How a signature is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// RSASSA-PKCS1-v1_5 against a public key.
    RsaPkcs1v15,
    /// HMAC with a shared secret.
    Hmac,
}

/// The closed set of JWS `alg` values the gate can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    RS256,
    RS384,
    RS512,
    HS256,
    HS384,
    HS512,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::RS256,
        Algorithm::RS384,
        Algorithm::RS512,
        Algorithm::HS256,
        Algorithm::HS384,
        Algorithm::HS512,
    ];

    /// Looks up an algorithm by its JWS name. Matching is exact, `rs256` is not `RS256`.
    pub fn from_name(name: &str) -> Option<Algorithm> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
        }
    }

    pub fn hash(self) -> HashAlgorithm {
        match self {
            Algorithm::RS256 | Algorithm::HS256 => HashAlgorithm::Sha256,
            Algorithm::RS384 | Algorithm::HS384 => HashAlgorithm::Sha384,
            Algorithm::RS512 | Algorithm::HS512 => HashAlgorithm::Sha512,
        }
    }

    pub fn scheme(self) -> Scheme {
        match self {
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => Scheme::RsaPkcs1v15,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Scheme::Hmac,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Algorithm::from_name(name).ok_or_else(|| ConfigError::UnknownAlgorithm(name.to_string()))
    }
}
