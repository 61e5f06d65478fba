use std::fmt;

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;

use crate::algorithm::{Algorithm, Scheme};
use crate::error::ConfigError;

const PKCS1_PUBLIC_KEY_LABEL: &str = "-----BEGIN RSA PUBLIC KEY-----";

/// Key material resolved once at construction, tagged by the kind of algorithm it serves.
#[derive(Clone)]
pub enum VerificationKey {
    Asymmetric(RsaPublicKey),
    Symmetric(Vec<u8>),
}

impl VerificationKey {
    /// Parses `material` the way `algorithm` needs it: a PEM public key for RSA (either a `PUBLIC KEY` or an
    /// `RSA PUBLIC KEY` block), raw secret bytes for HMAC.
    pub fn for_algorithm(algorithm: Algorithm, material: &str) -> Result<Self, ConfigError> {
        match algorithm.scheme() {
            Scheme::RsaPkcs1v15 => parse_rsa_public_key(material).map(VerificationKey::Asymmetric),
            Scheme::Hmac if material.is_empty() => Err(ConfigError::EmptySecret(algorithm.name())),
            Scheme::Hmac => Ok(VerificationKey::Symmetric(material.as_bytes().to_vec())),
        }
    }
}

fn parse_rsa_public_key(pem: &str) -> Result<RsaPublicKey, ConfigError> {
    let pem = pem.trim();
    let parsed = if pem.starts_with(PKCS1_PUBLIC_KEY_LABEL) {
        RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| e.to_string())
    } else {
        RsaPublicKey::from_public_key_pem(pem).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| ConfigError::InvalidPublicKey { reason })
}

// Keeps secrets out of logs.
impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationKey::Asymmetric(_) => f.write_str("Asymmetric(..)"),
            VerificationKey::Symmetric(secret) => write!(f, "Symmetric({} bytes)", secret.len()),
        }
    }
}
