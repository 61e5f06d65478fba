use hmac::{Hmac, Mac};
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::algorithm::{Algorithm, HashAlgorithm, Scheme};
use crate::key::VerificationKey;
use crate::token::DecodedToken;

/// Header parameters a token may list in `crit`. Any other critical extension is refused.
const SUPPORTED_HEADER_NAMES: [&str; 5] = ["alg", "kid", "typ", "cty", "crit"];

/// Why a token failed verification. Callers only ever see [`Rejection::VerifyError`](crate::Rejection::VerifyError);
/// the variants exist for diagnostics.
#[derive(thiserror::Error, Debug)]
pub enum VerifyFailure {
    #[error("unsupported critical header `{0}`")]
    UnsupportedCritical(String),
    #[error("unknown JWS algorithm `{0}`")]
    UnknownAlgorithm(String),
    #[error("incorrect alg, expected {expected} got {found}")]
    AlgorithmMismatch { expected: Algorithm, found: Algorithm },
    #[error("configured key cannot be used with {0}")]
    KeyMismatch(Algorithm),
    #[error("signature not verified")]
    BadSignature,
}

/// Checks a decoded token against the configured algorithm and key.
pub fn verify_token(
    token: &DecodedToken<'_>,
    configured: Algorithm,
    key: &VerificationKey,
) -> Result<(), VerifyFailure> {
    let header = token.header();
    if let Some(name) = header
        .crit
        .iter()
        .find(|name| !SUPPORTED_HEADER_NAMES.contains(&name.as_str()))
    {
        return Err(VerifyFailure::UnsupportedCritical(name.clone()));
    }

    let declared = Algorithm::from_name(&header.alg)
        .ok_or_else(|| VerifyFailure::UnknownAlgorithm(header.alg.clone()))?;
    if declared != configured {
        return Err(VerifyFailure::AlgorithmMismatch {
            expected: configured,
            found: declared,
        });
    }

    verify_signature(configured, key, token.signing_input(), token.signature())
}

/// Verifies `signature` over `signing_input` with the procedure `algorithm` maps to.
pub fn verify_signature(
    algorithm: Algorithm,
    key: &VerificationKey,
    signing_input: &[u8],
    signature: &[u8],
) -> Result<(), VerifyFailure> {
    match (algorithm.scheme(), key) {
        (Scheme::Hmac, VerificationKey::Symmetric(secret)) => {
            verify_hmac(algorithm.hash(), secret, signing_input, signature)
        }
        (Scheme::RsaPkcs1v15, VerificationKey::Asymmetric(public_key)) => {
            verify_rsa_pkcs1v15(algorithm.hash(), public_key, signing_input, signature)
        }
        _ => Err(VerifyFailure::KeyMismatch(algorithm)),
    }
}

fn verify_hmac(
    hash: HashAlgorithm,
    secret: &[u8],
    signing_input: &[u8],
    signature: &[u8],
) -> Result<(), VerifyFailure> {
    match hash {
        HashAlgorithm::Sha256 => verify_mac::<Hmac<Sha256>>(secret, signing_input, signature),
        HashAlgorithm::Sha384 => verify_mac::<Hmac<Sha384>>(secret, signing_input, signature),
        HashAlgorithm::Sha512 => verify_mac::<Hmac<Sha512>>(secret, signing_input, signature),
    }
}

fn verify_mac<M: Mac + hmac::digest::KeyInit>(
    secret: &[u8],
    signing_input: &[u8],
    signature: &[u8],
) -> Result<(), VerifyFailure> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(|_| VerifyFailure::BadSignature)?;
    mac.update(signing_input);
    // `verify_slice` compares in constant time.
    mac.verify_slice(signature)
        .map_err(|_| VerifyFailure::BadSignature)
}

fn verify_rsa_pkcs1v15(
    hash: HashAlgorithm,
    public_key: &RsaPublicKey,
    signing_input: &[u8],
    signature: &[u8],
) -> Result<(), VerifyFailure> {
    let (scheme, digest) = match hash {
        HashAlgorithm::Sha256 => (
            Pkcs1v15Sign::new::<Sha256>(),
            Sha256::digest(signing_input).to_vec(),
        ),
        HashAlgorithm::Sha384 => (
            Pkcs1v15Sign::new::<Sha384>(),
            Sha384::digest(signing_input).to_vec(),
        ),
        HashAlgorithm::Sha512 => (
            Pkcs1v15Sign::new::<Sha512>(),
            Sha512::digest(signing_input).to_vec(),
        ),
    };
    public_key
        .verify(scheme, &digest, signature)
        .map_err(|_| VerifyFailure::BadSignature)
}
