//! Decoding of compact bearer tokens (`<header>.<payload>.<signature>`).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use http::HeaderValue;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::Rejection;

const BEARER_PREFIX: &str = "Bearer ";

/// Unpadded base64url that, like most JWT libraries, tolerates non-zero trailing bits in the last symbol.
const BASE64_URL_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
    Signature,
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("authorization header not found")]
    MissingHeader,
    #[error("authorization header is not a bearer token")]
    NotBearer,
    #[error("token has {0} segments, expected 3")]
    SegmentCount(usize),
    #[error("{segment:?} segment is not valid base64url")]
    Base64 {
        segment: Segment,
        #[source]
        source: base64::DecodeError,
    },
    #[error("{segment:?} segment is not a JSON object")]
    Json {
        segment: Segment,
        #[source]
        source: serde_json::Error,
    },
    #[error("token signature is empty")]
    EmptySignature,
}

impl DecodeError {
    pub fn rejection(&self) -> Rejection {
        match self {
            DecodeError::MissingHeader | DecodeError::NotBearer | DecodeError::SegmentCount(_) => {
                Rejection::NoToken
            }
            DecodeError::Base64 { .. } | DecodeError::Json { .. } | DecodeError::EmptySignature => {
                Rejection::MalformedToken
            }
        }
    }
}

/// JOSE header fields the gate cares about. Anything else in the header is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenHeader {
    #[serde(default, deserialize_with = "null_as_default")]
    pub alg: String,
    pub kid: Option<String>,
    pub typ: Option<String>,
    pub cty: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crit: Vec<String>,
}

/// An explicit `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The token's claims, kept as parsed JSON so `iat` and `exp` can be read without constraining other claims.
#[derive(Debug, Clone, Default)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

impl TokenPayload {
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.claims.get("iat").and_then(numeric_date)
    }

    /// `None` when `exp` is missing or not a number.
    pub fn expires_at(&self) -> Option<i64> {
        self.claims.get("exp").and_then(numeric_date)
    }
}

fn numeric_date(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|secs| secs.is_finite())
            .map(|secs| secs.trunc() as i64)
    })
}

/// A token that parsed cleanly but has not been verified yet.
#[derive(Debug)]
pub struct DecodedToken<'a> {
    signing_input: &'a [u8],
    signature: Vec<u8>,
    header: TokenHeader,
    payload: TokenPayload,
    raw_payload: Vec<u8>,
}

impl<'a> DecodedToken<'a> {
    /// The exact `<header>.<payload>` bytes as received on the wire.
    pub fn signing_input(&self) -> &'a [u8] {
        self.signing_input
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    pub fn payload(&self) -> &TokenPayload {
        &self.payload
    }

    pub fn raw_payload(&self) -> &[u8] {
        &self.raw_payload
    }
}

/// Decodes the value of an `Authorization` header into a [`DecodedToken`].
pub fn decode_bearer(authorization: Option<&HeaderValue>) -> Result<DecodedToken<'_>, DecodeError> {
    let authorization = authorization.ok_or(DecodeError::MissingHeader)?;
    let token = authorization
        .as_bytes()
        .strip_prefix(BEARER_PREFIX.as_bytes())
        .ok_or(DecodeError::NotBearer)?;
    decode_token(token)
}

/// Decodes a bare compact token.
pub fn decode_token(token: &[u8]) -> Result<DecodedToken<'_>, DecodeError> {
    let segments: Vec<&[u8]> = token.split(|byte| *byte == b'.').collect();
    let &[header_b64, payload_b64, signature_b64] = segments.as_slice() else {
        return Err(DecodeError::SegmentCount(segments.len()));
    };

    let header = decode_segment(Segment::Header, header_b64)?;
    let raw_payload = decode_segment(Segment::Payload, payload_b64)?;
    let signature = decode_segment(Segment::Signature, signature_b64)?;
    if signature.is_empty() {
        return Err(DecodeError::EmptySignature);
    }

    let header: TokenHeader = serde_json::from_value(Value::Object(parse_object(
        Segment::Header,
        &header,
    )?))
    .map_err(|source| DecodeError::Json {
        segment: Segment::Header,
        source,
    })?;
    let claims = parse_object(Segment::Payload, &raw_payload)?;

    Ok(DecodedToken {
        signing_input: &token[..header_b64.len() + 1 + payload_b64.len()],
        signature,
        header,
        payload: TokenPayload { claims },
        raw_payload,
    })
}

fn decode_segment(segment: Segment, encoded: &[u8]) -> Result<Vec<u8>, DecodeError> {
    BASE64_URL_LENIENT
        .decode(encoded)
        .map_err(|source| DecodeError::Base64 { segment, source })
}

fn parse_object(segment: Segment, json: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    serde_json::from_slice(json).map_err(|source| DecodeError::Json { segment, source })
}
