use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;
use thiserror::Error;

use crate::models::Rotation;
use crate::snapshot::{normalize, Normalized};

/// Fragment parameter carrying the snapshot in a share link.
const FRAGMENT_PREFIX: &str = "#s=";

/// Why a pasted share token was rejected
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no share token found in input")]
    MissingToken,
    #[error("token contains characters outside the url-safe alphabet")]
    BadAlphabet,
    #[error("token is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token does not decode to UTF-8 text")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("token does not hold a JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a rotation as a URL-safe token: compact JSON, base64url, no
/// padding.
pub fn encode_token(rotation: &Rotation) -> String {
    let json = serde_json::to_string(rotation).expect("rotation serializes");
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// The `#s=<token>` document fragment for a share link.
pub fn encode_fragment(rotation: &Rotation) -> String {
    format!("{}{}", FRAGMENT_PREFIX, encode_token(rotation))
}

/// Full share link against a base URL.
pub fn share_url(base: &str, rotation: &Rotation) -> String {
    format!(
        "{}{}",
        base.trim_end_matches('#'),
        encode_fragment(rotation)
    )
}

/// Pull the raw token out of pasted input: accepts a bare token, a
/// `#s=token` fragment, or a full URL containing one. Trailing `=` padding
/// is tolerated and stripped.
fn extract_token(input: &str) -> Result<&str, ShareError> {
    let input = input.trim();
    let token = match input.find(FRAGMENT_PREFIX) {
        Some(pos) => &input[pos + FRAGMENT_PREFIX.len()..],
        None => input,
    };
    let token = token.trim_end_matches('=');
    if token.is_empty() {
        return Err(ShareError::MissingToken);
    }
    if !token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(ShareError::BadAlphabet);
    }
    Ok(token)
}

/// Decode a share token back into a normalized rotation, reporting why a
/// bad token was rejected.
pub fn decode_token(input: &str) -> Result<Normalized, ShareError> {
    let token = extract_token(input)?;
    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let json = String::from_utf8(bytes)?;
    let value: Value = serde_json::from_str(&json)?;
    Ok(normalize(&value))
}

/// Failure-tolerant decode: malformed input reads as no snapshot at all.
pub fn decode(input: &str) -> Option<Normalized> {
    match decode_token(input) {
        Ok(normalized) => Some(normalized),
        Err(e) => {
            log::debug!("share token rejected: {}", e);
            None
        }
    }
}
