use axum::{
    body::{self, Body},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware,
    response::IntoResponse,
};
use hmac::{digest::MacError, Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::AppError;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// GitHub caps webhook payloads at 25 MB, but push payloads we care about are far smaller.
const MAX_BODY_BYTES: usize = 1024 * 1024;

type HmacSha256 = Hmac<Sha256>;

pub async fn validate_request_signature(
    State(secret): State<SecretString>,
    request: Request<Body>,
    next: middleware::Next,
) -> Result<impl IntoResponse, AppError> {
    let request = buffer_and_verify(&secret, request).await?;
    Ok(next.run(request).await)
}

fn extract_signature(headers: &HeaderMap) -> Result<Vec<u8>, AppError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or((
            StatusCode::BAD_REQUEST,
            "Missing X-Hub-Signature-256 header",
        ))?;
    let hex = header.strip_prefix("sha256=").ok_or((
        StatusCode::BAD_REQUEST,
        "Invalid signature format, expected sha256=...",
    ))?;
    Ok(hex::decode(hex).map_err(|err| (StatusCode::BAD_REQUEST, format!("Invalid hex: {err}")))?)
}

fn mac(secret: &SecretString) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC can take key of any size")
}

fn verify(secret: &SecretString, body: &[u8], signature: &[u8]) -> Result<(), MacError> {
    let mut mac = mac(secret);
    mac.update(body);
    mac.verify_slice(signature)
}

/// The body has to be read in full to be hashed, so the request is rebuilt around the buffered
/// bytes for the next handler.
async fn buffer_and_verify(
    secret: &SecretString,
    request: Request<Body>,
) -> Result<Request<Body>, AppError> {
    let (parts, body) = request.into_parts();
    let signature = extract_signature(&parts.headers)?;
    let body = body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    if verify(secret, &body, &signature).is_ok() {
        Ok(Request::from_parts(parts, Body::from(body)))
    } else {
        Err((StatusCode::BAD_REQUEST, "Invalid signature").into())
    }
}

/// `X-Hub-Signature-256` value GitHub would send for `body`.
#[cfg(test)]
pub fn sign(secret: &SecretString, body: &[u8]) -> String {
    let mut mac = mac(secret);
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
