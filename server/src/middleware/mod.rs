use crate::error::AppError;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
};
use ipnet::IpNet;
use std::net::SocketAddr;

/// Rejects peers outside every configured range, e.g. anything but GitHub's published hook
/// addresses.
pub async fn allowed_ips(
    State(allowed): State<Vec<IpNet>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: middleware::Next,
) -> Result<Response, AppError> {
    // dual-stack listeners report IPv4 peers as ::ffff:a.b.c.d
    let ip = addr.ip().to_canonical();
    if !allowed.iter().any(|range| range.contains(&ip)) {
        tracing::info!("Denying connection from IP: {addr}");
        return Ok(StatusCode::FORBIDDEN.into_response());
    }

    Ok(next.run(request).await)
}
