use std::{convert::Infallible, sync::Arc};

use super::{client::GithubClient, events::PushEvent, middleware::validate_request_signature};
use crate::{
    error::AppError, middleware::allowed_ips, model::MergeCommitMessage,
    notifier::FirstTimeContributorNotifier, profile::WordPressProfiles,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{post, MethodRouter},
};
use ipnet::IpNet;
use secrecy::SecretString;

pub type PushNotifier =
    FirstTimeContributorNotifier<GithubClient, WordPressProfiles, MergeCommitMessage>;

const EVENT_HEADER: &str = "X-GitHub-Event";
const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[tracing::instrument(skip_all, fields(delivery = header(&headers, DELIVERY_HEADER)), err)]
async fn webhook(
    State(notifier): State<Arc<PushNotifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let event = header(&headers, EVENT_HEADER)
        .ok_or((StatusCode::BAD_REQUEST, "Missing X-GitHub-Event header"))?;

    match event {
        "ping" => Ok("pong".into_response()),
        "push" => {
            let push: PushEvent = serde_json::from_slice(&body).map_err(|err| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid push payload: {err}"),
                )
            })?;
            tracing::trace!(?push);
            notifier.process(&push).await?;
            Ok(StatusCode::OK.into_response())
        }
        other => {
            tracing::debug!("Ignoring {other} event");
            Ok(StatusCode::ACCEPTED.into_response())
        }
    }
}

pub fn handler(
    secret: SecretString,
    allowed: Vec<IpNet>,
) -> MethodRouter<Arc<PushNotifier>, Infallible> {
    post(webhook)
        .route_layer(middleware::from_fn_with_state(
            secret,
            validate_request_signature,
        ))
        .route_layer(middleware::from_fn_with_state(allowed, allowed_ips))
}
