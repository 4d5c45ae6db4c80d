use crate::{
    config::Config,
    github::{
        client::GithubClient,
        webhook::{self, PushNotifier},
    },
    model::MergeCommitMessage,
    notifier::FirstTimeContributorNotifier,
    profile::WordPressProfiles,
};
use axum::{http::StatusCode, routing::get, Router};
use contributor_sentinel::shutdown_signal;
use listenfd::ListenFd;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

mod config;
mod error;
mod github;
mod http;
mod middleware;
mod model;
mod notifier;
mod profile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Config = contributor_sentinel::init(include_str!("./default.toml"))?;

    let github = GithubClient::new(
        config.github_api_url,
        &config.github_token,
        &config.user_agent,
        config.request_timeout,
    )?;
    let profiles = WordPressProfiles::new(
        config.profile_lookup_url,
        &config.user_agent,
        config.request_timeout,
    )?;
    let notifier =
        FirstTimeContributorNotifier::new(github, profiles, MergeCommitMessage, &config.main_branch)
            .with_label(config.label)
            .with_comment(config.comment);

    let app = app(
        Arc::new(notifier),
        webhook::handler(config.github_webhook_secret, config.allowed_ip_ranges),
        request_deadline(config.request_timeout),
    );

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // if we are given a tcp listener on listen fd 0, we use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // otherwise fall back to local listening
        None => TcpListener::bind(&config.listen_addr).await?,
    };

    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

/// Upstream round-trips one push can make: commit listing, label, profile lookup, comment.
const UPSTREAM_CALLS: u32 = 4;

/// Every upstream call may use its whole `request_timeout`, plus one more as slack, before the
/// request as a whole is abandoned.
fn request_deadline(request_timeout: Duration) -> Duration {
    request_timeout * (UPSTREAM_CALLS + 1)
}

fn app(
    notifier: Arc<PushNotifier>,
    webhook: axum::routing::MethodRouter<Arc<PushNotifier>>,
    deadline: Duration,
) -> Router {
    Router::new()
        .route("/webhook", webhook)
        .with_state(notifier)
        .route("/healthz", get(|| async { "ok" }))
        .layer((
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()),
            // Graceful shutdown will wait for outstanding requests to complete. Add a timeout so
            // requests don't hang forever.
            TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, deadline),
        ))
}
