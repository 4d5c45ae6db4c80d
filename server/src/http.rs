use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

pub fn client(
    user_agent: &str,
    timeout: Duration,
    mut headers: HeaderMap,
) -> anyhow::Result<reqwest::Client> {
    headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

pub trait ResponseExt {
    async fn error_for_status_with_body(self) -> anyhow::Result<Self>
    where
        Self: Sized;
}

impl ResponseExt for reqwest::Response {
    async fn error_for_status_with_body(self) -> anyhow::Result<Self>
    where
        Self: Sized,
    {
        if self.status().is_server_error() || self.status().is_client_error() {
            let url = self.url().clone();
            let status = self.status();
            let body = self.text().await;
            return Err(anyhow::anyhow!(
                "{url} returned HTTP {status} with body {body:#?}",
            ));
        }

        Ok(self)
    }
}
