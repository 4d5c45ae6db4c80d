use crate::http::{self, ResponseExt};
use reqwest::{header::HeaderMap, StatusCode};
use std::{future::Future, time::Duration};
use url::Url;

/// Answers whether a GitHub user has linked their account to a contributor profile.
pub trait ProfileLookup {
    fn has_profile(&self, username: &str) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

/// The `wporg-github` lookup endpoint on profiles.wordpress.org: `HEAD <base>/<username>` answers
/// 200 for linked accounts and 404 otherwise.
#[derive(Clone)]
pub struct WordPressProfiles {
    base_url: Url,
    client: reqwest::Client,
}

impl WordPressProfiles {
    pub fn new(base_url: Url, user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            base_url,
            client: http::client(user_agent, timeout, HeaderMap::new())?,
        })
    }

    fn lookup_url(&self, username: &str) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("{} cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .push(username);
        Ok(url)
    }
}

impl ProfileLookup for WordPressProfiles {
    #[tracing::instrument(skip(self), err)]
    async fn has_profile(&self, username: &str) -> anyhow::Result<bool> {
        let response = self.client.head(self.lookup_url(username)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        response.error_for_status_with_body().await?;
        Ok(true)
    }
}
