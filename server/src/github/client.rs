use crate::{
    http::{self, ResponseExt},
    model::PullRequestNumber,
};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{future::Future, time::Duration};
use url::Url;

/// The slice of the hosting platform's REST API the notifier needs.
pub trait HostingApi {
    fn list_commits_by_author(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<CommitSummary>>> + Send;

    fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue: PullRequestNumber,
        labels: &[&str],
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: PullRequestNumber,
        body: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CommitSummary {
    pub sha: String,
}

#[derive(Serialize)]
struct AddLabels<'a> {
    labels: &'a [&'a str],
}

#[derive(Serialize)]
struct CreateComment<'a> {
    body: &'a str,
}

/// Never asks for more than this many commits; two are enough to tell a first contribution apart.
const COMMITS_PER_PAGE: &str = "2";

/// https://docs.github.com/en/rest
#[derive(Clone)]
pub struct GithubClient {
    base_url: Url,
    client: reqwest::Client,
}

impl GithubClient {
    pub fn new(
        base_url: Url,
        token: &SecretString,
        user_agent: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .context("GitHub token is not a valid header value")?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(AUTHORIZATION, authorization);

        Ok(Self {
            base_url,
            client: http::client(user_agent, timeout, headers)?,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("{} cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn issue_endpoint(
        &self,
        owner: &str,
        repo: &str,
        issue: PullRequestNumber,
        resource: &str,
    ) -> anyhow::Result<Url> {
        let issue = issue.get().to_string();
        self.endpoint(&["repos", owner, repo, "issues", &issue, resource])
    }
}

impl HostingApi for GithubClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_commits_by_author(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
    ) -> anyhow::Result<Vec<CommitSummary>> {
        let url = self.endpoint(&["repos", owner, repo, "commits"])?;
        let response = self
            .client
            .get(url)
            .query(&[("author", author), ("per_page", COMMITS_PER_PAGE)])
            .send()
            .await?
            .error_for_status_with_body()
            .await?;
        Ok(response.json().await?)
    }

    #[tracing::instrument(skip(self), err)]
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue: PullRequestNumber,
        labels: &[&str],
    ) -> anyhow::Result<()> {
        let url = self.issue_endpoint(owner, repo, issue, "labels")?;
        self.client
            .post(url)
            .json(&AddLabels { labels })
            .send()
            .await?
            .error_for_status_with_body()
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, body), err)]
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue: PullRequestNumber,
        body: &str,
    ) -> anyhow::Result<()> {
        let url = self.issue_endpoint(owner, repo, issue, "comments")?;
        self.client
            .post(url)
            .json(&CreateComment { body })
            .send()
            .await?
            .error_for_status_with_body()
            .await?;
        Ok(())
    }
}
