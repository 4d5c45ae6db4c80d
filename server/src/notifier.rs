use crate::{
    github::{client::HostingApi, events::PushEvent},
    model::PullRequestResolver,
    profile::ProfileLookup,
};

pub const FIRST_TIME_CONTRIBUTOR_LABEL: &str = "First-time Contributor";

pub const ACCOUNT_LINK_PROMPT: &str = concat!(
    "Congratulations on your first merged pull request! We'd like to credit you for your ",
    "contribution in the post announcing the next WordPress release, but we can't find a ",
    "WordPress.org profile associated with your GitHub account. When you have a moment, visit ",
    "the following URL and click \"link your GitHub account\" under \"GitHub Username\" to link ",
    "your accounts:\n\n",
    "https://profiles.wordpress.org/me/profile/edit/\n\n",
    "And if you don't have a WordPress.org account, you can create one on this page:\n\n",
    "https://login.wordpress.org/register\n\n",
    "Kudos!",
);

/// Labels the pull request behind an author's first commit on the main branch, and asks authors
/// without a linked profile to link one.
pub struct FirstTimeContributorNotifier<A, P, R> {
    api: A,
    profiles: P,
    resolver: R,
    main_branch: String,
    label: String,
    comment: String,
}

impl<A, P, R> FirstTimeContributorNotifier<A, P, R>
where
    A: HostingApi,
    P: ProfileLookup,
    R: PullRequestResolver,
{
    pub fn new(api: A, profiles: P, resolver: R, main_branch: &str) -> Self {
        Self {
            api,
            profiles,
            resolver,
            main_branch: main_branch.to_owned(),
            label: FIRST_TIME_CONTRIBUTOR_LABEL.to_owned(),
            comment: ACCOUNT_LINK_PROMPT.to_owned(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Errors from the hosting API are returned. A failed profile lookup only skips the comment.
    #[tracing::instrument(skip_all, fields(git_ref = %event.r#ref, repo = %event.repository.name), err)]
    pub async fn process(&self, event: &PushEvent) -> anyhow::Result<()> {
        if event.branch() != Some(self.main_branch.as_str()) {
            tracing::debug!("Ignoring push outside {}", self.main_branch);
            return Ok(());
        }

        let Some(commit) = event.commits.first() else {
            tracing::info!("Ignoring push without commits");
            return Ok(());
        };

        let Some(pull_request) = self.resolver.pull_request(commit) else {
            tracing::info!(commit = %commit.id, "No pull request associated with commit");
            return Ok(());
        };

        let owner = &event.repository.owner.login;
        let repo = &event.repository.name;
        let Some(author) = commit.author.username.as_deref() else {
            tracing::info!(
                commit = %commit.id,
                "Commit author {} has no GitHub account",
                commit.author.name
            );
            return Ok(());
        };

        let commits = self.api.list_commits_by_author(owner, repo, author).await?;
        if commits.len() > 1 {
            tracing::debug!("{author} already has commits in {owner}/{repo}");
            return Ok(());
        }

        tracing::info!("Labeling {owner}/{repo}{pull_request} from first-time contributor {author}");
        self.api
            .add_labels(owner, repo, pull_request, &[self.label.as_str()])
            .await?;

        match self.profiles.has_profile(author).await {
            Ok(true) => {
                tracing::debug!("{author} has a linked profile");
                Ok(())
            }
            Ok(false) => {
                tracing::info!("Asking {author} to link their profile on {pull_request}");
                self.api
                    .create_comment(owner, repo, pull_request, &self.comment)
                    .await
            }
            Err(err) => {
                tracing::warn!(%err, "Profile lookup for {author} failed, not commenting");
                Ok(())
            }
        }
    }
}
