use crate::notifier::{ACCOUNT_LINK_PROMPT, FIRST_TIME_CONTRIBUTOR_LABEL};
use ipnet::IpNet;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub allowed_ip_ranges: Vec<IpNet>,
    pub github_webhook_secret: SecretString,
    pub github_token: SecretString,
    pub github_api_url: Url,
    pub profile_lookup_url: Url,
    /// Branch whose pushes are inspected, without the `refs/heads/` prefix.
    pub main_branch: String,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_comment")]
    pub comment: String,
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_label() -> String {
    FIRST_TIME_CONTRIBUTOR_LABEL.to_owned()
}

fn default_comment() -> String {
    ACCOUNT_LINK_PROMPT.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use secrecy::ExposeSecret;

    #[test]
    fn embedded_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("CONTRIBUTOR_SENTINEL_GITHUB_WEBHOOK_SECRET", "hook");
            jail.set_env("CONTRIBUTOR_SENTINEL_GITHUB_TOKEN", "ghp_token");

            let config: Config =
                contributor_sentinel::load_config(include_str!("./default.toml"), None).unwrap();

            assert_eq!(config.github_api_url.as_str(), "https://api.github.com/");
            assert_eq!(config.main_branch, "trunk");
            assert_eq!(config.label, FIRST_TIME_CONTRIBUTOR_LABEL);
            assert_eq!(config.comment, ACCOUNT_LINK_PROMPT);
            assert_eq!(config.request_timeout, Duration::from_secs(10));
            assert_eq!(config.github_token.expose_secret(), "ghp_token");
            assert_eq!(config.allowed_ip_ranges.len(), 2);
            Ok(())
        });
    }

    #[test]
    fn secrets_are_required() {
        Jail::expect_with(|_jail| {
            assert!(contributor_sentinel::load_config::<Config>(
                include_str!("./default.toml"),
                None
            )
            .is_err());
            Ok(())
        });
    }
}
