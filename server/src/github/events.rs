use serde::Deserialize;

/// The subset of GitHub's `push` webhook payload the notifier reads.
#[derive(Deserialize, Debug, Clone)]
pub struct PushEvent {
    pub r#ref: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
    pub repository: Repository,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Owner {
    pub login: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Commit {
    pub id: String,
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommitAuthor {
    pub name: String,
    /// Missing when the commit email is not linked to a GitHub account.
    pub username: Option<String>,
}

impl PushEvent {
    pub fn branch(&self) -> Option<&str> {
        self.r#ref.strip_prefix("refs/heads/")
    }
}

impl Commit {
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_push() {
        let event: PushEvent =
            serde_json::from_str(include_str!("../../test/push.json")).unwrap();

        assert_eq!(event.branch(), Some("trunk"));
        assert_eq!(event.repository.name, "gutenberg");
        assert_eq!(event.repository.owner.login, "WordPress");
        assert_eq!(event.commits.len(), 1);

        let commit = &event.commits[0];
        assert_eq!(commit.title(), "Fix block toolbar focus (#42)");
        assert_eq!(commit.author.username.as_deref(), Some("alice"));
    }

    #[test]
    fn tag_push_has_no_branch() {
        let event: PushEvent = serde_json::from_value(serde_json::json!({
            "ref": "refs/tags/v1.0.0",
            "repository": { "name": "gutenberg", "owner": { "login": "WordPress" } }
        }))
        .unwrap();

        assert_eq!(event.branch(), None);
        assert!(event.commits.is_empty());
    }

    #[test]
    fn empty_message_title() {
        let commit: Commit = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "message": "",
            "author": { "name": "Alice", "email": "alice@example.com" }
        }))
        .unwrap();

        assert_eq!(commit.title(), "");
        assert_eq!(commit.author.username, None);
    }
}
