use crate::github::events::Commit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{fmt, num::NonZeroU64};

/// Issue number of a pull request. GitHub numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PullRequestNumber(NonZeroU64);

impl PullRequestNumber {
    pub fn new(number: u64) -> Option<Self> {
        NonZeroU64::new(number).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Maps a pushed commit to the pull request that produced it.
pub trait PullRequestResolver {
    fn pull_request(&self, commit: &Commit) -> Option<PullRequestNumber>;
}

/// Reads the number from the title GitHub generates when merging: `Merge pull request #12 from
/// user/branch` for merge commits, `Title (#12)` for squash merges.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeCommitMessage;

static MERGE_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Merge pull request #(\d+) from \S|\(#(\d+)\)\s*$").expect("valid regex")
});

impl PullRequestResolver for MergeCommitMessage {
    fn pull_request(&self, commit: &Commit) -> Option<PullRequestNumber> {
        let captures = MERGE_TITLE.captures(commit.title())?;
        let number = captures.get(1).or_else(|| captures.get(2))?;
        PullRequestNumber::new(number.as_str().parse().ok()?)
    }
}
