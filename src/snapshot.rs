use crate::github::CommitResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The bounded set of repository material collected for one request
///
/// Serialized with the field names the HTTP API and the prompt context use:
/// `{repo, defaultBranch, readmeText, commits, files}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    /// `owner/name`
    pub repo: String,
    /// Branch the material was read from
    pub default_branch: String,
    /// README text, empty when the repository has none
    pub readme_text: String,
    /// Most recent commits, newest first
    pub commits: Vec<CommitRecord>,
    /// Sampled source files in tree order
    pub files: Vec<RepoFile>,
}

impl RepositorySnapshot {
    /// Whether a non-blank README was found
    pub fn has_readme(&self) -> bool {
        !self.readme_text.trim().is_empty()
    }
}

/// A source file and its decoded text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    /// Path relative to the repository root
    pub path: String,
    /// Decoded file text
    pub content: String,
}

/// The parts of a commit worth showing a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit hash
    pub sha: String,
    /// Full commit message
    pub message: String,
    /// GitHub login, or the git author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Author date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Link to the commit on github.com
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<CommitResponse> for CommitRecord {
    fn from(response: CommitResponse) -> Self {
        let signature = response.commit.author;
        let author = response
            .author
            .map(|user| user.login)
            .or_else(|| signature.as_ref().and_then(|s| s.name.clone()));

        Self {
            sha: response.sha,
            message: response.commit.message,
            author,
            date: signature.and_then(|s| s.date),
            url: response.html_url,
        }
    }
}
