//! Response shapes for the handful of GitHub REST endpoints the collector uses.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryMetadata {
    /// `owner/name` as GitHub spells it
    pub full_name: Option<String>,
    /// Branch the snapshot is taken from
    pub default_branch: String,
    /// Repository description
    pub description: Option<String>,
}

/// `GET /repos/{owner}/{repo}/readme` and `/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    /// Encoded body; absent for directories and oversized files
    pub content: Option<String>,
    /// Usually `base64`
    pub encoding: Option<String>,
}

impl ContentFile {
    /// Decodes the file body as text
    pub fn decoded_text(&self) -> Option<String> {
        let content = self.content.as_deref()?;
        match self.encoding.as_deref() {
            None | Some("base64") => decode_base64_text(content),
            Some(_) => Some(content.to_string()),
        }
    }
}

/// Decodes GitHub's line-wrapped base64 into UTF-8, replacing invalid sequences
pub fn decode_base64_text(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeResponse {
    /// Flattened entries in GitHub's order
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    /// Set when GitHub cut the listing short
    #[serde(default)]
    pub truncated: bool,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    /// `blob`, `tree` or `commit`
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    /// Whether the entry is a file
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Clone, Deserialize)]
pub struct CommitResponse {
    /// Commit hash
    pub sha: String,
    /// Web link to the commit
    pub html_url: Option<String>,
    /// Git-level commit data
    pub commit: CommitDetail,
    /// GitHub account, when the author email maps to one
    pub author: Option<UserRef>,
}

/// The git commit inside a commit listing entry
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    /// Commit message
    pub message: String,
    /// Git author signature
    pub author: Option<GitSignature>,
}

/// Name, email and time of a git signature
#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    /// Author name
    pub name: Option<String>,
    /// Author email
    pub email: Option<String>,
    /// Author timestamp
    pub date: Option<DateTime<Utc>>,
}

/// A GitHub account reference
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    /// Account login
    pub login: String,
}

/// Error body GitHub returns with non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable error
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wrapped_base64() {
        // "# Demo\n\nHello" wrapped the way GitHub wraps at 60 columns
        let file = ContentFile {
            content: Some("IyBEZW1v\nCgpIZWxs\nbw==\n".into()),
            encoding: Some("base64".into()),
        };
        assert_eq!(file.decoded_text().as_deref(), Some("# Demo\n\nHello"));
    }

    #[test]
    fn test_invalid_base64_is_none() {
        assert_eq!(decode_base64_text("!!!not base64!!!"), None);
    }

    #[test]
    fn test_missing_content() {
        let file = ContentFile {
            content: None,
            encoding: None,
        };
        assert_eq!(file.decoded_text(), None);
    }

    #[test]
    fn test_commit_payload() {
        let json = r#"{
            "sha": "abc123",
            "html_url": "https://github.com/octo/demo/commit/abc123",
            "commit": {
                "message": "Fix typo",
                "author": {"name": "Octo Cat", "email": "octo@example.com", "date": "2024-05-01T12:00:00Z"}
            },
            "author": null
        }"#;
        let commit: CommitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "abc123");
        assert_eq!(commit.commit.message, "Fix typo");
        assert!(commit.author.is_none());
        assert!(commit.commit.author.unwrap().date.is_some());
    }

    #[test]
    fn test_tree_defaults() {
        let tree: TreeResponse = serde_json::from_str(r#"{"sha": "x"}"#).unwrap();
        assert!(tree.tree.is_empty());
        assert!(!tree.truncated);
    }
}
