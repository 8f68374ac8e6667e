use crate::error::{DocsError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static GITHUB_REPO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)github\.com/([^/?#\s]+)/([^/?#\s]+)").expect("repository URL pattern is valid")
});

/// Owner and repository name parsed from a GitHub URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    /// User or organization that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryReference {
    /// Parses `https://github.com/{owner}/{repo}` and the usual variations
    /// (no scheme, trailing path, query, fragment or `.git`).
    pub fn parse(url: &str) -> Result<Self> {
        let captures = GITHUB_REPO_URL
            .captures(url.trim())
            .ok_or_else(|| DocsError::InvalidReference("Invalid GitHub repo URL".into()))?;

        let owner = captures[1].to_string();
        let name = captures[2].trim_end_matches(".git").to_string();
        if [owner.as_str(), name.as_str()]
            .iter()
            .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
        {
            return Err(DocsError::InvalidReference("Invalid GitHub repo URL".into()));
        }

        Ok(Self { owner, name })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryReference {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
