//! Source collector: turns a repository URL into a [`RepositorySnapshot`].
//!
//! Repository metadata must load; everything after that degrades to empty
//! values instead of failing the snapshot. README, commits and files are
//! fetched concurrently, file downloads go through a bounded worker pool,
//! and the whole collection runs under a deadline.

use crate::config::CollectorConfig;
use crate::error::{DocsError, Result};
use crate::github::{GitHubClient, RepositoryReference, TreeEntry};
use crate::parallel::ParallelProcessor;
use crate::snapshot::{CommitRecord, RepoFile, RepositorySnapshot};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Collects repository snapshots from GitHub
#[derive(Clone)]
pub struct SourceCollector {
    client: GitHubClient,
    config: CollectorConfig,
    workers: ParallelProcessor,
}

impl SourceCollector {
    /// Creates a collector with the given limits
    pub fn new(client: GitHubClient, config: CollectorConfig) -> Self {
        let workers = ParallelProcessor::new(config.max_concurrent_fetches);
        Self {
            client,
            config,
            workers,
        }
    }

    /// Parses `repo_url` and collects its snapshot
    ///
    /// Fails with `InvalidReference` before any request is made when the URL
    /// is not a GitHub repository URL.
    pub async fn collect(&self, repo_url: &str) -> Result<RepositorySnapshot> {
        let reference = RepositoryReference::parse(repo_url)?;
        let deadline = self.config.deadline();

        tokio::time::timeout(deadline, self.collect_reference(&reference))
            .await
            .map_err(|_| {
                DocsError::Timeout(format!(
                    "collecting {} took longer than {}s",
                    reference, self.config.deadline_secs
                ))
            })?
    }

    /// Collects the snapshot of an already parsed reference, without a deadline
    pub async fn collect_reference(&self, reference: &RepositoryReference) -> Result<RepositorySnapshot> {
        let started = Instant::now();
        let metadata = self.client.repository(reference).await?;
        let branch = metadata.default_branch;

        let (readme_text, commits, files) = tokio::join!(
            self.readme(reference),
            self.commits(reference, &branch),
            self.files(reference, &branch),
        );
        let snapshot = RepositorySnapshot {
            repo: reference.full_name(),
            default_branch: branch,
            readme_text: readme_text?,
            commits: commits?,
            files: files?,
        };

        info!(
            repo = %reference,
            branch = %snapshot.default_branch,
            readme = snapshot.has_readme(),
            commits = snapshot.commits.len(),
            files = snapshot.files.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collected repository snapshot"
        );
        Ok(snapshot)
    }

    async fn readme(&self, reference: &RepositoryReference) -> Result<String> {
        match self.client.readme(reference).await {
            Ok(file) => Ok(file.decoded_text().unwrap_or_default()),
            Err(DocsError::GitHubApi { status, message }) => {
                debug!(repo = %reference, status, %message, "no README");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn commits(&self, reference: &RepositoryReference, branch: &str) -> Result<Vec<CommitRecord>> {
        match self
            .client
            .recent_commits(reference, branch, self.config.commit_count)
            .await
        {
            Ok(commits) => Ok(commits
                .into_iter()
                .take(self.config.commit_count)
                .map(CommitRecord::from)
                .collect()),
            Err(DocsError::GitHubApi { status, message }) => {
                warn!(repo = %reference, status, %message, "commit history unavailable");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn files(&self, reference: &RepositoryReference, branch: &str) -> Result<Vec<RepoFile>> {
        let tree = match self.client.tree(reference, branch).await {
            Ok(tree) => tree,
            Err(DocsError::GitHubApi { status, message }) => {
                warn!(repo = %reference, status, %message, "file tree unavailable");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        if tree.truncated {
            debug!(repo = %reference, "GitHub truncated the tree listing");
        }

        let paths = select_source_files(&tree.tree, &self.config.extensions, self.config.max_files);
        let tasks: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let client = self.client.clone();
                let reference = reference.clone();
                let branch = branch.to_string();
                async move {
                    let content = client.file_content(&reference, &path, &branch).await;
                    Ok::<_, DocsError>((path, content))
                }
            })
            .collect();
        debug!(
            repo = %reference,
            files = tasks.len(),
            concurrency = self.workers.max_concurrent(),
            "fetching source files"
        );

        let files = self
            .workers
            .process(tasks)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok((path, Ok(content))) => Some(RepoFile { path, content }),
                Ok((path, Err(e))) => {
                    warn!(repo = %reference, %path, error = %e, "skipping file");
                    None
                }
                Err(e) => {
                    warn!(repo = %reference, error = %e, "file fetch task failed");
                    None
                }
            })
            .collect();
        Ok(files)
    }
}

/// Picks the first `limit` blobs whose extension is in `extensions`, in tree order
pub fn select_source_files(entries: &[TreeEntry], extensions: &[String], limit: usize) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| entry.is_blob())
        .filter(|entry| has_allowed_extension(&entry.path, extensions))
        .take(limit)
        .map(|entry| entry.path.clone())
        .collect()
}

fn has_allowed_extension(path: &str, extensions: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: &str) -> TreeEntry {
        TreeEntry {
            path: path.to_string(),
            kind: kind.to_string(),
        }
    }

    fn default_extensions() -> Vec<String> {
        CollectorConfig::default().extensions
    }

    #[test]
    fn test_only_blobs_with_allowed_extensions() {
        let entries = vec![
            entry("src", "tree"),
            entry("src/index.ts", "blob"),
            entry("Cargo.toml", "blob"),
            entry("docs/GUIDE.MD", "blob"),
            entry("vendor/lib.rs", "blob"),
            entry("tools/build.py", "blob"),
            entry("modules/sub", "commit"),
            entry("Makefile", "blob"),
        ];

        let selected = select_source_files(&entries, &default_extensions(), 8);
        assert_eq!(selected, vec!["src/index.ts", "docs/GUIDE.MD", "tools/build.py"]);
    }

    #[test]
    fn test_never_more_than_limit() {
        let entries: Vec<_> = (0..50).map(|i| entry(&format!("src/file{}.js", i), "blob")).collect();

        let selected = select_source_files(&entries, &default_extensions(), 8);
        assert_eq!(selected.len(), 8);
        assert_eq!(selected[0], "src/file0.js");
        assert_eq!(selected[7], "src/file7.js");
    }

    #[test]
    fn test_extension_list_tolerates_dots() {
        let extensions = vec![".rs".to_string()];
        assert!(has_allowed_extension("src/main.rs", &extensions));
        assert!(!has_allowed_extension("src/main.rsx", &extensions));
        assert!(!has_allowed_extension("rs", &extensions));
    }
}
