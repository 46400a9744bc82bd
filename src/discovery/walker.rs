//! Route discovery: filesystem walk and entry construction.
//!
//! # Responsibilities
//! - Enumerate eligible route source files under the route root
//! - Apply skip rules (ignored directories, server/test-tagged files)
//! - Turn each file into a `RouteEntry` via method parsing, URL building,
//!   and content hashing
//!
//! # Design Decisions
//! - Traversal is depth-first with per-directory name sorting, so the result
//!   order is stable for a given filesystem state
//! - One bad file never fails the whole scan: it is logged and skipped
//!   (unless `strict_methods` is set, in which case an unknown method aborts)
//! - Handler modules are referenced as `file://` URLs so the artifact stays
//!   resolution-strategy agnostic

use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::DiscoveryConfig;
use crate::discovery::method::{parse_base_name, UnknownMethod};
use crate::discovery::path::{build_url_path, to_kebab_case};
use crate::hash::hash_file;
use crate::table::{HandlerType, RouteEntry};

/// Errors that abort a discovery pass as a whole.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The route root itself could not be resolved or read.
    #[error("route root {path} is not accessible")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory inside the walk could not be read.
    #[error("failed to read directory {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A route file's contents could not be hashed.
    #[error("failed to hash {path}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict mode only: a file declared a method outside the fixed set.
    #[error(transparent)]
    UnknownMethod(#[from] UnknownMethod),
}

/// Walks a route root and produces route entries in traversal order.
#[derive(Debug, Clone)]
pub struct RouteDiscoverer {
    root: PathBuf,
    extensions: Vec<String>,
    ignore_dirs: Vec<String>,
    strict_methods: bool,
}

impl RouteDiscoverer {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            root: config.root.clone(),
            extensions: config.extensions.clone(),
            ignore_dirs: config.ignore_dirs.clone(),
            strict_methods: config.strict_methods,
        }
    }

    /// The configured route root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run a full discovery pass.
    pub async fn discover(&self) -> Result<Vec<RouteEntry>, DiscoveryError> {
        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|source| DiscoveryError::Root {
                path: self.root.clone(),
                source,
            })?;

        let files = self.collect_files(&root).await?;
        let mut entries = Vec::with_capacity(files.len());

        for file in files {
            match self.entry_for(&root, &file).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(DiscoveryError::UnknownMethod(err)) if self.strict_methods => {
                    return Err(err.into());
                }
                Err(err) => {
                    tracing::warn!(
                        file = %file.display(),
                        error = %err,
                        "Skipping route file"
                    );
                }
            }
        }

        tracing::debug!(
            root = %root.display(),
            routes = entries.len(),
            "Route discovery finished"
        );
        Ok(entries)
    }

    /// Depth-first walk, directories and files visited in name order.
    async fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut read_dir =
                tokio::fs::read_dir(&dir)
                    .await
                    .map_err(|source| DiscoveryError::Walk {
                        path: dir.clone(),
                        source,
                    })?;

            let mut dirs_here = Vec::new();
            let mut files_here = Vec::new();

            while let Some(item) = read_dir
                .next_entry()
                .await
                .map_err(|source| DiscoveryError::Walk {
                    path: dir.clone(),
                    source,
                })?
            {
                let path = item.path();
                let file_type = match item.file_type().await {
                    Ok(t) => t,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "Unreadable entry");
                        continue;
                    }
                };

                if file_type.is_dir() {
                    if !self.is_ignored_dir(&path) {
                        dirs_here.push(path);
                    }
                } else if file_type.is_file() && self.is_eligible_file(&path) {
                    files_here.push(path);
                }
            }

            files_here.sort();
            files.extend(files_here);

            // Reverse so the stack pops directories in name order.
            dirs_here.sort();
            dirs_here.reverse();
            pending.extend(dirs_here);
        }

        Ok(files)
    }

    fn is_ignored_dir(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.ignore_dirs.iter().any(|d| d == name))
            .unwrap_or(true)
    }

    /// Extension must be in the eligible set; eligibility of the base name
    /// (skip tags) is checked separately so it can be logged.
    pub fn is_eligible_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Build the entry for one file, or `None` if the file is skipped by
    /// convention.
    async fn entry_for(
        &self,
        root: &Path,
        file: &Path,
    ) -> Result<Option<RouteEntry>, DiscoveryError> {
        let base_name = match file.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name,
            None => return Ok(None),
        };

        if is_skip_tagged(base_name) {
            tracing::debug!(file = %file.display(), "Skipping server/test-tagged file");
            return Ok(None);
        }

        let (method, route_name) = parse_base_name(base_name)?;

        let relative_dir = file
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .unwrap_or(Path::new(""));
        let segments: Vec<String> = relative_dir
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .map(String::from)
            .collect();

        let (module, sub_segments) = match segments.split_first() {
            Some((module, rest)) => (Some(module.as_str()), rest),
            None => (None, &[] as &[String]),
        };

        let url = build_url_path(module, sub_segments, route_name);

        let file_hash = hash_file(file).await.map_err(|source| DiscoveryError::Hash {
            path: file.to_path_buf(),
            source,
        })?;

        let handler_module = match Url::from_file_path(file) {
            Ok(url) => url.to_string(),
            Err(()) => {
                tracing::warn!(file = %file.display(), "Cannot express file as a module URL");
                return Ok(None);
            }
        };

        Ok(Some(RouteEntry {
            name: to_kebab_case(route_name),
            url,
            method,
            file_path: file.to_path_buf(),
            file_hash,
            handler_type: HandlerType::DynamicImport,
            handler_module,
        }))
    }
}

/// A base name carrying a bracketed `server` or `test` tag is excluded from
/// discovery, e.g. `helpers.[server].rs` or `users.[test].rs`.
fn is_skip_tagged(base_name: &str) -> bool {
    let mut rest = base_name;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) => {
                let tag = after[..close].to_ascii_lowercase();
                if tag.contains("server") || tag.contains("test") {
                    return true;
                }
                rest = &after[close + 1..];
            }
            None => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_tags_match_server_and_test() {
        assert!(is_skip_tagged("helpers.[server]"));
        assert!(is_skip_tagged("users.[test]"));
        assert!(is_skip_tagged("users.[unit-test]"));
        assert!(is_skip_tagged("[server-only].setup"));
        assert!(!is_skip_tagged("users.get"));
        assert!(!is_skip_tagged("bracket[only"));
        assert!(!is_skip_tagged("tagged.[cache]"));
    }

    #[test]
    fn eligibility_follows_configured_extensions() {
        let discoverer = RouteDiscoverer::new(&DiscoveryConfig::default());
        assert!(discoverer.is_eligible_file(Path::new("/r/users.get.rs")));
        assert!(!discoverer.is_eligible_file(Path::new("/r/users.get.txt")));
        assert!(!discoverer.is_eligible_file(Path::new("/r/Makefile")));
    }
}
