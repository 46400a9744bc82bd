//! Route table data model and artifact format.
//!
//! # Responsibilities
//! - Define `RouteEntry` and the ordered `RouteTable`
//! - Serialize to / deserialize from the persisted JSON artifact
//! - Validate entry shape beyond what serde enforces
//! - Apply the duplicate `(method, url)` policy when assembling a table
//!
//! # Design Decisions
//! - Artifact field names are camelCase; unknown extra fields are ignored,
//!   missing required fields or an out-of-set method reject the entry
//! - Duplicate `(method, url)` pairs: first in discovery order wins, later
//!   ones are logged and dropped
//! - Tables are immutable once assembled; consumers swap whole snapshots

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::discovery::method::HttpMethod;

/// Handler resolution strategy recorded in the artifact.
///
/// Only dynamic import exists today; the tag keeps the artifact format open
/// for other strategies without a schema break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerType {
    #[serde(rename = "dynamic-import")]
    DynamicImport,
}

/// One discovered route: a method + URL pattern backed by a handler module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// Normalized route identifier (lower-kebab-case of the route name).
    pub name: String,

    /// Absolute URL pattern with `:name` parameter segments.
    pub url: String,

    /// HTTP method from the fixed set.
    pub method: HttpMethod,

    /// Absolute path to the source file defining the route.
    pub file_path: PathBuf,

    /// Hex SHA-256 of `file_path`'s contents at last discovery.
    pub file_hash: String,

    /// Resolution strategy tag, always `dynamic-import`.
    pub handler_type: HandlerType,

    /// Opaque resolvable reference to the handler module (`file://` URL).
    pub handler_module: String,
}

/// A persisted or deserialized entry failed shape validation.
#[derive(Debug, Error)]
pub enum EntryInvalid {
    #[error("entry {name:?} has a non-absolute or non-normalized url {url:?}")]
    MalformedUrl { name: String, url: String },

    #[error("entry {name:?} has an empty file hash")]
    EmptyHash { name: String },

    #[error("entry {name:?} has an empty handler module reference")]
    EmptyModuleRef { name: String },
}

impl RouteEntry {
    /// Shape checks beyond serde's type and method-membership enforcement.
    pub fn validate(&self) -> Result<(), EntryInvalid> {
        let normalized = crate::discovery::path::normalize_url(&self.url);
        if self.url != normalized {
            return Err(EntryInvalid::MalformedUrl {
                name: self.name.clone(),
                url: self.url.clone(),
            });
        }
        if self.file_hash.is_empty() {
            return Err(EntryInvalid::EmptyHash {
                name: self.name.clone(),
            });
        }
        if self.handler_module.is_empty() {
            return Err(EntryInvalid::EmptyModuleRef {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// The ordered collection of route entries currently considered
/// authoritative. Order is discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Assemble a table from entries in discovery order, applying the
    /// duplicate policy: first `(method, url)` wins, later ones are dropped
    /// with a warning.
    pub fn from_entries(entries: Vec<RouteEntry>) -> Self {
        let mut seen: HashSet<(HttpMethod, String)> = HashSet::with_capacity(entries.len());
        let mut kept = Vec::with_capacity(entries.len());

        for entry in entries {
            if seen.insert((entry.method, entry.url.clone())) {
                kept.push(entry);
            } else {
                tracing::warn!(
                    method = %entry.method,
                    url = %entry.url,
                    file = %entry.file_path.display(),
                    "Duplicate route skipped; an earlier file already claims this method and URL"
                );
            }
        }

        Self { entries: kept }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its `(method, url)` pair.
    pub fn get(&self, method: HttpMethod, url: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|e| e.method == method && e.url == url)
    }

    /// Whether any entry is sourced from `path`.
    pub fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.file_path == path)
    }

    /// Validate every entry's shape; used when adopting a persisted table.
    pub fn validate(&self) -> Result<(), EntryInvalid> {
        for entry in &self.entries {
            entry.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(method: HttpMethod, url: &str, file: &str) -> RouteEntry {
        RouteEntry {
            name: "test".into(),
            url: url.into(),
            method,
            file_path: PathBuf::from(file),
            file_hash: "abc123".into(),
            handler_type: HandlerType::DynamicImport,
            handler_module: format!("file://{file}"),
        }
    }

    #[test]
    fn artifact_round_trips_with_camel_case_fields() {
        let original = entry(HttpMethod::Post, "/users", "/tmp/users.post.rs");
        let json = serde_json::to_string(&original).unwrap();

        assert!(json.contains("\"filePath\""));
        assert!(json.contains("\"fileHash\""));
        assert!(json.contains("\"handlerType\":\"dynamic-import\""));
        assert!(json.contains("\"method\":\"POST\""));

        let back: RouteEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let json = r#"{
            "name": "users",
            "url": "/users",
            "method": "GET",
            "filePath": "/tmp/users.rs",
            "fileHash": "deadbeef",
            "handlerType": "dynamic-import",
            "handlerModule": "file:///tmp/users.rs",
            "somethingNew": 42
        }"#;
        assert!(serde_json::from_str::<RouteEntry>(json).is_ok());
    }

    #[test]
    fn missing_field_or_bad_method_is_rejected() {
        let missing = r#"{
            "name": "users",
            "url": "/users",
            "method": "GET",
            "filePath": "/tmp/users.rs",
            "handlerType": "dynamic-import",
            "handlerModule": "file:///tmp/users.rs"
        }"#;
        assert!(serde_json::from_str::<RouteEntry>(missing).is_err());

        let bad_method = r#"{
            "name": "users",
            "url": "/users",
            "method": "FETCH",
            "filePath": "/tmp/users.rs",
            "fileHash": "deadbeef",
            "handlerType": "dynamic-import",
            "handlerModule": "file:///tmp/users.rs"
        }"#;
        assert!(serde_json::from_str::<RouteEntry>(bad_method).is_err());
    }

    #[test]
    fn duplicate_method_url_pairs_keep_the_first_entry() {
        let table = RouteTable::from_entries(vec![
            entry(HttpMethod::Get, "/users", "/tmp/a/users.get.rs"),
            entry(HttpMethod::Get, "/users", "/tmp/b/users.get.rs"),
            entry(HttpMethod::Post, "/users", "/tmp/a/users.post.rs"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(HttpMethod::Get, "/users").unwrap().file_path,
            PathBuf::from("/tmp/a/users.get.rs")
        );
    }

    #[test]
    fn malformed_url_fails_validation() {
        let bad = entry(HttpMethod::Get, "users/", "/tmp/users.rs");
        assert!(bad.validate().is_err());

        let good = entry(HttpMethod::Get, "/users", "/tmp/users.rs");
        assert!(good.validate().is_ok());
    }
}
