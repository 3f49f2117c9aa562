// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-service log destination registry.
//!
//! The registry owns the mapping from service name to its single
//! [`Destination`]. Entries are created lazily on first reference, cached
//! for the life of the process, and never evicted or rotated (retention is
//! out of scope). Lookup is reference-stable: the same name always resolves
//! to the same `Arc<Destination>`.
//!
//! # Concurrency
//!
//! The map sits behind a `tokio::sync::RwLock`: lookups of existing
//! entries take the read lock and do not serialize against each other,
//! while first-creation takes the write lock and re-checks the map so a
//! race between two callers for a new name still creates exactly one
//! destination. Each destination serializes its own appends with a
//! per-destination mutex around the file handle, so writers to different
//! services never contend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::constants::LOG_FILE_EXTENSION;
use crate::error::LogStoreError;

/// Checks that a service name is usable as a registry key and filename.
///
/// Non-empty, and free of path separators and `..`, so the derived path
/// `<root>/<service>.log` can never escape the log root. The filesystem
/// path is always derived, never supplied by the caller.
pub fn validate_service_name(service: &str) -> Result<(), LogStoreError> {
    if service.is_empty() {
        return Err(LogStoreError::InvalidArgument(
            "service name must not be empty".to_string(),
        ));
    }
    if service.contains('/') || service.contains('\\') || service.contains("..") {
        return Err(LogStoreError::InvalidArgument(format!(
            "service name '{service}' must not contain path separators or '..'"
        )));
    }
    Ok(())
}

/// The append-only log resource for one service.
///
/// Bound 1:1 to a service name and to exactly one file path derived from
/// it. Created by [`DestinationRegistry::get`] on first reference and then
/// shared; the file handle is never closed or rotated by this crate.
#[derive(Debug)]
pub struct Destination {
    service: String,
    path: PathBuf,
    writer: Mutex<File>,
}

impl Destination {
    /// The service this destination belongs to.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The derived file path under the log root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one rendered line (newline added here) to the file.
    ///
    /// The line and its terminator are written with a single `write_all`
    /// under the per-destination mutex, so concurrent appends to the same
    /// destination never interleave bytes and a cancelled caller never
    /// leaves a partial line behind the flush.
    pub async fn append_line(&self, line: &str) -> Result<(), LogStoreError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(buf.as_bytes())
            .await
            .map_err(|e| LogStoreError::io("append a log line", &self.service, e))?;
        writer
            .flush()
            .await
            .map_err(|e| LogStoreError::io("flush the log file", &self.service, e))
    }
}

/// Process-wide mapping from service name to [`Destination`].
///
/// Constructor-injected, never an ambient singleton: the server builds one
/// at startup and hands it to the ingestion and retrieval engines, and
/// tests build a fresh one over a temp directory.
#[derive(Debug)]
pub struct DestinationRegistry {
    root: PathBuf,
    destinations: RwLock<HashMap<String, Arc<Destination>>>,
}

impl DestinationRegistry {
    /// Creates a registry rooted at `root`. The directory itself is only
    /// created on the first destination open, not here.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DestinationRegistry {
            root: root.into(),
            destinations: RwLock::new(HashMap::new()),
        }
    }

    /// The configured log root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file path derived for a service name: `<root>/<service>.log`.
    #[must_use]
    pub fn log_path(&self, service: &str) -> PathBuf {
        self.root
            .join(format!("{service}.{LOG_FILE_EXTENSION}"))
    }

    /// Resolves the destination for `service`, opening it on first use.
    ///
    /// The same name always returns the same `Arc` for the remainder of
    /// the process. On first reference the log root directory is created
    /// if absent and the file is opened in append+create mode; on failure
    /// nothing is cached, so a later call retries the open.
    pub async fn get(&self, service: &str) -> Result<Arc<Destination>, LogStoreError> {
        validate_service_name(service)?;

        // Fast path: cached entries only need the read lock.
        if let Some(destination) = self.destinations.read().await.get(service) {
            return Ok(Arc::clone(destination));
        }

        let mut destinations = self.destinations.write().await;
        // Re-check under the write lock: another caller may have won the
        // race while we waited.
        if let Some(destination) = destinations.get(service) {
            return Ok(Arc::clone(destination));
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| LogStoreError::io("create the log root directory", service, e))?;

        let path = self.log_path(service);
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .await
            .map_err(|e| LogStoreError::io("open the log file", service, e))?;

        debug!("Opened log destination for service '{service}' at {path:?}");

        let destination = Arc::new(Destination {
            service: service.to_string(),
            path,
            writer: Mutex::new(file),
        });
        destinations.insert(service.to_string(), Arc::clone(&destination));
        Ok(destination)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_service_name_accepts_ordinary_names() {
        assert!(validate_service_name("payments").is_ok());
        assert!(validate_service_name("test_service").is_ok());
        assert!(validate_service_name("api-v2").is_ok());
    }

    #[test]
    fn test_validate_service_name_rejects_empty() {
        assert!(validate_service_name("").is_err());
    }

    #[test]
    fn test_validate_service_name_rejects_path_escapes() {
        assert!(validate_service_name("../etc/passwd").is_err());
        assert!(validate_service_name("a/b").is_err());
        assert!(validate_service_name("a\\b").is_err());
        assert!(validate_service_name("..").is_err());
    }

    #[tokio::test]
    async fn test_get_creates_root_and_file_on_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("logs");
        let registry = DestinationRegistry::new(&root);

        assert!(!root.exists());
        let destination = registry.get("svc").await.unwrap();

        assert!(root.is_dir());
        assert!(destination.path().is_file());
        assert_eq!(destination.path(), root.join("svc.log"));
        assert_eq!(destination.service(), "svc");
    }

    #[tokio::test]
    async fn test_get_is_reference_stable() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DestinationRegistry::new(dir.path());

        let first = registry.get("svc").await.unwrap();
        let second = registry.get("svc").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_get_distinct_services_get_distinct_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DestinationRegistry::new(dir.path());

        let a = registry.get("service_a").await.unwrap();
        let b = registry.get("service_b").await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_concurrent_get_for_new_service_creates_one_destination() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(DestinationRegistry::new(dir.path()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(
                async move { registry.get("contended").await },
            ));
        }

        let mut destinations = Vec::new();
        for handle in handles {
            destinations.push(handle.await.unwrap().unwrap());
        }
        for destination in &destinations[1..] {
            assert!(Arc::ptr_eq(&destinations[0], destination));
        }
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_names_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DestinationRegistry::new(dir.path());

        let err = registry.get("").await.unwrap_err();
        assert!(err.is_invalid_argument());
        let err = registry.get("../sneaky").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_open_failure_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DestinationRegistry::new(dir.path());

        // A directory squatting on the derived path makes the open fail.
        tokio::fs::create_dir(dir.path().join("blocked.log"))
            .await
            .unwrap();
        let err = registry.get("blocked").await.unwrap_err();
        assert!(matches!(err, LogStoreError::Io { .. }));

        // Clearing the obstruction lets a later call succeed, proving the
        // failure was not cached.
        tokio::fs::remove_dir(dir.path().join("blocked.log"))
            .await
            .unwrap();
        assert!(registry.get("blocked").await.is_ok());
    }

    #[tokio::test]
    async fn test_append_line_terminates_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let registry = DestinationRegistry::new(dir.path());

        let destination = registry.get("svc").await.unwrap();
        destination.append_line("first").await.unwrap();
        destination.append_line("second").await.unwrap();

        let contents = std::fs::read_to_string(destination.path()).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_reopened_registry_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();

        {
            let registry = DestinationRegistry::new(dir.path());
            let destination = registry.get("svc").await.unwrap();
            destination.append_line("from first process").await.unwrap();
        }

        // A fresh registry (new process) must append, not truncate.
        let registry = DestinationRegistry::new(dir.path());
        let destination = registry.get("svc").await.unwrap();
        destination.append_line("from second process").await.unwrap();

        let contents = std::fs::read_to_string(destination.path()).unwrap();
        assert_eq!(contents, "from first process\nfrom second process\n");
    }
}
