//! Async file I/O utilities
//!
//! Installer steps share these so every failure carries the path and the
//! step that failed.

use crate::error_ext::ErrorContext;
use diplug_domain::error::{Error, Result};
use std::path::Path;

/// Async file utilities for the installer
pub struct FileUtils;

impl FileUtils {
    /// Create a directory and its parents
    pub async fn create_dir<P: AsRef<Path>>(path: P, context: &str) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path)
            .await
            .install_context(format!("Failed to create {context} {}", path.display()))
    }

    /// Copy `from` to `to`, failing when the source is missing
    pub async fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(
        from: P,
        to: Q,
        context: &str,
    ) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        if !tokio::fs::metadata(from).await.is_ok_and(|m| m.is_file()) {
            return Err(Error::installation(format!(
                "Missing {context} template {}",
                from.display()
            )));
        }
        tokio::fs::copy(from, to).await.install_context(format!(
            "Failed to copy {context} from {} to {}",
            from.display(),
            to.display()
        ))?;
        Ok(())
    }

    /// Rename `from` to `to`
    pub async fn rename<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q, context: &str) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        tokio::fs::rename(from, to).await.install_context(format!(
            "Failed to move {context} into place at {}",
            to.display()
        ))
    }

    /// Remove a directory tree, returning whether it existed
    pub async fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::installation_with_source(
                format!("Failed to remove {}", path.display()),
                e,
            )),
        }
    }
}
