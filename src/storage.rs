//! On-disk storage for submitted solution files.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::AppResult;

const FALLBACK_NAME: &str = "upload";

/// Reduces `name` to a single safe path component.
///
/// Whitespace becomes `_`, anything outside `[A-Za-z0-9._-]` is dropped and
/// leading dots are stripped, so the result can never escape its directory.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.').trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct SolutionStorage {
    root: PathBuf,
}

impl SolutionStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `<root>/<course>/<homework>/<uuid>-<filename>`.
    pub async fn store(
        &self,
        course_name: &str,
        homework_name: &str,
        filename: &str,
        contents: &[u8],
    ) -> AppResult<PathBuf> {
        let directory = self
            .root
            .join(sanitize_component(course_name))
            .join(sanitize_component(homework_name));
        tokio::fs::create_dir_all(&directory).await?;

        let path = directory.join(format!("{}-{}", Uuid::new_v4(), sanitize_component(filename)));
        tokio::fs::write(&path, contents).await?;

        log::info!("Stored {} bytes at {}", contents.len(), path.display());
        Ok(path)
    }

    /// Best effort: files already gone are ignored, other failures are logged.
    pub async fn remove_all(&self, paths: &[String]) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => log::debug!("Removed solution file {}", path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Could not remove solution file {}: {}", path, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("report.pdf"), "report.pdf");
        assert_eq!(sanitize_component("my report.pdf"), "my_report.pdf");
        assert_eq!(sanitize_component("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_component("..."), FALLBACK_NAME);
        assert_eq!(sanitize_component(""), FALLBACK_NAME);
        assert_eq!(sanitize_component("ÁrvíztűrőTükörfúrógép"), "rvztrTkrfrgp");
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let root = std::env::temp_dir().join(format!("homework-storage-{}", Uuid::new_v4()));
        let storage = SolutionStorage::new(&root);

        let path = storage
            .store("Course 1", "Homework/1", "answer.txt", b"42")
            .await
            .unwrap();

        assert!(path.starts_with(root.join("Course_1").join("Homework1")));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("-answer.txt")));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"42");

        let stored = path.to_string_lossy().to_string();
        storage.remove_all(&[stored.clone(), stored]).await;
        assert!(!path.exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
