use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use consorciatech_application::SecurityRulesStore;
use consorciatech_core::{AppError, AppResult};

/// Security rules file replaced atomically through a sibling temp file.
pub struct FilesystemSecurityRulesStore {
    path: PathBuf,
}

impl FilesystemSecurityRulesStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "rules".into());
        file_name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        self.path.with_file_name(file_name)
    }
}

#[async_trait]
impl SecurityRulesStore for FilesystemSecurityRulesStore {
    async fn overwrite(&self, rules: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| io_error("create security rules directory", parent, error))?;
        }

        let temp_path = self.temp_path();
        if let Err(error) = tokio::fs::write(&temp_path, rules.as_bytes()).await {
            return Err(io_error("write security rules", &temp_path, error));
        }

        if let Err(error) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_error("replace security rules", &self.path, error));
        }

        info!(path = %self.path.display(), bytes = rules.len(), "security rules updated");
        Ok(())
    }
}

fn io_error(operation: &str, path: &Path, error: std::io::Error) -> AppError {
    AppError::Internal(format!("failed to {operation} at '{}': {error}", path.display()))
}

#[cfg(test)]
mod tests {
    use consorciatech_application::SecurityRulesStore;

    use super::FilesystemSecurityRulesStore;

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("consorciatech-rules-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn rules_are_written_and_replaced() {
        let directory = scratch_dir();
        let path = directory.join("nested").join("firestore.rules");
        let store = FilesystemSecurityRulesStore::new(&path);

        assert!(store.overwrite("rules_version = '1';").await.is_ok());
        assert!(store.overwrite("rules_version = '2';").await.is_ok());

        let contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        assert_eq!(contents, "rules_version = '2';");

        let mut entries = tokio::fs::read_dir(directory.join("nested"))
            .await
            .unwrap_or_else(|error| panic!("{error}"));
        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name());
        }
        assert_eq!(names.len(), 1);

        let _ = tokio::fs::remove_dir_all(&directory).await;
    }

    #[tokio::test]
    async fn unwritable_target_reports_internal_error() {
        let directory = scratch_dir();
        assert!(tokio::fs::create_dir_all(&directory).await.is_ok());
        let store = FilesystemSecurityRulesStore::new(&directory);

        assert!(store.overwrite("rules").await.is_err());

        let _ = tokio::fs::remove_dir_all(&directory).await;
    }
}
