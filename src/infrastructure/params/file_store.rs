use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::{ChatbotParams, DomainError, ParamsUpdate};

/// `params.json` on disk, read fresh on every `load`
///
/// Writes go through a temporary sibling file and a rename so readers never
/// observe a half-written document.
#[derive(Debug)]
pub struct ParamsFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ParamsFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    pub async fn load(&self) -> Result<ChatbotParams, DomainError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::not_found(format!(
                    "Params file {} not found; create it with `update-config --preset <name>`",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let params: ChatbotParams = serde_json::from_str(&raw).map_err(|e| {
            DomainError::schema(format!("Invalid params file {}: {}", self.path.display(), e))
        })?;
        params.ensure_valid()?;

        debug!(path = %self.path.display(), with_rag = params.with_rag, "Loaded params");
        Ok(params)
    }

    pub async fn save(&self, params: &ChatbotParams) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        self.write(params).await
    }

    /// Rewrite only the given keys; the result is validated before it is written
    pub async fn update(&self, update: ParamsUpdate) -> Result<ChatbotParams, DomainError> {
        let _guard = self.write_lock.lock().await;

        let mut params = self.load().await?;
        params.apply(update)?;
        self.write(&params).await?;

        info!(path = %self.path.display(), "Updated params");
        Ok(params)
    }

    async fn write(&self, params: &ChatbotParams) -> Result<(), DomainError> {
        params.ensure_valid()?;

        let body = serde_json::to_string_pretty(params)
            .map_err(|e| DomainError::internal(format!("Failed to encode params: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Preset;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamsFileStore::new(dir.path().join("params.json"));

        let params = Preset::Mistral.params();
        store.save(&params).await.unwrap();

        assert_eq!(store.load().await.unwrap(), params);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"emb_model\""));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamsFileStore::new(dir.path().join("params.json"));

        assert!(!store.exists().await);
        assert!(matches!(store.load().await, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_touches_only_given_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamsFileStore::new(dir.path().join("params.json"));
        store.save(&Preset::Alibaba.params()).await.unwrap();

        let updated = store
            .update(ParamsUpdate {
                k: Some(3),
                with_rag: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.k, 3);
        assert!(!updated.with_rag);
        assert_eq!(updated.emb_model, Preset::Alibaba.params().emb_model);
        assert_eq!(store.load().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParamsFileStore::new(dir.path().join("params.json"));
        store.save(&Preset::Alibaba.params()).await.unwrap();

        let result = store
            .update(ParamsUpdate {
                k: Some(0),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(store.load().await.unwrap().k, 5);
    }

    #[tokio::test]
    async fn test_file_without_prompt_style_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(
            &path,
            r#"{"emb_model":"hash:64","faiss_idx_path":"idx","k":2,"chatbot_model":"c","judge_model":"j","with_rag":true}"#,
        )
        .unwrap();

        let params = ParamsFileStore::new(path).load().await.unwrap();
        assert_eq!(params.k, 2);
        assert_eq!(params.prompt_style, crate::domain::PromptStyle::Strict);
    }
}
