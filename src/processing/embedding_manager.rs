//! Embedding model management for downloading and managing Model2Vec models

use crate::error::{Result, ResumeScorerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files StaticModel needs in a local model directory
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Information about a known embedding model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

fn known_models() -> Vec<EmbeddingModelInfo> {
    let entry = |id: &str, name: &str, repo_id: &str, size_mb, dimensions, description: &str| {
        EmbeddingModelInfo {
            id: id.to_string(),
            name: name.to_string(),
            repo_id: repo_id.to_string(),
            size_mb,
            dimensions,
            description: description.to_string(),
        }
    };

    vec![
        entry(
            "potion-base-8M",
            "Potion Base 8M",
            "minishlab/potion-base-8M",
            33,
            256,
            "High-quality Model2Vec embeddings with 8M parameters",
        ),
        entry(
            "m2v-base",
            "Model2Vec Base",
            "minishlab/M2V_base_output",
            90,
            256,
            "Model2Vec base embeddings distilled from bge-base",
        ),
        entry(
            "m2v-large",
            "Model2Vec Large",
            "minishlab/M2V_large_output",
            250,
            512,
            "Higher-capacity Model2Vec embeddings",
        ),
    ]
}

/// Manager for embedding models: download, lookup and removal
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: Vec<EmbeddingModelInfo>,
    downloaded_models: BTreeSet<String>,
}

impl EmbeddingModelManager {
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&models_dir).await.map_err(|e| {
            ResumeScorerError::ModelError(format!("Failed to create models directory: {}", e))
        })?;

        let mut manager = Self {
            models_dir,
            available_models: known_models(),
            downloaded_models: BTreeSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Download a known model from the Hugging Face Hub into the models directory
    pub async fn download_model(&mut self, model: &str, force: bool) -> Result<PathBuf> {
        let info = self
            .model_info(model)
            .cloned()
            .ok_or_else(|| ResumeScorerError::ModelNotFound(model.to_string()))?;

        let model_dir = self.models_dir.join(&info.id);
        if !force && self.downloaded_models.contains(&info.id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            info.name, info.size_mb, info.repo_id
        );
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new().map_err(|e| {
            ResumeScorerError::ModelError(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.model(info.repo_id.clone());

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                ResumeScorerError::ModelError(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("Downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not available: {}", file, e),
            }
        }

        self.downloaded_models.insert(info.id.clone());
        Ok(model_dir)
    }

    pub async fn remove_model(&mut self, model: &str) -> Result<PathBuf> {
        let id = self
            .resolve_model_id(model)
            .unwrap_or_else(|| model.to_string());

        if !self.downloaded_models.contains(&id) {
            return Err(ResumeScorerError::ModelNotFound(format!(
                "{} is not downloaded",
                model
            )));
        }

        let model_dir = self.models_dir.join(&id);
        fs::remove_dir_all(&model_dir).await?;
        self.downloaded_models.remove(&id);
        Ok(model_dir)
    }

    /// Local path of a downloaded model, by id or by directory name
    pub fn model_path(&self, model: &str) -> Option<PathBuf> {
        let id = self
            .resolve_model_id(model)
            .unwrap_or_else(|| model.to_string());
        self.downloaded_models
            .contains(&id)
            .then(|| self.models_dir.join(id))
    }

    pub async fn ensure_model_available(&mut self, model: &str) -> Result<PathBuf> {
        match self.model_path(model) {
            Some(path) => Ok(path),
            None => self.download_model(model, false).await,
        }
    }

    pub fn list_available_models(&self) -> &[EmbeddingModelInfo] {
        &self.available_models
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        self.downloaded_models.iter().cloned().collect()
    }

    pub fn is_model_downloaded(&self, model: &str) -> bool {
        self.model_path(model).is_some()
    }

    /// Preferred downloaded model, or the recommended default when none are present
    pub fn auto_select_model(&self) -> String {
        self.available_models
            .iter()
            .find(|m| self.downloaded_models.contains(&m.id))
            .map(|m| m.id.clone())
            .or_else(|| self.downloaded_models.iter().next().cloned())
            .unwrap_or_else(|| "potion-base-8M".to_string())
    }

    pub fn model_info(&self, model: &str) -> Option<&EmbeddingModelInfo> {
        let id = self.resolve_model_id(model)?;
        self.available_models.iter().find(|m| m.id == id)
    }

    /// Resolve model ID from id, repo id or display name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|m| {
                m.id.to_lowercase() == input_lower
                    || m.repo_id.to_lowercase() == input_lower
                    || m.name.to_lowercase() == input_lower
            })
            .map(|m| m.id.clone())
    }
}

async fn is_model_directory(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fake_model(root: &Path, id: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).await.unwrap();
        for file in REQUIRED_FILES {
            fs::write(dir.join(file), b"{}").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_manager_creation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.list_available_models().len(), 3);
        assert!(manager.list_downloaded_models().is_empty());
        assert_eq!(manager.auto_select_model(), "potion-base-8M");
    }

    #[tokio::test]
    async fn test_scan_picks_up_complete_directories_only() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "m2v-base").await;
        fs::create_dir_all(temp_dir.path().join("half-done")).await.unwrap();
        fs::write(temp_dir.path().join("half-done").join("tokenizer.json"), b"{}")
            .await
            .unwrap();

        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.list_downloaded_models(), vec!["m2v-base"]);
        assert!(manager.is_model_downloaded("Model2Vec Base"));
        assert_eq!(manager.auto_select_model(), "m2v-base");
        assert_eq!(
            manager.model_path("minishlab/M2V_base_output"),
            Some(temp_dir.path().join("m2v-base"))
        );
    }

    #[tokio::test]
    async fn test_remove_model() {
        let temp_dir = TempDir::new().unwrap();
        fake_model(temp_dir.path(), "potion-base-8M").await;
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        let removed = manager.remove_model("potion-base-8M").await.unwrap();

        assert!(!removed.exists());
        assert!(!manager.is_model_downloaded("potion-base-8M"));
        assert!(manager.remove_model("potion-base-8M").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-8M"),
            Some("potion-base-8M".to_string())
        );
        assert_eq!(manager.resolve_model_id("potion base 8m"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("POTION-BASE-8m"), Some("potion-base-8M".to_string()));
        assert_eq!(
            manager.resolve_model_id("MinishLab/M2V_Base_Output"),
            Some("m2v-base".to_string())
        );
        assert_eq!(manager.resolve_model_id("unknown"), None);
        assert!(manager.model_info("m2v-large").is_some());
    }

    #[tokio::test]
    async fn test_download_unknown_model_fails_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EmbeddingModelManager::new(temp_dir.path().to_path_buf())
            .await
            .unwrap();

        let err = manager.download_model("no-such-model", false).await.unwrap_err();
        assert!(matches!(err, ResumeScorerError::ModelNotFound(_)));
    }
}
