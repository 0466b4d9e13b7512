//! Configuration management for the resume scorer

use crate::error::{Result, ResumeScorerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub processing: ProcessingConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub batch_size: usize,
    pub enable_caching: bool,
    /// Characters that end a sentence when segmenting resume and job text
    pub sentence_delimiters: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub score_mode: ScoreMode,
    pub strength_threshold: f32,
    pub improvement_floor: f32,
    pub max_strengths: usize,
    pub max_improvements: usize,
    pub max_gaps: usize,
    pub relevant_threshold: f32,
    pub relevant_top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreMode {
    /// Whole resume against whole job description
    Document,
    /// Mean of each requirement's best sentence match
    RequirementCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-scorer")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                default_embedding_model: "potion-base-8M".to_string(),
            },
            processing: ProcessingConfig {
                batch_size: 32,
                enable_caching: true,
                sentence_delimiters: ".".to_string(),
            },
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            score_mode: ScoreMode::Document,
            strength_threshold: 0.6,
            improvement_floor: 0.4,
            max_strengths: 5,
            max_improvements: 3,
            max_gaps: 3,
            relevant_threshold: 0.3,
            relevant_top_k: 3,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                ResumeScorerError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scorer")
            .join("config.toml")
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        for (name, value) in [
            ("analysis.strength_threshold", analysis.strength_threshold),
            ("analysis.improvement_floor", analysis.improvement_floor),
            ("analysis.relevant_threshold", analysis.relevant_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ResumeScorerError::Configuration(format!(
                    "{} must be within [-1, 1], got {}",
                    name, value
                )));
            }
        }

        if analysis.improvement_floor > analysis.strength_threshold {
            return Err(ResumeScorerError::Configuration(format!(
                "analysis.improvement_floor ({}) exceeds analysis.strength_threshold ({})",
                analysis.improvement_floor, analysis.strength_threshold
            )));
        }

        if self.processing.batch_size == 0 {
            return Err(ResumeScorerError::Configuration(
                "processing.batch_size must be greater than zero".to_string(),
            ));
        }

        if self.processing.sentence_delimiters.is_empty() {
            return Err(ResumeScorerError::Configuration(
                "processing.sentence_delimiters must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Set a dotted key such as `analysis.strength_threshold`.
    ///
    /// The value is parsed against the type of the existing entry, so a
    /// float key rejects `"high"` and an enum key only accepts its variants.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut tree = toml::Value::try_from(&*self).map_err(|e| {
            ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        let (section, field) = key.split_once('.').ok_or_else(|| {
            ResumeScorerError::Configuration(format!(
                "Key must be of the form section.field: {}",
                key
            ))
        })?;

        let slot = tree
            .get_mut(section)
            .and_then(|s| s.get_mut(field))
            .ok_or_else(|| ResumeScorerError::Configuration(format!("Unknown key: {}", key)))?;

        *slot = match slot {
            toml::Value::String(_) => toml::Value::String(value.to_string()),
            toml::Value::Integer(_) => toml::Value::Integer(value.parse().map_err(|_| {
                ResumeScorerError::Configuration(format!("{} expects an integer", key))
            })?),
            toml::Value::Float(_) => toml::Value::Float(value.parse().map_err(|_| {
                ResumeScorerError::Configuration(format!("{} expects a number", key))
            })?),
            toml::Value::Boolean(_) => toml::Value::Boolean(value.parse().map_err(|_| {
                ResumeScorerError::Configuration(format!("{} expects true or false", key))
            })?),
            _ => {
                return Err(ResumeScorerError::Configuration(format!(
                    "{} cannot be set from the command line",
                    key
                )))
            }
        };

        let updated: Config = tree.try_into().map_err(|e| {
            ResumeScorerError::Configuration(format!("Invalid value for {}: {}", key, e))
        })?;
        updated.validate()?;

        *self = updated;
        Ok(())
    }
}
