//! Integration tests for input handling and configuration

use resume_scorer::config::{Config, ScoreMode};
use resume_scorer::error::ResumeScorerError;
use resume_scorer::input::InputManager;
use std::path::Path;
use tempfile::TempDir;

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text = manager.extract_text(path).await.unwrap();

    assert!(text.contains("Jane Smith"));
    assert!(text.contains("Backend Software Engineer"));
    assert!(text.contains("Kafka"));
    assert!(text.contains("PostgreSQL"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.md");

    let text = manager.extract_text(path).await.unwrap();

    assert!(text.contains("Jane Smith"));
    assert!(text.contains("Backend Software Engineer"));
    assert!(text.contains("Kafka consumers & cut settlement latency"));
    // Markdown syntax is gone
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
    assert!(!text.contains("&amp;"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/unsupported.xyz");

    let result = manager.extract_text(path).await;
    assert!(matches!(result, Err(ResumeScorerError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/nonexistent.txt");

    let result = manager.extract_text(path).await;
    assert!(matches!(result, Err(ResumeScorerError::InvalidInput(_))));
}

#[test]
fn test_config_set_persists_through_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::load_from(&path).unwrap();
    config.set_value("analysis.score_mode", "RequirementCoverage").unwrap();
    config.set_value("processing.sentence_delimiters", ".;").unwrap();
    config.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.analysis.score_mode, ScoreMode::RequirementCoverage);
    assert_eq!(reloaded.processing.sentence_delimiters, ".;");
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.analysis.strength_threshold = 0.3;
    let content = toml::to_string_pretty(&config).unwrap();
    std::fs::write(&path, content).unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ResumeScorerError::Configuration(_))));
}
