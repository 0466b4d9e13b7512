//! Input manager for handling different file types

use crate::error::{Result, ResumeScorerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if let Some(cached_text) = self.cache.get(&path_str) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached_text.clone());
        }

        if !path.exists() {
            return Err(ResumeScorerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        // Reject before reading so unsupported files cost nothing
        Self::detect_file_type(&path_str)?;

        let bytes = fs::read(path).await?;
        let text = Self::extract_bytes(&path_str, &bytes)?;

        self.cache.insert(path_str, text.clone());

        Ok(text)
    }

    /// Extract text from an in-memory upload, dispatching on the file name
    pub fn extract_bytes(file_name: &str, bytes: &[u8]) -> Result<String> {
        let text = match Self::detect_file_type(file_name)? {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", file_name);
                PdfExtractor.extract(bytes, file_name)?
            }
            FileType::Text => {
                info!("Reading plain text: {}", file_name);
                PlainTextExtractor.extract(bytes, file_name)?
            }
            FileType::Markdown => {
                info!("Processing markdown: {}", file_name);
                MarkdownExtractor.extract(bytes, file_name)?
            }
            FileType::Unknown => {
                return Err(ResumeScorerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    file_name
                )));
            }
        };

        debug!("Extracted {} characters from {}", text.chars().count(), file_name);
        Ok(text)
    }

    fn detect_file_type(file_name: &str) -> Result<FileType> {
        match FileType::from_path(Path::new(file_name)) {
            None => Err(ResumeScorerError::InvalidInput(format!(
                "File has no extension: {}",
                file_name
            ))),
            Some(FileType::Unknown) => Err(ResumeScorerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                file_name
            ))),
            Some(file_type) => Ok(file_type),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
