//! Input manager: cleaned document text and parsed skill lists

use crate::error::{Result, SkillMatchError};
use crate::input::cleaner::{chunk_text, TextCleaner};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::collections::HashMap;
use std::path::Path;

pub struct InputManager {
    cleaner: TextCleaner,
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new()?,
            cache: HashMap::new(),
            enable_cache: true,
        })
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Extract and clean the text of a PDF, plain text or markdown document.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(SkillMatchError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let raw = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Json | FileType::Unknown => {
                return Err(SkillMatchError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        let text = self.cleaner.clean(&raw);

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract cleaned text and split it into overlapping chunks.
    pub async fn extract_chunks(&mut self, path: &Path, size: usize, overlap: usize) -> Result<Vec<String>> {
        let text = self.extract_text(path).await?;
        chunk_text(&text, size, overlap)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
