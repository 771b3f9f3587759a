//! Cleanup of extracted document text and fixed-window chunking

use crate::error::{Result, SkillMatchError};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_CHUNK_SIZE: usize = 13_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 400;

pub struct TextCleaner {
    image_placeholder: Regex,
    non_printable: Regex,
    repeated_spaces: Regex,
    excess_newlines: Regex,
    trailing_spaces: Regex,
}

impl TextCleaner {
    pub fn new() -> Result<Self> {
        let build = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| SkillMatchError::InvalidInput(format!("Invalid cleanup pattern {}: {}", pattern, e)))
        };

        Ok(Self {
            image_placeholder: build(r"(?i)<!--\s*image\s*-->")?,
            non_printable: build(r"[^\x09\x0A\x0D\x20-\x7E]")?,
            repeated_spaces: build(r"[ ]{2,}")?,
            excess_newlines: build(r"\n{3,}")?,
            trailing_spaces: build(r"[ \t]+\n")?,
        })
    }

    /// Normalize layout-extracted text into plain printable ASCII paragraphs.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self.image_placeholder.replace_all(text, "");
        let text = text
            .replace('\u{FFFD}', " ")
            .replace('·', "- ")
            .replace('•', "- ")
            .replace('○', "- ");
        let text = self.non_printable.replace_all(&text, " ");
        let text = self.repeated_spaces.replace_all(&text, " ").replace("\\n", "\n");
        let text = self.excess_newlines.replace_all(&text, "\n\n");
        let text = self.trailing_spaces.replace_all(&text, "\n");

        text.trim().to_string()
    }
}

/// Split text into windows of `size` graphemes, each starting `size - overlap` after the previous.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if size == 0 || overlap >= size {
        return Err(SkillMatchError::InvalidInput(format!(
            "Chunk overlap ({}) must be smaller than chunk size ({})",
            overlap, size
        )));
    }

    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < graphemes.len() {
        let end = (start + size).min(graphemes.len());
        chunks.push(graphemes[start..end].concat());
        start += step;
    }

    Ok(chunks)
}
