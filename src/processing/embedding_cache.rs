//! Persistent embedding cache, one file per embedding model
//!
//! The cache is keyed by the exact raw skill string. It is loaded once when a
//! matcher is built, written back after every batch of new encodings, and can
//! be flushed explicitly. A missing, unreadable or corrupt file is treated as
//! an empty cache.
//!
//! There is no locking: one writer per cache file is assumed. Two processes
//! sharing a file may lose each other's updates (last writer wins), but a
//! reader never sees a partially written file because saves go through a
//! temporary file that is renamed into place.

use crate::error::{Result, SkillMatchError};
use crate::processing::embeddings::{Embedder, Embedding};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Borrowed view of the embeddings resolved for one matching run.
pub type EmbeddingMap<'a> = HashMap<&'a str, &'a [f32]>;

#[derive(Serialize)]
struct CacheFileRef<'a> {
    model_name: &'a str,
    entries: &'a HashMap<String, Embedding>,
}

#[derive(Deserialize)]
struct CacheFile {
    model_name: String,
    entries: HashMap<String, Embedding>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

pub struct EmbeddingCache {
    path: Option<PathBuf>,
    model_name: String,
    entries: HashMap<String, Embedding>,
    dirty: bool,
    hits: usize,
    misses: usize,
}

impl EmbeddingCache {
    /// Cache that never touches disk.
    pub fn in_memory(model_name: &str) -> Self {
        Self {
            path: None,
            model_name: model_name.to_string(),
            entries: HashMap::new(),
            dirty: false,
            hits: 0,
            misses: 0,
        }
    }

    /// Open the cache file for `model_name`. Never fails: unreadable content starts empty.
    pub fn open(path: PathBuf, model_name: &str) -> Self {
        let entries = Self::load_entries(&path, model_name);
        Self {
            path: Some(path),
            model_name: model_name.to_string(),
            entries,
            dirty: false,
            hits: 0,
            misses: 0,
        }
    }

    fn load_entries(path: &Path, model_name: &str) -> HashMap<String, Embedding> {
        if !path.exists() {
            info!("Cache file not found. Starting with an empty cache.");
            return HashMap::new();
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read cache file {}. Starting fresh. Error: {}", path.display(), e);
                return HashMap::new();
            }
        };

        match bincode::deserialize::<CacheFile>(&bytes) {
            Ok(file) if file.model_name == model_name => {
                info!("Loaded {} embeddings from cache.", file.entries.len());
                file.entries
            }
            Ok(file) => {
                warn!(
                    "Cache file {} belongs to model '{}', expected '{}'. Starting fresh.",
                    path.display(),
                    file.model_name,
                    model_name
                );
                HashMap::new()
            }
            Err(e) => {
                warn!("Could not load cache file {}. Starting fresh. Error: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    pub fn get(&self, text: &str) -> Option<&[f32]> {
        self.entries.get(text).map(Vec::as_slice)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Resolve embeddings for `texts`, encoding every miss in one batched model call.
    ///
    /// New entries are persisted right after the batch. A failed save is
    /// logged and the run continues with the in-memory entries.
    pub fn embed_batch<'a>(
        &'a mut self,
        texts: &'a [String],
        embedder: &mut dyn Embedder,
    ) -> Result<EmbeddingMap<'a>> {
        let mut seen = HashSet::new();
        let misses: Vec<String> = texts
            .iter()
            .filter(|text| seen.insert(text.as_str()))
            .filter(|text| !self.entries.contains_key(text.as_str()))
            .cloned()
            .collect();

        self.hits += seen.len() - misses.len();
        self.misses += misses.len();

        if !misses.is_empty() {
            info!("Encoding {} unique skills in batch...", misses.len());
            let embeddings = embedder.encode_batch(&misses)?;
            if embeddings.len() != misses.len() {
                return Err(SkillMatchError::Embedding(format!(
                    "Embedding model returned {} vectors for {} texts",
                    embeddings.len(),
                    misses.len()
                )));
            }

            self.entries.extend(misses.into_iter().zip(embeddings));
            self.dirty = true;

            if let Err(e) = self.flush() {
                error!("Could not save embedding cache, continuing in memory: {}", e);
            }
        }

        let entries = &self.entries;
        Ok(texts
            .iter()
            .filter_map(|text| {
                entries
                    .get(text.as_str())
                    .map(|embedding| (text.as_str(), embedding.as_slice()))
            })
            .collect())
    }

    /// Write pending entries to disk. No-op for in-memory caches or when nothing changed.
    pub fn flush(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let bytes = bincode::serialize(&CacheFileRef {
            model_name: &self.model_name,
            entries: &self.entries,
        })?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| SkillMatchError::Cache(format!("Failed to persist {}: {}", path.display(), e)))?;

        self.dirty = false;
        Ok(())
    }

    /// Drop all entries and delete the backing file.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.dirty = false;
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
