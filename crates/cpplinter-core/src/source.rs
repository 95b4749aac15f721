//! Source text cache
//!
//! Loads and decodes source files on demand and keeps a bounded number of
//! them in memory. Victims are picked at random once the bound is exceeded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use rand::Rng;
use tracing::{debug, trace};

pub const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot decode '{}' as {detected} or UTF-8", path.display())]
    Decode {
        path: PathBuf,
        detected: &'static str,
    },
    #[error("Offset {offset} is out of range for '{}' ({len} characters)", path.display())]
    OutOfRange {
        path: PathBuf,
        offset: usize,
        len: usize,
    },
}

/// Decoded text of a single file.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    encoding: &'static Encoding,
    /// Byte offset of every character; `None` for pure ASCII text.
    char_starts: Option<Vec<usize>>,
}

impl SourceFile {
    fn new(path: PathBuf, text: String, encoding: &'static Encoding) -> Self {
        let char_starts = if text.is_ascii() {
            None
        } else {
            Some(text.char_indices().map(|(i, _)| i).collect())
        };
        Self {
            path,
            text,
            encoding,
            char_starts,
        }
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self::new(path.into(), text.into(), UTF_8)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Length in characters, which is the unit all offsets are expressed in.
    pub fn char_len(&self) -> usize {
        match &self.char_starts {
            None => self.text.len(),
            Some(starts) => starts.len(),
        }
    }

    /// Characters `[offset, offset + length)`, clipped at the end of the text.
    pub fn slice(&self, offset: usize, length: usize) -> Result<&str, SourceError> {
        let len = self.char_len();
        if offset >= len {
            return Err(SourceError::OutOfRange {
                path: self.path.clone(),
                offset,
                len,
            });
        }

        let start = self.byte_index(offset);
        let end = self.byte_index(offset.saturating_add(length));
        Ok(&self.text[start..end])
    }

    fn byte_index(&self, chars: usize) -> usize {
        match &self.char_starts {
            None => chars.min(self.text.len()),
            Some(starts) => starts.get(chars).copied().unwrap_or(self.text.len()),
        }
    }
}

/// Bounded path-to-text cache.
///
/// Not safe for shared use across threads; parallel callers should give each
/// worker its own cache.
#[derive(Debug)]
pub struct SourceCache {
    files: HashMap<PathBuf, Arc<SourceFile>>,
    capacity: usize,
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Returns the decoded text of `path`, loading it on a miss.
    pub fn text(&mut self, path: &Path) -> Result<Arc<SourceFile>, SourceError> {
        if let Some(file) = self.files.get(path) {
            return Ok(Arc::clone(file));
        }

        let file = Arc::new(load_source(path)?);
        self.files.insert(path.to_path_buf(), Arc::clone(&file));
        self.evict_randomly(path);
        Ok(file)
    }

    /// Characters `[offset, offset + length)` of `path`.
    pub fn segment(
        &mut self,
        path: &Path,
        offset: usize,
        length: usize,
    ) -> Result<String, SourceError> {
        let file = self.text(path)?;
        file.slice(offset, length).map(str::to_string)
    }

    /// Seeds the cache with already-decoded text, subject to the same bound.
    pub fn insert(&mut self, file: SourceFile) -> Arc<SourceFile> {
        let path = file.path().to_path_buf();
        let file = Arc::new(file);
        self.files.insert(path.clone(), Arc::clone(&file));
        self.evict_randomly(&path);
        file
    }

    fn evict_randomly(&mut self, keep: &Path) {
        let mut rng = rand::rng();
        while self.files.len() > self.capacity {
            let candidates: Vec<&PathBuf> = self.files.keys().filter(|p| *p != keep).collect();
            if candidates.is_empty() {
                break;
            }
            let victim = candidates[rng.random_range(0..candidates.len())].clone();
            debug!(path = %victim.display(), "evicting cached source");
            self.files.remove(&victim);
        }
    }
}

fn load_source(path: &Path) -> Result<SourceFile, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (detected, bom_len) = detect_encoding(&bytes);
    trace!(path = %path.display(), encoding = detected.name(), "decoding source");

    let (text, encoding) = match decode(detected, &bytes[bom_len..]) {
        Some(text) => (text, detected),
        None => {
            let text = decode(UTF_8, &bytes).ok_or_else(|| SourceError::Decode {
                path: path.to_path_buf(),
                detected: detected.name(),
            })?;
            (text, UTF_8)
        }
    };

    Ok(SourceFile::new(path.to_path_buf(), text, encoding))
}

/// Guesses the encoding of `bytes`. A byte-order mark wins; otherwise the
/// statistical detector decides. Returns the encoding and the BOM length.
pub fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, bom_len);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    (detector.guess(None, true), 0)
}

fn decode(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}
