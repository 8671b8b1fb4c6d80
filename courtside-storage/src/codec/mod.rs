//! File import/export codecs, selected by file extension.

pub mod csv;
pub mod json;

pub use self::csv::CsvCodec;
pub use self::json::JsonCodec;

use courtside_core::Player;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("File does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Reads and writes a whole player list to one file format.
pub trait PlayerCodec: Send + Sync {
    /// Lower-case extension this codec handles, without the dot.
    fn extension(&self) -> &'static str;

    fn decode(&self, path: &Path) -> CodecResult<Vec<Player>>;

    /// Write `players`, replacing the file, and return how many were written.
    fn encode(&self, path: &Path, players: &[Player]) -> CodecResult<usize>;
}

/// Maps file extensions to codecs. The default registry knows `csv` and `json`.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn PlayerCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::empty()
            .with_codec(Arc::new(CsvCodec))
            .with_codec(Arc::new(JsonCodec))
    }
}

impl CodecRegistry {
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Register a codec. A later codec for the same extension wins.
    pub fn with_codec(mut self, codec: Arc<dyn PlayerCodec>) -> Self {
        self.codecs.retain(|c| c.extension() != codec.extension());
        self.codecs.push(codec);
        self
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.extension()).collect()
    }

    /// Pick the codec for `path` by its extension, ignoring case.
    pub fn for_path(&self, path: &Path) -> CodecResult<Arc<dyn PlayerCodec>> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        self.codecs
            .iter()
            .find(|codec| codec.extension() == extension)
            .cloned()
            .ok_or(CodecError::UnsupportedExtension(extension))
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

pub(crate) fn ensure_exists(path: &Path) -> CodecResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CodecError::FileNotFound(path.to_path_buf()))
    }
}

pub(crate) fn ensure_parent(path: &Path) -> CodecResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
