//! Persistence of the vector index as a pair of companion files.
//!
//! The search structure and the document list are always written and read
//! together. A pair with either half missing counts as absent.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::crawler::Document;
use crate::index::error::IndexError;
use crate::index::flat::FlatIndex;

/// File name of the serialized search structure
pub const INDEX_FILE: &str = "vector.index";

/// File name of the serialized document list
pub const DOCS_FILE: &str = "docs.json";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory holding one sub-directory per site
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Location of one persisted index pair
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Store the pair directly inside `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store the pair for the site at `base_url` under the configured data dir
    pub fn for_site(config: &StoreConfig, base_url: &str) -> Result<Self, IndexError> {
        Ok(Self::new(config.data_dir.join(cache_key(base_url)?)))
    }

    /// Directory holding both files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the serialized search structure
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Path of the serialized document list
    pub fn docs_path(&self) -> PathBuf {
        self.dir.join(DOCS_FILE)
    }

    /// Whether both files are present
    pub async fn exists(&self) -> Result<bool, IndexError> {
        let index = fs::try_exists(self.index_path()).await?;
        Ok(index && fs::try_exists(self.docs_path()).await?)
    }

    /// Read the pair, returning `None` if either file is missing
    pub async fn read(&self) -> Result<Option<(FlatIndex, Vec<Document>)>, IndexError> {
        if !self.exists().await? {
            return Ok(None);
        }

        let index_bytes = fs::read(self.index_path()).await?;
        let index = FlatIndex::from_bytes(&index_bytes)?;

        let docs_json = fs::read(self.docs_path()).await?;
        let documents: Vec<Document> = serde_json::from_slice(&docs_json)
            .map_err(|e| IndexError::Corrupted(format!("unreadable document list: {}", e)))?;

        debug!(
            "Read {} vectors and {} documents from {}",
            index.len(),
            documents.len(),
            self.dir.display()
        );
        Ok(Some((index, documents)))
    }

    /// Write the pair, creating the directory if needed
    ///
    /// Each file is written to a temporary name and renamed into place, so
    /// a crash never leaves a half-written file behind.
    pub async fn write(&self, index: &FlatIndex, documents: &[Document]) -> Result<(), IndexError> {
        fs::create_dir_all(&self.dir).await?;

        let docs_json = serde_json::to_vec(documents)?;
        write_replace(&self.docs_path(), &docs_json).await?;
        write_replace(&self.index_path(), &index.to_bytes()).await?;

        debug!(
            "Wrote {} vectors and {} documents to {}",
            index.len(),
            documents.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// Remove both files, ignoring ones that do not exist
    pub async fn clear(&self) -> Result<(), IndexError> {
        for path in [self.index_path(), self.docs_path()] {
            match fs::remove_file(&path).await {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

async fn write_replace(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await
}

/// Directory name identifying a site's index: its host plus any explicit port
///
/// `https://help.example.com/docs` becomes `help.example.com`, and
/// `http://localhost:8080/` becomes `localhost_8080`.
pub fn cache_key(base_url: &str) -> Result<String, IndexError> {
    let parsed = Url::parse(base_url.trim())
        .map_err(|e| IndexError::InvalidKey(format!("{}: {}", base_url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| IndexError::InvalidKey(base_url.to_string()))?;

    let netloc = match parsed.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };

    let unsafe_chars = Regex::new(r"[^A-Za-z0-9._-]+")
        .map_err(|e| IndexError::InvalidKey(e.to_string()))?;
    Ok(unsafe_chars.replace_all(&netloc, "_").into_owned())
}
