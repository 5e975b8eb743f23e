//! Document index combining an embedder, a flat search structure and its
//! persisted artifacts.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::crawler::Document;
use crate::index::embedding::Embedder;
use crate::index::error::IndexError;
use crate::index::flat::FlatIndex;
use crate::index::store::IndexStore;

/// Built or loaded index contents; vector `i` belongs to document `i`
#[derive(Debug)]
struct IndexState {
    vectors: FlatIndex,
    documents: Vec<Document>,
}

/// Nearest-neighbour index over crawled documents
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    store: IndexStore,
    state: Option<IndexState>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("embedder", &self.embedder.name())
            .field("store", &self.store)
            .field("documents", &self.len())
            .finish()
    }
}

impl VectorIndex {
    /// Create an empty, uninitialized index persisted through `store`
    pub fn new(embedder: Arc<dyn Embedder>, store: IndexStore) -> Self {
        Self {
            embedder,
            store,
            state: None,
        }
    }

    /// Embed `documents`, build the search structure and persist both
    ///
    /// Document `i` is addressed by id `i` from here on.
    #[instrument(skip_all, fields(documents = documents.len(), embedder = self.embedder.name()))]
    pub async fn build(&mut self, documents: Vec<Document>) -> Result<(), IndexError> {
        if documents.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let texts: Vec<String> = documents.iter().map(|doc| doc.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts)?;
        if embeddings.len() != documents.len() {
            return Err(IndexError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut vectors = FlatIndex::new(self.embedder.dimensions());
        for embedding in &embeddings {
            vectors.add(embedding)?;
        }

        self.store.write(&vectors, &documents).await?;
        info!(
            "Built index of {} documents in {}",
            documents.len(),
            self.store.dir().display()
        );

        self.state = Some(IndexState { vectors, documents });
        Ok(())
    }

    /// Load a previously persisted index
    ///
    /// Returns `Ok(false)` if either artifact is missing. A pair that cannot
    /// be read, whose halves disagree in length, or whose vectors do not match
    /// the embedder's dimensionality is reported as `Corrupted`.
    #[instrument(skip_all, fields(dir = %self.store.dir().display()))]
    pub async fn load(&mut self) -> Result<bool, IndexError> {
        let Some((vectors, documents)) = self.store.read().await? else {
            debug!("No persisted index found");
            return Ok(false);
        };

        if vectors.len() != documents.len() {
            return Err(IndexError::Corrupted(format!(
                "{} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }
        if vectors.dimensions() != self.embedder.dimensions() {
            return Err(IndexError::Corrupted(format!(
                "index has {}-dimensional vectors but {} produces {}",
                vectors.dimensions(),
                self.embedder.name(),
                self.embedder.dimensions()
            )));
        }

        info!("Loaded index of {} documents", documents.len());
        self.state = Some(IndexState { vectors, documents });
        Ok(true)
    }

    /// Return up to `top_k` documents nearest to `text`, nearest first
    ///
    /// Blank queries return nothing. Fewer than `top_k` results is normal
    /// when the index is small.
    pub fn query(&self, text: &str, top_k: usize) -> Result<Vec<Document>, IndexError> {
        let state = self.state.as_ref().ok_or(IndexError::NotInitialized)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let k = top_k.min(state.documents.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embedding("no embedding returned for query".to_string()))?;

        let hits = state.vectors.search(&query, k)?;
        debug!("Query matched {} of {} requested documents", hits.len(), k);

        Ok(hits
            .into_iter()
            .filter_map(|(id, _)| state.documents.get(id).cloned())
            .collect())
    }

    /// Whether the index has been built or loaded
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.documents.len())
    }

    /// Whether no documents are indexed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexed documents in id order
    pub fn documents(&self) -> &[Document] {
        self.state
            .as_ref()
            .map_or(&[], |state| state.documents.as_slice())
    }

    /// Where the index is persisted
    pub fn store(&self) -> &IndexStore {
        &self.store
    }
}
