//! Load-or-build policy for a site's persisted index.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::crawler::Document;
use crate::index::embedding::Embedder;
use crate::index::error::IndexError;
use crate::index::store::IndexStore;
use crate::index::vector_index::VectorIndex;

/// How [`load_or_build`] obtained its index
#[derive(Debug)]
pub enum IndexOutcome {
    /// A valid persisted pair was reused
    Loaded(VectorIndex),
    /// A new index was built from the documents and persisted
    Built(VectorIndex),
    /// Neither loading nor building succeeded
    Failed(IndexError),
}

impl IndexOutcome {
    /// Whether the index came from disk
    pub fn is_loaded(&self) -> bool {
        matches!(self, IndexOutcome::Loaded(_))
    }

    /// The index, or the error that prevented producing one
    pub fn into_result(self) -> Result<VectorIndex, IndexError> {
        match self {
            IndexOutcome::Loaded(index) | IndexOutcome::Built(index) => Ok(index),
            IndexOutcome::Failed(err) => Err(err),
        }
    }
}

/// Reuse the persisted index in `store`, or build one from `documents`
///
/// Both artifacts are treated as one unit: if the pair is missing, half
/// present or unusable, both files are removed before rebuilding.
#[instrument(skip_all, fields(dir = %store.dir().display(), documents = documents.len()))]
pub async fn load_or_build(
    embedder: Arc<dyn Embedder>,
    store: IndexStore,
    documents: Vec<Document>,
) -> IndexOutcome {
    let mut index = VectorIndex::new(embedder, store);

    match index.load().await {
        Ok(true) => {
            info!("Loaded existing vector store from disk");
            return IndexOutcome::Loaded(index);
        }
        Ok(false) => info!("Creating new vector store"),
        Err(e) => warn!("Discarding unusable vector store: {}", e),
    }

    if let Err(e) = index.store().clear().await {
        return IndexOutcome::Failed(e);
    }

    match index.build(documents).await {
        Ok(()) => IndexOutcome::Built(index),
        Err(e) => IndexOutcome::Failed(e),
    }
}
