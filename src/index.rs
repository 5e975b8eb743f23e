//! # Vector Index Module
//!
//! Embeds crawled documents and answers nearest-neighbour queries over them.
//!
//! ## Key Components
//!
//! - `Embedder`: text to fixed-dimension vectors (`FastEmbedder`, `HashEmbedder`)
//! - `FlatIndex`: exact squared-L2 search over dense positional ids
//! - `IndexStore`: the persisted `vector.index` / `docs.json` pair for one site
//! - `VectorIndex`: build, load and query documents
//! - `load_or_build`: reuse a persisted index or rebuild it, reported as an `IndexOutcome`

mod cache;
mod embedding;
pub mod error;
mod flat;
mod store;
mod vector_index;

pub use cache::{IndexOutcome, load_or_build};
pub use embedding::{
    EMBEDDER_ENV, Embedder, FastEmbedder, HashEmbedder, MINILM_DIMENSIONS, embedder_from_env,
};
pub use error::IndexError;
pub use flat::FlatIndex;
pub use store::{DOCS_FILE, INDEX_FILE, IndexStore, StoreConfig, cache_key};
pub use vector_index::VectorIndex;
