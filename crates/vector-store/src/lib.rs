//! # MoodDine Vector Store
//!
//! Embedding index and exact similarity search for restaurant images.
//!
//! ## Features
//!
//! - **Frozen index** of `(locator, embedding, group)` records with a single shared
//!   dimensionality, validated on insertion
//! - **Exact linear-scan search** using full cosine similarity, with a stable
//!   insertion-order tie-break
//! - **Binary artifact** with checksum, written atomically (temp file + rename)
//! - **Embedding boundary** ([`Embedder`]) so the ML model stays outside the core
//!
//! ## Architecture
//!
//! ```text
//! images ──> Embedder ──> VectorRecord[] ──> VectorIndex ──save──> restaurant_index.bin
//!                                                 │
//! query text ──> Embedder ──> query vector ──> search ──> Match[] (score desc)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use mooddine_vector_store::{VectorIndex, VectorRecord};
//!
//! fn main() -> mooddine_vector_store::Result<()> {
//!     let index = VectorIndex::build(vec![
//!         VectorRecord::new("restaurant_images/Noma/1.jpg", vec![0.6, 0.8], "Noma"),
//!         VectorRecord::new("restaurant_images/Geranium/3.jpg", vec![1.0, 0.0], "Geranium"),
//!     ])?;
//!     index.save("restaurant_index.bin")?;
//!
//!     let index = VectorIndex::load("restaurant_index.bin")?;
//!     for hit in index.search(&[0.0, 1.0], 10)? {
//!         println!("{}: {:.4}", hit.record.group, hit.score);
//!     }
//!     Ok(())
//! }
//! ```

mod artifact;
mod embeddings;
mod error;
mod index;
mod paths;
mod similarity;
mod types;

pub use artifact::{INDEX_MAGIC, INDEX_SCHEMA_VERSION};
pub use embeddings::{
    Embedder, EmbeddingMode, SidecarEmbedder, StubEmbedder,
    DEFAULT_STUB_DIMENSION, EMBEDDING_MODE_ENV, STUB_DIMENSION_ENV,
};
pub use error::{Result, VectorStoreError};
pub use index::{IndexBuilder, VectorIndex, UNIT_NORM_TOLERANCE};
pub use paths::{
    default_images_dir, default_index_path, lock_path_for_index, DEFAULT_IMAGES_DIR_NAME,
    DEFAULT_INDEX_FILE_NAME,
};
pub use similarity::{cosine_similarity, l2_norm, TIE_EPSILON};
pub use types::{Match, VectorRecord};
