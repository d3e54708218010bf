//! # MoodDine Indexer
//!
//! Batch job that turns a directory of restaurant photos into a searchable index.
//!
//! ## Pipeline
//!
//! ```text
//! restaurant_images/
//!     │
//!     ├──> Image Scanner (<restaurant>/<image>)
//!     │      └─> (group, path) pairs
//!     │
//!     ├──> Embedder (stub, sidecar, ...)
//!     │      └─> Vector records
//!     │
//!     └──> Vector Index (build + atomic save)
//!            └─> restaurant_index.bin
//! ```
//!
//! Precomputed embeddings can be imported instead from a JSON Lines manifest.
//!
//! ## Example
//!
//! ```no_run
//! use mooddine_indexer::ImageIndexer;
//! use mooddine_vector_store::StubEmbedder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = Arc::new(StubEmbedder::new(64));
//!     let indexer = ImageIndexer::new("restaurant_images", "restaurant_index.bin", embedder);
//!     let stats = indexer.index().await?;
//!
//!     println!("Indexed {} images, skipped {}", stats.images, stats.skipped);
//!     Ok(())
//! }
//! ```

mod error;
mod index_lock;
mod indexer;
mod manifest;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::{index_from_manifest, ImageIndexer};
pub use manifest::{import_manifest, parse_manifest};
pub use scanner::{ImageEntry, ImageScanner};
pub use stats::IndexStats;
