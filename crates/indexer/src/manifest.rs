//! Import of precomputed embeddings.
//!
//! A manifest is JSON Lines, one record per line:
//!
//! ```text
//! {"locator": "restaurant_images/Noma/1.jpg", "group": "Noma", "embedding": [0.12, ...]}
//! ```
//!
//! Blank lines are ignored. Errors carry the 1-based line number.

use crate::error::{IndexerError, Result};
use mooddine_vector_store::{IndexBuilder, VectorIndex, VectorRecord};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestLine {
    locator: String,
    group: String,
    embedding: Vec<f32>,
}

/// Parse manifest text into an index, preserving line order.
pub fn parse_manifest(text: &str) -> Result<VectorIndex> {
    let mut builder = IndexBuilder::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let entry: ManifestLine =
            serde_json::from_str(raw).map_err(|e| IndexerError::Manifest {
                line,
                message: e.to_string(),
            })?;
        builder
            .push(VectorRecord::new(entry.locator, entry.embedding, entry.group))
            .map_err(|e| IndexerError::Manifest {
                line,
                message: e.to_string(),
            })?;
    }

    Ok(builder.finish())
}

/// Read a manifest file and build the index it describes.
pub async fn import_manifest(path: impl AsRef<Path>) -> Result<VectorIndex> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        IndexerError::InvalidPath(format!("cannot read manifest {}: {e}", path.display()))
    })?;

    let index = parse_manifest(&text)?;
    log::info!(
        "Imported {} records from manifest {}",
        index.len(),
        path.display()
    );
    Ok(index)
}
