use crate::error::{IndexerError, Result};
use crate::index_lock::acquire_index_write_lock;
use crate::manifest::import_manifest;
use crate::scanner::{ImageEntry, ImageScanner};
use crate::stats::IndexStats;
use mooddine_vector_store::{Embedder, IndexBuilder, VectorIndex, VectorRecord, VectorStoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Batch job: scan an image tree, embed every image and persist the index.
pub struct ImageIndexer {
    images_dir: PathBuf,
    index_path: PathBuf,
    embedder: Arc<dyn Embedder>,
}

impl ImageIndexer {
    pub fn new(
        images_dir: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            images_dir: images_dir.as_ref().to_path_buf(),
            index_path: index_path.as_ref().to_path_buf(),
            embedder,
        }
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Rebuild the index from scratch and overwrite the artifact.
    ///
    /// Images that fail to embed or yield a degenerate vector are logged, recorded in
    /// [`IndexStats::errors`] and skipped. An embedding whose length disagrees with
    /// the ones before it aborts the run with `DimensionMismatch` and leaves any
    /// existing artifact untouched, as do scan, lock and save failures.
    pub async fn index(&self) -> Result<IndexStats> {
        let start = Instant::now();
        let mut stats = IndexStats::new();

        let _write_lock = acquire_index_write_lock(&self.index_path).await?;
        log::info!("Indexing images under {}", self.images_dir.display());

        let scanner = ImageScanner::new(&self.images_dir);
        let images = tokio::task::spawn_blocking(move || scanner.scan())
            .await
            .map_err(|err| IndexerError::Other(format!("join scan task: {err}")))??;

        let mut builder = IndexBuilder::with_capacity(images.len());
        for image in images {
            let record = match self.embed(&image).await {
                Ok(record) => record,
                Err(err) => {
                    skip(&mut stats, &image, &err);
                    continue;
                }
            };
            match builder.push(record) {
                Ok(()) => stats.add_image(&image.group),
                Err(err @ VectorStoreError::DimensionMismatch { .. }) => {
                    log::error!(
                        "Aborting: {} does not match the index dimensionality: {err}",
                        image.path.display()
                    );
                    return Err(err.into());
                }
                Err(err) => skip(&mut stats, &image, &err),
            }
        }

        let index = builder.finish();
        if index.is_empty() {
            log::warn!(
                "No images were indexed from {}; writing an empty index",
                self.images_dir.display()
            );
        }
        stats.dimension = index.dimension();
        persist(index, self.index_path.clone()).await?;

        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} images from {} restaurants ({} skipped) in {}ms",
            stats.images,
            stats.groups.len(),
            stats.skipped,
            stats.time_ms
        );
        Ok(stats)
    }

    async fn embed(&self, image: &ImageEntry) -> Result<VectorRecord> {
        let embedding = self.embedder.embed_image(&image.path).await?;
        log::debug!("Embedded {} ({} dims)", image.path.display(), embedding.len());
        Ok(VectorRecord::new(
            image.path.to_string_lossy(),
            embedding,
            image.group.as_str(),
        ))
    }
}

/// Build the artifact at `index_path` from a JSON Lines manifest of precomputed
/// embeddings. A malformed manifest leaves any existing artifact untouched.
pub async fn index_from_manifest(
    manifest: impl AsRef<Path>,
    index_path: impl AsRef<Path>,
) -> Result<IndexStats> {
    let start = Instant::now();
    let index_path = index_path.as_ref().to_path_buf();

    let _write_lock = acquire_index_write_lock(&index_path).await?;
    let index = import_manifest(manifest).await?;

    let mut stats = IndexStats::new();
    for record in index.records() {
        stats.add_image(&record.group);
    }
    stats.dimension = index.dimension();
    persist(index, index_path).await?;

    stats.time_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}

fn skip(stats: &mut IndexStats, image: &ImageEntry, err: &dyn std::fmt::Display) {
    log::warn!("Error processing {}: {err}", image.path.display());
    stats.add_skipped(format!("{}: {err}", image.path.display()));
}

async fn persist(index: VectorIndex, path: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || index.save(&path))
        .await
        .map_err(|err| IndexerError::Other(format!("join save task: {err}")))??;
    Ok(())
}
