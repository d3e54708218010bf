//! Embedding boundary.
//!
//! The model that turns images and text into vectors lives outside this crate; the
//! index only relies on the [`Embedder`] contract (same dimensionality for both
//! modalities, unit L2 norm). Two model-free implementations ship here:
//!
//! - [`StubEmbedder`]: deterministic pseudo-embeddings seeded by the input bytes.
//! - [`SidecarEmbedder`]: reads vectors an external job wrote next to each image.

use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable selecting the embedding backend (`stub` or `sidecar`).
pub const EMBEDDING_MODE_ENV: &str = "MOODDINE_EMBEDDING_MODE";
pub const STUB_DIMENSION_ENV: &str = "MOODDINE_STUB_DIMENSION";
pub const DEFAULT_STUB_DIMENSION: usize = 64;

/// Maps images and text into one shared, unit-norm vector space.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Output dimensionality when known up front.
    fn dimension(&self) -> Option<usize>;

    async fn embed_image(&self, locator: &Path) -> Result<Vec<f32>>;

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbeddingMode {
    Stub,
    Sidecar,
}

impl EmbeddingMode {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stub" => Ok(Self::Stub),
            "sidecar" => Ok(Self::Sidecar),
            other => Err(VectorStoreError::EmbeddingError(format!(
                "Unsupported embedding mode '{other}' (expected 'stub' or 'sidecar')"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stub => "stub",
            Self::Sidecar => "sidecar",
        }
    }

    /// Instantiate the embedder for this mode.
    #[must_use]
    pub fn embedder(self, stub_dimension: usize) -> Arc<dyn Embedder> {
        match self {
            Self::Stub => Arc::new(StubEmbedder::new(stub_dimension)),
            Self::Sidecar => Arc::new(SidecarEmbedder),
        }
    }
}

/// Deterministic, model-free embedder. Identical input bytes give identical vectors.
#[derive(Clone, Debug)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[must_use]
    pub fn embed_bytes(&self, bytes: &[u8]) -> Vec<f32> {
        stub_embed(bytes, self.dimension)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed_image(&self, locator: &Path) -> Result<Vec<f32>> {
        let bytes = tokio::fs::read(locator).await.map_err(|e| {
            VectorStoreError::EmbeddingError(format!("cannot read {}: {e}", locator.display()))
        })?;
        Ok(self.embed_bytes(&bytes))
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_bytes(text.as_bytes()))
    }
}

/// Reads `<image>.json` (a JSON array of floats) produced by an external embedding job.
#[derive(Clone, Copy, Debug, Default)]
pub struct SidecarEmbedder;

impl SidecarEmbedder {
    #[must_use]
    pub fn sidecar_path(locator: &Path) -> PathBuf {
        let mut name = locator.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

#[async_trait]
impl Embedder for SidecarEmbedder {
    fn dimension(&self) -> Option<usize> {
        None
    }

    async fn embed_image(&self, locator: &Path) -> Result<Vec<f32>> {
        let path = Self::sidecar_path(locator);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            VectorStoreError::EmbeddingError(format!(
                "missing sidecar embedding {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_slice::<Vec<f32>>(&bytes).map_err(|e| {
            VectorStoreError::EmbeddingError(format!("invalid sidecar {}: {e}", path.display()))
        })
    }

    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VectorStoreError::EmbeddingError(
            "sidecar mode cannot embed free text; supply a query vector instead".to_string(),
        ))
    }
}

/// Expand the BLAKE3 digest of `bytes` into `dimension` components in `[-1, 1]`,
/// then scale to unit length. The dimension is part of the hashed input, so
/// different widths give unrelated vectors.
fn stub_embed(bytes: &[u8], dimension: usize) -> Vec<f32> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(dimension as u64).to_le_bytes());
    hasher.update(bytes);

    let mut stream = vec![0u8; dimension * 4];
    hasher.finalize_xof().fill(&mut stream);

    let raw: Vec<f64> = stream
        .chunks_exact(4)
        .map(|word| {
            let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            f64::from(word) / f64::from(u32::MAX) * 2.0 - 1.0
        })
        .collect();

    let norm = raw.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        return vec![0.0; dimension];
    }
    raw.into_iter().map(|v| (v / norm) as f32).collect()
}
