use serde::{Deserialize, Serialize};

/// One indexed image: where it lives, its embedding, and the restaurant it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// File path or URI of the source image. Passed through untouched.
    pub locator: String,
    pub embedding: Vec<f32>,
    /// Diversity key (restaurant name). Not used for scoring.
    pub group: String,
}

impl VectorRecord {
    pub fn new(
        locator: impl Into<String>,
        embedding: impl Into<Vec<f32>>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            embedding: embedding.into(),
            group: group.into(),
        }
    }
}

/// A scored record borrowed from the index it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match<'a> {
    pub record: &'a VectorRecord,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f64,
    /// Insertion position of `record` inside the index.
    pub position: usize,
}

impl<'a> Match<'a> {
    #[must_use]
    pub fn group(&self) -> &'a str {
        &self.record.group
    }

    #[must_use]
    pub fn locator(&self) -> &'a str {
        &self.record.locator
    }
}
