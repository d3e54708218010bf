use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about an indexing run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of images embedded into the index
    pub images: usize,

    /// Images per restaurant
    pub groups: BTreeMap<String, usize>,

    /// Images that were found but could not be indexed
    pub skipped: usize,

    /// Shared embedding dimensionality, if anything was indexed
    pub dimension: Option<usize>,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Errors encountered
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, group: &str) {
        self.images += 1;
        *self.groups.entry(group.to_string()).or_insert(0) += 1;
    }

    pub fn add_skipped(&mut self, error: String) {
        self.skipped += 1;
        self.errors.push(error);
    }
}
