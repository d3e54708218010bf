use crate::error::{Result, VectorStoreError};
use crate::similarity::l2_norm;
use crate::types::VectorRecord;
use std::collections::HashMap;

/// Producer contract: embeddings are unit-norm within this tolerance.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-5;

/// Immutable, ordered collection of [`VectorRecord`]s sharing one dimensionality.
///
/// Built once (via [`VectorIndex::build`] or [`IndexBuilder`]), persisted with
/// [`VectorIndex::save`], and loaded read-only with [`VectorIndex::load`].
/// There is no update or delete; re-indexing means building a new index.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimension: Option<usize>,
    records: Vec<VectorRecord>,
    norms: Vec<f64>,
}

impl VectorIndex {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from records in insertion order.
    pub fn build(records: impl IntoIterator<Item = VectorRecord>) -> Result<Self> {
        let records = records.into_iter();
        let mut builder = IndexBuilder::with_capacity(records.size_hint().0);
        for record in records {
            builder.push(record)?;
        }
        Ok(builder.finish())
    }

    /// Shared dimensionality, `None` while the index holds no records.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&VectorRecord> {
        self.records.get(position)
    }

    /// Distinct groups with their record counts, in first-seen order.
    #[must_use]
    pub fn groups(&self) -> Vec<(&str, usize)> {
        let mut groups: Vec<(&str, usize)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            let group = record.group.as_str();
            match slots.get(group) {
                Some(&slot) => groups[slot].1 += 1,
                None => {
                    slots.insert(group, groups.len());
                    groups.push((group, 1));
                }
            }
        }
        groups
    }

    pub(crate) fn norms(&self) -> &[f64] {
        &self.norms
    }
}

/// Incremental construction of a [`VectorIndex`].
///
/// The first record fixes the dimensionality; every later record must match it.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    dimension: Option<usize>,
    records: Vec<VectorRecord>,
    norms: Vec<f64>,
    off_unit: usize,
}

impl IndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            norms: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Append a record, rejecting it if its embedding is empty, has the wrong length,
    /// or has a zero or non-finite norm.
    pub fn push(&mut self, record: VectorRecord) -> Result<()> {
        let actual = record.embedding.len();
        if actual == 0 {
            return Err(VectorStoreError::EmptyEmbedding {
                locator: record.locator,
            });
        }
        if let Some(expected) = self.dimension {
            if actual != expected {
                return Err(VectorStoreError::DimensionMismatch { expected, actual });
            }
        }

        let norm = l2_norm(&record.embedding);
        if norm == 0.0 || !norm.is_finite() {
            return Err(VectorStoreError::DegenerateVector(format!(
                "embedding of '{}' has norm {norm}",
                record.locator
            )));
        }
        if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            self.off_unit += 1;
        }

        self.dimension = Some(actual);
        self.norms.push(norm);
        self.records.push(record);
        Ok(())
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> VectorIndex {
        if self.off_unit > 0 {
            log::warn!(
                "{} of {} embeddings are not unit-norm (tolerance {UNIT_NORM_TOLERANCE})",
                self.off_unit,
                self.records.len()
            );
        }
        VectorIndex {
            dimension: self.dimension,
            records: self.records,
            norms: self.norms,
        }
    }
}
