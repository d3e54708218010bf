use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::types::Match;

/// Scores closer than this are ties and fall back to insertion order.
pub const TIE_EPSILON: f64 = 1e-12;

#[must_use]
pub fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum::<f64>()
        .sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

fn ensure_usable_norm(norm: f64, what: impl FnOnce() -> String) -> Result<()> {
    if norm == 0.0 || !norm.is_finite() {
        return Err(VectorStoreError::DegenerateVector(format!(
            "{} has norm {norm}",
            what()
        )));
    }
    Ok(())
}

fn cosine_with_norms(a: &[f32], norm_a: f64, b: &[f32], norm_b: f64) -> f64 {
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Full cosine similarity, dividing by the actual norms of both operands.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(VectorStoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    ensure_usable_norm(norm_a, || "left operand".to_string())?;
    ensure_usable_norm(norm_b, || "right operand".to_string())?;
    Ok(cosine_with_norms(a, norm_a, b, norm_b))
}

/// Descending by score; runs of scores within [`TIE_EPSILON`] keep insertion order.
fn order_matches(matches: &mut [Match<'_>]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut start = 0;
    while start < matches.len() {
        let mut end = start + 1;
        while end < matches.len() && matches[end - 1].score - matches[end].score <= TIE_EPSILON {
            end += 1;
        }
        if end - start > 1 {
            matches[start..end].sort_by_key(|m| m.position);
        }
        start = end;
    }
}

impl VectorIndex {
    /// Exact linear-scan search: scores every record, sorts the whole index, then
    /// keeps the first `limit` matches.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<Match<'_>>> {
        if limit == 0 {
            return Err(VectorStoreError::InvalidArgument(
                "search limit must be positive".to_string(),
            ));
        }
        let Some(dimension) = self.dimension() else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let query_norm = l2_norm(query);
        ensure_usable_norm(query_norm, || "query vector".to_string())?;

        // Record norms were validated when the index was built.
        let mut matches: Vec<Match<'_>> = self
            .records()
            .iter()
            .zip(self.norms())
            .enumerate()
            .map(|(position, (record, &norm))| Match {
                record,
                score: cosine_with_norms(query, query_norm, &record.embedding, norm),
                position,
            })
            .collect();

        order_matches(&mut matches);
        matches.truncate(limit);

        log::debug!(
            "Scanned {} records (dimension {dimension}), returning {}",
            self.len(),
            matches.len()
        );
        Ok(matches)
    }
}
