use crate::diversity::{diversify, DistinctResults};
use crate::error::{Result, SearchError};
use mooddine_vector_store::{Embedder, VectorIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many candidates to rank and how many distinct restaurants to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPolicy {
    pub pool_limit: usize,
    pub distinct_k: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            pool_limit: 10,
            distinct_k: 3,
        }
    }
}

impl SearchPolicy {
    pub fn new(pool_limit: usize, distinct_k: usize) -> Result<Self> {
        let policy = Self {
            pool_limit,
            distinct_k,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_limit == 0 {
            return Err(SearchError::InvalidArgument(
                "pool_limit must be positive".to_string(),
            ));
        }
        if self.distinct_k == 0 {
            return Err(SearchError::InvalidArgument(
                "distinct_k must be positive".to_string(),
            ));
        }
        if self.pool_limit < self.distinct_k {
            log::warn!(
                "pool_limit {} is below distinct_k {}; results will often be short",
                self.pool_limit,
                self.distinct_k
            );
        }
        Ok(())
    }
}

/// Rank the top `pool_limit` matches, then keep the first `distinct_k` distinct groups.
pub fn find_top_distinct<'a>(
    index: &'a VectorIndex,
    query: &[f32],
    pool_limit: usize,
    distinct_k: usize,
) -> Result<DistinctResults<'a>> {
    SearchPolicy {
        pool_limit,
        distinct_k,
    }
    .validate()?;

    let pool = index.search(query, pool_limit)?;
    let pool_len = pool.len();
    let results = DistinctResults::new(diversify(pool, distinct_k), distinct_k);

    log::debug!(
        "Pool of {pool_len} candidates -> {} distinct groups (requested {distinct_k})",
        results.len()
    );
    Ok(results)
}

/// Mood query front-end: embeds free text and returns distinct restaurants.
pub struct MoodSearch {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    policy: SearchPolicy,
}

impl MoodSearch {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        policy: SearchPolicy,
    ) -> Result<Self> {
        policy.validate()?;
        if let (Some(index_dim), Some(embed_dim)) = (index.dimension(), embedder.dimension()) {
            if index_dim != embed_dim {
                log::warn!(
                    "Embedder produces {embed_dim}-dimensional vectors but the index holds \
                     {index_dim}; text queries will be rejected"
                );
            }
        }
        Ok(Self {
            index,
            embedder,
            policy,
        })
    }

    #[must_use]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    #[must_use]
    pub const fn policy(&self) -> SearchPolicy {
        self.policy
    }

    pub async fn search_text(&self, text: &str) -> Result<DistinctResults<'_>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        log::debug!("Mood search: query='{text}', policy={:?}", self.policy);
        let query = self.embedder.embed_text(text).await?;
        self.search_vector(&query)
    }

    pub fn search_vector(&self, query: &[f32]) -> Result<DistinctResults<'_>> {
        find_top_distinct(
            &self.index,
            query,
            self.policy.pool_limit,
            self.policy.distinct_k,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mooddine_vector_store::{StubEmbedder, VectorRecord, VectorStoreError};
    use pretty_assertions::assert_eq;

    fn restaurants() -> VectorIndex {
        VectorIndex::build(vec![
            VectorRecord::new("A/1.jpg", vec![1.0, 0.0], "A"),
            VectorRecord::new("A/2.jpg", vec![0.995, 0.0998], "A"),
            VectorRecord::new("B/1.jpg", vec![0.98, 0.199], "B"),
            VectorRecord::new("C/1.jpg", vec![0.0, 1.0], "C"),
            VectorRecord::new("D/1.jpg", vec![-1.0, 0.0], "D"),
        ])
        .unwrap()
    }

    fn groups(results: &DistinctResults<'_>) -> Vec<String> {
        results.iter().map(|m| m.record.group.clone()).collect()
    }

    #[test]
    fn composes_search_and_diversity() {
        let index = restaurants();
        let results = find_top_distinct(&index, &[1.0, 0.0], 10, 3).unwrap();
        assert_eq!(groups(&results), vec!["A", "B", "C"]);
        assert!(!results.is_short());
    }

    #[test]
    fn small_pool_can_starve_diversity() {
        let index = restaurants();
        let results = find_top_distinct(&index, &[1.0, 0.0], 2, 3).unwrap();
        assert_eq!(groups(&results), vec!["A"]);
        assert_eq!(results.shortfall(), 2);
    }

    #[test]
    fn rejects_non_positive_arguments() {
        let index = restaurants();
        assert!(matches!(
            find_top_distinct(&index, &[1.0, 0.0], 10, 0),
            Err(SearchError::InvalidArgument(_))
        ));
        assert!(matches!(
            find_top_distinct(&index, &[1.0, 0.0], 0, 3),
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn dimension_mismatch_is_propagated() {
        let index = restaurants();
        let err = find_top_distinct(&index, &[1.0, 0.0, 0.0], 10, 3).unwrap_err();
        assert!(matches!(
            err,
            SearchError::VectorStoreError(VectorStoreError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn empty_index_gives_empty_results() {
        let index = VectorIndex::empty();
        let results = find_top_distinct(&index, &[0.1, 0.2, 0.3], 10, 3).unwrap();
        assert!(results.is_empty());
        assert!(results.is_short());
    }

    #[tokio::test]
    async fn text_search_uses_embedder() {
        let embedder = Arc::new(StubEmbedder::new(8));
        let records = ["cozy", "rooftop", "neon", "garden"]
            .iter()
            .enumerate()
            .map(|(i, mood)| {
                VectorRecord::new(format!("{i}.jpg"), embedder.embed_bytes(mood.as_bytes()), *mood)
            });
        let index = Arc::new(VectorIndex::build(records).unwrap());
        let search = MoodSearch::new(index, embedder, SearchPolicy::default()).unwrap();

        let results = search.search_text("  rooftop ").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results.matches[0].record.group, "rooftop");
        assert!((results.matches[0].score - 1.0).abs() < 1e-6);

        assert!(matches!(
            search.search_text("   ").await,
            Err(SearchError::EmptyQuery)
        ));
    }
}
