use mooddine_vector_store::Match;
use serde::Serialize;
use std::collections::HashSet;

/// Keep only the first match of every group, in the order given.
///
/// Lazy: nothing past the last consumed item is inspected.
pub fn distinct_by_group<'a, I>(matches: I) -> impl Iterator<Item = Match<'a>>
where
    I: IntoIterator<Item = Match<'a>>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    matches
        .into_iter()
        .filter(move |m| seen.insert(m.record.group.as_str()))
}

/// First `k` matches with pairwise distinct groups, preserving order.
///
/// Never fails: fewer than `k` distinct groups simply yields a shorter result.
pub fn diversify<'a, I>(matches: I, k: usize) -> Vec<Match<'a>>
where
    I: IntoIterator<Item = Match<'a>>,
{
    distinct_by_group(matches).take(k).collect()
}

/// Diversified results together with how many were asked for.
#[derive(Debug, Clone, Serialize)]
pub struct DistinctResults<'a> {
    pub matches: Vec<Match<'a>>,
    pub requested: usize,
}

impl<'a> DistinctResults<'a> {
    #[must_use]
    pub fn new(matches: Vec<Match<'a>>, requested: usize) -> Self {
        Self { matches, requested }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// True when fewer distinct groups were found than requested.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.matches.len() < self.requested
    }

    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.matches.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match<'a>> {
        self.matches.iter()
    }
}

impl<'a> IntoIterator for DistinctResults<'a> {
    type Item = Match<'a>;
    type IntoIter = std::vec::IntoIter<Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}
