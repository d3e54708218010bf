use anyhow::Result;
use mooddine_indexer::IndexStats;
use mooddine_search::DistinctResults;
use mooddine_vector_store::VectorIndex;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

pub(crate) const NO_RESULTS_NOTICE: &str = "No distinct restaurants found. Try a different query.";

pub(crate) fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchOutput<'a> {
    pub query: Option<&'a str>,
    pub requested: usize,
    pub short: bool,
    pub results: Vec<SearchHit<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchHit<'a> {
    pub rank: usize,
    pub restaurant: &'a str,
    pub locator: &'a str,
    pub score: f64,
}

impl<'a> SearchOutput<'a> {
    pub(crate) fn new(query: Option<&'a str>, results: &DistinctResults<'a>) -> Self {
        Self {
            query,
            requested: results.requested,
            short: results.is_short(),
            results: results
                .iter()
                .enumerate()
                .map(|(idx, m)| SearchHit {
                    rank: idx + 1,
                    restaurant: m.group(),
                    locator: m.locator(),
                    score: m.score,
                })
                .collect(),
        }
    }
}

pub(crate) fn render_search(out: &SearchOutput<'_>) -> String {
    if out.results.is_empty() {
        return NO_RESULTS_NOTICE.to_string();
    }

    let mut text = String::new();
    for hit in &out.results {
        text.push_str(&format!("Restaurant {}: {}\n", hit.rank, hit.restaurant));
        text.push_str(&format!("  {}\n", hit.locator));
        text.push_str(&format!("  Similarity Score: {:.4}\n", hit.score));
    }
    if out.short {
        text.push_str(&format!(
            "Only {} distinct restaurants found (requested {}).\n",
            out.results.len(),
            out.requested
        ));
    }
    text.truncate(text.trim_end().len());
    text
}

#[derive(Debug, Serialize)]
pub(crate) struct InspectOutput<'a> {
    pub path: &'a Path,
    pub records: usize,
    pub dimension: Option<usize>,
    pub restaurants: Vec<GroupCount<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GroupCount<'a> {
    pub restaurant: &'a str,
    pub images: usize,
}

impl<'a> InspectOutput<'a> {
    pub(crate) fn new(path: &'a Path, index: &'a VectorIndex) -> Self {
        Self {
            path,
            records: index.len(),
            dimension: index.dimension(),
            restaurants: index
                .groups()
                .into_iter()
                .map(|(restaurant, images)| GroupCount { restaurant, images })
                .collect(),
        }
    }
}

pub(crate) fn render_inspect(out: &InspectOutput<'_>) -> String {
    let mut text = format!("Index: {}\n", out.path.display());
    text.push_str(&format!("Records: {}\n", out.records));
    text.push_str(&format!(
        "Dimension: {}\n",
        out.dimension.map_or("n/a".to_string(), |d| d.to_string())
    ));
    text.push_str(&format!("Restaurants: {}", out.restaurants.len()));
    for group in &out.restaurants {
        text.push_str(&format!("\n  {}: {}", group.restaurant, group.images));
    }
    text
}

pub(crate) fn render_index_stats(index_path: &Path, stats: &IndexStats) -> String {
    let mut text = format!(
        "Indexed {} images from {} restaurants into {} ({}ms)",
        stats.images,
        stats.groups.len(),
        index_path.display(),
        stats.time_ms
    );
    if stats.skipped > 0 {
        text.push_str(&format!("\nSkipped {} images:", stats.skipped));
        for error in &stats.errors {
            text.push_str(&format!("\n  {error}"));
        }
    }
    text
}
