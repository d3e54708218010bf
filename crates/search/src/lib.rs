//! Mood search: ranks the index against a query vector and keeps the best match per
//! restaurant.

mod diversity;
mod error;
mod mood;

pub use diversity::{distinct_by_group, diversify, DistinctResults};
pub use error::{Result, SearchError};
pub use mood::{find_top_distinct, MoodSearch, SearchPolicy};
