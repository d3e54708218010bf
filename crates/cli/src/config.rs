//! Layered settings: built-in defaults, then `mooddine.json`, then environment,
//! then command-line flags (applied by the caller).

use anyhow::{Context as AnyhowContext, Result};
use mooddine_search::SearchPolicy;
use mooddine_vector_store::{
    default_images_dir, default_index_path, EmbeddingMode, DEFAULT_STUB_DIMENSION,
    EMBEDDING_MODE_ENV, STUB_DIMENSION_ENV,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_FILE_NAME: &str = "mooddine.json";
pub(crate) const INDEX_PATH_ENV: &str = "MOODDINE_INDEX_PATH";
pub(crate) const IMAGES_DIR_ENV: &str = "MOODDINE_IMAGES_DIR";

/// On-disk config; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    index_path: Option<PathBuf>,
    images_dir: Option<PathBuf>,
    embedding_mode: Option<String>,
    stub_dimension: Option<usize>,
    pool_limit: Option<usize>,
    distinct_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub index_path: PathBuf,
    pub images_dir: PathBuf,
    pub embedding_mode: EmbeddingMode,
    pub stub_dimension: usize,
    pub policy: SearchPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            images_dir: default_images_dir(),
            embedding_mode: EmbeddingMode::Stub,
            stub_dimension: DEFAULT_STUB_DIMENSION,
            policy: SearchPolicy::default(),
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then process environment.
    ///
    /// An explicit `config_path` must exist; the implicit `./mooddine.json` is optional.
    pub(crate) fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut settings = Self::default();

        let (path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };
        if required || path.is_file() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            settings
                .apply_file(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            log::debug!("Loaded config from {}", path.display());
        }

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    fn apply_file(&mut self, text: &str) -> Result<()> {
        let file: FileConfig = serde_json::from_str(text)?;

        if let Some(path) = file.index_path {
            self.index_path = path;
        }
        if let Some(dir) = file.images_dir {
            self.images_dir = dir;
        }
        if let Some(mode) = file.embedding_mode {
            self.embedding_mode = EmbeddingMode::parse(&mode)?;
        }
        if let Some(dim) = file.stub_dimension {
            self.stub_dimension = positive(dim, "stub_dimension")?;
        }
        if let Some(pool) = file.pool_limit {
            self.policy.pool_limit = positive(pool, "pool_limit")?;
        }
        if let Some(k) = file.distinct_k {
            self.policy.distinct_k = positive(k, "distinct_k")?;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(INDEX_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.index_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(IMAGES_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.images_dir = PathBuf::from(dir);
        }
        if let Some(mode) = lookup(EMBEDDING_MODE_ENV) {
            self.embedding_mode = EmbeddingMode::parse(&mode)
                .with_context(|| format!("Invalid {EMBEDDING_MODE_ENV}"))?;
        }
        if let Some(raw) = lookup(STUB_DIMENSION_ENV) {
            let dim = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {STUB_DIMENSION_ENV}: {raw}"))?;
            self.stub_dimension = positive(dim, STUB_DIMENSION_ENV)?;
        }
        Ok(())
    }
}

fn positive(value: usize, name: &str) -> Result<usize> {
    if value == 0 {
        anyhow::bail!("{name} must be positive");
    }
    Ok(value)
}
