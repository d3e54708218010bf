use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::Settings;
use flags::EmbedMode;
use mooddine_indexer::{index_from_manifest, ImageIndexer};
use mooddine_search::{MoodSearch, SearchPolicy};
use mooddine_vector_store::VectorIndex;
use report::{print_stdout, InspectOutput, SearchOutput};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod flags;
mod report;

#[derive(Parser)]
#[command(name = "mooddine")]
#[command(about = "Find restaurants whose ambience matches your mood", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./mooddine.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed restaurant images and write the index artifact
    Index(IndexArgs),

    /// Find distinct restaurants matching a mood
    Search(SearchArgs),

    /// Summarize an index artifact
    Inspect(InspectArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Image tree laid out as <restaurant>/<image>
    #[arg(long)]
    images: Option<PathBuf>,

    /// Where to write the index artifact
    #[arg(long)]
    output: Option<PathBuf>,

    /// Import precomputed embeddings (JSON Lines) instead of scanning images
    #[arg(long, conflicts_with = "images")]
    manifest: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Free-text mood, e.g. "candlelit and cozy"
    #[arg(required_unless_present = "vector")]
    query: Option<String>,

    /// Query with a precomputed embedding (JSON array of floats)
    #[arg(long, conflicts_with = "query")]
    vector: Option<PathBuf>,

    /// Index artifact to search
    #[arg(long)]
    index: Option<PathBuf>,

    /// Candidates ranked before diversity filtering
    #[arg(long)]
    pool: Option<usize>,

    /// Number of distinct restaurants to return
    #[arg(short = 'k', long)]
    limit: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Index artifact to inspect
    #[arg(long)]
    index: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Inspect(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(mode) = cli.embed_mode {
        settings.embedding_mode = mode.as_domain();
    }

    match cli.command {
        Commands::Index(args) => run_index(args, settings).await?,
        Commands::Search(args) => run_search(args, settings).await?,
        Commands::Inspect(args) => run_inspect(args, settings).await?,
    }

    Ok(())
}

async fn run_index(args: IndexArgs, settings: Settings) -> Result<()> {
    let index_path = args.output.unwrap_or(settings.index_path);

    let stats = if let Some(manifest) = args.manifest {
        index_from_manifest(&manifest, &index_path)
            .await
            .with_context(|| format!("Failed to import manifest {}", manifest.display()))?
    } else {
        let images_dir = args.images.unwrap_or(settings.images_dir);
        let embedder = settings.embedding_mode.embedder(settings.stub_dimension);
        log::info!(
            "Embedding images with the {} backend",
            settings.embedding_mode.as_str()
        );
        ImageIndexer::new(&images_dir, &index_path, embedder)
            .index()
            .await
            .with_context(|| format!("Failed to index {}", images_dir.display()))?
    };

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&stats)?)?;
    } else {
        print_stdout(&report::render_index_stats(&index_path, &stats))?;
    }
    Ok(())
}

async fn run_search(args: SearchArgs, settings: Settings) -> Result<()> {
    let index_path = args.index.unwrap_or(settings.index_path);
    let policy = SearchPolicy::new(
        args.pool.unwrap_or(settings.policy.pool_limit),
        args.limit.unwrap_or(settings.policy.distinct_k),
    )?;

    let index = Arc::new(load_index(&index_path).await?);
    let embedder = settings.embedding_mode.embedder(settings.stub_dimension);
    let search = MoodSearch::new(index, embedder, policy)?;

    let results = match (&args.vector, args.query.as_deref()) {
        (Some(vector_path), _) => {
            let query = read_query_vector(vector_path).await?;
            search.search_vector(&query)?
        }
        (None, Some(text)) => search.search_text(text).await?,
        (None, None) => anyhow::bail!("Provide a mood query or --vector"),
    };

    let out = SearchOutput::new(args.query.as_deref(), &results);
    if args.json {
        print_stdout(&serde_json::to_string_pretty(&out)?)?;
    } else {
        print_stdout(&report::render_search(&out))?;
    }
    Ok(())
}

async fn run_inspect(args: InspectArgs, settings: Settings) -> Result<()> {
    let index_path = args.index.unwrap_or(settings.index_path);
    let index = load_index(&index_path).await?;

    let out = InspectOutput::new(&index_path, &index);
    if args.json {
        print_stdout(&serde_json::to_string_pretty(&out)?)?;
    } else {
        print_stdout(&report::render_inspect(&out))?;
    }
    Ok(())
}

async fn load_index(path: &Path) -> Result<VectorIndex> {
    let owned = path.to_path_buf();
    let index = tokio::task::spawn_blocking(move || VectorIndex::load(&owned))
        .await
        .context("Index load task failed")?
        .with_context(|| format!("Failed to load index {}", path.display()))?;
    Ok(index)
}

async fn read_query_vector(path: &Path) -> Result<Vec<f32>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read query vector {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Query vector {} is not a JSON array of floats", path.display()))
}
