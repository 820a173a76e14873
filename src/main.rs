// ABOUTME: Entry point for the course-advisor binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs the recommendation pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use advisor_agent::{
    MetadataSelectorStage, NameFilterStage, PipelineConfig, PromptSet, RankingStage,
    RecommendationPipeline, create_model_runtime, rank_top_k,
};
use advisor_core::{PreferenceProfile, RunReport};
use advisor_store::CatalogStore;

mod survey;

#[derive(Parser)]
#[command(name = "course-advisor", about = "LLM-backed academic course recommender")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the chunked filter/select pipeline over a course catalog.
    Recommend(RecommendArgs),
    /// Score a previous run's recommendations and keep the top K.
    Rank(RankArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// LLM provider: "gemini" or "openai".
    #[arg(long, default_value = "gemini")]
    provider: String,
    /// Model name; defaults to the provider's configured model.
    #[arg(long)]
    model: Option<String>,
    /// YAML file overriding the built-in stage prompts.
    #[arg(long)]
    prompts: Option<PathBuf>,
    /// Fixed pause before each model call, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    call_delay_ms: u64,
}

#[derive(Args)]
struct RecommendArgs {
    /// Course catalog: a JSON object mapping course names to metadata.
    catalog: PathBuf,
    /// Preference profile JSON; without it the interactive survey runs.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Where to write the run report.
    #[arg(long, default_value = "recommendations.json")]
    output: PathBuf,
    /// Catalog entries fed through the stages per iteration.
    #[arg(long, default_value_t = 10)]
    chunk_size: usize,
    /// Minimum recommendations required to stop early.
    #[arg(long, default_value_t = 5)]
    quota: usize,
    /// Hard bound on pipeline iterations.
    #[arg(long, default_value_t = 10)]
    max_iters: u32,
    /// Minimum acceptable fraction of resolved names in the catalog lookup.
    #[arg(long, default_value_t = 0.3)]
    tolerance: f64,
    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct RankArgs {
    /// Course catalog: a JSON object mapping course names to metadata.
    catalog: PathBuf,
    /// Run report written by `recommend`; its courses are the ranking input.
    report: PathBuf,
    /// Preference profile JSON; without it the interactive survey runs.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Where to write the ranked scores.
    #[arg(long, default_value = "scores.json")]
    output: PathBuf,
    /// How many top-scored courses to keep.
    #[arg(long, default_value_t = 3)]
    top: usize,
    /// Concurrent ranker workers, each with its own model runtime.
    #[arg(long, default_value_t = 2)]
    workers: usize,
    #[command(flatten)]
    model: ModelArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_advisor=info,advisor_agent=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Recommend(args) => recommend(args).await,
        Command::Rank(args) => rank(args).await,
    }
}

async fn recommend(args: RecommendArgs) -> anyhow::Result<()> {
    let catalog = Arc::new(
        CatalogStore::load(&args.catalog)
            .with_context(|| format!("loading catalog {}", args.catalog.display()))?,
    );
    let profile = load_profile(args.profile.as_deref())?;
    let prompts = load_prompts(args.model.prompts.as_deref())?;
    let runtime = create_model_runtime(&args.model.provider, args.model.model.as_deref())?;

    let config = PipelineConfig {
        chunk_size: args.chunk_size,
        quota: args.quota,
        max_iters: args.max_iters,
        tolerance: args.tolerance,
        call_delay: Duration::from_millis(args.model.call_delay_ms),
    };
    let mut pipeline = RecommendationPipeline::new(
        catalog,
        Box::new(NameFilterStage::new(Arc::clone(&runtime), prompts.clone())),
        Box::new(MetadataSelectorStage::new(runtime, prompts)),
        config,
    )?;

    let report = pipeline.run(&profile).await;
    advisor_store::write_report(&args.output, &report)?;

    println!(
        "{} after {} iteration(s): {} course(s)",
        report.status,
        report.iterations,
        report.recommendations.len()
    );
    for course in &report.recommendations {
        println!("  - {course}");
    }
    Ok(())
}

async fn rank(args: RankArgs) -> anyhow::Result<()> {
    let catalog = Arc::new(
        CatalogStore::load(&args.catalog)
            .with_context(|| format!("loading catalog {}", args.catalog.display()))?,
    );
    let profile = Arc::new(load_profile(args.profile.as_deref())?);
    let prompts = load_prompts(args.model.prompts.as_deref())?;

    let raw = std::fs::read_to_string(&args.report)
        .with_context(|| format!("reading report {}", args.report.display()))?;
    let report: RunReport = serde_json::from_str(&raw)
        .with_context(|| format!("parsing report {}", args.report.display()))?;
    let names: Vec<String> = report.recommendations.into_iter().collect();

    // Each worker gets its own runtime so no HTTP client is shared.
    let worker_count = args.workers.max(1).min(names.len().max(1));
    let mut rankers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let runtime = create_model_runtime(&args.model.provider, args.model.model.as_deref())?;
        rankers.push(Arc::new(RankingStage::new(runtime, prompts.clone())));
    }

    let scored = rank_top_k(
        rankers,
        catalog,
        profile,
        names,
        args.top,
        Duration::from_millis(args.model.call_delay_ms),
    )
    .await?;
    advisor_store::write_scores(&args.output, &scored)?;

    for (course, score) in &scored {
        println!("{score:>6.1}  {course}");
    }
    Ok(())
}

fn load_profile(path: Option<&Path>) -> anyhow::Result<PreferenceProfile> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing profile {}", path.display()))
        }
        None => Ok(survey::collect_profile()?),
    }
}

fn load_prompts(path: Option<&Path>) -> anyhow::Result<PromptSet> {
    match path {
        Some(path) => Ok(PromptSet::from_yaml_file(path)?),
        None => Ok(PromptSet::default()),
    }
}
