use clap::{Parser, Subcommand, ValueEnum};
use hullmatch::config::{find_entity, load_entities, resolve_profile};
use hullmatch::{
    annotate, compare, explain_difference, find_top_k, ExplainView, ProfileRegistry,
    RankingStats,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Compare and rank boats by structured and visual similarity
#[derive(Parser, Debug)]
#[command(name = "hullmatch")]
#[command(about = "Boat similarity and ranking engine", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ProfileArgs {
    /// Path to a weight profile JSON file
    #[arg(long, conflicts_with = "preset")]
    profile: Option<PathBuf>,

    /// Name of a built-in preset (legacy-a, legacy-b, visual-hybrid)
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two boats
    Compare {
        /// Path to a JSON array of entities
        #[arg(short, long)]
        entities: PathBuf,

        /// Id of the first boat
        #[arg(long)]
        a: String,

        /// Id of the second boat
        #[arg(long)]
        b: String,

        /// Include per-field facts in the given order
        #[arg(long, value_enum)]
        explain: Option<ViewArg>,

        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Find the boats most similar to a query boat
    Similar {
        /// Path to a JSON array of entities
        #[arg(short, long)]
        entities: PathBuf,

        /// Id of the query boat
        #[arg(short, long)]
        query: String,

        /// Number of results
        #[arg(short, long, default_value_t = 10)]
        k: usize,

        /// Minimum overall score
        #[arg(short, long, default_value_t = 0.0)]
        threshold: f32,

        /// Annotate each result with per-field facts
        #[arg(long, value_enum)]
        explain: Option<ViewArg>,

        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Print the built-in weight profiles
    Presets,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewArg {
    MostSimilar,
    MostDifferent,
}

impl From<ViewArg> for ExplainView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::MostSimilar => ExplainView::MostSimilar,
            ViewArg::MostDifferent => ExplainView::MostDifferent,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the JSON output, so logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting hullmatch v{}", env!("CARGO_PKG_VERSION"));

    let output = match args.command {
        Command::Compare {
            entities,
            a,
            b,
            explain,
            profile,
        } => {
            let profile = resolve_profile(profile.profile.as_deref(), profile.preset.as_deref())?;
            let entities = load_entities(&entities)?;
            let entity_a = find_entity(&entities, &a)?;
            let entity_b = find_entity(&entities, &b)?;

            let result = compare(entity_a, entity_b, &profile)?;
            info!(profile = %profile.name, score = result.overall_score, "compared boats");

            let facts = match explain {
                Some(view) => Some(explain_difference(&result, view.into())?),
                None => None,
            };

            json!({
                "profile": profile.name,
                "a": entity_a.id,
                "b": entity_b.id,
                "overall_score": result.overall_score,
                "percentage": result.percentage(),
                "per_field": result.per_field(),
                "explain": facts,
            })
        }
        Command::Similar {
            entities,
            query,
            k,
            threshold,
            explain,
            profile,
        } => {
            let profile = resolve_profile(profile.profile.as_deref(), profile.preset.as_deref())?;
            let entities = load_entities(&entities)?;
            let query = find_entity(&entities, &query)?;

            let ranked = find_top_k(query, &entities, &profile, k, threshold)?;
            let stats = RankingStats::compute(&ranked, entities.len().saturating_sub(1));
            info!(
                profile = %profile.name,
                results = stats.results_count,
                best = stats.best_score,
                "ranked similar boats"
            );

            let result = match explain {
                Some(view) => {
                    let explained = annotate(query, &entities, ranked, &profile, view.into())?;
                    serde_json::to_value(explained)?
                }
                None => serde_json::to_value(ranked)?,
            };

            json!({
                "profile": profile.name,
                "query": query.id,
                "result": result,
                "stats": stats,
            })
        }
        Command::Presets => {
            let registry = ProfileRegistry::with_presets();
            serde_json::to_value(registry.profiles().collect::<Vec<_>>())?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
