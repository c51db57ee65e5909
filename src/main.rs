mod api;
mod server;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use engagement_sim::config::EngineConfig;
use engagement_sim::scoring::ViralityScorer;
use engagement_sim::simulation::{intensity, lifetime_target, PhaseDurations};
use engagement_sim::store::JsonStore;
use engagement_sim::{
    format_float, format_number, EngagementEngine, RunRequest, ScoringInput, SimulationSettings,
};

#[derive(Parser)]
#[command(name = "engagement-sim", about = "Engagement simulation engine")]
struct Cli {
    /// Path to the engine TOML config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one engine invocation against the store.
    Run(RunArgs),
    /// Serve the health and run endpoints over HTTP.
    Serve(ServeArgs),
    /// Print the virality score breakdown for a piece of content.
    Score(ScoreArgs),
    /// Print intensity and expected totals hour by hour.
    Curve(CurveArgs),
    /// Write a default config and seed the store with default settings.
    Init(InitArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    #[arg(long)]
    item_id: Option<String>,
    #[arg(long)]
    manual: bool,
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    window_hours: Option<f64>,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

#[derive(Args, Debug, Clone)]
struct ScoreArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    body: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long = "theme")]
    themes: Vec<String>,
    #[arg(long = "keyword")]
    keywords: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct CurveArgs {
    #[arg(long, default_value_t = 70.0)]
    score: f64,
    #[arg(long, default_value_t = 6.0)]
    step_hours: f64,
    #[arg(long, default_value_t = 1.5)]
    delay: f64,
    #[arg(long, default_value_t = 24.0)]
    growth: f64,
    #[arg(long, default_value_t = 48.0)]
    decay: f64,
    #[arg(long, default_value_t = 50)]
    min_interactions: u64,
    #[arg(long, default_value_t = 300)]
    max_interactions: u64,
}

#[derive(Args, Debug, Clone)]
struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %err, "command failed");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_engine(cli.config, args).await,
        Command::Serve(args) => {
            let engine = open_engine(cli.config).await?;
            server::serve(args, engine).await
        }
        Command::Score(args) => run_score(cli.config, args),
        Command::Curve(args) => run_curve(args),
        Command::Init(args) => run_init(cli.config, args).await,
    }
}

async fn open_engine(path: Option<PathBuf>) -> Result<EngagementEngine<JsonStore>, String> {
    let (config, _) = EngineConfig::load(path)?;
    let store = JsonStore::load(config.store.path.clone())
        .await
        .map_err(|err| format!("failed to open store: {}", err))?;
    Ok(EngagementEngine::new(Arc::new(store), config))
}

async fn run_engine(path: Option<PathBuf>, args: RunArgs) -> Result<(), String> {
    let engine = open_engine(path).await?;
    let request = RunRequest {
        item_id: args.item_id,
        manual: args.manual,
        dry_run: args.dry_run,
        window_hours: args.window_hours,
    };
    let mut rng = engine.make_rng();
    let report = engine
        .run(&request, Utc::now(), &mut rng)
        .await
        .map_err(|err| err.to_string())?;

    println!(
        "Run ({}): processed {} of {} candidates | completed {} | failed {} | window {}h",
        report.mode.label(),
        report.processed,
        report.candidates,
        report.completed,
        report.failed,
        format_float(report.window_hours, 2)
    );

    if args.details {
        for item in &report.items {
            println!(
                "- {} [{}] score {} | {} at {}h | intensity {} | lambda {} | +{} likes +{} dislikes | {:?}",
                item.id,
                item.family.label(),
                format_float(item.score, 1),
                item.phase.label(),
                format_float(item.hours_since_anchor, 1),
                format_float(item.intensity, 3),
                format_float(item.lambda, 2),
                item.likes,
                item.dislikes,
                item.status
            );
        }
    }

    Ok(())
}

fn run_score(path: Option<PathBuf>, args: ScoreArgs) -> Result<(), String> {
    let (config, _) = EngineConfig::load(path)?;
    let scorer = ViralityScorer::new(config.rules);
    let input = ScoringInput {
        title: &args.title,
        description: &args.description,
        body: &args.body,
        category: args.category.as_deref(),
        themes: &args.themes,
        keywords: &args.keywords,
    };
    if input.text().trim().is_empty() {
        return Err("missing content: pass --title, --description or --body".to_string());
    }

    let breakdown = scorer.breakdown(&input);
    println!(
        "Virality score: {} (raw {})",
        format_float(breakdown.score, 1),
        format_float(breakdown.raw, 1)
    );
    println!("Base: {}", format_float(breakdown.base, 1));
    for hit in &breakdown.hits {
        println!(
            "- {} +{} ({})",
            hit.rule,
            format_float(hit.bonus, 1),
            hit.matches.join(", ")
        );
    }
    Ok(())
}

fn run_curve(args: CurveArgs) -> Result<(), String> {
    if args.step_hours <= 0.0 {
        return Err(format!("invalid step (hours > 0): {}", args.step_hours));
    }
    let settings = SimulationSettings {
        delay_hours: args.delay,
        growth_hours: args.growth,
        decay_hours: args.decay,
        min_interactions: args.min_interactions,
        max_interactions: args.max_interactions,
        ..SimulationSettings::default()
    };
    settings.validate()?;

    let phases: PhaseDurations = settings.phases();
    let target = lifetime_target(args.score, settings.min_interactions, settings.max_interactions);
    println!(
        "Lifetime target: {} interactions over {}h",
        format_number(target as f64),
        format_float(phases.lifetime(), 1)
    );

    let mut hours = 0.0;
    let mut cumulative = 0.0;
    while hours <= phases.lifetime() + args.step_hours {
        let current = intensity(hours, &phases);
        let expected = current * args.step_hours * target as f64 / phases.active_span();
        cumulative += expected;
        println!(
            "{:>7}h  {:<9}  intensity {}  expected {}  cumulative {}",
            format_float(hours, 1),
            phases.phase_at(hours).label(),
            format_float(current, 3),
            format_float(expected, 1),
            format_number(cumulative)
        );
        hours += args.step_hours;
    }
    Ok(())
}

async fn run_init(path: Option<PathBuf>, args: InitArgs) -> Result<(), String> {
    let (config, config_path) = EngineConfig::load(path)?;
    if let Some(config_path) = config_path.as_ref() {
        if config_path.exists() && !args.force {
            println!("Config exists: {}", config_path.display());
        } else {
            config.write(config_path)?;
            println!("Wrote config: {}", config_path.display());
        }
    }

    let store = JsonStore::load(config.store.path.clone())
        .await
        .map_err(|err| format!("failed to open store: {}", err))?;
    if store.snapshot().await.settings.is_none() {
        store
            .put_settings(SimulationSettings::default())
            .await
            .map_err(|err| format!("failed to write settings: {}", err))?;
        println!("Seeded default settings: {}", config.store.path.display());
    } else {
        println!("Store already has settings: {}", config.store.path.display());
    }
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("ENGAGEMENT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
