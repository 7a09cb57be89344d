mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use wellbeing_engine::audit::AuditRunner;
use wellbeing_engine::synthetic::generate_profiles;
use wellbeing_engine::validation::validate_ranges;
use wellbeing_engine::{format_float, format_percent, Engine, EngineConfig, ModelContext};

#[derive(Parser)]
#[command(name = "wellbeing-engine", about = "Well-being score, persona and recommendation engine")]
struct Cli {
    /// Engine config (TOML); defaults to $ENGINE_CONFIG_PATH or config/engine.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Model bundle directory, overrides the config
    #[arg(long, global = true)]
    models: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Predict(PredictArgs),
    Serve(ServeArgs),
    Audit(AuditArgs),
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct PredictArgs {
    /// JSON record file; reads stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    details: bool,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[derive(Args, Debug, Clone)]
struct AuditArgs {
    #[arg(long, default_value_t = 500)]
    samples: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/engine.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Predict(args) => run_predict(args, build_engine(cli.config, cli.models)?),
        Command::Serve(args) => server::serve(args, build_engine(cli.config, cli.models)?).await,
        Command::Audit(args) => run_audit(args, build_engine(cli.config, cli.models)?),
        Command::InitConfig(args) => run_init_config(args),
    }
}

fn build_engine(
    config_path: Option<PathBuf>,
    models_dir: Option<PathBuf>,
) -> Result<Engine, String> {
    let (mut config, path) = EngineConfig::load(config_path).map_err(|err| err.to_string())?;
    if let Some(dir) = models_dir {
        config.models.dir = dir;
    }
    match path {
        Some(path) if path.exists() => info!(path = %path.display(), "config loaded"),
        _ => info!("using default config"),
    }

    let models = ModelContext::load(&config.models.dir).map_err(|err| err.to_string())?;
    Ok(Engine::new(&config, models))
}

fn run_predict(args: PredictArgs, engine: Engine) -> Result<(), String> {
    let record = read_record(args.input.as_deref())?;
    validate_ranges(&record).map_err(|err| err.to_string())?;

    let report = engine
        .infer_detailed(&record)
        .map_err(|err| format!("prediction failed: {}", err))?;

    if args.json {
        let payload = if args.details {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string_pretty(&report.prediction)
        }
        .map_err(|err| format!("failed to serialize prediction: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    let prediction = &report.prediction;
    println!("Happiness: {} / 10", format_float(prediction.happiness, 2));
    println!("Stress: {} / 10", format_float(prediction.stress, 2));
    println!("Persona: {}", prediction.persona);

    if args.details {
        let resolution = &report.resolution;
        println!("\nEngagement score: {}", format_float(report.engagement_score, 1));
        println!("Wellbeing penalty: {}", report.penalty.label());
        println!("Persona source: {}", resolution.source.label());
        match (resolution.model_candidate, resolution.cluster_index) {
            (Some(candidate), Some(index)) => {
                println!("Clustering candidate: {} (cluster {})", candidate, index)
            }
            (None, Some(index)) => println!("Cluster index: {}", index),
            _ => println!("Clustering candidate: none"),
        }
    }

    println!("\nRecommendations:");
    for recommendation in &prediction.recommendations {
        println!("- {}", recommendation);
    }

    Ok(())
}

fn run_audit(args: AuditArgs, engine: Engine) -> Result<(), String> {
    let runner = AuditRunner::new(generate_profiles(args.samples, args.seed));
    let report = runner.run(&engine);

    if args.json {
        let payload = serde_json::to_string_pretty(&report)
            .map_err(|err| format!("failed to serialize report: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    println!(
        "Samples: {} ({} failed)",
        report.sample_count, report.failures
    );
    println!(
        "Clustering agreement: {} of {} candidates ({})",
        report.agreed,
        report.model_candidates,
        format_percent(report.agreement_rate)
    );
    println!(
        "Sources: agreed {} | overridden {} | heuristic only {} | fallback {}",
        report.agreed, report.overridden, report.heuristic_only, report.fallback
    );
    println!(
        "Average scores: happiness {} | stress {}",
        format_float(report.average_happiness, 2),
        format_float(report.average_stress, 2)
    );

    if !report.confusion.is_empty() {
        println!("\nClustering candidate -> resolved persona:");
        for entry in &report.confusion {
            println!("  {} -> {}: {}", entry.model, entry.resolved, entry.count);
        }
    }

    println!("\nPersona distribution:");
    for (persona, count) in &report.persona_distribution {
        println!("  {}: {}", persona, count);
    }

    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists (pass --force to overwrite)",
            args.path.display()
        ));
    }
    EngineConfig::default()
        .write(&args.path)
        .map_err(|err| err.to_string())?;
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn read_record(path: Option<&Path>) -> Result<Map<String, Value>, String> {
    let contents = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("failed reading {}: {}", path.display(), err))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("failed reading stdin: {}", err))?;
            buffer
        }
    };

    if contents.trim().is_empty() {
        return Err("missing input record: pass --input or pipe JSON on stdin".to_string());
    }

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err("input record must be a JSON object".to_string()),
        Err(err) => Err(format!("invalid JSON input: {}", err)),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
