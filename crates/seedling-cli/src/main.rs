mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use seedling_core::{Error as CoreError, InMemoryStore, Instance, ModelRegistry};
use seedling_generate::{GenerationError, ModelFinder, Seeder};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "seedling", version, about = "Seedling test-data factory")]
struct Cli {
    /// Log filter (e.g. `debug`, `seedling_generate=debug`). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build instances without persisting them.
    Prepare(BuildArgs),
    /// Build and persist instances in an in-memory store.
    Make(BuildArgs),
    /// List models and the names they resolve from.
    Models(ModelsArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Model name, `app.model` or a bare model name.
    model: String,
    /// Number of instances to build.
    #[arg(long, default_value_t = 1)]
    quantity: usize,
    /// Field override, `field=value` or `relation__field=value`. Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
    /// Model registry file.
    #[arg(long, default_value = "models.json")]
    models: PathBuf,
    /// Factory options file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
    /// Leave required many-to-many relations empty.
    #[arg(long, default_value_t = false)]
    no_m2m: bool,
}

#[derive(Args, Debug)]
struct ModelsArgs {
    /// Model registry file.
    #[arg(long, default_value = "models.json")]
    models: PathBuf,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref(), cli.log_json)?;

    match cli.command {
        Command::Prepare(args) => run_build(args, false),
        Command::Make(args) => run_build(args, true),
        Command::Models(args) => run_models(args),
    }
}

fn run_build(args: BuildArgs, commit: bool) -> Result<(), CliError> {
    if args.quantity == 0 {
        return Err(CliError::InvalidArgument(
            "quantity must be at least 1".to_string(),
        ));
    }

    let mut options = config::load_options(args.config.as_deref())?;
    if args.seed.is_some() {
        options.seed = args.seed;
    }
    if args.no_m2m {
        options.make_m2m = false;
    }
    let overrides = config::parse_overrides(&args.set)?;

    let registry = ModelRegistry::load(&args.models)?;
    tracing::info!(
        models = registry.len(),
        path = %args.models.display(),
        "model registry loaded"
    );
    let finder = Arc::new(ModelFinder::new(Arc::new(registry)));
    let mut seeder = Seeder::with_store(finder, InMemoryStore::new(), options);

    let instances = seeder
        .builder()
        .build(args.model.as_str(), args.quantity, commit, &overrides)?;
    print_instances(&instances)?;

    tracing::info!(
        model = %args.model,
        quantity = instances.len(),
        commit,
        stored = seeder.store().len(),
        "build finished"
    );
    Ok(())
}

fn print_instances(instances: &[Instance]) -> Result<(), CliError> {
    let output = match instances {
        [instance] => serde_json::to_string_pretty(instance)?,
        _ => serde_json::to_string_pretty(instances)?,
    };
    println!("{output}");
    Ok(())
}

fn run_models(args: ModelsArgs) -> Result<(), CliError> {
    let registry = Arc::new(ModelRegistry::load(&args.models)?);
    let finder = ModelFinder::new(Arc::clone(&registry));

    for model in registry.models() {
        let name = model.model_name();
        if finder.is_ambiguous(&name) {
            println!("{}\t(ambiguous: {name})", model.label());
        } else {
            println!("{}\t{name}", model.label());
        }
    }
    Ok(())
}
