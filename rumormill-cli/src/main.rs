//! Rumormill CLI
//!
//! Procedural narrative generation from seeded rumor diffusion.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rumormill_gen::{
    create_anthropic_backend, create_backend, AnthropicConfig, LlmProvider, OpenAIBackendConfig,
    SharedProvider, TemplateProvider,
};
use rumormill_runtime::{CountryOutcome, Orchestrator, RunReport, SimConfig};
use rumormill_world::{EventFilter, WorldDatabase};

#[derive(Parser)]
#[command(name = "rumormill")]
#[command(author, version, about = "Rumormill: rumor-driven procedural chronicles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation over a world file
    Run {
        /// World data file (TOML)
        #[arg(short, long)]
        world: PathBuf,

        /// Nodes per country network
        #[arg(long, default_value = "12")]
        population: usize,

        /// Fraction of the population the journalist seeds edges to
        #[arg(long, default_value = "0.7")]
        hub_fraction: f32,

        /// Maximum turns per country
        #[arg(long, default_value = "10")]
        turn_cap: usize,

        /// Restrict each country to its own events (drop global ones)
        #[arg(long)]
        country_events_only: bool,

        /// Adoption chance per listener per turn
        #[arg(long, default_value = "0.85")]
        acceptance: f32,

        /// Edges added per growth step
        #[arg(long, default_value = "4")]
        growth_edges: usize,

        /// Pacing delay between turns in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Base seed for network construction and node streams
        #[arg(long, default_value = "1234")]
        seed: u64,

        /// Use the Anthropic backend instead of the offline generator
        #[arg(long)]
        anthropic: bool,

        /// Use an OpenAI-compatible backend instead of the offline generator
        #[arg(long)]
        openai: bool,

        /// Use OpenRouter instead of the offline generator
        #[arg(long)]
        openrouter: bool,

        /// LLM model to use with --anthropic/--openai/--openrouter
        #[arg(short, long, default_value = "claude-sonnet-4-20250514")]
        model: String,

        /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
        #[arg(long, env = "ANTHROPIC_API_KEY")]
        anthropic_key: Option<String>,

        /// OpenAI API key (or set OPENAI_API_KEY env var)
        #[arg(long, env = "OPENAI_API_KEY")]
        api_key: Option<String>,

        /// OpenRouter API key (or set OPENROUTER_API_KEY env var)
        #[arg(long, env = "OPENROUTER_API_KEY")]
        openrouter_key: Option<String>,

        /// Directory to write per-country chronicle files into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load and validate a world file without running
    Validate {
        /// World data file (TOML)
        #[arg(short, long)]
        world: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            world,
            population,
            hub_fraction,
            turn_cap,
            country_events_only,
            acceptance,
            growth_edges,
            delay_ms,
            seed,
            anthropic,
            openai,
            openrouter,
            model,
            anthropic_key,
            api_key,
            openrouter_key,
            output,
        } => {
            let provider = select_provider(
                anthropic,
                openai,
                openrouter,
                &model,
                anthropic_key,
                api_key,
                openrouter_key,
            )?;

            let config = SimConfig {
                population,
                hub_fraction,
                acceptance_probability: acceptance,
                growth_edges_per_turn: growth_edges,
                turn_cap,
                event_filter: if country_events_only {
                    EventFilter::CountryOnly
                } else {
                    EventFilter::CountryOrGlobal
                },
                step_delay_ms: delay_ms,
                seed,
                ..SimConfig::default()
            };

            run_world(&world, provider, config, output).await?;
        }
        Commands::Validate { world } => {
            let database = WorldDatabase::from_file(&world)?;
            database.validate()?;
            println!(
                "✅ {} is valid: {} countries, {} characters, {} events",
                world.display(),
                database.countries.len(),
                database.characters.len(),
                database.events.len()
            );
        }
    }

    Ok(())
}

fn select_provider(
    anthropic: bool,
    openai: bool,
    openrouter: bool,
    model: &str,
    anthropic_key: Option<String>,
    api_key: Option<String>,
    openrouter_key: Option<String>,
) -> Result<SharedProvider> {
    let provider: SharedProvider = if openrouter {
        let key = openrouter_key.ok_or_else(|| {
            anyhow::anyhow!("OpenRouter API key required. Set OPENROUTER_API_KEY or use --openrouter-key")
        })?;
        LlmProvider::shared(create_backend(OpenAIBackendConfig::openrouter(&key, model))?)
    } else if openai {
        let key = api_key.ok_or_else(|| {
            anyhow::anyhow!("OpenAI API key required. Set OPENAI_API_KEY or use --api-key")
        })?;
        LlmProvider::shared(create_backend(OpenAIBackendConfig::openai(&key, model))?)
    } else if anthropic {
        let key = anthropic_key.ok_or_else(|| {
            anyhow::anyhow!("Anthropic API key required. Set ANTHROPIC_API_KEY or use --anthropic-key")
        })?;
        LlmProvider::shared(create_anthropic_backend(AnthropicConfig::new(&key, model))?)
    } else {
        // offline deterministic generator
        TemplateProvider::shared()
    };
    Ok(provider)
}

async fn run_world(
    world_path: &PathBuf,
    provider: SharedProvider,
    config: SimConfig,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("📜 Rumormill - rumor-driven procedural chronicles\n");

    let database = WorldDatabase::from_file(world_path)?;
    println!(
        "🌍 World: {} countries, {} characters, {} events",
        database.countries.len(),
        database.characters.len(),
        database.events.len()
    );
    println!(
        "⚙️  Population: {} | Hub fraction: {} | Turn cap: {} | Seed: {}\n",
        config.population, config.hub_fraction, config.turn_cap, config.seed
    );

    let orchestrator = Orchestrator::new(database, provider, config)?;

    // Ctrl-C stops the run at the next step boundary
    let cancel = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n🛑 Cancelling at the next boundary...");
            cancel.cancel();
        }
    });

    let report = orchestrator.run().await;

    print_report(&report, output.as_deref())?;
    Ok(())
}

fn print_report(report: &RunReport, output: Option<&std::path::Path>) -> Result<()> {
    for chronicle in &report.chronicles {
        match &chronicle.outcome {
            CountryOutcome::Completed { feed, history, .. } => {
                println!("{feed}");
                println!("--- {} Consolidated History ---", chronicle.country);
                println!("{}\n", history.consolidated);

                if let Some(dir) = output {
                    fs::create_dir_all(dir)?;
                    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
                    let path = dir.join(format!(
                        "chronicle_{}_{timestamp}.md",
                        chronicle.country.to_lowercase()
                    ));
                    let content = format!("{feed}\n## Consolidated History\n\n{}\n", history.consolidated);
                    fs::write(&path, content)?;
                    println!("📄 Chronicle saved to: {}\n", path.display());
                }
            }
            CountryOutcome::Skipped { reason } => {
                println!("⏭️  {} skipped: {reason}\n", chronicle.country);
            }
            CountryOutcome::Aborted { error } => {
                println!("⚠️  {} aborted: {error}\n", chronicle.country);
            }
        }
    }

    if report.cancelled {
        println!("🛑 Run cancelled; {} countries completed.", report.completed_count());
    } else {
        println!(
            "✅ Run complete: {}/{} countries produced a chronicle.",
            report.completed_count(),
            report.chronicles.len()
        );
    }
    Ok(())
}
