use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use copycat::cli::commands;

#[derive(Parser)]
#[command(name = "copycat")]
#[command(
    version,
    about = "Generates and normalizes variant exam questions with LLM backends"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate clone questions for a test batch
    Generate {
        #[arg(help = "Test number selecting the source batch (prompted when omitted)")]
        test_number: Option<String>,
        #[arg(long, help = "Cap the number of records processed")]
        limit: Option<usize>,
        #[arg(long = "dry-run", help = "Log intended writes without writing")]
        dry_run: bool,
        #[arg(long, help = "Process a single source record by identifier")]
        record: Option<String>,
        #[arg(long, help = "LLM backend (deepseek, openai, anthropic, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
    },

    /// Normalize stored LaTeX markup with deterministic transforms
    Cleanup {
        #[arg(long, help = "Field to clean (defaults to the stored explanation field)")]
        field: Option<String>,
        #[arg(long, help = "Cap the number of records processed")]
        limit: Option<usize>,
        #[arg(long = "dry-run", help = "Log intended patches without writing")]
        dry_run: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize project configuration
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            test_number,
            limit,
            dry_run,
            record,
            provider,
            model,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(commands::generate::GenerateOptions {
                test_number,
                limit,
                dry_run,
                record,
                provider,
                model,
            }))?;
        }
        Commands::Cleanup {
            field,
            limit,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::cleanup::run(field, limit, dry_run))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                commands::config::show(&format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { force } => {
                commands::config::init(force)?;
            }
        },
    }

    Ok(())
}
