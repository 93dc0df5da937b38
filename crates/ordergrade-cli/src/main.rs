//! ordergrade CLI: grade ordering-question attempts from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ordergrade", version, about = "Grading engine for ordering questions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade every attempt in a grading set
    Grade {
        /// Path to .toml grading set or directory
        #[arg(long)]
        grading_set: PathBuf,

        /// Policy applied to every question, by name or code (e.g. "relative_to_correct", "-1")
        #[arg(long, allow_negative_numbers = true)]
        policy: Option<String>,

        /// Max concurrent gradings (default from config)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, text, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Filter questions by tags (comma-separated)
        #[arg(long)]
        filter: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate grading set TOML files
    Validate {
        /// Path to grading set file or directory
        #[arg(long)]
        grading_set: PathBuf,
    },

    /// List the available grading policies
    Policies,

    /// Create starter config and example grading set
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "ordergrade=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            grading_set,
            policy,
            parallelism,
            output,
            format,
            filter,
            config,
        } => {
            commands::grade::execute(
                grading_set,
                policy,
                parallelism,
                output,
                format,
                filter,
                config,
            )
            .await
        }
        Commands::Validate { grading_set } => commands::validate::execute(grading_set),
        Commands::Policies => commands::policies::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
