//! confscore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "confscore",
    version,
    about = "Confidence-weighted scoring and group comparison"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a dataset and compare CG against EG
    Analyze {
        /// Path to the study CSV
        #[arg(long)]
        data: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scoring scheme: signed, brier
        #[arg(long)]
        scheme: Option<String>,

        /// Participant aggregation: mean, sum
        #[arg(long)]
        aggregation: Option<String>,

        /// t-test variant: welch, student
        #[arg(long)]
        t_test: Option<String>,

        /// Questions per participant
        #[arg(long)]
        questions: Option<usize>,

        /// Output directory (defaults to the configured output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, csv, markdown, all
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Write per-item and per-participant scores to CSV
    Score {
        /// Path to the study CSV
        #[arg(long)]
        data: PathBuf,

        /// Destination CSV file
        #[arg(long)]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scoring scheme: signed, brier
        #[arg(long)]
        scheme: Option<String>,

        /// Participant aggregation: mean, sum
        #[arg(long)]
        aggregation: Option<String>,
    },

    /// Check a study CSV for problems
    Validate {
        /// Path to the study CSV
        #[arg(long)]
        data: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Questions per participant (defaults to the configured value)
        #[arg(long)]
        questions: Option<usize>,
    },

    /// Create a starter config and example dataset
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("confscore=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            data,
            config,
            scheme,
            aggregation,
            t_test,
            questions,
            output,
            format,
        } => commands::analyze::execute(commands::analyze::AnalyzeArgs {
            data,
            config,
            overrides: commands::analyze::Overrides {
                scheme,
                aggregation,
                t_test,
                questions,
            },
            output,
            format,
        }),
        Commands::Score {
            data,
            output,
            config,
            scheme,
            aggregation,
        } => commands::score::execute(
            data,
            output,
            config,
            commands::analyze::Overrides {
                scheme,
                aggregation,
                t_test: None,
                questions: None,
            },
        ),
        Commands::Validate {
            data,
            config,
            questions,
        } => commands::validate::execute(
            data,
            config,
            commands::analyze::Overrides {
                questions,
                ..Default::default()
            },
        ),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
