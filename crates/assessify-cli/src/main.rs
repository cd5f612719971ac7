//! assessify CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "assessify",
    version,
    about = "Question-set to assessment-evidence transformer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the evidence bundle for a question set
    Build {
        /// Reference question-set identifier
        #[arg(long)]
        reference_id: String,

        /// Solution type label (e.g. "observation", "survey")
        #[arg(long, default_value = "observation")]
        solution_type: String,

        /// Emit only criteria and sections, without page questions
        #[arg(long)]
        skip_page_questions: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List the field templates per question type
    ShowTemplates {
        /// Show only one type (text, number, slider, date, multiselect, radio)
        #[arg(long = "type")]
        type_key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("assessify=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            reference_id,
            solution_type,
            skip_page_questions,
            config,
            pretty,
        } => {
            commands::build::execute(reference_id, solution_type, skip_page_questions, config, pretty)
                .await
        }
        Commands::ShowTemplates { type_key } => commands::show_templates::execute(type_key),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
