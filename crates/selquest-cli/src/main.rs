//! selquest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use selquest_core::model::AssessmentType;

mod commands;

#[derive(Parser)]
#[command(
    name = "selquest",
    version,
    about = "SEL progress and assessment scoring engine"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the daily check-in
    CheckIn {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Event time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record a journal entry
    Journal {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Journal text
        #[arg(long, default_value = "")]
        text: String,

        /// Pre-computed dimension score, e.g. "self-awareness=0.8" (repeatable)
        #[arg(long = "sel-score")]
        sel_scores: Vec<String>,

        /// Event time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Record a mindfulness session
    Mindfulness {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Event time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Mark the child's profile as completed
    ProfileComplete {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Event time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show streak, XP, level, and badges
    Progress {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Score and store a PRE or POST assessment
    Assess {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Assessment type: pre, post
        #[arg(long = "type")]
        assessment_type: AssessmentType,

        /// Answers file (.toml or .json) mapping question code to a 1-5 value
        #[arg(long)]
        answers: PathBuf,

        /// Completion time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Show the pre/post comparison
    Compare {
        /// Child identifier
        #[arg(long)]
        child: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a question bank TOML file
    Validate {
        /// Question bank file; the configured or built-in bank when omitted
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// Create starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("selquest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::CheckIn { child, at, format } => {
            commands::check_in::execute(config, child, at, format).await
        }
        Commands::Journal {
            child,
            text,
            sel_scores,
            at,
            format,
        } => commands::journal::execute(config, child, text, sel_scores, at, format).await,
        Commands::Mindfulness { child, at, format } => {
            commands::mindfulness::execute(config, child, at, format).await
        }
        Commands::ProfileComplete { child, at, format } => {
            commands::profile_complete::execute(config, child, at, format).await
        }
        Commands::Progress { child, format } => {
            commands::progress::execute(config, child, format).await
        }
        Commands::Assess {
            child,
            assessment_type,
            answers,
            at,
        } => commands::assess::execute(config, child, assessment_type, answers, at).await,
        Commands::Compare {
            child,
            format,
            output,
        } => commands::compare::execute(config, child, format, output).await,
        Commands::Validate { bank } => commands::validate::execute(config, bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
