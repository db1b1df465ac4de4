//! MathDesk CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Initialize config & archive directory
//! - `doctor`: Diagnose setup and provider reachability
//! - `student`: Add, list and show student archives
//! - `mistake`: Analyze a typed-in mistake (cumulative per student)
//! - `photo`: Analyze a photographed mistake (single turn)
//! - `progress`: Stage progress report for a student
//! - `prep`: Lecture preparation for an exam question
//! - `quiz`: Generate a topic quiz
//! - `parallel`: Generate a parallel exam paper

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod render;

use commands::{Globals, InputArgs};

#[derive(Parser)]
#[command(
    name = "mathdesk",
    about = "MathDesk: mistake analysis, progress reports and quizzes for math teachers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.mathdesk/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Archive file, overriding config and MATHDESK_ARCHIVE
    #[arg(long, global = true, value_name = "PATH")]
    archive: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the archive directory
    Onboard,

    /// Diagnose configuration, archive and provider health
    Doctor {
        /// Skip contacting the providers
        #[arg(long)]
        offline: bool,
    },

    /// Manage student archives
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Analyze a typed-in mistake with the student's history as context
    Mistake {
        /// Student name
        student: String,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Analyze a photo of a student's work
    Photo {
        /// Student name
        student: String,

        /// Image file (png, jpeg, gif, webp, bmp)
        image: PathBuf,

        /// Extra instruction sent along with the photo
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Stage progress report from a student's submitted problems
    Progress {
        /// Student name
        student: String,
    },

    /// Lecture preparation for an exam question
    Prep {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Generate a topic quiz with answers
    Quiz {
        /// Topic, e.g. 反比例函数
        #[arg(short, long)]
        topic: String,

        /// Number of questions (1-10)
        #[arg(short, long, default_value_t = 5)]
        count: u8,

        /// 基础巩固, 中等强化 or 压轴拔高
        #[arg(short, long, default_value = "中等强化")]
        difficulty: String,
    },

    /// Generate a parallel exam paper from an original
    Parallel {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Subcommand)]
enum StudentAction {
    /// Create an empty archive for a student
    Add { name: String },

    /// List all students
    List,

    /// Show a student's mistake book
    Show { name: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for report text
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let globals = Globals {
        config: cli.config,
        archive: cli.archive,
    };

    let result = match cli.command {
        Commands::Onboard => commands::onboard::run(&globals).await,
        Commands::Doctor { offline } => commands::doctor::run(&globals, offline).await,
        Commands::Student { action } => match action {
            StudentAction::Add { name } => commands::student::add(&globals, &name).await,
            StudentAction::List => commands::student::list(&globals).await,
            StudentAction::Show { name } => commands::student::show(&globals, &name).await,
        },
        Commands::Mistake { student, input } => {
            commands::mistake::text(&globals, &student, &input).await
        }
        Commands::Photo {
            student,
            image,
            note,
        } => commands::mistake::photo(&globals, &student, &image, note.as_deref()).await,
        Commands::Progress { student } => commands::reports::progress(&globals, &student).await,
        Commands::Prep { input } => commands::reports::prep(&globals, &input).await,
        Commands::Quiz {
            topic,
            count,
            difficulty,
        } => commands::reports::quiz(&globals, topic, count, &difficulty).await,
        Commands::Parallel { input } => commands::reports::parallel(&globals, &input).await,
    };

    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
