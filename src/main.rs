use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use quiz_session::{Difficulty, Quiz, QuizConfig, TimerConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the questions from (defaults to the built-in bank)
    #[arg(short, long)]
    questions: Option<PathBuf>,

    /// Category to preselect on the setup screen
    #[arg(short, long)]
    category: Option<String>,

    /// Difficulty to preselect: beginner, intermediate or advanced
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Seconds allowed per question
    #[arg(long, default_value_t = quiz_session::config::DEFAULT_DURATION_SECS)]
    time_limit: u32,

    /// Remaining seconds at which the countdown turns to its warning colour
    #[arg(long, default_value_t = quiz_session::config::DEFAULT_WARNING_SECS)]
    warning: u32,

    /// Answer without a countdown
    #[arg(long)]
    no_timer: bool,

    /// File holding the best score
    #[arg(long)]
    store: Option<PathBuf>,

    /// Ring the terminal bell after each answer
    #[arg(long)]
    sound: bool,

    /// Write logs (filtered by RUST_LOG) to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> QuizConfig {
        QuizConfig {
            questions_path: self.questions,
            store_path: self.store,
            timer: TimerConfig {
                enabled: !self.no_timer,
                duration_secs: self.time_limit,
                warning_threshold_secs: self.warning,
            },
            category: self.category,
            difficulty: self.difficulty,
            sound: self.sound,
        }
    }
}

/// The terminal owns stdout and stderr while the quiz runs, so logging is
/// only enabled when a file is given.
fn init_logging(log_file: Option<&PathBuf>) {
    let Some(path) = log_file else {
        return;
    };

    match File::create(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.log_file.as_ref());

    let config = args.into_config();
    let quiz = match Quiz::from_config(&config) {
        Ok(quiz) => quiz,
        Err(e) => {
            eprintln!("Error starting quiz: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = quiz.run().await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}
