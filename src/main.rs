use clap::{Parser, Subcommand};
use colored::*;
use docsdoc::api::{self, AppState, DEFAULT_LANGUAGE};
use docsdoc::service::CapabilityOutcome;
use docsdoc::{logging, Config, DocsService, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "Docs' Doc: README summaries, generation, drift checks and Q&A for GitHub repositories", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the repository snapshot as JSON
    Fetch {
        /// GitHub repository URL
        url: String,
    },
    /// Summarise the README, generate docs and check for drift
    Analyze {
        /// GitHub repository URL
        url: String,
        /// Generate docs without emoji
        #[arg(long)]
        no_emoji: bool,
    },
    /// Translate the repository README
    Translate {
        /// GitHub repository URL
        url: String,
        /// Target language
        #[arg(short = 'L', long, default_value = DEFAULT_LANGUAGE)]
        language: String,
    },
    /// Ask a question about the repository
    Ask {
        /// GitHub repository URL
        url: String,
        /// The question
        question: String,
    },
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    let explicit_level = cli.log_level.is_some();
    if let Some(level) = cli.log_level {
        config.server.log_level = level;
    }
    let serving = matches!(cli.command, Command::Serve { .. });
    // One-shot commands only show warnings unless a level was asked for
    let log_level = if explicit_level || serving {
        config.server.log_level.as_str()
    } else {
        "warn"
    };
    logging::init(log_level)?;

    let service = DocsService::from_config(&config)?;
    if !serving && !service.llm_configured() {
        eprintln!(
            "{} GEMINI_API_KEY is not set; generated sections will be placeholders",
            "[WARNING]".yellow().bold()
        );
    }

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            println!("{} http://{}", "Docs' Doc listening on".bright_green().bold(), config.server.bind_addr);
            api::serve(AppState::new(service), &config.server.bind_addr).await?;
        }
        Command::Fetch { url } => {
            let pb = spinner(&format!("Fetching {}", url));
            let snapshot = service.fetch_repo(&url).await;
            pb.finish_and_clear();
            println!("{}", serde_json::to_string_pretty(&snapshot?)?);
        }
        Command::Analyze { url, no_emoji } => {
            let pb = spinner(&format!("Analyzing {}", url));
            let analysis = service.analyze(&url, !no_emoji).await;
            pb.finish_and_clear();
            let analysis = analysis?;

            println!(
                "{} {} ({}, {} commits, {} files)",
                "Repository:".bright_white().bold(),
                analysis.snapshot.repo,
                analysis.snapshot.default_branch,
                analysis.snapshot.commits.len(),
                analysis.snapshot.files.len()
            );
            print_outcome("README TL;DR", &analysis.summary);
            print_outcome("Generated docs", &analysis.docs);
            print_outcome("Doc drift", &analysis.drift);
        }
        Command::Translate { url, language } => {
            let pb = spinner(&format!("Translating README to {}", language));
            let result = translate_readme(&service, &url, &language).await;
            pb.finish_and_clear();
            print_section(&format!("README ({})", language), &result?);
        }
        Command::Ask { url, question } => {
            let pb = spinner("Reading repository");
            let result = ask(&service, &url, &question).await;
            pb.finish_and_clear();
            print_section("Answer", &result?);
        }
    }
    Ok(())
}

async fn translate_readme(service: &DocsService, url: &str, language: &str) -> Result<String> {
    let snapshot = service.fetch_repo(url).await?;
    if !snapshot.has_readme() {
        return Ok(format!("{} has no README to translate", snapshot.repo));
    }
    service.translate(&snapshot.readme_text, language).await
}

async fn ask(service: &DocsService, url: &str, question: &str) -> Result<String> {
    let snapshot = service.fetch_repo(url).await?;
    let context = serde_json::to_value(&snapshot)?;
    service.answer(question, &context).await
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn print_section(title: &str, body: &str) {
    println!("\n{}", title.bright_cyan().bold());
    println!("{}", "=".repeat(title.len()).bright_yellow());
    println!("{}", body);
}

fn print_outcome(title: &str, outcome: &CapabilityOutcome) {
    match outcome {
        CapabilityOutcome::Ok { text } => print_section(title, text),
        CapabilityOutcome::Failed { error } => {
            print_section(title, &format!("{} {}", "[FAILED]".red().bold(), error))
        }
        CapabilityOutcome::Skipped { reason } => {
            print_section(title, &format!("{} {}", "[SKIPPED]".yellow(), reason))
        }
    }
}
