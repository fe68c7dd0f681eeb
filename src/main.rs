use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use postcheck::config::Config;
use postcheck::moderation::models::{ModerationRequest, PostSubmission};
use postcheck::moderation::orchestrator::ModerationOrchestrator;
use postcheck::output::terminal;

/// Postcheck: moderation and engagement feedback for forum posts.
///
/// Checks a post for safety issues, asks two LLM providers for engagement
/// feedback (whichever answers first wins) and drafts an improved post.
#[derive(Parser)]
#[command(name = "postcheck", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Moderate a single post from the terminal
    Check {
        /// Post title
        #[arg(long)]
        title: String,

        /// Post body
        #[arg(long)]
        content: String,

        /// Category: "A-Level", "GCSE", "Study Support" or "Job Experience"
        #[arg(long)]
        category: String,
    },

    /// List the known categories and their reference links
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("postcheck=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_providers()?;
            info!(origins = ?config.allowed_origins, "Starting HTTP API");
            postcheck::web::run_server(config, port, &bind).await?;
        }

        Commands::Check {
            title,
            content,
            category,
        } => {
            let submission = PostSubmission {
                content: Some(content),
                title: Some(title),
                category: Some(category),
            };
            // Fail fast on bad input before loading provider config.
            let request = match ModerationRequest::validate(&submission) {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("{} {}", "Error:".red().bold(), e.public_message());
                    std::process::exit(2);
                }
            };

            let config = Config::load()?;
            config.require_providers()?;
            let orchestrator = ModerationOrchestrator::from_config(&config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("  {spinner} {msg} ({elapsed})")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message("Checking post with the LLM providers...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let outcome = orchestrator.moderate(&submission).await;
            spinner.finish_and_clear();

            match outcome {
                Ok(result) => terminal::display_result(&request, &result),
                Err(e) => {
                    tracing::error!(error = %e, "Moderation failed");
                    eprintln!("{} {}", "Error:".red().bold(), e.public_message());
                    std::process::exit(1);
                }
            }
        }

        Commands::Categories => terminal::display_categories(),
    }

    Ok(())
}
