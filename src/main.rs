mod api;
mod board;
mod models;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use api::ApiClient;
use models::{display_date, Outcome};

#[derive(Parser)]
#[command(name = "shortlist")]
#[command(about = "Job application board - browse postings and track application status")]
struct Cli {
    /// Backend base URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    base_url: String,

    /// Write traces to this file (the only way to see them while the board owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse jobs interactively (default)
    Browse,

    /// List jobs
    List,

    /// Show job details
    Show {
        /// Job ID
        id: i64,
    },

    /// Mark a job as applied
    Apply {
        /// Job ID
        id: i64,
    },

    /// Mark a job as rejected
    Reject {
        /// Job ID
        id: i64,
    },

    /// Mark a job as interview
    Interview {
        /// Job ID
        id: i64,
    },

    /// Hide a job from the board
    Hide {
        /// Job ID
        id: i64,
    },
}

fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // Without a file there is no usable sink under the TUI: stderr shares
        // the terminal with the board.
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse);
    init_tracing(cli.log_file.as_deref(), matches!(command, Commands::Browse))?;

    let api = ApiClient::new(&cli.base_url)?;

    match command {
        Commands::Browse => tui::run(api).await?,

        Commands::List => {
            let jobs = api.all_jobs().await?;
            let jobs: Vec<_> = jobs.into_iter().filter(|j| !j.hidden).collect();
            if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!(
                    "{:<6} {:<10} {:<12} {:<32} {:<20}",
                    "ID", "STATUS", "DATE", "TITLE", "COMPANY"
                );
                println!("{}", "-".repeat(82));
                for job in jobs {
                    let status = if job.interview {
                        "interview"
                    } else if job.applied {
                        "applied"
                    } else if job.rejected {
                        "rejected"
                    } else {
                        "-"
                    };
                    let date = job
                        .date
                        .as_deref()
                        .map(display_date)
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<6} {:<10} {:<12} {:<32} {:<20}",
                        job.id,
                        status,
                        date,
                        truncate(&job.title, 30),
                        truncate(job.company.as_deref().unwrap_or("-"), 18),
                    );
                }
            }
        }

        Commands::Show { id } => {
            let job = api.job_details(id).await?;
            println!("Job #{}", job.id);
            println!("Title: {}", job.title);
            if let Some(company) = &job.company {
                println!("Company: {}", company);
            }
            if let Some(location) = &job.location {
                println!("Location: {}", location);
            }
            if let Some(date) = &job.date {
                println!("Date: {}", display_date(date));
            }
            if let Some(url) = &job.job_url {
                println!("URL: {}", url);
            }
            if let Some(description) = &job.job_description {
                println!("\n{}", textwrap::fill(description, 80));
            }
        }

        Commands::Apply { id } => mark(&api, id, Outcome::Applied).await?,
        Commands::Reject { id } => mark(&api, id, Outcome::Rejected).await?,
        Commands::Interview { id } => mark(&api, id, Outcome::Interview).await?,

        Commands::Hide { id } => {
            if api.hide(id).await? {
                println!("Hid job #{}.", id);
            } else {
                println!("Backend did not accept hiding job #{}.", id);
            }
        }
    }

    Ok(())
}

async fn mark(api: &ApiClient, id: i64, outcome: Outcome) -> Result<()> {
    if api.mark(id, outcome).await? {
        println!("Marked job #{} {}.", id, outcome.label());
    } else {
        println!("Backend did not accept marking job #{} {}.", id, outcome.label());
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
