use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::sync::Arc;

use litsift::config::{find_config_file, load_config, Config};
use litsift::export::{save_to_file, ExportFormat};
use litsift::filter::{matches, FilterParser};
use litsift::{CancelToken, RateLimiter, SemanticScholar};

/// LitSift - search, sift, and export results from Semantic Scholar
#[derive(Parser, Debug)]
#[command(name = "litsift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search, sift, and export results from Semantic Scholar to BibTeX/CSV", long_about = None)]
struct Cli {
    /// Search query
    query: String,

    /// Maximum number of results to fetch
    #[arg(long, short = 'n', default_value_t = 100)]
    max_results: usize,

    /// Sift expression applied to the fetched records,
    /// e.g. 'title:"critical discourse" AND NOT year:2008'
    #[arg(long, short)]
    sift: Option<String>,

    /// Output format when saving
    #[arg(long, short, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Write results to this file instead of printing a summary
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for saved results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Comma-separated values, fully quoted
    Csv,
    /// BibTeX entries
    Bib,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config.clone().or_else(find_config_file) {
        Some(path) => load_config(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.capacity,
        config.rate_limit.fill_rate,
    ));
    let client = SemanticScholar::new(&config, limiter);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos:>3}% {msg}")
            .expect("progress template is valid"),
    );

    let papers = {
        let bar = bar.clone();
        client
            .search(
                &cli.query,
                cli.max_results,
                move |percent, message| {
                    bar.set_position(percent as u64);
                    bar.set_message(message.to_string());
                },
                &cancel,
            )
            .await?
    };
    bar.finish_and_clear();

    if cancel.is_cancelled() {
        eprintln!("Search cancelled; keeping {} fetched records.", papers.len());
    } else {
        eprintln!("Search completed. Found {} results.", papers.len());
    }

    let sifted: Vec<_> = match cli.sift.as_deref() {
        Some(input) => {
            let expr = FilterParser::parse(input);
            papers
                .into_iter()
                .filter(|paper| matches(&expr, paper))
                .collect()
        }
        None => papers,
    };

    match cli.output {
        Some(path) => {
            let format = match cli.format {
                Format::Csv => ExportFormat::Csv,
                Format::Bib => ExportFormat::Bibtex,
            };
            save_to_file(&sifted, &path, format)
                .with_context(|| format!("failed to save results to {}", path.display()))?;
            println!("Saved {} records to {}", sifted.len(), path.display());
        }
        None => {
            for paper in &sifted {
                let year = if paper.year.is_empty() {
                    "----"
                } else {
                    paper.year.as_str()
                };
                println!("{}  {}", year.dimmed(), paper.title.bold());
                if !paper.authors.is_empty() {
                    println!("      {}", paper.authors);
                }
                if !paper.url.is_empty() {
                    println!("      {}", paper.url.dimmed());
                }
            }
            println!("{} records", sifted.len());
        }
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}
