//! Blog-Audit main entry point
//!
//! This is the command-line interface for the Blog-Audit sitemap SEO auditor.

use blog_audit::config::{load_config_with_hash, Config, OutputFormat};
use blog_audit::pipeline::{analyze_sitemap, AuditContext, RunStatus};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Blog-Audit: SEO review of every post listed in a sitemap
///
/// Blog-Audit reads a sitemap, fetches each blog post it lists, extracts the
/// readable content, asks a text-analysis service for an SEO review, and writes
/// the results to a markdown table or a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "blog-audit")]
#[command(version)]
#[command(about = "Sitemap-driven SEO auditor for blog posts", long_about = None)]
struct Cli {
    /// Absolute http(s) URL of the sitemap
    #[arg(value_name = "SITEMAP_URL")]
    sitemap_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report path (overrides [output] path)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Report format (overrides [output] format)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Sqlite,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Sqlite => OutputFormat::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    (cfg, Some(hash))
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    apply_overrides(&mut config, &cli);

    let ctx = match AuditContext::from_env(config, config_hash) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    match analyze_sitemap(&ctx, &cli.sitemap_url).await {
        Ok(outcome) => {
            if !cli.quiet {
                println!(
                    "✓ Analyzed {} of {} posts ({})",
                    outcome.analyzed_count, outcome.candidate_count, outcome.status
                );
                if outcome.status == RunStatus::StoppedEarly {
                    println!("! Stopped early after too many consecutive errors");
                }
                println!("✓ Report written to: {}", outcome.report_path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                class = ?e.class(),
                status = e.status_code(),
                "Audit failed: {}",
                e
            );
            Err(e.into())
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(format) = cli.format {
        config.output.format = format.into();
        if cli.output.is_none() && config.output.format == OutputFormat::Sqlite {
            config.output.path = PathBuf::from(&config.output.path)
                .with_extension("db")
                .to_string_lossy()
                .into_owned();
        }
    }
    if let Some(path) = &cli.output {
        config.output.path = path.clone();
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("blog_audit=info,warn"),
            1 => EnvFilter::new("blog_audit=debug,info"),
            2 => EnvFilter::new("blog_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
