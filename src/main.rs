//! Blackout service and CLI.
//!
//! `serve` runs the HTTP upload endpoint; `redact` processes a single file
//! locally with the same engine.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blackout::{BlackoutRatio, Config, RedactionReport, RedactionService};

/// PDF page blackout tool
///
/// Blacks out a random share of the pages after the first three.
#[derive(Parser)]
#[command(name = "blackout")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Black out pages of a local PDF
    Redact {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Password for an encrypted input
        #[arg(long, value_name = "PASSWORD")]
        pdf_password: Option<String>,

        /// Share of eligible pages to black out, in (0, 1]
        #[arg(long)]
        ratio: Option<BlackoutRatio>,

        /// Processing time budget in seconds; 0 disables it
        #[arg(long, value_name = "SECS")]
        time_budget_secs: Option<f64>,

        /// Fixed random seed for reproducible page selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Redaction command handler.
struct RedactionHandler {
    service: RedactionService,
    verbose: bool,
}

impl RedactionHandler {
    fn new(service: RedactionService, verbose: bool) -> Self {
        Self { service, verbose }
    }

    fn redact(&self, input: &Path, output: &Path, pdf_password: Option<&str>) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        if self.verbose {
            println!("Input:  {}", input.display());
            println!("Output: {}", output.display());
        }

        let report = self
            .service
            .redact(input, output, pdf_password)
            .with_context(|| "Redaction failed")?;

        if self.verbose {
            print_summary(&report);
        }

        if report.has_redactions() {
            println!(
                "✓ Blacked out {} page(s) → {}",
                report.redacted_count(),
                output.display()
            );
        } else {
            println!("⚠ No pages eligible for blackout → {}", output.display());
        }
        if report.is_partial() {
            println!(
                "⚠ Time budget ran out after {} of {} page(s)",
                report.redacted_count(),
                report.target_pages
            );
        }

        Ok(())
    }
}

fn print_summary(report: &RedactionReport) {
    println!("\nRedaction Summary:");
    println!("  Pages total:     {}", report.total_pages);
    println!("  Pages eligible:  {}", report.eligible_pages);
    println!("  Pages targeted:  {}", report.target_pages);
    println!("  Pages redacted:  {}", report.redacted_count());
    if report.has_redactions() {
        let pages: Vec<String> = report
            .redacted_pages
            .iter()
            .map(|p| (p + 1).to_string())
            .collect();
        println!("  Page numbers:    {}", pages.join(", "));
    }
}

/// Maps the `--time-budget-secs` flag onto the configured budget.
fn resolve_time_budget(flag: Option<f64>, configured: Option<Duration>) -> Result<Option<Duration>> {
    match flag {
        None => Ok(configured),
        Some(secs) if !secs.is_finite() || secs < 0.0 => {
            anyhow::bail!("--time-budget-secs must be a non-negative number")
        }
        Some(secs) if secs == 0.0 => Ok(None),
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|_| anyhow::anyhow!("--time-budget-secs is too large")),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "blackout=debug,tower_http=debug"
    } else {
        "blackout=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.access.is_fallback {
                tracing::warn!("PHI_APP_PASSWORD is not set, using the built-in access password");
            }

            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(blackout::server::serve(config))?;
        }
        Commands::Redact {
            input,
            output,
            pdf_password,
            ratio,
            time_budget_secs,
            seed,
        } => {
            let time_budget = resolve_time_budget(time_budget_secs, config.redaction.time_budget)?;
            let ratio = ratio.unwrap_or(config.redaction.ratio);

            let mut service = RedactionService::new(ratio, time_budget);
            if let Some(seed) = seed {
                service = service.with_seed(seed);
            }

            let handler = RedactionHandler::new(service, cli.verbose);
            handler.redact(&input, &output, pdf_password.as_deref())?;
        }
    }

    Ok(())
}
