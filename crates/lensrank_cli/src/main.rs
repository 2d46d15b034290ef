//! Terminal front end for the lens ranker.
//!
//! # Responsibility
//! - Parse flags into a `ReviewConfig` and open the review ledger.
//! - Act as the presentation sink: print what to show, read reviewer commands.
//! - Route quit, end of input and Ctrl+C through the same persist path.

mod command;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use command::{Command, HELP};
use lensrank_core::config::{DEFAULT_EXTENSION, DEFAULT_LEDGER_FILE, DEFAULT_MAX_SCORE};
use lensrank_core::{
    default_log_level, init_logging, FileLedgerStore, LogLevel, Resolution, ReviewConfig,
    ReviewService, ScoreScale, SubmitOutcome,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::signal;

type Service = ReviewService<FileLedgerStore, StdRng>;

#[derive(Parser)]
#[command(name = "lensrank", version, about = "Rank candidate images one at a time")]
struct Cli {
    /// Directory containing the images to rank (defaults to the working directory)
    #[arg(short, long)]
    path: Option<PathBuf>,
    /// Ledger file; created from a directory scan when missing
    #[arg(short = 'f', long, default_value = DEFAULT_LEDGER_FILE)]
    filename: PathBuf,
    /// Image file extension to rank
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    imtype: String,
    /// Highest accepted score; scores run from 0 to this value
    #[arg(long, default_value_t = DEFAULT_MAX_SCORE)]
    max_score: u8,
    /// Start with resampling of already scored images enabled
    #[arg(long)]
    resample: bool,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    start_logging(&cli)?;

    let config = review_config(&cli)?;
    let service = Service::open(&config, StdRng::from_entropy())
        .with_context(|| format!("failed to open ledger `{}`", config.ledger_path.display()))?;
    let service = Arc::new(Mutex::new(service));

    let review = tokio::task::spawn_blocking({
        let service = Arc::clone(&service);
        move || run_review(&service)
    });

    tokio::select! {
        outcome = review => {
            outcome.context("review loop panicked")??;
            close(&service)
        }
        () = wait_for_interrupt(signal::ctrl_c()) => {
            info!("event=interrupt module=cli status=received");
            close(&service)?;
            println!();
            // The stdin reader thread stays blocked; leave without joining it.
            std::process::exit(130);
        }
    }
}

/// Resolves once `interrupt` delivers; never resolves when the handler
/// could not be installed, so the review loop keeps running.
async fn wait_for_interrupt<F>(interrupt: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = interrupt.await {
        warn!(
            "event=interrupt module=cli status=unavailable error={}",
            err
        );
        std::future::pending::<()>().await;
    }
}

fn start_logging(cli: &Cli) -> Result<()> {
    let level = match cli.log_level.as_deref() {
        Some(level) => level.parse::<LogLevel>()?,
        None => default_log_level(),
    };
    let log_dir = match &cli.log_dir {
        Some(dir) => std::path::absolute(dir).context("failed to resolve log directory")?,
        None => std::env::temp_dir().join("lensrank-logs"),
    };
    init_logging(level, &log_dir)?;
    Ok(())
}

fn review_config(cli: &Cli) -> Result<ReviewConfig> {
    let source_dir = match &cli.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to read working directory")?,
    };
    Ok(ReviewConfig {
        source_dir,
        extension: cli.imtype.clone(),
        ledger_path: cli.filename.clone(),
        scale: ScoreScale::up_to(cli.max_score)?,
        resample_enabled: cli.resample,
        ..ReviewConfig::default()
    })
}

fn lock(service: &Mutex<Service>) -> Result<std::sync::MutexGuard<'_, Service>> {
    service
        .lock()
        .map_err(|_| anyhow!("review state lock poisoned"))
}

fn close(service: &Mutex<Service>) -> Result<()> {
    lock(service)?.close().context("failed to save ledger")
}

fn run_review(service: &Mutex<Service>) -> Result<()> {
    {
        let service = lock(service)?;
        if matches!(service.current_resolution(), Resolution::EmptyCatalog) {
            println!(
                "No images found in `{}`.",
                service.source_dir().display()
            );
            return Ok(());
        }
        println!("{HELP}\n");
        render(&service);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        prompt(&*lock(service)?)?;
        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line.context("failed to read reviewer input")?;

        let command = Command::parse(&line);
        // Ask before taking the lock so Ctrl+C can still save while we wait.
        if command == Command::Quit {
            if confirm_quit(&mut lines)? {
                return Ok(());
            }
            continue;
        }

        let mut service = lock(service)?;
        match command {
            Command::Quit => {}
            Command::Help => println!("{HELP}"),
            Command::Back => {
                if service.go_back().is_none() {
                    println!("Already at the first image.");
                }
                render(&service);
            }
            Command::Skip => {
                service.skip_forward();
                render(&service);
            }
            Command::ToggleResample => {
                let enabled = service.toggle_resample();
                println!("resample: {}", if enabled { "on" } else { "off" });
                if enabled {
                    render(&service);
                }
            }
            Command::Submit(raw) => match service.submit(&raw)? {
                SubmitOutcome::Accepted {
                    identifier, score, ..
                } => {
                    println!("saved {identifier} -> {score}");
                    render(&service);
                }
                SubmitOutcome::Rejected(reason) => println!("Error: {reason}"),
            },
        }
    }
}

fn render(service: &Service) {
    let progress = service.progress();
    match service.current_resolution() {
        Resolution::Present(presentation) => {
            println!(
                "[{}/{} scored] {}",
                progress.scored,
                progress.total,
                presentation.position_label(progress.total)
            );
            let mut detail = format!(
                "  image: {}",
                service.image_path(&presentation.identifier).display()
            );
            if presentation.rotation.degrees() != 0 {
                detail.push_str(&format!("  rotate: {}deg", presentation.rotation.degrees()));
            }
            if presentation.resampled {
                detail.push_str("  (resampled)");
            }
            println!("{detail}");
        }
        Resolution::EndOfQueue => println!(
            "All {} images reviewed. Enable resampling (r) or go back (b) to continue.",
            progress.total
        ),
        Resolution::EmptyCatalog => println!("No images to review."),
    }
}

fn prompt(service: &Service) -> Result<()> {
    print!("score ({}) > ", service.scale().hint());
    std::io::stdout().flush().context("failed to flush prompt")
}

fn confirm_quit<I>(lines: &mut I) -> Result<bool>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    print!("Do you really wish to quit? [y/N] ");
    std::io::stdout().flush().context("failed to flush prompt")?;
    match lines.next() {
        Some(answer) => Ok(matches!(
            answer.context("failed to read reviewer input")?.trim(),
            "y" | "Y" | "yes"
        )),
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::wait_for_interrupt;
    use std::future::ready;
    use std::io::{Error, ErrorKind};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn delivered_interrupt_resolves() {
        let outcome = timeout(Duration::from_millis(200), wait_for_interrupt(ready(Ok(())))).await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn failed_handler_registration_does_not_interrupt() {
        let failed = ready(Err(Error::new(ErrorKind::Other, "signals unavailable")));
        let outcome = timeout(Duration::from_millis(50), wait_for_interrupt(failed)).await;
        assert!(outcome.is_err(), "a registration failure must not end the review");
    }
}
