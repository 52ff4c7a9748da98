//! backoff-timeout CLI
//!
//! Prints the delays a timeout configuration produces, or drives real timers
//! through the tokio scheduler to observe them.
//!
//! ```text
//! backoff-timeout [--config FILE] sequence --base-ms 100 --backoff 1.25 --steps 8
//! backoff-timeout run --base-ms 200 --random 0.2 --attempts 3 --cancel-last
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;

use backoff_timeout::config::validation::validate_config;
use backoff_timeout::config::{load_config, AppConfig, ConfigError, TimeoutConfig};
use backoff_timeout::observability::logging::init_logging;
use backoff_timeout::{CancelOutcome, Timeout, TimerCancel, TokioScheduler};

#[derive(Parser)]
#[command(name = "backoff-timeout")]
#[command(about = "Inspect and exercise backoff timeout configurations", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct TimeoutArgs {
    /// Base timeout in milliseconds.
    #[arg(long)]
    base_ms: Option<u64>,

    /// Exponential backoff factor.
    #[arg(long)]
    backoff: Option<f64>,

    /// Backoff ceiling in milliseconds.
    #[arg(long)]
    backoff_max_ms: Option<u64>,

    /// Jitter fraction in (0, 1).
    #[arg(long)]
    random: Option<f64>,
}

impl TimeoutArgs {
    fn apply(&self, config: &mut TimeoutConfig) {
        if let Some(base_ms) = self.base_ms {
            config.base_ms = base_ms;
        }
        if self.backoff.is_some() {
            config.backoff = self.backoff;
        }
        if self.backoff_max_ms.is_some() {
            config.backoff_max_ms = self.backoff_max_ms;
        }
        if self.random.is_some() {
            config.random = self.random;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the delay produced by each successive advance
    Sequence {
        #[command(flatten)]
        timeout: TimeoutArgs,

        /// Number of advances to print.
        #[arg(long, default_value_t = 10)]
        steps: usize,

        /// Seed for the jitter generator.
        #[arg(long)]
        seed: Option<u64>,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Schedule real timers and wait for each to fire
    Run {
        #[command(flatten)]
        timeout: TimeoutArgs,

        /// Number of timers to schedule back to back.
        #[arg(long, default_value_t = 3)]
        attempts: u32,

        /// Cancel the final timer instead of waiting for it.
        #[arg(long)]
        cancel_last: bool,
    },
}

#[derive(Debug, Serialize)]
struct Step {
    step: usize,
    backoff_round: u32,
    current_ms: u64,
    delay_ms: u64,
}

fn resolve_config(path: Option<&PathBuf>, overrides: &TimeoutArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    overrides.apply(&mut config.timeout);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn sequence(timeout: Timeout, steps: usize, seed: Option<u64>) -> Vec<Step> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut timeout = timeout;
    (1..=steps)
        .map(|step| {
            timeout = timeout.clone().advance();
            Step {
                step,
                backoff_round: timeout.backoff_round(),
                current_ms: timeout.current().unwrap_or(timeout.base()),
                delay_ms: timeout.current_value_with(&mut rng),
            }
        })
        .collect()
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn run(timeout: Timeout, attempts: u32, cancel_last: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = TokioScheduler::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
    let mut timeout = timeout;

    for attempt in 1..=attempts {
        let started = Instant::now();
        let (next, delay) = timeout.schedule(&scheduler, &tx, attempt)?;
        timeout = next;

        if cancel_last && attempt == attempts {
            let (_, outcome) = timeout.cancel(&scheduler)?;
            match outcome {
                CancelOutcome::Timer(TimerCancel::Cancelled { remaining }) => {
                    println!("attempt {attempt}: {delay}ms timer cancelled with {}ms left", remaining.as_millis());
                }
                other => println!("attempt {attempt}: {delay}ms timer not cancelled ({other:?})"),
            }
            break;
        }

        let Some(fired) = rx.recv().await else {
            break;
        };
        let elapsed_ms = millis(started.elapsed());
        tracing::info!(attempt = fired, delay_ms = delay, elapsed_ms, "Timer fired");
        println!("attempt {fired}: scheduled {delay}ms, fired after {elapsed_ms}ms");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Sequence { timeout, .. } | Commands::Run { timeout, .. } => timeout,
    };
    let config = resolve_config(cli.config.as_ref(), overrides)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    init_logging(&level);

    let timeout = Timeout::try_from(&config.timeout)?;
    tracing::info!(
        base_ms = config.timeout.base_ms,
        backoff = ?config.timeout.backoff,
        backoff_max_ms = ?config.timeout.backoff_max_ms,
        random = ?config.timeout.random,
        "Timeout configured"
    );

    match cli.command {
        Commands::Sequence { steps, seed, json, .. } => {
            let steps = sequence(timeout, steps, seed);
            if json {
                println!("{}", serde_json::to_string_pretty(&steps)?);
            } else {
                println!("{:>5} {:>6} {:>12} {:>10}", "step", "round", "current_ms", "delay_ms");
                for s in &steps {
                    println!("{:>5} {:>6} {:>12} {:>10}", s.step, s.backoff_round, s.current_ms, s.delay_ms);
                }
            }
        }
        Commands::Run { attempts, cancel_last, .. } => {
            run(timeout, attempts, cancel_last).await?;
        }
    }

    Ok(())
}
