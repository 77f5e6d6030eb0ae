#![warn(missing_docs)]
//! SeqBench CLI Library
//!
//! Command line, `seqbench.toml` configuration, the interactive menu and
//! result rendering for the concurrent sequence comparator.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     seqbench_cli::run()
//! }
//! ```

mod config;
mod menu;
mod output;
mod session;

pub use config::*;
pub use menu::Menu;
pub use output::{OutputFormat, Report, SCHEMA_VERSION, format_human, generate_json_report, render};
pub use session::Session;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use seqbench_core::{Action, ContainerKind, CycleAverager, FailurePolicy, TrialConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SeqBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "seqbench")]
#[command(
    author,
    version,
    about = "SeqBench - concurrent latency comparator for sequence containers"
)]
pub struct Cli {
    /// Optional subcommand; defaults to the interactive menu
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: nearest seqbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Trials per averaging pass
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub cycles: Option<i64>,

    /// List parameters: SIZE LOW HIGH
    #[arg(
        long,
        global = true,
        num_args = 1..,
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    pub size_params: Option<Vec<i64>>,

    /// The two containers to compare: copy-on-write, synchronized, unsync, linked
    #[arg(long, global = true, num_args = 2)]
    pub lists: Option<Vec<ContainerKind>>,

    /// Concurrent workers per trial
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// On a failed worker: abort or exclude
    #[arg(long, global = true)]
    pub failure_policy: Option<FailurePolicy>,

    /// Pin worker i to core i modulo the available cores (Linux only)
    #[arg(long, global = true)]
    pub pin_workers: bool,

    /// Output format: human, json
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Hide the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,
    /// Run one comparison and exit
    Run {
        /// get (read every element by index) or add (append one element per index)
        #[arg(long, short, default_value = "get")]
        action: Action,
    },
    /// Print the resolved configuration and list contents
    Show,
    /// Print a default seqbench.toml
    Init,
}

/// Run the SeqBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if the comparison could not run.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the SeqBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if let Some(Commands::Init) = cli.command {
        print!("{}", SeqConfig::default_toml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => SeqConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SeqConfig::discover().unwrap_or_default(),
    };
    let config = apply_overrides(&cli, config);

    let format: OutputFormat = config.output.format.parse().unwrap_or_else(|e| {
        tracing::warn!("{}, using human output", e);
        OutputFormat::Human
    });
    let session = build_session(&config);

    match cli.command {
        Some(Commands::Run { action }) => {
            if config.run.lists.is_none() {
                anyhow::bail!("no lists configured; set [run].lists or pass --lists");
            }
            run_once(&session, action, format, config.output.progress)?;
        }
        Some(Commands::Show) => {
            print!("{}", session.describe());
        }
        Some(Commands::Init) => {}
        Some(Commands::Menu) | None => {
            let mut menu = Menu::new(std::io::stdin().lock(), std::io::stdout().lock(), session)
                .with_format(format)
                .with_progress(config.output.progress);
            menu.run()?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "seqbench=debug"
    } else {
        "seqbench=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Layer command line flags over file configuration.
pub fn apply_overrides(cli: &Cli, mut config: SeqConfig) -> SeqConfig {
    if let Some(cycles) = cli.cycles {
        config.run.cycles = cycles;
    }
    if let Some(size_params) = &cli.size_params {
        config.run.size_params = Some(size_params.clone());
    }
    if let Some(&[first, second]) = cli.lists.as_deref() {
        config.run.lists = Some([first, second]);
    }
    if let Some(workers) = cli.workers {
        config.run.workers = workers;
    }
    if let Some(policy) = cli.failure_policy {
        config.run.failure_policy = policy;
    }
    if cli.pin_workers {
        config.run.pin_workers = true;
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if cli.no_progress {
        config.output.progress = false;
    }
    config
}

/// Build a session from resolved configuration.
///
/// Invalid values are reported and skipped, leaving the session defaults.
pub fn build_session(config: &SeqConfig) -> Session {
    let averager = CycleAverager::new(
        TrialConfig {
            workers: config.run.workers.max(1),
            pin_workers: config.run.pin_workers,
        },
        config.run.failure_policy,
    );
    let mut session = Session::new(averager);

    if let Err(e) = session.set_cycles(config.run.cycles) {
        tracing::warn!("{}", e);
    }
    if let Some(components) = &config.run.size_params {
        if let Err(e) = session.set_size_params(components.clone()) {
            tracing::warn!("{}", e);
        }
    }
    if let Some([first, second]) = config.run.lists {
        if let Err(e) = session.select_lists(first, second) {
            tracing::warn!("failed to populate lists: {}", e);
        }
    }
    session
}

fn run_once(
    session: &Session,
    action: Action,
    format: OutputFormat,
    progress: bool,
) -> anyhow::Result<()> {
    let total = u64::try_from(session.cycles()).unwrap_or(0).saturating_mul(2);
    let pb = if progress {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let comparison = session.run(action, |slot, cycle| {
        pb.set_message(format!("{} list, cycle {}", slot, cycle));
        pb.inc(1);
    });
    pb.finish_and_clear();
    let comparison = comparison?;

    let text = render(&comparison, format)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if format == OutputFormat::Json {
        writeln!(stdout)?;
    }
    Ok(())
}
