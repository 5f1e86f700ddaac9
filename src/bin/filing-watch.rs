//! filing-watch CLI
//!
//! Runs the portal scraping operations from the command line and prints
//! their JSON envelopes to stdout. Logging goes to stderr via `env_logger`
//! (`RUST_LOG=filing_watch=debug` for verbose output).

use clap::{Parser, Subcommand};
use filing_watch::{
    InMemorySeenSet, LatestFilingsAgent, LaunchOptions, MonitorConfig, MonitorScheduler,
    PortalScraper, SearchCriteria, StatsAggregator,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filing-watch", version, about = "Scrape the SERFF public filing-access portal")]
struct Cli {
    /// Launch the browser with a visible window (useful for debugging)
    #[arg(long, global = true)]
    headed: bool,

    /// Directory for diagnostic page snapshots
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape filings for one search
    Scrape {
        /// Full state name, e.g. "California"
        #[arg(long)]
        state: String,

        /// Insurance type, e.g. "Auto Insurance"
        #[arg(long, default_value = "Auto Insurance")]
        insurance_type: String,

        /// Company name filter (omit for all companies)
        #[arg(long, default_value = "")]
        company: String,

        /// Maximum number of result pages to visit
        #[arg(long, default_value_t = 5)]
        max_pages: u32,
    },

    /// Run one monitor sweep over state/type combinations
    Monitor {
        /// States to check (repeatable)
        #[arg(long, required = true)]
        state: Vec<String>,

        /// Insurance types to check (repeatable)
        #[arg(long, required = true)]
        insurance_type: Vec<String>,

        /// Companies to check (repeatable; omit for all companies)
        #[arg(long)]
        company: Vec<String>,
    },

    /// Count this month's filings for a state
    Stats {
        #[arg(long)]
        state: String,

        /// Insurance type (omit for all types)
        #[arg(long)]
        insurance_type: Option<String>,
    },

    /// Fetch the latest filings with their document lists
    Latest {
        #[arg(long)]
        state: String,

        /// Insurance type (omit for all types)
        #[arg(long)]
        insurance_type: Option<String>,

        /// Number of filings to fetch
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut options = LaunchOptions::new().headless(!cli.headed);
    if let Some(dir) = &cli.snapshot_dir {
        options = options.snapshot_dir(dir);
    }

    let json = match cli.command {
        Command::Scrape { state, insurance_type, company, max_pages } => {
            let criteria = SearchCriteria::new(state, insurance_type)
                .company(company)
                .max_pages(max_pages);
            let outcome = PortalScraper::with_options(options).scrape_filings(&criteria);
            serde_json::to_string_pretty(&outcome)?
        }
        Command::Monitor { state, insurance_type, company } => {
            let config = MonitorConfig {
                states: state,
                insurance_types: insurance_type,
                companies: company,
            };
            let scheduler = MonitorScheduler::new(PortalScraper::with_options(options));
            let mut seen = InMemorySeenSet::new();
            let report = scheduler.sweep(&config, &mut seen);
            serde_json::to_string_pretty(&report)?
        }
        Command::Stats { state, insurance_type } => {
            let count = StatsAggregator::with_options(options)
                .monthly_filing_count(&state, insurance_type.as_deref());
            serde_json::to_string_pretty(&count)?
        }
        Command::Latest { state, insurance_type, limit } => {
            let latest = LatestFilingsAgent::with_options(options).latest_filings_with_docs(
                &state,
                insurance_type.as_deref(),
                limit,
            );
            serde_json::to_string_pretty(&latest)?
        }
    };

    println!("{}", json);
    Ok(())
}
