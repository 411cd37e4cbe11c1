use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "readmind")]
#[command(
    author,
    version,
    about = "Sync archived Readwise Reader items to Beeminder goal datapoints"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count items archived since the last run and post the count
    #[command(after_help = "Examples:
  readmind sync --dry-run       Test without posting
  readmind sync --tag videos    Track items tagged 'videos' instead
  readmind sync --reset         Reset state and check last 24 hours
  readmind sync --hours 48      Check last 48 hours (ignores saved state)")]
    Sync {
        /// Test mode - do not post to Beeminder
        #[arg(long)]
        dry_run: bool,

        /// Only count items with this tag (default from READMIND_TAG)
        #[arg(long)]
        tag: Option<String>,

        /// Reset state file and check last 24 hours
        #[arg(long)]
        reset: bool,

        /// Check last N hours (overrides saved state)
        #[arg(long)]
        hours: Option<i64>,

        /// Show detailed output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Count every archived item and post the delta versus the last posted total
    Total {
        /// Test mode - do not post to Beeminder
        #[arg(long)]
        dry_run: bool,

        /// Only count items with this tag (default from READMIND_TAG)
        #[arg(long)]
        tag: Option<String>,

        /// Show detailed output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Count items archived since local midnight and post today's count
    Today {
        /// Test mode - do not post to Beeminder
        #[arg(long)]
        dry_run: bool,

        /// Only count items with this tag (default from READMIND_TAG)
        #[arg(long)]
        tag: Option<String>,

        /// Post even if a datapoint was already recorded today
        #[arg(long)]
        force: bool,

        /// Show detailed output
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Sync { verbose, .. }
            | Commands::Total { verbose, .. }
            | Commands::Today { verbose, .. } => *verbose,
        }
    }
}
