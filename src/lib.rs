//! # Readmind - Readwise Reader to Beeminder sync
//!
//! Readmind counts archived items in Readwise Reader and reports them to a
//! Beeminder goal as datapoints. Three commands share one workflow and
//! differ only in what they count:
//!
//! - `sync`: items archived since the last run (state kept in a local file)
//! - `total`: every archived item ever, posting the delta versus the last
//!   posted total (recovered from Beeminder's own comment history)
//! - `today`: items archived since local midnight, with a duplicate guard
//!   against posting twice in one day
//!
//! ## Quick Start
//!
//! ```bash
//! export READWISE_TOKEN='...'
//! export BEEMINDER_TOKEN='...'
//!
//! # See what would be posted without posting it
//! readmind sync --dry-run
//!
//! # Track items tagged 'videos' instead of the default tag
//! readmind sync --tag videos
//!
//! # Daily cumulative run (cron-friendly)
//! readmind total
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface definitions and handlers
//! - [`config`]: Environment-driven configuration, resolved once at startup
//! - [`error`]: Error types and result aliases
//! - [`readwise`]: Readwise Reader list client (pagination, tag filtering)
//! - [`beeminder`]: Beeminder datapoint client (create + history read-back)
//! - [`state`]: Local last-run marker and boundary resolution
//! - [`sync`]: The shared orchestrator and its per-command variants

/// Command-line interface definitions using clap.
pub mod cli;

/// Environment-driven configuration.
///
/// Built once by `Config::from_env()` and passed to every component.
pub mod config;

/// Error types and result aliases.
///
/// Defines `SyncError` enum and `Result<T>` type alias.
pub mod error;

/// Beeminder datapoint client.
pub mod beeminder;

/// Readwise Reader list client.
pub mod readwise;

/// Local state file and since-boundary resolution.
pub mod state;

/// The sync orchestrator and variant descriptors.
pub mod sync;

pub mod logging;
