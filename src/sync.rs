use chrono::{Local, TimeZone, Utc};
use colored::Colorize;

use crate::beeminder::{BeeminderClient, Datapoint};
use crate::config::Config;
use crate::error::Result;
use crate::readwise::{self, Document, ReadwiseClient};
use crate::state::{self, BoundarySource, StateFile};

/// How fresh a marked datapoint must be for the duplicate guard to fire.
/// Deliberately under 24h so a once-daily scheduler cannot double-fire across
/// the goal's timezone boundary. Heuristic, tunable.
pub const DUPLICATE_GUARD_HOURS: f64 = 20.0;

/// Comment marker for the cumulative variant; the embedded total is the only
/// persistence channel that variant has.
pub const TOTAL_MARKER: &str = "Total:";

/// Comment marker for the today variant's duplicate guard.
pub const TODAY_MARKER: &str = "Archived today";

const GUARD_SCAN_COUNT: usize = 5;
const TOTAL_SCAN_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Stored/derived last-run timestamp (hours override > state file >
    /// remote datapoint > 24h lookback).
    SinceLastRun,
    /// No lower bound; count everything ever archived.
    AllTime,
    /// Local midnight of the current day.
    LocalMidnight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// Post the raw item count.
    Count,
    /// Post the delta versus the total recovered from remote comments.
    DeltaFromTotal,
}

/// Everything that differs between the three sync commands. The flow in
/// [`run`] is shared; handlers pick a descriptor and go.
pub struct Variant {
    pub label: &'static str,
    pub boundary: Boundary,
    pub value: ValueRule,
    pub guard_marker: Option<&'static str>,
    pub persists_state: bool,
    pub post_when_zero: bool,
}

impl Variant {
    pub fn since_last_run() -> Self {
        Self {
            label: "Readwise Reader to Beeminder Sync",
            boundary: Boundary::SinceLastRun,
            value: ValueRule::Count,
            guard_marker: None,
            persists_state: true,
            post_when_zero: false,
        }
    }

    pub fn cumulative_total() -> Self {
        Self {
            label: "Readwise Reader to Beeminder (Total Count)",
            boundary: Boundary::AllTime,
            value: ValueRule::DeltaFromTotal,
            guard_marker: None,
            persists_state: false,
            post_when_zero: false,
        }
    }

    pub fn today() -> Self {
        Self {
            label: "Readwise Reader to Beeminder (Today)",
            boundary: Boundary::LocalMidnight,
            value: ValueRule::Count,
            guard_marker: Some(TODAY_MARKER),
            persists_state: false,
            post_when_zero: true,
        }
    }

    /// Build the datapoint comment. `count` is the fetched item count and
    /// `value` the number actually posted (they differ for the delta rule).
    pub fn comment(&self, count: i64, value: i64, tag: Option<&str>) -> String {
        match self.value {
            ValueRule::DeltaFromTotal => format!("{} {} (+{} new)", TOTAL_MARKER, count, value),
            ValueRule::Count => {
                let mut comment = match self.boundary {
                    Boundary::LocalMidnight => format!("{}: {} items", TODAY_MARKER, count),
                    _ => format!("Auto-tracked from Readwise Reader ({} items)", count),
                };
                if let Some(tag) = tag {
                    comment.push_str(&format!(" [tag: {}]", tag));
                }
                comment
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    pub tag: Option<String>,
    pub hours: Option<i64>,
    pub reset: bool,
    pub force: bool,
    pub verbose: bool,
}

/// Drive one sync run end to end: resolve clients and boundary, query and
/// filter, compute the value, post, persist. Linear, no retries.
pub fn run(config: &Config, variant: &Variant, opts: &RunOptions) -> Result<()> {
    println!("=== {} ===", variant.label);
    println!("Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    if opts.dry_run {
        println!("MODE: DRY RUN (no data will be posted)");
    }
    if let Some(ref tag) = opts.tag {
        println!("FILTER: Only items tagged '{}'", tag);
    }
    println!();

    // Credential checks happen here, before any network call.
    let readwise = ReadwiseClient::new(config)?;
    let beeminder = BeeminderClient::new(config)?;
    let state_file = StateFile::new(&config.state_path);

    if opts.reset && state_file.reset()? {
        println!("{} State file reset", "✓".green());
    }

    if let Some(marker) = variant.guard_marker {
        if !opts.force && !opts.dry_run {
            let history = beeminder.recent_datapoints(GUARD_SCAN_COUNT, "id");
            if let Some(dp) = find_recent_marker(&history, marker, Utc::now().timestamp()) {
                let hours_ago = (Utc::now().timestamp() - dp.timestamp) as f64 / 3600.0;
                println!(
                    "Found recent post ({:.1}h ago): {}",
                    hours_ago,
                    dp.comment_text()
                );
                println!("Already posted today - skipping (use --force to post anyway)");
                println!("\n=== Sync Complete ===");
                return Ok(());
            }
        }
    }

    let since = match variant.boundary {
        Boundary::AllTime => None,
        Boundary::LocalMidnight => Some(local_midnight_timestamp()),
        Boundary::SinceLastRun => {
            let (boundary, source) = state::resolve_since(
                opts.hours,
                state_file.load(),
                || beeminder.last_datapoint_timestamp(),
                Utc::now().timestamp(),
            );
            report_boundary(boundary, source);
            Some(boundary)
        }
    };

    println!("Fetching archived items from Readwise Reader...");
    let mut items = readwise.list_archived(since)?;
    if let Some(ref tag) = opts.tag {
        items = readwise::filter_by_tag(items, tag);
    }
    let count = items.len() as i64;

    match variant.boundary {
        Boundary::AllTime => println!("\nTotal archived items: {}", count),
        Boundary::LocalMidnight => println!("\nItems archived today: {}", count),
        Boundary::SinceLastRun => println!("\nItems archived since last run: {}", count),
    }
    print_items(&items, opts.verbose);

    let value = match variant.value {
        ValueRule::Count => count,
        ValueRule::DeltaFromTotal => {
            let previous = recover_previous_total(&beeminder.recent_datapoints(
                TOTAL_SCAN_COUNT,
                "id",
            ));
            let delta = count - previous;
            println!("Last total: {}", previous);
            println!("Current total: {}", count);
            println!("Difference (new items): {}", delta);
            delta
        }
    };

    if value == 0 && !variant.post_when_zero {
        match variant.value {
            ValueRule::DeltaFromTotal => println!("No new items to post - skipping"),
            ValueRule::Count => println!("\nNo new items to track"),
        }
        println!("\n=== Sync Complete ===");
        return Ok(());
    }

    println!();
    let comment = variant.comment(count, value, opts.tag.as_deref());
    let success = beeminder.post_datapoint(value, Some(&comment), opts.dry_run);

    if success && !opts.dry_run && variant.persists_state {
        state_file.save(Utc::now().timestamp())?;
        println!("\n{} State saved for next run", "✓".green());
    }

    println!("\n=== Sync Complete ===");
    Ok(())
}

fn report_boundary(boundary: i64, source: BoundarySource) {
    match source {
        BoundarySource::HoursOverride(hours) => println!("Checking last {} hours", hours),
        BoundarySource::LocalState => println!("Last run: {}", format_timestamp(boundary)),
        BoundarySource::RemoteDatapoint => {
            println!("No local state found, using last Beeminder datapoint timestamp");
        }
        BoundarySource::Default => println!("First run - will check last 24 hours"),
    }
}

fn format_timestamp(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn local_midnight_timestamp() -> i64 {
    let midnight = Local::now().date_naive().and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| Utc::now().timestamp() - 24 * 3600)
}

fn print_items(items: &[Document], verbose: bool) {
    let count = items.len();
    if count == 0 {
        return;
    }

    if verbose || count <= 5 {
        println!("\nArchived items:");
        let display_count = if verbose { count } else { count.min(5) };
        for item in &items[..display_count] {
            let title: String = item.display_title().chars().take(60).collect();
            println!("  - {}...", title);
            if verbose {
                println!("    URL: {}", item.source_url.as_deref().unwrap_or("No URL"));
                if !item.tags.is_empty() {
                    println!("    Tags: {}", item.tag_names().join(", "));
                }
            }
        }
        if count > display_count {
            println!("  ... and {} more", count - display_count);
        }
    } else {
        println!("\n(Use --verbose to see all items)");
    }
}

/// Pull the integer after the literal `Total:` marker out of a comment like
/// `Total: 5 (+2 new)`. Any deviation from that shape means "not found";
/// the format is a convention shared with past runs, so it must not drift.
pub fn parse_total_comment(comment: &str) -> Option<i64> {
    comment
        .split(TOTAL_MARKER)
        .nth(1)?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

/// Scan recent datapoints newest-first for the last posted cumulative total.
/// Unparseable marker comments are skipped; no match means zero.
pub fn recover_previous_total(datapoints: &[Datapoint]) -> i64 {
    datapoints
        .iter()
        .filter_map(|dp| parse_total_comment(dp.comment_text()))
        .next()
        .unwrap_or(0)
}

/// Duplicate guard: a datapoint younger than [`DUPLICATE_GUARD_HOURS`] whose
/// comment carries the variant marker means this run already happened.
pub fn find_recent_marker<'a>(
    datapoints: &'a [Datapoint],
    marker: &str,
    now: i64,
) -> Option<&'a Datapoint> {
    datapoints.iter().find(|dp| {
        let hours_ago = (now - dp.timestamp) as f64 / 3600.0;
        hours_ago < DUPLICATE_GUARD_HOURS && dp.comment_text().contains(marker)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datapoint(timestamp: i64, comment: &str) -> Datapoint {
        serde_json::from_str(&format!(
            r#"{{"value": 1, "timestamp": {}, "comment": {}}}"#,
            timestamp,
            serde_json::to_string(comment).unwrap()
        ))
        .unwrap()
    }

    #[test]
    fn test_parse_total_comment() {
        assert_eq!(parse_total_comment("Total: 5 (+2 new)"), Some(5));
        assert_eq!(parse_total_comment("Total: 120 (+0 new)"), Some(120));
        assert_eq!(parse_total_comment("something else entirely"), None);
        assert_eq!(parse_total_comment("Total: twelve (+1 new)"), None);
        assert_eq!(parse_total_comment(""), None);
    }

    #[test]
    fn test_recover_previous_total_takes_newest_match() {
        let history = vec![
            datapoint(300, "manual entry"),
            datapoint(200, "Total: 8 (+3 new)"),
            datapoint(100, "Total: 5 (+2 new)"),
        ];
        assert_eq!(recover_previous_total(&history), 8);
    }

    #[test]
    fn test_recover_previous_total_skips_unparseable() {
        let history = vec![
            datapoint(200, "Total: oops"),
            datapoint(100, "Total: 5 (+2 new)"),
        ];
        assert_eq!(recover_previous_total(&history), 5);
    }

    #[test]
    fn test_recover_previous_total_defaults_to_zero() {
        assert_eq!(recover_previous_total(&[]), 0);
        assert_eq!(recover_previous_total(&[datapoint(100, "no marker")]), 0);
    }

    #[test]
    fn test_guard_fires_inside_window() {
        let now = 1_700_000_000;
        let ten_hours_ago = now - 10 * 3600;
        let history = vec![datapoint(ten_hours_ago, "Archived today: 3 items")];
        assert!(find_recent_marker(&history, TODAY_MARKER, now).is_some());
    }

    #[test]
    fn test_guard_ignores_stale_datapoints() {
        let now = 1_700_000_000;
        let twenty_one_hours_ago = now - 21 * 3600;
        let history = vec![datapoint(twenty_one_hours_ago, "Archived today: 3 items")];
        assert!(find_recent_marker(&history, TODAY_MARKER, now).is_none());
    }

    #[test]
    fn test_guard_needs_the_marker() {
        let now = 1_700_000_000;
        let history = vec![datapoint(now - 3600, "manual entry")];
        assert!(find_recent_marker(&history, TODAY_MARKER, now).is_none());
    }

    #[test]
    fn test_cumulative_comment_round_trip() {
        let variant = Variant::cumulative_total();
        let comment = variant.comment(8, 3, None);
        assert_eq!(comment, "Total: 8 (+3 new)");
        assert_eq!(parse_total_comment(&comment), Some(8));
    }

    #[test]
    fn test_count_comments_embed_tag() {
        let sync = Variant::since_last_run();
        assert_eq!(
            sync.comment(4, 4, Some("learning")),
            "Auto-tracked from Readwise Reader (4 items) [tag: learning]"
        );
        assert_eq!(
            sync.comment(4, 4, None),
            "Auto-tracked from Readwise Reader (4 items)"
        );

        let today = Variant::today();
        let comment = today.comment(0, 0, Some("videos"));
        assert_eq!(comment, "Archived today: 0 items [tag: videos]");
        assert!(comment.contains(TODAY_MARKER));
    }
}
