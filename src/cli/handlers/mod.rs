mod sync;
mod today;
mod total;

pub use sync::{SyncParams, handle_sync};
pub use today::{TodayParams, handle_today};
pub use total::{TotalParams, handle_total};

use crate::config::Config;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}
