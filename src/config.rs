use crate::error::{Result, SyncError};
use directories::BaseDirs;
use std::path::PathBuf;

pub const READWISE_API_BASE: &str = "https://readwise.io/api/v3";
pub const BEEMINDER_API_BASE: &str = "https://www.beeminder.com/api/v1";

const STATE_FILE_NAME: &str = ".readmind_state.json";

/// Everything the sync needs from the environment, resolved once at startup.
///
/// Components receive a reference to this struct; nothing reads `std::env`
/// after construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub readwise_token: Option<String>,
    pub beeminder_token: Option<String>,
    pub beeminder_username: String,
    pub beeminder_goal: String,
    pub default_tag: Option<String>,
    pub readwise_api_base: String,
    pub beeminder_api_base: String,
    pub state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            readwise_token: env_var("READWISE_TOKEN"),
            beeminder_token: env_var("BEEMINDER_TOKEN"),
            beeminder_username: env_var("BEEMINDER_USERNAME")
                .unwrap_or_else(|| default_username().to_string()),
            beeminder_goal: env_var("BEEMINDER_GOAL")
                .unwrap_or_else(|| default_goal().to_string()),
            default_tag: env_var("READMIND_TAG").or_else(|| Some(default_tag().to_string())),
            readwise_api_base: env_var("READWISE_API_BASE")
                .unwrap_or_else(|| READWISE_API_BASE.to_string()),
            beeminder_api_base: env_var("BEEMINDER_API_BASE")
                .unwrap_or_else(|| BEEMINDER_API_BASE.to_string()),
            state_path: env_var("READMIND_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_state_path),
        }
    }

    pub fn require_readwise_token(&self) -> Result<&str> {
        self.readwise_token.as_deref().ok_or_else(|| {
            SyncError::Config(
                "READWISE_TOKEN environment variable not set.\n\
                 Get your token from: https://readwise.io/access_token\n\
                 Set it with: export READWISE_TOKEN='your_token_here'"
                    .to_string(),
            )
        })
    }

    pub fn require_beeminder_token(&self) -> Result<&str> {
        self.beeminder_token.as_deref().ok_or_else(|| {
            SyncError::Config(
                "BEEMINDER_TOKEN environment variable not set.\n\
                 Get your token from: https://www.beeminder.com/api/v1/auth_token.json\n\
                 Set it with: export BEEMINDER_TOKEN='your_token_here'"
                    .to_string(),
            )
        })
    }

    /// The tag to filter on: an explicit `--tag` wins, then the configured
    /// default. `None` means count every archived item.
    pub fn resolve_tag(&self, override_tag: Option<String>) -> Option<String> {
        override_tag.or_else(|| self.default_tag.clone())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn default_username() -> &'static str {
    "kyle"
}

fn default_goal() -> &'static str {
    "learning"
}

fn default_tag() -> &'static str {
    "learning"
}

fn default_state_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(STATE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_FILE_NAME))
}
