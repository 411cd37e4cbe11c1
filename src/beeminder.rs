use chrono::Utc;
use colored::Colorize;
use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;

/// One measurement on a Beeminder goal. Values echo back as floats even
/// though this tool only ever posts integer counts.
#[derive(Debug, Clone, Deserialize)]
pub struct Datapoint {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub value: f64,

    #[serde(default)]
    pub timestamp: i64,

    #[serde(default)]
    pub daystamp: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl Datapoint {
    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

pub struct BeeminderClient {
    http: reqwest::blocking::Client,
    base_url: String,
    username: String,
    goal: String,
    token: String,
}

impl BeeminderClient {
    /// Fails before any network call when `BEEMINDER_TOKEN` is absent.
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.require_beeminder_token()?.to_string();
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            base_url: config.beeminder_api_base.clone(),
            username: config.beeminder_username.clone(),
            goal: config.beeminder_goal.clone(),
            token,
        })
    }

    fn datapoints_url(&self) -> String {
        format!(
            "{}/users/{}/goals/{}/datapoints.json",
            self.base_url, self.username, self.goal
        )
    }

    /// Create one datapoint stamped with the current wall-clock time.
    ///
    /// Failures are non-fatal by contract: a transport error or non-2xx
    /// response prints a ✗ line and returns false so the caller can skip
    /// advancing its state. Dry-run never touches the network and always
    /// reports success.
    pub fn post_datapoint(&self, value: i64, comment: Option<&str>, dry_run: bool) -> bool {
        if dry_run {
            println!("[DRY RUN] Would post to Beeminder: {} items", value);
            if let Some(c) = comment {
                println!("[DRY RUN] Comment: {}", c);
            }
            return true;
        }

        let value_field = value.to_string();
        let timestamp_field = Utc::now().timestamp().to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("auth_token", self.token.as_str()),
            ("value", value_field.as_str()),
            ("timestamp", timestamp_field.as_str()),
        ];
        if let Some(c) = comment {
            form.push(("comment", c));
        }

        println!("Posting to Beeminder: {} items", value);
        match self.http.post(self.datapoints_url()).form(&form).send() {
            Ok(response) if response.status().is_success() => {
                println!(
                    "{} Successfully posted {} items to Beeminder goal '{}'",
                    "✓".green(),
                    value,
                    self.goal
                );
                true
            }
            Ok(response) => {
                println!(
                    "{} Error posting to Beeminder: {}",
                    "✗".red(),
                    response.status()
                );
                if let Ok(body) = response.text() {
                    println!("{}", body);
                }
                false
            }
            Err(e) => {
                println!("{} Error posting to Beeminder: {}", "✗".red(), e);
                false
            }
        }
    }

    /// Read back up to `count` datapoints with the given sort key. Any
    /// failure degrades to an empty history with a warning; read-back is
    /// never a reason to abort a run.
    pub fn recent_datapoints(&self, count: usize, sort: &str) -> Vec<Datapoint> {
        let count_field = count.to_string();
        let result = self
            .http
            .get(self.datapoints_url())
            .query(&[
                ("auth_token", self.token.as_str()),
                ("count", count_field.as_str()),
                ("sort", sort),
            ])
            .send();

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<Vec<Datapoint>>() {
                    Ok(datapoints) => datapoints,
                    Err(e) => {
                        tracing::warn!("Could not parse Beeminder datapoints: {}", e);
                        Vec::new()
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(
                    "Could not fetch Beeminder datapoints: {}",
                    response.status()
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Could not fetch Beeminder datapoints: {}", e);
                Vec::new()
            }
        }
    }

    /// Timestamp of the newest datapoint on the goal, if any. With
    /// `sort=timestamp` the window arrives oldest-first, so take the last.
    pub fn last_datapoint_timestamp(&self) -> Option<i64> {
        self.recent_datapoints(1, "timestamp")
            .last()
            .map(|dp| dp.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datapoint_deserializes_with_missing_fields() {
        let dp: Datapoint = serde_json::from_str(r#"{"value": 3.0, "timestamp": 1700000000}"#)
            .unwrap();
        assert_eq!(dp.value, 3.0);
        assert_eq!(dp.timestamp, 1_700_000_000);
        assert_eq!(dp.comment_text(), "");
        assert!(dp.daystamp.is_none());
    }

    #[test]
    fn test_datapoint_comment_text() {
        let dp: Datapoint = serde_json::from_str(
            r#"{"id": "abc", "value": 1, "timestamp": 0, "comment": "Total: 5 (+2 new)"}"#,
        )
        .unwrap();
        assert_eq!(dp.comment_text(), "Total: 5 (+2 new)");
    }
}
