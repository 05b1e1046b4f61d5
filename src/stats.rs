use std::future::Future;

use anyhow::Result;
use log::info;
use serde::Serialize;
use url::Url;

/// What a finished run reports to the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub normalized_score: u32,
    pub time_spent_seconds: u64,
}

/// Sink for end-of-run statistics. Submission is fire-and-forget from the
/// game's perspective: a failure never blocks or alters game state.
pub trait StatsReporter: Send + Sync + 'static {
    fn submit(&self, stats: RunStats) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsPayload<'a> {
    user_id: &'a str,
    game_id: u32,
    normalized_score: u32,
    total_scale: u32,
    time_spent_seconds: u64,
}

/// Posts run statistics to a remote collector. Without an endpoint or a
/// user identity there is nothing to attribute the run to, so submission is
/// skipped entirely; that is not an error.
pub struct HttpStatsReporter {
    client: reqwest::Client,
    endpoint: Option<Url>,
    user_id: Option<String>,
    game_id: u32,
}

impl HttpStatsReporter {
    pub fn new(endpoint: Option<Url>, user_id: Option<String>, game_id: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            user_id,
            game_id,
        }
    }
}

impl StatsReporter for HttpStatsReporter {
    async fn submit(&self, stats: RunStats) -> Result<()> {
        let (Some(endpoint), Some(user_id)) = (&self.endpoint, &self.user_id) else {
            info!("No stats endpoint or user id configured, skipping submission");
            return Ok(());
        };

        let payload = StatsPayload {
            user_id,
            game_id: self.game_id,
            normalized_score: stats.normalized_score,
            total_scale: 100,
            time_spent_seconds: stats.time_spent_seconds,
        };
        self.client
            .post(endpoint.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        info!(
            "Submitted run stats: normalized score {} in {}s",
            stats.normalized_score, stats.time_spent_seconds
        );
        Ok(())
    }
}

/// Captures submissions in memory so tests can assert on them.
#[cfg(feature = "test-support")]
pub struct RecordingStatsReporter {
    submissions: std::sync::Mutex<Vec<RunStats>>,
}

#[cfg(feature = "test-support")]
impl RecordingStatsReporter {
    pub fn new() -> Self {
        Self {
            submissions: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<RunStats> {
        self.submissions.lock().unwrap().clone()
    }
}

#[cfg(feature = "test-support")]
impl Default for RecordingStatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "test-support")]
impl StatsReporter for RecordingStatsReporter {
    async fn submit(&self, stats: RunStats) -> Result<()> {
        self.submissions.lock().unwrap().push(stats);
        Ok(())
    }
}
