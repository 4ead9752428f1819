use chrono::{Local, TimeZone};
use depotsync_fetch::HttpClient;
use serde::Serialize;
use tracing::{error, info};

use super::GitHubApi;
use super::types::RateLimit;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    pub used: u64,
    /// Epoch seconds at which the quota resets.
    pub reset: i64,
    /// Local time of the reset, `%Y-%m-%d %H:%M:%S`.
    pub reset_formatted: String,
    /// Relative-time token, `<t:{reset}:R>`.
    pub reset_relative: String,
}

impl RateLimitStatus {
    pub fn new(limit: u64, remaining: u64, used: u64, reset: i64) -> Self {
        Self {
            limit,
            remaining,
            used,
            reset,
            reset_formatted: format_reset(reset),
            reset_relative: format!("<t:{reset}:R>"),
        }
    }
}

/// Outcome of a quota check. A failed check is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuotaReport {
    Available(RateLimitStatus),
    Unavailable { message: String },
}

impl QuotaReport {
    pub fn status(&self) -> Option<&RateLimitStatus> {
        match self {
            QuotaReport::Available(status) => Some(status),
            QuotaReport::Unavailable { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.status().is_some_and(|s| s.remaining == 0)
    }
}

fn format_reset(reset: i64) -> String {
    match Local.timestamp_opt(reset, 0).single() {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => reset.to_string(),
    }
}

impl<C: HttpClient> GitHubApi<C> {
    pub async fn check_rate_limit(&self) -> QuotaReport {
        let url = self.url("rate_limit");
        let rate: RateLimit = match self.get_json(&url).await {
            Ok(rate) => rate,
            Err(e) => {
                let message = match e {
                    Error::Status { status, .. } => {
                        format!("rate limit check failed with status {status}")
                    }
                    other => format!("rate limit check failed: {other}"),
                };
                error!("{message}");
                return QuotaReport::Unavailable { message };
            }
        };

        let r = rate.rate;
        info!(remaining = r.remaining, limit = r.limit, "API requests remaining");
        QuotaReport::Available(RateLimitStatus::new(r.limit, r.remaining, r.used, r.reset))
    }
}
