//! Combined recent-changes + log-events query.
//!
//! One `api.php` request covers both lists; the API family's wire convention
//! for multi-valued filters is pipe-joined strings.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::FetchError;
use crate::fandom::endpoint::EndpointClient;

/// Optional filters for a recent-activity fetch.
#[derive(Debug, Clone, Default)]
pub struct RecentActivityQuery {
    pub limit: Option<u32>,
    pub types: Option<Vec<String>>,
    pub show: Option<Vec<String>>,
    pub recent_changes_props: Option<Vec<String>>,
    pub log_events_props: Option<Vec<String>>,
    pub namespaces: Option<Vec<i64>>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
}

impl RecentActivityQuery {
    /// Restricts the query to the given half-open time window.
    #[must_use]
    pub fn window(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.after = after;
        self.before = before;
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("list", "recentchanges|logevents".to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(limit) = self.limit {
            params.push(("rclimit", limit.to_string()));
            params.push(("lelimit", limit.to_string()));
        }
        if let Some(types) = &self.types {
            params.push(("rctype", types.join("|")));
        }
        if let Some(show) = &self.show {
            params.push(("rcshow", show.join("|")));
        }
        if let Some(props) = &self.recent_changes_props {
            params.push(("rcprop", props.join("|")));
        }
        if let Some(props) = &self.log_events_props {
            params.push(("leprop", props.join("|")));
        }
        if let Some(after) = self.after {
            let ts = api_timestamp(after);
            params.push(("rcend", ts.clone()));
            params.push(("leend", ts));
        }
        if let Some(before) = self.before {
            let ts = api_timestamp(before);
            params.push(("rcstart", ts.clone()));
            params.push(("lestart", ts));
        }
        if let Some(namespaces) = &self.namespaces {
            let joined = namespaces
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|");
            params.push(("namespaces", joined));
        }
        params
    }
}

/// Full-precision ISO-8601 with a literal `Z` suffix.
///
/// `api.php` wants UTC-suffixed timestamps, not timezone-aware ISO output;
/// the suffix is appended verbatim. The discussion posts API uses a
/// different encoding, see [`super::discussions`].
fn api_timestamp(t: DateTime<Utc>) -> String {
    format!("{}Z", t.format("%Y-%m-%dT%H:%M:%S%.6f"))
}

/// Fetches recent changes and log events in one request.
///
/// # Errors
///
/// Returns [`FetchError`] when the request or decoding fails.
pub async fn fetch_recent_activity(
    client: &EndpointClient,
    query: &RecentActivityQuery,
) -> Result<Value, FetchError> {
    client.call_api(&query.to_params()).await
}

/// Fetches the wiki's latest social activity via the RPC surface.
///
/// `after`, when present, goes on the wire as `lastUpdateTime` in epoch
/// seconds; this endpoint predates the ISO conventions of the other two
/// fetch surfaces. An empty result (the RPC surface's 204 answer) comes
/// back as an empty list.
///
/// # Errors
///
/// Returns [`FetchError`] when the request or decoding fails, including
/// [`FetchError::MissingBaseUrl`] for a wiki without a base URL.
pub async fn fetch_social_activity(
    client: &EndpointClient,
    after: Option<DateTime<Utc>>,
) -> Result<Value, FetchError> {
    let body = client.call_nirvana(&social_activity_params(after)).await?;
    if body.is_null() {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(body)
}

fn social_activity_params(after: Option<DateTime<Utc>>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("controller", "ActivityApiController".to_string()),
        ("method", "getSocialActivity".to_string()),
        ("uselang", "en".to_string()),
    ];
    if let Some(after) = after {
        params.push(("lastUpdateTime", after.timestamp().to_string()));
    }
    params
}
