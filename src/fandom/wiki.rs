//! Per-wiki session state and the poll cycle.

use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::entry::Entry;
use crate::error::{FetchError, PollError};
use crate::fandom::discussions::{self, PostsQuery};
use crate::fandom::endpoint::EndpointClient;
use crate::fandom::recent::{self, RecentActivityQuery};
use crate::fandom::urls;
use crate::handlers;
use crate::transports::Transport;

/// Result of one successful poll cycle.
#[derive(Debug, Clone, Copy)]
pub struct PollOutcome {
    /// Number of entries dispatched to transports.
    pub entries: usize,
    /// End of the covered window; the checkpoint now points here.
    pub window_end: DateTime<Utc>,
}

/// One configured wiki: identity, checkpoint, and its delivery transports.
///
/// Lives for the process's duration. The checkpoint mutates after every
/// successful poll cycle and only then, so a failed cycle's window is
/// re-covered by the next one.
pub struct Wiki {
    pub id: u64,
    pub url: String,
    pub last_check_time: DateTime<Utc>,
    endpoint: EndpointClient,
    transports: Vec<Box<dyn Transport>>,
}

impl Wiki {
    #[must_use]
    pub fn new(endpoint: EndpointClient, last_check_time: DateTime<Utc>) -> Self {
        Self {
            id: endpoint.wiki_id(),
            url: endpoint.base_url().to_string(),
            last_check_time,
            endpoint,
            transports: Vec::new(),
        }
    }

    /// Attaches a delivery transport. Transports are never removed at
    /// runtime.
    pub fn add_transport(&mut self, transport: Box<dyn Transport>) {
        self.transports.push(transport);
    }

    #[must_use]
    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    #[must_use]
    pub fn endpoint(&self) -> &EndpointClient {
        &self.endpoint
    }

    /// URL to the given page on this wiki.
    #[must_use]
    pub fn url_to(&self, page: &str, namespace: Option<&str>, params: &[(&str, &str)]) -> String {
        urls::page_url(&self.url, page, namespace, params)
    }

    /// URL to the given discussion thread or reply.
    #[must_use]
    pub fn discussions_url(&self, thread_id: &str, reply_id: Option<&str>) -> String {
        urls::discussions_url(&self.url, thread_id, reply_id)
    }

    /// URL to the discussions listing for a tag.
    #[must_use]
    pub fn tag_url(&self, tag: &str) -> String {
        urls::tag_url(&self.url, tag)
    }

    /// Latest social activity for this wiki, from the RPC surface.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the request fails.
    pub async fn fetch_social_activity(
        &self,
        after: Option<DateTime<Utc>>,
    ) -> Result<Value, FetchError> {
        recent::fetch_social_activity(&self.endpoint, after).await
    }

    /// Runs one poll cycle covering `(last_check_time, window_end]`.
    ///
    /// Fetches recent activity and discussion posts concurrently, normalizes
    /// both payloads, then fans each entry out to every transport. The
    /// checkpoint advances to `window_end` only after dispatch completes;
    /// per-transport delivery failures are logged and do not prevent that.
    ///
    /// # Errors
    ///
    /// Returns [`PollError`] on any fetch or normalize failure, in which
    /// case the checkpoint is left unchanged.
    pub async fn poll(&mut self, window_end: DateTime<Utc>) -> Result<PollOutcome, PollError> {
        let window_start = self.last_check_time;

        // Fetching: both surfaces share the window, joined before advancing.
        let rc_query =
            default_recent_query().window(Some(window_start), Some(window_end));
        let posts_query = PostsQuery::default().window(Some(window_start), Some(window_end));

        let (rc_body, posts_payload) = tokio::try_join!(
            recent::fetch_recent_activity(&self.endpoint, &rc_query),
            discussions::fetch_posts(&self.endpoint, &posts_query),
        )?;

        // Normalizing.
        let mut entries = handlers::rc::normalize(self, &rc_body)?;
        entries.extend(handlers::discussions::normalize(self, &posts_payload)?);

        // Dispatching.
        for entry in &entries {
            self.dispatch(entry).await;
        }

        self.last_check_time = window_end;
        debug!(wiki = self.id, entries = entries.len(), "Poll cycle complete");

        Ok(PollOutcome {
            entries: entries.len(),
            window_end,
        })
    }

    /// Delivers one entry to every transport concurrently. Each delivery is
    /// isolated: an error or panic in one transport is logged and does not
    /// reach its siblings.
    async fn dispatch(&self, entry: &Entry) {
        let deliveries = self
            .transports
            .iter()
            .map(|transport| AssertUnwindSafe(transport.deliver(entry)).catch_unwind());

        for (transport, outcome) in self.transports.iter().zip(join_all(deliveries).await) {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    wiki = self.id,
                    transport = transport.name(),
                    "Delivery failed: {e:#}"
                ),
                Err(_) => error!(
                    wiki = self.id,
                    transport = transport.name(),
                    "Delivery panicked"
                ),
            }
        }
    }
}

fn default_recent_query() -> RecentActivityQuery {
    RecentActivityQuery {
        limit: Some(500),
        types: Some(vec!["edit".to_string(), "new".to_string()]),
        recent_changes_props: Some(
            ["user", "userid", "comment", "timestamp", "title", "ids", "sizes"]
                .map(String::from)
                .to_vec(),
        ),
        log_events_props: Some(
            ["user", "userid", "comment", "timestamp", "title", "ids", "type", "details"]
                .map(String::from)
                .to_vec(),
        ),
        ..Default::default()
    }
}
