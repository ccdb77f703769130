//! Discord webhook transport.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;

use crate::entry::{Details, Entry};

use super::Transport;

/// Delivers entries as Discord webhook embeds.
pub struct DiscordTransport {
    http: reqwest::Client,
    webhook_url: String,
}

impl DiscordTransport {
    #[must_use]
    pub fn new(http: reqwest::Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }

    fn render(entry: &Entry) -> serde_json::Value {
        let user = entry
            .user
            .as_ref()
            .map_or("someone", |account| account.name.as_str());
        let target = entry.target.title().unwrap_or("untitled");
        let title = format!("{user} {} {target}", entry.action.label());

        let mut description = entry.summary.clone().unwrap_or_default();
        if let Some(Details::Diff(diff)) = &entry.details {
            let delta = diff.size_delta();
            let sign = if delta >= 0 { "+" } else { "" };
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(&format!("({sign}{delta} bytes)"));
        }

        json!({
            "embeds": [{
                "title": title,
                "description": description,
                "url": entry.url,
                "timestamp": entry.timestamp.to_rfc3339(),
            }]
        })
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, entry: &Entry) -> Result<()> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&Self::render(entry))
            .send()
            .await
            .context("Failed to send webhook request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("webhook returned status {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Action, Diff, EntryKind, Target};
    use crate::fandom::account::Account;
    use crate::fandom::page::{Page, PageVersion};
    use chrono::{TimeZone, Utc};

    fn sample_entry() -> Entry {
        Entry {
            kind: EntryKind::Edit,
            action: Action::EditPage,
            target: Target::Page(Page {
                id: 7,
                name: "Main Page".to_string(),
                namespace: 0,
            }),
            user: Some(Account {
                id: 1,
                name: "Editor".to_string(),
            }),
            summary: Some("fix typo".to_string()),
            details: Some(Details::Diff(Diff {
                old: PageVersion { id: 10, size: 100 },
                new: PageVersion { id: 11, size: 120 },
            })),
            url: "https://test.fandom.com/wiki/Main_Page".to_string(),
            timestamp: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_embed() {
        let body = DiscordTransport::render(&sample_entry());
        let embed = &body["embeds"][0];
        assert_eq!(embed["title"], "Editor edited page Main Page");
        assert_eq!(embed["url"], "https://test.fandom.com/wiki/Main_Page");
        let description = embed["description"].as_str().unwrap();
        assert!(description.contains("fix typo"));
        assert!(description.contains("+20 bytes"));
    }

    #[test]
    fn test_render_without_user_or_summary() {
        let mut entry = sample_entry();
        entry.user = None;
        entry.summary = None;
        entry.details = None;
        let body = DiscordTransport::render(&entry);
        assert_eq!(body["embeds"][0]["title"], "someone edited page Main Page");
        assert_eq!(body["embeds"][0]["description"], "");
    }
}
