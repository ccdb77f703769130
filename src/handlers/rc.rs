//! Recent-changes and log-events normalization.

use serde_json::Value;
use tracing::{debug, warn};

use crate::entry::{Action, Details, Diff, Entry, EntryKind, RenameParams, Target};
use crate::error::PollError;
use crate::fandom::account::Account;
use crate::fandom::page::{Page, PageVersion};
use crate::fandom::urls;
use crate::fandom::wiki::Wiki;

/// Converts one `api.php` recent-activity payload into entries.
///
/// Malformed individual records are skipped with a warning; a payload
/// missing either result list is a normalization error.
///
/// # Errors
///
/// Returns [`PollError::Normalize`] when the payload lacks the
/// `query.recentchanges` or `query.logevents` lists.
pub fn normalize(wiki: &Wiki, body: &Value) -> Result<Vec<Entry>, PollError> {
    let query = body
        .get("query")
        .ok_or_else(|| PollError::Normalize("missing `query` in api.php payload".to_string()))?;
    let changes = list(query, "recentchanges")?;
    let log_events = list(query, "logevents")?;

    let mut entries = Vec::with_capacity(changes.len() + log_events.len());

    for raw in changes {
        match edit_entry(wiki, raw) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!(wiki = wiki.id, %reason, "Skipping malformed recent change"),
        }
    }

    for raw in log_events {
        match log_entry(wiki, raw) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => debug!(wiki = wiki.id, "Skipping unsupported log event type"),
            Err(reason) => warn!(wiki = wiki.id, %reason, "Skipping malformed log event"),
        }
    }

    Ok(entries)
}

fn list<'a>(query: &'a Value, name: &str) -> Result<&'a Vec<Value>, PollError> {
    query
        .get(name)
        .and_then(Value::as_array)
        .ok_or_else(|| PollError::Normalize(format!("missing `query.{name}` list")))
}

fn edit_entry(wiki: &Wiki, raw: &Value) -> Result<Entry, String> {
    let author = account(raw)?;
    let page = page(raw)?;

    let old = PageVersion {
        id: u64_field(raw, "old_revid")?,
        size: i64_field(raw, "oldlen")?,
    };
    let new = PageVersion {
        id: u64_field(raw, "revid")?,
        size: i64_field(raw, "newlen")?,
    };

    let is_new = str_field(raw, "type")? == "new";
    let action = if is_new { Action::CreatePage } else { Action::EditPage };

    // New pages have no old revision to diff against.
    let url = if is_new {
        urls::page_url(&wiki.url, &page.name, None, &[])
    } else {
        let diff_id = new.id.to_string();
        let old_id = old.id.to_string();
        urls::page_url(
            &wiki.url,
            &page.name,
            None,
            &[("diff", diff_id.as_str()), ("oldid", old_id.as_str())],
        )
    };

    Ok(Entry {
        kind: EntryKind::Edit,
        action,
        target: Target::Page(page),
        user: Some(author),
        summary: opt_str_field(raw, "comment"),
        details: Some(Details::Diff(Diff { old, new })),
        url,
        timestamp: super::from_mw_timestamp(str_field(raw, "timestamp")?)?,
    })
}

/// `Ok(None)` means the log type is one this normalizer does not cover.
fn log_entry(wiki: &Wiki, raw: &Value) -> Result<Option<Entry>, String> {
    let author = account(raw)?;
    let page = page(raw)?;

    let (action, details) = match str_field(raw, "type")? {
        "move" => {
            let params = raw
                .get("params")
                .ok_or_else(|| "move event without params".to_string())?;
            let details = RenameParams {
                target_title: str_field(params, "target_title")?.to_string(),
                target_namespace: i64_field(params, "target_ns")?,
                suppress_redirect: params.get("suppressredirect").is_some(),
            };
            (Action::RenamePage, Some(Details::Rename(details)))
        }
        "delete" => {
            let action = if str_field(raw, "action")? == "delete" {
                Action::DeletePage
            } else {
                Action::UndeletePage
            };
            (action, None)
        }
        _ => return Ok(None),
    };

    let url = urls::page_url(&wiki.url, &page.name, None, &[]);

    Ok(Some(Entry {
        kind: EntryKind::Log,
        action,
        target: Target::Page(page),
        user: Some(author),
        summary: opt_str_field(raw, "comment"),
        details,
        url,
        timestamp: super::from_mw_timestamp(str_field(raw, "timestamp")?)?,
    }))
}

fn account(raw: &Value) -> Result<Account, String> {
    Ok(Account {
        id: u64_field(raw, "userid")?,
        name: str_field(raw, "user")?.to_string(),
    })
}

fn page(raw: &Value) -> Result<Page, String> {
    Ok(Page {
        id: u64_field(raw, "pageid")?,
        name: str_field(raw, "title")?.to_string(),
        namespace: i64_field(raw, "ns")?,
    })
}

fn str_field<'a>(raw: &'a Value, name: &str) -> Result<&'a str, String> {
    raw.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string field `{name}`"))
}

fn opt_str_field(raw: &Value, name: &str) -> Option<String> {
    raw.get(name).and_then(Value::as_str).map(ToString::to_string)
}

fn u64_field(raw: &Value, name: &str) -> Result<u64, String> {
    raw.get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("missing integer field `{name}`"))
}

fn i64_field(raw: &Value, name: &str) -> Result<i64, String> {
    raw.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("missing integer field `{name}`"))
}
