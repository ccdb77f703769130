//! Discussion-post normalization.
//!
//! The two posts endpoints return differently-shaped payloads; the post
//! list's location is chosen by the endpoint tag on the payload, never by
//! the container set that was requested.

use chrono::{TimeZone, Utc};
use serde_json::Value;
use tracing::warn;

use crate::entry::{Action, Entry, EntryKind, Target};
use crate::error::PollError;
use crate::fandom::account::Account;
use crate::fandom::discussions::{
    Category, ContainerType, Post, PostsEndpoint, PostsPayload, Thread, ThreadParent,
};
use crate::fandom::page::PartialPage;
use crate::fandom::wiki::Wiki;

/// Converts a posts payload into entries.
///
/// Malformed individual posts are skipped with a warning; a payload whose
/// post list is missing entirely is a normalization error. A null body (the
/// RPC surface's empty-result answer) yields no entries.
///
/// # Errors
///
/// Returns [`PollError::Normalize`] when the expected post list is absent.
pub fn normalize(wiki: &Wiki, payload: &PostsPayload) -> Result<Vec<Entry>, PollError> {
    if payload.body.is_null() {
        return Ok(Vec::new());
    }

    let posts = match payload.endpoint {
        PostsEndpoint::Service => payload.body.pointer("/_embedded/doc:posts"),
        PostsEndpoint::Nirvana => payload.body.get("posts"),
    }
    .and_then(Value::as_array)
    .ok_or_else(|| {
        PollError::Normalize(format!(
            "posts payload from {:?} endpoint has no post list",
            payload.endpoint
        ))
    })?;

    let mut entries = Vec::with_capacity(posts.len());
    for raw in posts {
        match post_entry(wiki, raw) {
            Ok(entry) => entries.push(entry),
            Err(reason) => warn!(wiki = wiki.id, %reason, "Skipping malformed discussion post"),
        }
    }
    Ok(entries)
}

fn post_entry(wiki: &Wiki, raw: &Value) -> Result<Entry, String> {
    let id = id_field(raw, "id")?;
    let thread_id = id_field(raw, "threadId")?;
    let title = raw.get("title").and_then(Value::as_str).map(ToString::to_string);
    let text = raw
        .get("rawContent")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let is_reply = raw.get("isReply").and_then(Value::as_bool).unwrap_or(false);

    let author = raw.get("createdBy").and_then(|creator| {
        Some(Account {
            id: creator.get("id").and_then(value_as_u64)?,
            name: creator.get("name")?.as_str()?.to_string(),
        })
    });

    let timestamp = raw
        .pointer("/creationDate/epochSecond")
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .ok_or_else(|| "missing or invalid creationDate".to_string())?;

    let parent = thread_parent(raw)?;

    let post = Post {
        id,
        text: text.clone(),
        thread_id: thread_id.clone(),
        author: author.clone(),
        timestamp: Some(timestamp),
    };
    let thread = Thread {
        id: thread_id,
        title,
        parent,
        first_post: None,
        posts: Vec::new(),
    };

    // Thread starters link to the thread, replies to the specific post.
    let (action, url) = if is_reply {
        (Action::ReplyPost, post.url(&wiki.url))
    } else {
        (Action::CreatePost, thread.url(&wiki.url))
    };

    Ok(Entry {
        kind: EntryKind::Post,
        action,
        target: Target::Thread {
            id: thread.id,
            title: thread.title,
        },
        user: author,
        summary: (!text.is_empty()).then_some(text),
        details: None,
        url,
        timestamp,
    })
}

fn thread_parent(raw: &Value) -> Result<ThreadParent, String> {
    let kind = raw
        .get("containerType")
        .and_then(Value::as_str)
        .and_then(ContainerType::from_param)
        .ok_or_else(|| "missing or unknown containerType".to_string())?;

    let container_name = raw
        .get("forumName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(match kind {
        ContainerType::Forum => ThreadParent::Category(Category {
            id: id_field(raw, "forumId").unwrap_or_default(),
            title: container_name,
        }),
        ContainerType::Wall => ThreadParent::Account(Account {
            id: raw.get("forumId").and_then(value_as_u64).unwrap_or(0),
            name: wall_owner(&container_name),
        }),
        ContainerType::ArticleComment => ThreadParent::Page(PartialPage {
            name: container_name,
        }),
    })
}

/// Wall container names come as `{owner}'s Message Wall`.
fn wall_owner(container_name: &str) -> String {
    container_name
        .strip_suffix("'s Message Wall")
        .unwrap_or(container_name)
        .to_string()
}

/// Discussion ids arrive as decimal strings, but the RPC surface sometimes
/// serializes them as numbers.
fn id_field(raw: &Value, name: &str) -> Result<String, String> {
    match raw.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(format!("missing id field `{name}`")),
    }
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_wiki() -> Wiki {
        Wiki::new(
            crate::fandom::endpoint::EndpointClient::new(
                reqwest::Client::new(),
                1,
                "https://test.fandom.com".to_string(),
            ),
            Utc::now(),
        )
    }

    fn forum_post(id: &str, is_reply: bool) -> Value {
        json!({
            "id": id,
            "threadId": "4400000000000012345",
            "title": "Patch discussion",
            "rawContent": "What do you all think?",
            "isReply": is_reply,
            "containerType": "FORUM",
            "forumId": "558",
            "forumName": "General",
            "createdBy": { "id": "42", "name": "Poster" },
            "creationDate": { "epochSecond": 1_685_600_000 }
        })
    }

    #[test]
    fn test_service_payload_normalizes() {
        let wiki = test_wiki();
        let payload = PostsPayload {
            endpoint: PostsEndpoint::Service,
            body: json!({ "_embedded": { "doc:posts": [forum_post("1", false)] } }),
        };
        let entries = normalize(&wiki, &payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, Action::CreatePost);
        assert_eq!(
            entries[0].url,
            "https://test.fandom.com/f/4400000000000012345"
        );
    }

    #[test]
    fn test_nirvana_payload_uses_flat_post_list() {
        let wiki = test_wiki();
        let payload = PostsPayload {
            endpoint: PostsEndpoint::Nirvana,
            body: json!({ "posts": [forum_post("2", true)] }),
        };
        let entries = normalize(&wiki, &payload).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, Action::ReplyPost);
        assert_eq!(
            entries[0].url,
            "https://test.fandom.com/f/4400000000000012345/r/2"
        );
    }

    #[test]
    fn test_shape_is_selected_by_endpoint_not_content() {
        let wiki = test_wiki();
        // Nirvana-shaped body tagged as Service must fail, not fall back.
        let payload = PostsPayload {
            endpoint: PostsEndpoint::Service,
            body: json!({ "posts": [forum_post("3", false)] }),
        };
        assert!(normalize(&wiki, &payload).is_err());
    }

    #[test]
    fn test_null_body_yields_no_entries() {
        let wiki = test_wiki();
        let payload = PostsPayload {
            endpoint: PostsEndpoint::Nirvana,
            body: Value::Null,
        };
        assert!(normalize(&wiki, &payload).unwrap().is_empty());
    }

    #[test]
    fn test_wall_post_parent_is_account() {
        let mut raw = forum_post("4", false);
        raw["containerType"] = json!("WALL");
        raw["forumName"] = json!("Visitor's Message Wall");
        let parent = thread_parent(&raw).unwrap();
        match parent {
            ThreadParent::Account(account) => assert_eq!(account.name, "Visitor"),
            other => panic!("expected account parent, got {other:?}"),
        }
    }

    #[test]
    fn test_article_comment_parent_is_page() {
        let mut raw = forum_post("5", false);
        raw["containerType"] = json!("ARTICLE_COMMENT");
        raw["forumName"] = json!("Main Page");
        match thread_parent(&raw).unwrap() {
            ThreadParent::Page(page) => assert_eq!(page.name, "Main Page"),
            other => panic!("expected page parent, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_post_is_skipped() {
        let wiki = test_wiki();
        let payload = PostsPayload {
            endpoint: PostsEndpoint::Service,
            body: json!({
                "_embedded": { "doc:posts": [forum_post("6", false), { "id": "7" }] }
            }),
        };
        let entries = normalize(&wiki, &payload).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let mut raw = forum_post("8", false);
        raw["id"] = json!(8);
        raw["threadId"] = json!(4_400_000_000_000_012_345_u64);
        assert!(post_entry(&test_wiki(), &raw).is_ok());
    }
}
