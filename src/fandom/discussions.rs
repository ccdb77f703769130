//! Discussion containers, the thread/post model, and the post fetcher.
//!
//! The platform's filtered posts endpoint accepts at most one container type
//! per request. Fetching two of the three container kinds therefore fans out
//! into concurrent per-container requests whose pages are merged
//! deterministically, while the full set routes through a separate
//! unfiltered RPC endpoint with a different payload shape.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::FetchError;
use crate::fandom::account::Account;
use crate::fandom::endpoint::EndpointClient;
use crate::fandom::page::PartialPage;
use crate::fandom::urls;

/// A category of discussion content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    ArticleComment,
    Forum,
    Wall,
}

impl ContainerType {
    /// All three container kinds, the default fetch set.
    pub const ALL: [Self; 3] = [Self::ArticleComment, Self::Forum, Self::Wall];

    /// Wire value for the `containerType` parameter.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::ArticleComment => "ARTICLE_COMMENT",
            Self::Forum => "FORUM",
            Self::Wall => "WALL",
        }
    }

    /// Parses a wire value back into a container kind.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "ARTICLE_COMMENT" => Some(Self::ArticleComment),
            "FORUM" => Some(Self::Forum),
            "WALL" => Some(Self::Wall),
            _ => None,
        }
    }
}

/// A discussion category (forum board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub title: String,
}

impl Category {
    #[must_use]
    pub fn url(&self, wiki_base: &str) -> String {
        format!("{wiki_base}/f?catId={}", self.id)
    }
}

/// The thing a thread hangs off of. A closed set: message walls belong to an
/// account, forum threads to a category, article comments to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadParent {
    Account(Account),
    Category(Category),
    Page(PartialPage),
}

/// A discussion thread. `first_post` and `posts` are views derived from
/// fetch results, not authoritative ownership.
#[derive(Debug, Clone)]
pub struct Thread {
    pub id: String,
    pub title: Option<String>,
    pub parent: ThreadParent,
    pub first_post: Option<Post>,
    pub posts: Vec<Post>,
}

impl Thread {
    #[must_use]
    pub fn url(&self, wiki_base: &str) -> String {
        urls::discussions_url(wiki_base, &self.id, None)
    }
}

/// A single discussion post. Holds its thread's id as a non-owning
/// back-reference; URL derivation walks post → thread → wiki.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub thread_id: String,
    pub author: Option<Account>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Post {
    #[must_use]
    pub fn url(&self, wiki_base: &str) -> String {
        urls::discussions_url(wiki_base, &self.thread_id, Some(&self.id))
    }
}

/// Which endpoint family served a posts payload. The two families return
/// differently-shaped bodies, so the normalizer keys off this tag rather
/// than off the requested container count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostsEndpoint {
    /// `services.fandom.com/discussion/{id}/posts`, HAL-style body.
    Service,
    /// `wikia.php` `DiscussionPost/getPosts`, flat body.
    Nirvana,
}

/// Raw posts payload plus the endpoint that produced it.
#[derive(Debug, Clone)]
pub struct PostsPayload {
    pub endpoint: PostsEndpoint,
    pub body: Value,
}

/// Filters for a posts fetch.
#[derive(Debug, Clone)]
pub struct PostsQuery {
    pub limit: Option<u32>,
    pub containers: Vec<ContainerType>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
}

impl Default for PostsQuery {
    fn default() -> Self {
        Self {
            limit: None,
            containers: ContainerType::ALL.to_vec(),
            before: None,
            after: None,
        }
    }
}

impl PostsQuery {
    /// Restricts the query to the given half-open time window.
    #[must_use]
    pub fn window(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.after = after;
        self.before = before;
        self
    }

    /// Window and limit parameters shared by every dispatch strategy.
    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(after) = self.after {
            params.push(("since", posts_timestamp(after)));
        }
        if let Some(before) = self.before {
            params.push(("until", posts_timestamp(before)));
        }
        params
    }
}

/// Millisecond-truncated ISO-8601 with a literal `Z` suffix.
///
/// The posts API rejects microsecond-precision strings, unlike `api.php`;
/// the two encodings are intentionally separate.
fn posts_timestamp(t: DateTime<Utc>) -> String {
    format!("{}Z", t.format("%Y-%m-%dT%H:%M:%S%.3f"))
}

/// How a posts fetch will be issued for a given container set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchPlan {
    /// One filtered call to the services endpoint.
    SingleFiltered(ContainerType),
    /// Two concurrent filtered calls, merged first-then-second.
    FanOut(ContainerType, ContainerType),
    /// One unfiltered call to the RPC endpoint, which returns the union.
    Unfiltered,
}

fn plan_fetch(containers: &[ContainerType]) -> FetchPlan {
    match containers {
        [only] => FetchPlan::SingleFiltered(*only),
        [first, second] => FetchPlan::FanOut(*first, *second),
        _ => FetchPlan::Unfiltered,
    }
}

/// Appends `second`'s post list to `base`'s, in place.
///
/// `base` keeps its surrounding structure; only the `_embedded["doc:posts"]`
/// array grows. Order is base's posts first, then `second`'s, untouched.
fn merge_post_pages(base: &mut Value, second: Value) {
    let second_posts = match second.pointer("/_embedded/doc:posts") {
        Some(Value::Array(posts)) => posts.clone(),
        _ => return,
    };
    if second_posts.is_empty() {
        return;
    }

    if let Some(Value::Array(posts)) = base.pointer_mut("/_embedded/doc:posts") {
        posts.extend(second_posts);
        return;
    }

    // Base page with no post list at all: adopt the second's.
    if let Some(Value::Object(embedded)) = base.pointer_mut("/_embedded") {
        embedded.insert("doc:posts".to_string(), Value::Array(second_posts));
    } else if let Some(obj) = base.as_object_mut() {
        obj.insert(
            "_embedded".to_string(),
            serde_json::json!({ "doc:posts": second_posts }),
        );
    }
}

/// Fetches discussion posts according to the query's container set.
///
/// Exactly one container produces one filtered services call; two containers
/// fan out into concurrent per-container calls whose pages are merged; any
/// other count (notably the default full set) is served by the unfiltered
/// RPC endpoint in a single call. Either sub-request's failure fails the
/// whole fetch.
///
/// # Errors
///
/// Returns [`FetchError`] when any underlying request fails.
pub async fn fetch_posts(
    client: &EndpointClient,
    query: &PostsQuery,
) -> Result<PostsPayload, FetchError> {
    let base_params = query.base_params();

    match plan_fetch(&query.containers) {
        FetchPlan::SingleFiltered(container) => {
            let mut params = base_params;
            params.push(("containerType", container.as_param().to_string()));
            let body = client.call_service("discussion", "posts", &params).await?;
            Ok(PostsPayload {
                endpoint: PostsEndpoint::Service,
                body,
            })
        }
        FetchPlan::FanOut(first, second) => {
            let mut first_params = base_params.clone();
            first_params.push(("containerType", first.as_param().to_string()));
            let mut second_params = base_params;
            second_params.push(("containerType", second.as_param().to_string()));

            let (mut first_body, second_body) = tokio::try_join!(
                client.call_service("discussion", "posts", &first_params),
                client.call_service("discussion", "posts", &second_params),
            )?;

            merge_post_pages(&mut first_body, second_body);
            Ok(PostsPayload {
                endpoint: PostsEndpoint::Service,
                body: first_body,
            })
        }
        FetchPlan::Unfiltered => {
            let mut params = vec![
                ("controller", "DiscussionPost".to_string()),
                ("method", "getPosts".to_string()),
            ];
            params.extend(base_params);
            let body = client.call_nirvana(&params).await?;
            Ok(PostsPayload {
                endpoint: PostsEndpoint::Nirvana,
                body,
            })
        }
    }
}
