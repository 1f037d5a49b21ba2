//! Reddit thread transformations
//!
//! Turns the two-part listing returned by `<permalink>.json` (post listing,
//! comments listing) into a [`Post`] owning a depth-annotated [`Comment`] forest.
//!
//! The post payload is strict: a missing field fails the whole parse with
//! [`ParseError`]. Comment nodes are lenient: anything malformed or unrecognized
//! is dropped or defaulted so one corrupt comment never hides the rest of the
//! thread.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::html::{HtmlDecoder, MarkupDecoder};
use crate::listing::{self, NodeKind};

/// Canonical web origin prefixed to permalinks
pub const REDDIT_ORIGIN: &str = "https://reddit.com";

const POST_PATH: &str = "listing[0].data.children[0].data";

/// Fatal parse failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid post structure: expected an array of at least two listings")]
    Structural,

    #[error("missing post data at `{path}`")]
    MissingData { path: String },
}

impl ParseError {
    fn missing(field: &str) -> Self {
        ParseError::MissingData {
            path: if field.is_empty() {
                POST_PATH.to_string()
            } else {
                format!("{POST_PATH}.{field}")
            },
        }
    }
}

/// A post with its comment forest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub score: i64,
    pub created: DateTime<Utc>,
    pub url: String,
    /// As reported by the API; never reconciled with `comments`
    pub comment_count: u64,
    pub comments: Vec<Comment>,
}

/// A comment and the replies nested under it
///
/// Drop, `Clone` and `PartialEq` walk the reply tree over a heap stack, so a
/// thread of any depth can be built, copied, compared and freed. `Debug` and
/// `Serialize` still recurse once per level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub awards: Vec<Award>,
    pub created: Option<DateTime<Utc>>,
    pub depth: usize,
    pub content: String,
    pub replies: Vec<Comment>,
}

impl Comment {
    fn without_replies(&self) -> Self {
        Comment {
            id: self.id.clone(),
            author: self.author.clone(),
            score: self.score,
            awards: self.awards.clone(),
            created: self.created,
            depth: self.depth,
            content: self.content.clone(),
            replies: Vec::new(),
        }
    }

    fn same_fields(&self, other: &Self) -> bool {
        self.id == other.id
            && self.author == other.author
            && self.score == other.score
            && self.awards == other.awards
            && self.created == other.created
            && self.depth == other.depth
            && self.content == other.content
            && self.replies.len() == other.replies.len()
    }
}

impl Drop for Comment {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.replies);
        while let Some(mut comment) = pending.pop() {
            pending.append(&mut comment.replies);
        }
    }
}

impl Clone for Comment {
    fn clone(&self) -> Self {
        let mut root = self.without_replies();
        let mut top = self.replies.iter();
        let mut stack: Vec<(Comment, std::slice::Iter<'_, Comment>)> = Vec::new();

        loop {
            let next = match stack.last_mut() {
                Some((_, pending)) => pending.next(),
                None => top.next(),
            };

            match next {
                Some(reply) => stack.push((reply.without_replies(), reply.replies.iter())),
                None => {
                    let Some((done, _)) = stack.pop() else {
                        break;
                    };
                    match stack.last_mut() {
                        Some((parent, _)) => parent.replies.push(done),
                        None => root.replies.push(done),
                    }
                }
            }
        }

        root
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if !left.same_fields(right) {
                return false;
            }
            pending.extend(left.replies.iter().zip(right.replies.iter()));
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: Option<String>,
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub count: Option<u64>,
}

/// What to do with "load more" placeholder nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StubPolicy {
    /// Keep them as comments with empty content, at every level
    #[default]
    Placeholder,
    /// Keep them as placeholders in replies, drop them from the top level
    RepliesOnly,
    /// Drop them from the tree
    Exclude,
}

/// Convert epoch seconds into a UTC timestamp
///
/// Seconds are scaled to milliseconds first, so fractional seconds survive.
/// Returns `None` for non-finite or out-of-range input.
pub fn epoch_seconds_to_timestamp(seconds: f64) -> Option<DateTime<Utc>> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// Normalize a raw `all_awardings` value
///
/// Non-array input yields no awards. Elements are mapped one to one, in order,
/// without validation: absent or mistyped sub-fields become `None`.
pub fn parse_awards(value: &Value) -> Vec<Award> {
    let Some(awards) = value.as_array() else {
        return Vec::new();
    };

    awards
        .iter()
        .map(|award| Award {
            id: listing::str_field(award, "id"),
            name: listing::str_field(award, "name"),
            icon_url: listing::str_field(award, "icon_url"),
            count: listing::uint_field(award, "count"),
        })
        .collect()
}

/// Count every comment in a forest, replies included
pub fn count_comments(comments: &[Comment]) -> usize {
    let mut total = 0;
    let mut pending: Vec<&Comment> = comments.iter().collect();
    while let Some(comment) = pending.pop() {
        total += 1;
        pending.extend(comment.replies.iter());
    }
    total
}

/// Deepest `depth` found in a forest, `None` when it is empty
pub fn max_depth(comments: &[Comment]) -> Option<usize> {
    let mut deepest = None;
    let mut pending: Vec<&Comment> = comments.iter().collect();
    while let Some(comment) = pending.pop() {
        deepest = deepest.max(Some(comment.depth));
        pending.extend(comment.replies.iter());
    }
    deepest
}

/// Parse a two-part listing with [`MarkupDecoder`] and placeholder stubs
pub fn parse_post(raw: &Value) -> Result<Post, ParseError> {
    ThreadParser::new(MarkupDecoder).parse_post(raw)
}

/// Top-level comment forest with [`MarkupDecoder`] and placeholder stubs
pub fn parse_comments(comments: &Value) -> Vec<Comment> {
    ThreadParser::new(MarkupDecoder).parse_comments(comments)
}

/// Parses thread listings with an injected HTML decoder
#[derive(Debug, Clone, Default)]
pub struct ThreadParser<D> {
    decoder: D,
    stubs: StubPolicy,
}

/// A comment on the walk stack, waiting for its replies to be built
struct Frame<'a> {
    comment: Comment,
    pending: std::slice::Iter<'a, Value>,
}

impl<D: HtmlDecoder> ThreadParser<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            stubs: StubPolicy::default(),
        }
    }

    pub fn with_stub_policy(mut self, stubs: StubPolicy) -> Self {
        self.stubs = stubs;
        self
    }

    pub fn stub_policy(&self) -> StubPolicy {
        self.stubs
    }

    /// Parse the full two-part listing into a [`Post`]
    pub fn parse_post(&self, raw: &Value) -> Result<Post, ParseError> {
        let parts = raw
            .as_array()
            .filter(|parts| parts.len() >= 2)
            .ok_or(ParseError::Structural)?;

        let post = parts[0]
            .pointer("/data/children/0/data")
            .filter(|data| data.is_object())
            .ok_or_else(|| ParseError::missing(""))?;

        let text = |field: &str| {
            listing::str_field(post, field).ok_or_else(|| ParseError::missing(field))
        };

        let id = text("id")?;
        let title = text("title")?;
        let author = text("author")?;
        let permalink = text("permalink")?;
        let score =
            listing::int_field(post, "score").ok_or_else(|| ParseError::missing("score"))?;
        let created = listing::float_field(post, "created_utc")
            .and_then(epoch_seconds_to_timestamp)
            .ok_or_else(|| ParseError::missing("created_utc"))?;
        let comment_count = listing::uint_field(post, "num_comments")
            .ok_or_else(|| ParseError::missing("num_comments"))?;

        Ok(Post {
            id,
            title,
            author,
            score,
            created,
            url: format!("{REDDIT_ORIGIN}{permalink}"),
            comment_count,
            comments: self.parse_comments(&parts[1]),
        })
    }

    /// Build the top-level comment forest of a comments listing
    ///
    /// A listing without `data.children` has no comments yet; that is not an
    /// error.
    pub fn parse_comments(&self, comments: &Value) -> Vec<Comment> {
        let Some(children) = listing::children(comments) else {
            return Vec::new();
        };

        let top_level = children.iter().filter(|node| {
            self.stubs != StubPolicy::RepliesOnly || NodeKind::of(node) != NodeKind::MoreStub
        });
        self.build_forest(top_level, 0)
    }

    /// Parse one node and its replies, `None` when the node is rejected
    pub fn parse_comment_node(&self, node: &Value, depth: usize) -> Option<Comment> {
        self.build_forest(std::iter::once(node), depth).pop()
    }

    /// Depth-first walk over an explicit stack
    ///
    /// Produces the same shape and order as the recursive formulation while
    /// keeping the call stack flat however deep the thread nests.
    fn build_forest<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a Value>,
        base_depth: usize,
    ) -> Vec<Comment> {
        let mut forest = Vec::new();
        let mut roots = nodes.into_iter();
        let mut stack: Vec<Frame<'a>> = Vec::new();

        loop {
            let next = match stack.last_mut() {
                Some(frame) => frame.pending.next(),
                None => roots.next(),
            };

            match next {
                Some(node) => {
                    let depth = base_depth + stack.len();
                    if let Some((comment, replies)) = self.parse_shallow(node, depth) {
                        stack.push(Frame {
                            comment,
                            pending: replies.iter(),
                        });
                    }
                }
                None => {
                    let Some(done) = stack.pop() else {
                        break;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.comment.replies.push(done.comment),
                        None => forest.push(done.comment),
                    }
                }
            }
        }

        forest
    }

    /// Map one node without its replies; hands back the raw reply children
    fn parse_shallow<'a>(&self, node: &'a Value, depth: usize) -> Option<(Comment, &'a [Value])> {
        match (NodeKind::of(node), self.stubs) {
            (NodeKind::Comment, _)
            | (NodeKind::MoreStub, StubPolicy::Placeholder | StubPolicy::RepliesOnly) => {}
            (NodeKind::MoreStub, StubPolicy::Exclude) | (NodeKind::Unrecognized, _) => {
                return None
            }
        }

        let data = listing::payload(node)?;

        let content = listing::str_field(data, "body_html")
            .filter(|body| !body.is_empty())
            .map(|body| self.decoder.decode(&body))
            .unwrap_or_default();

        let comment = Comment {
            id: listing::str_field(data, "id").unwrap_or_default(),
            author: listing::str_field(data, "author"),
            score: listing::int_field(data, "score"),
            awards: data
                .get("all_awardings")
                .map(parse_awards)
                .unwrap_or_default(),
            created: listing::float_field(data, "created_utc")
                .and_then(epoch_seconds_to_timestamp),
            depth,
            content,
            replies: Vec::new(),
        };

        Some((comment, listing::reply_children(data)))
    }
}
