//! Episode discussion search on r/anime
//!
//! Builds the search request for an episode discussion thread and turns the
//! search response into thread summaries. Fetching and caching belong to the
//! caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::listing;
use crate::thread::{epoch_seconds_to_timestamp, REDDIT_ORIGIN};

pub const SEARCH_ENDPOINT: &str = "https://www.reddit.com/r/anime/search.json";

/// Account that posts the episode discussion threads
pub const DISCUSSION_AUTHOR: &str = "AutoLovepon";

pub const RESULT_LIMIT: usize = 10;

const JSON_ORIGIN: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchSort {
    #[default]
    Relevance,
    New,
    Top,
    Comments,
}

impl SearchSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSort::Relevance => "relevance",
            SearchSort::New => "new",
            SearchSort::Top => "top",
            SearchSort::Comments => "comments",
        }
    }
}

impl fmt::Display for SearchSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(SearchSort::Relevance),
            "new" => Ok(SearchSort::New),
            "top" => Ok(SearchSort::Top),
            "comments" => Ok(SearchSort::Comments),
            other => Err(format!("Unsupported sort: {other}")),
        }
    }
}

/// One search hit, before its comments are fetched
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub score: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub comment_count: Option<u64>,
    pub url: Option<String>,
    /// Raw permalink, for building [`thread_json_url`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

/// Search phrase for an episode discussion thread
///
/// ```rust,ignore
/// build_search_query("Frieren", 5);
/// // Frieren - "Episode 5" discussion author:AutoLovepon
/// ```
pub fn build_search_query(title: &str, episode: u32) -> String {
    format!(
        "{} - \"Episode {episode}\" discussion author:{DISCUSSION_AUTHOR}",
        title.trim()
    )
}

/// Full search URL, restricted to the subreddit and to link posts
pub fn build_search_url(title: &str, episode: u32, sort: SearchSort) -> String {
    let query = build_search_query(title, episode);
    format!(
        "{SEARCH_ENDPOINT}?q={}&restrict_sr=on&sort={}&limit={RESULT_LIMIT}&type=link",
        urlencoding::encode(&query),
        sort.as_str()
    )
}

/// Address of the two-part (post, comments) listing for a permalink
pub fn thread_json_url(permalink: &str) -> String {
    format!("{JSON_ORIGIN}{}.json", permalink.trim_end_matches('/'))
}

/// Transform a search response into thread summaries
///
/// A response without `data.children` yields nothing; children without a `data`
/// object are skipped.
pub fn parse_search_results(response: &Value) -> Vec<ThreadSummary> {
    let Some(children) = listing::children(response) else {
        return Vec::new();
    };

    children
        .iter()
        .filter_map(listing::payload)
        .map(|data| {
            let permalink = listing::str_field(data, "permalink");
            ThreadSummary {
                id: listing::str_field(data, "id"),
                title: listing::str_field(data, "title"),
                author: listing::str_field(data, "author"),
                score: listing::int_field(data, "score"),
                created: listing::float_field(data, "created_utc")
                    .and_then(epoch_seconds_to_timestamp),
                comment_count: listing::uint_field(data, "num_comments"),
                url: permalink.as_ref().map(|p| format!("{REDDIT_ORIGIN}{p}")),
                permalink,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_round_trip_names() {
        for sort in [SearchSort::Relevance, SearchSort::New, SearchSort::Top, SearchSort::Comments] {
            assert_eq!(sort.as_str().parse::<SearchSort>(), Ok(sort));
        }
    }

    #[test]
    fn test_sort_parse_case_insensitive() {
        assert_eq!("TOP".parse::<SearchSort>(), Ok(SearchSort::Top));
    }

    #[test]
    fn test_sort_parse_unknown() {
        let err = "hot".parse::<SearchSort>().unwrap_err();
        assert!(err.contains("Unsupported sort: hot"));
    }

    #[test]
    fn test_sort_default_is_relevance() {
        assert_eq!(SearchSort::default(), SearchSort::Relevance);
    }

    #[test]
    fn test_build_search_query() {
        assert_eq!(
            build_search_query("  Frieren ", 5),
            "Frieren - \"Episode 5\" discussion author:AutoLovepon"
        );
    }

    #[test]
    fn test_build_search_url() {
        let url = build_search_url("Spy x Family", 12, SearchSort::New);

        assert!(url.starts_with("https://www.reddit.com/r/anime/search.json?q="));
        assert!(url.contains("Spy%20x%20Family%20-%20%22Episode%2012%22"));
        assert!(url.contains("author%3AAutoLovepon"));
        assert!(url.contains("&restrict_sr=on"));
        assert!(url.contains("&sort=new"));
        assert!(url.contains("&limit=10"));
        assert!(url.ends_with("&type=link"));
    }

    #[test]
    fn test_thread_json_url() {
        assert_eq!(
            thread_json_url("/r/anime/comments/abc123/frieren_episode_5/"),
            "https://www.reddit.com/r/anime/comments/abc123/frieren_episode_5.json"
        );
        assert_eq!(
            thread_json_url("/r/x/1"),
            "https://www.reddit.com/r/x/1.json"
        );
    }

    #[test]
    fn test_parse_search_results() {
        let response = json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {
                        "id": "abc123",
                        "title": "Frieren - Episode 5 discussion",
                        "author": "AutoLovepon",
                        "score": 2400,
                        "created_utc": 1609459200.0,
                        "num_comments": 310,
                        "permalink": "/r/anime/comments/abc123/frieren/"
                    }},
                    {"kind": "t3"},
                    {"kind": "t3", "data": {"id": "def456"}}
                ]
            }
        });

        let threads = parse_search_results(&response);

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].id.as_deref(), Some("abc123"));
        assert_eq!(threads[0].score, Some(2400));
        assert_eq!(threads[0].comment_count, Some(310));
        assert_eq!(
            threads[0].url.as_deref(),
            Some("https://reddit.com/r/anime/comments/abc123/frieren/")
        );
        assert_eq!(
            threads[0].created.map(|c| c.timestamp()),
            Some(1609459200)
        );

        assert_eq!(threads[1].id.as_deref(), Some("def456"));
        assert_eq!(threads[1].title, None);
        assert_eq!(threads[1].url, None);
    }

    #[test]
    fn test_parse_search_results_missing_children() {
        assert!(parse_search_results(&json!({})).is_empty());
        assert!(parse_search_results(&json!({"data": {"children": null}})).is_empty());
    }
}
