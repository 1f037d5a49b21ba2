use crate::prelude::{eprintln, println, *};
use serde_json::Value;
use threadview_core::search::{parse_search_results, thread_json_url, ThreadSummary};

use super::{format_time, read_json_input, truncate_text};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ThreadsOptions {
    /// Saved search response (the `search.json` body), or "-" for stdin
    #[clap(env = "THREADVIEW_INPUT")]
    pub input: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(options: ThreadsOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Reading search response from: {}", options.input);
    }

    let raw = read_json_input(&options.input)?;
    let threads = list_threads_data(&raw);
    debug!("Search response holds {} threads", threads.len());

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&threads)
                .map_err(|e| eyre!("JSON serialization failed: {}", e))?
        );
    } else if threads.is_empty() {
        println!("No threads found.");
    } else {
        build_table(&threads).printstd();

        if let Some(permalink) = threads.iter().find_map(|t| t.permalink.as_deref()) {
            println!("\nTo read a thread, save its listing and pass it to `threadview reddit read`:");
            println!("  {}", thread_json_url(permalink));
        }
    }

    Ok(())
}

/// Parse a raw search response into thread summaries
pub fn list_threads_data(raw: &Value) -> Vec<ThreadSummary> {
    parse_search_results(raw)
}

fn build_table(threads: &[ThreadSummary]) -> prettytable::Table {
    let mut table = new_table();
    table.set_titles(prettytable::row!["ID", "Score", "Comments", "Created", "Title"]);

    for thread in threads {
        table.add_row(prettytable::row![
            thread.id.as_deref().unwrap_or("-"),
            thread.score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            thread
                .comment_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format_time(thread.created),
            truncate_text(thread.title.as_deref().unwrap_or("(No title)"), 60)
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_response() -> Value {
        json!({"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {
                "id": "abc123",
                "title": "Frieren - Episode 5 discussion",
                "author": "AutoLovepon",
                "score": 2400,
                "created_utc": 1609459200.0,
                "num_comments": 310,
                "permalink": "/r/anime/comments/abc123/frieren/"
            }},
            {"kind": "t3", "data": {"id": "def456"}}
        ]}})
    }

    #[test]
    fn test_list_threads_data() {
        let threads = list_threads_data(&create_test_response());

        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].title.as_deref(), Some("Frieren - Episode 5 discussion"));
        assert_eq!(threads[1].score, None);
    }

    #[test]
    fn test_build_table_rows() {
        let threads = list_threads_data(&create_test_response());
        let table = build_table(&threads);

        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("abc123"));
        assert!(rendered.contains("2021-01-01 00:00:00 UTC"));
        assert!(rendered.contains("(No title)"));
    }

    #[test]
    fn test_summary_json_shape() {
        let threads = list_threads_data(&create_test_response());
        let json = serde_json::to_string_pretty(&threads).unwrap();

        assert!(json.contains("\"commentCount\": 310"));
        assert!(json.contains("\"url\": \"https://reddit.com/r/anime/comments/abc123/frieren/\""));
    }
}
