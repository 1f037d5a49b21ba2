use crate::prelude::*;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::Read;

pub mod list_threads;
pub mod query;
pub mod read_thread;

#[derive(Debug, clap::Parser)]
#[command(name = "reddit")]
#[command(about = "Reddit (reddit.com) thread operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Render a saved thread listing (`<permalink>.json`) as a comment tree
    #[clap(name = "read")]
    Read(read_thread::ReadOptions),

    /// List threads from a saved search response
    #[clap(name = "threads")]
    Threads(list_threads::ThreadsOptions),

    /// Print the search URL for an episode discussion thread
    #[clap(name = "query")]
    Query(query::QueryOptions),
}

/// How "load more" placeholders appear in the tree
#[derive(Debug, Clone, Copy, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StubMode {
    /// Keep them as empty comments (default)
    Placeholder,
    /// Keep them under replies, leave them out of the top level
    RepliesOnly,
    /// Leave them out
    Exclude,
}

impl From<StubMode> for threadview_core::StubPolicy {
    fn from(mode: StubMode) -> Self {
        match mode {
            StubMode::Placeholder => threadview_core::StubPolicy::Placeholder,
            StubMode::RepliesOnly => threadview_core::StubPolicy::RepliesOnly,
            StubMode::Exclude => threadview_core::StubPolicy::Exclude,
        }
    }
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Read(options) => read_thread::run(options, global),
        Commands::Threads(options) => list_threads::run(options, global),
        Commands::Query(options) => query::run(options, global),
    }
}

// Shared utility functions

/// Read a JSON document from a file, or from stdin when `input` is `-`
pub fn read_json_input(input: &str) -> Result<Value> {
    let body = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| Error::Io {
                path: "<stdin>".to_string(),
                message: e.to_string(),
            })?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| Error::Io {
            path: input.to_string(),
            message: e.to_string(),
        })?
    };

    debug!("Read {} bytes from {}", body.len(), input);

    parse_json(&body).with_context(|| format!("Failed to load {input}"))
}

/// Nesting depth `serde_json` accepts before giving up; about 24 reply levels
/// of a thread listing
pub const JSON_NESTING_LIMIT: usize = 128;

pub fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| {
        let message = if e.to_string().starts_with("recursion limit exceeded") {
            format!("nested deeper than {JSON_NESTING_LIMIT} levels ({e})")
        } else {
            format!("not valid JSON: {e}")
        };
        Error::InvalidInput(message).into()
    })
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "(unknown)".to_string())
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_json_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{\"data\": {{}}}}, {{}}]").unwrap();

        let value = read_json_input(file.path().to_str().unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_read_json_input_missing_file() {
        let err = read_json_input("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read /definitely/not/here.json"));
    }

    #[test]
    fn test_read_json_input_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = read_json_input(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
        assert!(err
            .chain()
            .any(|cause| cause.to_string().contains("Invalid input: not valid JSON")));
    }

    #[test]
    fn test_parse_json_nesting_limit() {
        let depth = JSON_NESTING_LIMIT + 10;
        let body = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        let err = parse_json(&body).unwrap_err();
        assert!(err.to_string().contains("nested deeper than 128 levels"));
    }

    #[test]
    fn test_parse_json_within_nesting_limit() {
        let depth = JSON_NESTING_LIMIT - 1;
        let body = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        assert!(parse_json(&body).unwrap().is_array());
    }

    #[test]
    fn test_stub_mode_replies_only() {
        assert_eq!(
            threadview_core::StubPolicy::from(StubMode::RepliesOnly),
            threadview_core::StubPolicy::RepliesOnly
        );
    }

    #[test]
    fn test_format_time() {
        let time = DateTime::<Utc>::from_timestamp(1609459200, 0);
        assert_eq!(format_time(time), "2021-01-01 00:00:00 UTC");
        assert_eq!(format_time(None), "(unknown)");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("ééééé", 2), "éé...");
    }
}
