use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use serde_json::Value;
use threadview_core::thread::{count_comments, max_depth};
use threadview_core::{Comment, MarkupDecoder, Post, ThreadParser};

use super::{format_time, read_json_input, truncate_text, StubMode};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReadOptions {
    /// Saved thread listing (the `<permalink>.json` response), or "-" for stdin.
    /// Listings nested deeper than 128 JSON levels (about 24 reply levels) are
    /// rejected
    #[clap(env = "THREADVIEW_INPUT")]
    pub input: String,

    /// Deepest reply level to show (0 shows top-level comments only)
    #[arg(short = 'd', long, env = "THREADVIEW_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// How "load more" placeholders are represented
    #[arg(long, value_enum, env = "THREADVIEW_STUBS", default_value = "placeholder")]
    pub stubs: StubMode,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(options: ReadOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Reading thread listing from: {}", options.input);
    }

    let raw = read_json_input(&options.input)?;
    let mut post = read_thread_data(&raw, options.stubs)?;

    let parsed = count_comments(&post.comments);
    debug!(
        "Parsed post {} with {} comments (deepest level: {:?})",
        post.id,
        parsed,
        max_depth(&post.comments)
    );
    if parsed as u64 != post.comment_count {
        warn!(
            "Post {} reports {} comments but the listing holds {}",
            post.id, post.comment_count, parsed
        );
    }

    if let Some(limit) = options.max_depth {
        prune_depth(&mut post.comments, limit);
    }

    if options.json {
        println!("{}", format_post_json(&post)?);
    } else {
        print!("{}", format_post_text(&post, parsed));
    }

    Ok(())
}

/// Parse a raw two-part listing into a [`Post`]
pub fn read_thread_data(raw: &Value, stubs: StubMode) -> Result<Post> {
    let post = ThreadParser::new(MarkupDecoder)
        .with_stub_policy(stubs.into())
        .parse_post(raw)
        .map_err(Error::from)?;
    Ok(post)
}

/// Drop replies nested below `limit`
fn prune_depth(comments: &mut [Comment], limit: usize) {
    let mut pending: Vec<&mut Comment> = comments.iter_mut().collect();
    while let Some(comment) = pending.pop() {
        if comment.depth >= limit {
            comment.replies.clear();
        } else {
            pending.extend(comment.replies.iter_mut());
        }
    }
}

fn format_post_json(post: &Post) -> Result<String> {
    serde_json::to_string_pretty(post).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Build formatted text output for a post and its comment tree
fn format_post_text(post: &Post, parsed: usize) -> String {
    let mut result = String::new();

    // Post header
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}: {}\n",
        "POST".bright_cyan().bold(),
        post.title.white().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    result.push_str(&format!("{}: {}\n", "URL".green(), post.url.cyan().underline()));
    result.push_str(&format!("{}: {}\n", "Author".green(), post.author.bright_white()));
    result.push_str(&format!(
        "{}: {}\n",
        "Score".green(),
        post.score.to_string().bright_yellow()
    ));
    result.push_str(&format!(
        "{}: {}\n",
        "Time".green(),
        format_time(Some(post.created)).bright_black()
    ));
    result.push_str(&format!(
        "{}: {} ({} {})\n",
        "Comments".green(),
        post.comment_count.to_string().bright_magenta(),
        parsed.to_string().bright_magenta(),
        "in listing".bright_black()
    ));
    result.push_str(&format!("{}: {}\n", "ID".green(), post.id.bright_white()));

    // Comments section
    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_magenta()));
    result.push_str(&format!("{}\n", "COMMENTS".bright_magenta().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_magenta()));

    if post.comments.is_empty() {
        result.push_str(&format!("\n{}\n", "No comments yet.".yellow()));
        return result;
    }

    let mut pending: Vec<&Comment> = post.comments.iter().rev().collect();
    while let Some(comment) = pending.pop() {
        result.push_str(&format_comment(comment));
        pending.extend(comment.replies.iter().rev());
    }
    result.push('\n');

    result
}

fn format_comment(comment: &Comment) -> String {
    let indent = "  ".repeat(comment.depth);
    let mut result = String::new();

    result.push_str(&format!(
        "\n{}{} {} {} ({}: {})\n",
        indent,
        format!("[{}]", comment.depth).yellow().bold(),
        "by".bright_black(),
        comment
            .author
            .as_deref()
            .unwrap_or("(unknown)")
            .bright_white(),
        "ID".bright_black(),
        comment.id.bright_white()
    ));
    result.push_str(&format!(
        "{}{}: {}  {}: {}\n",
        indent,
        "Score".green(),
        comment
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
            .bright_yellow(),
        "Time".green(),
        format_time(comment.created).bright_black()
    ));

    if !comment.awards.is_empty() {
        let awards: Vec<String> = comment
            .awards
            .iter()
            .map(|award| {
                format!(
                    "{} x{}",
                    award.name.as_deref().unwrap_or("award"),
                    award.count.unwrap_or(1)
                )
            })
            .collect();
        result.push_str(&format!(
            "{}{}: {}\n",
            indent,
            "Awards".green(),
            awards.join(", ").bright_magenta()
        ));
    }

    if comment.content.is_empty() {
        result.push_str(&format!("{}{}\n", indent, "(no content)".bright_black()));
    } else {
        for line in truncate_text(&comment.content, 500).lines() {
            result.push_str(&format!("{}{}\n", indent, line.white()));
        }
    }

    result
}
