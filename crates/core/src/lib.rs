//! Core library for threadview
//!
//! This crate implements the **Functional Core** of threadview: pure
//! transformations from raw Reddit API JSON into typed discussion threads.
//!
//! # Architecture Overview
//!
//! - **`threadview_core`** (this crate): Pure transformation functions with zero I/O
//! - **`threadview`**: Input reading, rendering and orchestration (the Imperative Shell)
//!
//! All functions in this crate are deterministic and side-effect free. They take
//! in-memory `serde_json::Value`s and return in-memory values, so they can be
//! tested with fixture data and called from any number of threads at once.
//!
//! # Module Organization
//!
//! - [`listing`]: Tolerant accessors over the untyped listing JSON
//! - [`html`]: HTML to plain text decoding for comment bodies
//! - [`thread`]: Post and depth-annotated comment tree construction
//! - [`search`]: Episode discussion search URLs and search result parsing
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use threadview_core::html::MarkupDecoder;
//! use threadview_core::thread::{StubPolicy, ThreadParser};
//!
//! let raw: serde_json::Value = serde_json::from_str(&body)?;
//! let post = ThreadParser::new(MarkupDecoder)
//!     .with_stub_policy(StubPolicy::Exclude)
//!     .parse_post(&raw)?;
//!
//! for comment in &post.comments {
//!     println!("{} {}", comment.depth, comment.content);
//! }
//! ```

pub mod html;
pub mod listing;
pub mod search;
pub mod thread;

pub use html::{HtmlDecoder, MarkupDecoder};
pub use thread::{
    parse_awards, parse_comments, parse_post, Award, Comment, ParseError, Post, StubPolicy,
    ThreadParser,
};
