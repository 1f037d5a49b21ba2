//! Boundary accessors for raw Reddit listing JSON
//!
//! Every "this field might be missing" question about the untyped API payload is
//! answered here, so the transformations in [`crate::thread`] and
//! [`crate::search`] only deal with `Option`s.

use serde_json::Value;

/// Kind of a child node inside a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A real comment (`t1` on the wire)
    Comment,
    /// A "load more" placeholder (`more` on the wire)
    MoreStub,
    /// Anything else, including a missing or non-string tag
    Unrecognized,
}

impl NodeKind {
    /// Map a kind tag to its variant
    ///
    /// Accepts both the wire tags (`t1`, `more`) and their long forms
    /// (`comment`, `more-stub`).
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "t1" | "comment" => NodeKind::Comment,
            "more" | "more-stub" => NodeKind::MoreStub,
            _ => NodeKind::Unrecognized,
        }
    }

    /// Read the `kind` field of a child node
    pub fn of(node: &Value) -> Self {
        node.get("kind")
            .and_then(Value::as_str)
            .map(NodeKind::from_tag)
            .unwrap_or(NodeKind::Unrecognized)
    }
}

/// The `data` payload of a node, if it is an object
pub fn payload(node: &Value) -> Option<&Value> {
    node.get("data").filter(|data| data.is_object())
}

/// The `data.children` array of a listing
pub fn children(listing: &Value) -> Option<&[Value]> {
    listing
        .pointer("/data/children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// The reply children nested under a comment payload (`replies.data.children`)
///
/// Reddit sends `replies: ""` for leaf comments; that reads as no replies.
pub fn reply_children(payload: &Value) -> &[Value] {
    payload.get("replies").and_then(children).unwrap_or(&[])
}

pub fn str_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Signed integer field; integral floats (`5.0`) are accepted
///
/// Floats outside the `i64` range read as absent rather than saturating.
pub fn int_field(payload: &Value, key: &str) -> Option<i64> {
    let value = payload.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub fn uint_field(payload: &Value, key: &str) -> Option<u64> {
    int_field(payload, key).and_then(|n| u64::try_from(n).ok())
}

/// Numeric field as `f64` (Reddit encodes `created_utc` as a float)
pub fn float_field(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key).and_then(Value::as_f64)
}
