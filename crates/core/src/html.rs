//! HTML to plain text decoding for comment bodies

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

/// Converts an HTML fragment into plain text
///
/// The thread parser takes a decoder explicitly so tests can substitute a
/// trivial one. Any `Fn(&str) -> String` closure is a decoder.
pub trait HtmlDecoder {
    fn decode(&self, html: &str) -> String;
}

impl<F> HtmlDecoder for F
where
    F: Fn(&str) -> String,
{
    fn decode(&self, html: &str) -> String {
        self(html)
    }
}

/// Default decoder: strips markup and resolves entities
///
/// Reddit ships `body_html` entity-escaped (`&lt;p&gt;Hi&lt;/p&gt;`). Fragments
/// with no literal `<` but an escaped one are unescaped before parsing, so both
/// forms decode to the same text.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupDecoder;

impl HtmlDecoder for MarkupDecoder {
    fn decode(&self, html: &str) -> String {
        let markup = if !html.contains('<') && html.contains("&lt;") {
            html_escape::decode_html_entities(html)
        } else {
            html.into()
        };

        let fragment = Html::parse_fragment(&markup);
        let text: String = fragment.root_element().text().collect();

        blank_lines().replace_all(text.trim(), "\n\n").into_owned()
    }
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_paragraph() {
        assert_eq!(MarkupDecoder.decode("<p>Hi</p>"), "Hi");
    }

    #[test]
    fn test_decode_nested_tags() {
        let html = "<p>Hello <strong>world</strong> and <a href=\"/x\">link</a></p>";
        assert_eq!(MarkupDecoder.decode(html), "Hello world and link");
    }

    #[test]
    fn test_decode_entities() {
        let html = "<p>1 &lt; 2 &amp;&amp; 3 &gt; 0 &quot;ok&quot; &#x27;yes&#x27;</p>";
        assert_eq!(MarkupDecoder.decode(html), "1 < 2 && 3 > 0 \"ok\" 'yes'");
    }

    #[test]
    fn test_decode_escaped_reddit_body() {
        let html = "&lt;div class=\"md\"&gt;&lt;p&gt;Tom &amp;amp; Jerry&lt;/p&gt;\n&lt;/div&gt;";
        assert_eq!(MarkupDecoder.decode(html), "Tom & Jerry");
    }

    #[test]
    fn test_decode_keeps_paragraph_breaks() {
        let html = "<div class=\"md\"><p>First</p>\n\n<p>Second</p>\n</div>";
        assert_eq!(MarkupDecoder.decode(html), "First\n\nSecond");
    }

    #[test]
    fn test_decode_collapses_blank_runs() {
        let html = "<p>First</p>\n\n\n\n<p>Second</p>";
        assert_eq!(MarkupDecoder.decode(html), "First\n\nSecond");
    }

    #[test]
    fn test_decode_plain_text_passthrough() {
        assert_eq!(MarkupDecoder.decode("just text"), "just text");
        assert_eq!(MarkupDecoder.decode(""), "");
    }

    #[test]
    fn test_closure_decoder() {
        let upper = |html: &str| html.to_uppercase();
        assert_eq!(upper.decode("<b>x</b>"), "<B>X</B>");
    }
}
