//! Markdown-lite formatting of message content.
//!
//! Content is parsed into [`Fragment`]s by applying, in this order: fenced
//! code blocks, inline code spans, links, bold emphasis and newlines. The two
//! code stages only look at plain text, so code contents are never
//! transformed again. Links and bold match across the fragments produced
//! before them, so bold may wrap a code span and a link label may hold code
//! or bold. Anything that does not match stays literal text.

use regex::{Captures, Regex};
use std::iter::Peekable;
use std::ops::Range;
use std::sync::OnceLock;

/// One presentational piece of a formatted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Bold(Vec<Fragment>),
    Code(String),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Link {
        label: Vec<Fragment>,
        url: String,
    },
    LineBreak,
}

static FENCED_BLOCK: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE: OnceLock<Regex> = OnceLock::new();
static LINK: OnceLock<Regex> = OnceLock::new();
static BOLD: OnceLock<Regex> = OnceLock::new();

fn fenced_block() -> &'static Regex {
    FENCED_BLOCK.get_or_init(|| {
        Regex::new(r"```(\w+)?\n((?s:.*?))```").expect("Failed to compile fenced block regex")
    })
}

fn inline_code() -> &'static Regex {
    INLINE_CODE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("Failed to compile code regex"))
}

fn link() -> &'static Regex {
    LINK.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Failed to compile link regex")
    })
}

fn bold() -> &'static Regex {
    BOLD.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Failed to compile bold regex"))
}

/// Parses message content into fragments.
pub fn parse(content: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    push_text(&mut fragments, content);

    let fragments = expand(fragments, fenced_block(), |caps| Fragment::CodeBlock {
        language: caps.get(1).map(|m| m.as_str().to_string()),
        code: group(caps, 2).trim().to_string(),
    });
    let fragments = expand(fragments, inline_code(), |caps| {
        Fragment::Code(group(caps, 1).to_string())
    });
    let fragments = expand_across(fragments, link(), &|caps: &Captures<'_>, holes: &mut Holes<'_>| {
        Fragment::Link {
            label: holes.restore(span(caps, 1)),
            url: plain_text(&holes.restore(span(caps, 2))),
        }
    });
    let fragments = expand_across(fragments, bold(), &|caps: &Captures<'_>, holes: &mut Holes<'_>| {
        Fragment::Bold(holes.restore(span(caps, 1)))
    });
    split_lines(fragments)
}

/// The literal text of fragments, with all formatting dropped.
pub fn plain_text(fragments: &[Fragment]) -> String {
    let mut text = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(t) | Fragment::Code(t) => text.push_str(t),
            Fragment::CodeBlock { code, .. } => text.push_str(code),
            Fragment::Bold(body) => text.push_str(&plain_text(body)),
            Fragment::Link { label, .. } => text.push_str(&plain_text(label)),
            Fragment::LineBreak => text.push('\n'),
        }
    }
    text
}

/// Renders content as an HTML string.
///
/// All literal text is escaped, so the output is safe to embed as markup.
pub fn render_html(content: &str) -> String {
    to_html(&parse(content))
}

pub fn to_html(fragments: &[Fragment]) -> String {
    let mut html = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => html.push_str(&escape_html(text)),
            Fragment::Bold(body) => {
                html.push_str("<strong>");
                html.push_str(&to_html(body));
                html.push_str("</strong>");
            }
            Fragment::Code(code) => {
                html.push_str("<code>");
                html.push_str(&escape_html(code));
                html.push_str("</code>");
            }
            Fragment::CodeBlock { code, .. } => {
                html.push_str("<pre><code>");
                html.push_str(&escape_html(code));
                html.push_str("</code></pre>");
            }
            Fragment::Link { label, url } => {
                html.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\">{}</a>",
                    escape_html(url),
                    to_html(label)
                ));
            }
            Fragment::LineBreak => html.push_str("<br>"),
        }
    }
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map(|m| m.as_str()).unwrap_or_default()
}

fn span(caps: &Captures<'_>, index: usize) -> Range<usize> {
    caps.get(index).map(|m| m.range()).unwrap_or(0..0)
}

fn push_text(out: &mut Vec<Fragment>, text: &str) {
    if !text.is_empty() {
        out.push(Fragment::Text(text.to_string()));
    }
}

/// Replaces every match of `pattern` inside plain text fragments.
fn expand(
    fragments: Vec<Fragment>,
    pattern: &Regex,
    build: impl Fn(&Captures<'_>) -> Fragment,
) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let Fragment::Text(text) = fragment else {
            out.push(fragment);
            continue;
        };
        let mut last = 0;
        for caps in pattern.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            push_text(&mut out, &text[last..whole.start()]);
            out.push(build(&caps));
            last = whole.end();
        }
        push_text(&mut out, &text[last..]);
    }
    out
}

/// Stands in for an already formatted fragment in the masked text.
const HOLE: char = '\u{1A}';

/// Formatted fragments held out of the masked text, keyed by byte offset.
struct Holes<'t> {
    text: &'t str,
    held: Peekable<std::vec::IntoIter<(usize, Fragment)>>,
}

impl Holes<'_> {
    /// Rebuilds the fragments covering `range`. Ranges must be requested
    /// left to right.
    fn restore(&mut self, range: Range<usize>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let mut last = range.start;
        while let Some(&(offset, _)) = self.held.peek() {
            if offset >= range.end {
                break;
            }
            push_text(&mut out, &self.text[last..offset]);
            if let Some((_, fragment)) = self.held.next() {
                out.push(fragment);
            }
            last = offset + HOLE.len_utf8();
        }
        push_text(&mut out, &self.text[last..range.end]);
        out
    }
}

/// Replaces every match of `pattern`, letting matches span fragments that
/// earlier stages produced. Bodies of bold and link fragments are expanded
/// too.
fn expand_across<F>(fragments: Vec<Fragment>, pattern: &Regex, build: &F) -> Vec<Fragment>
where
    F: Fn(&Captures<'_>, &mut Holes<'_>) -> Fragment,
{
    let mut text = String::new();
    let mut held = Vec::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(t) => text.push_str(&t),
            Fragment::Bold(body) => {
                held.push((text.len(), Fragment::Bold(expand_across(body, pattern, build))));
                text.push(HOLE);
            }
            Fragment::Link { label, url } => {
                let label = expand_across(label, pattern, build);
                held.push((text.len(), Fragment::Link { label, url }));
                text.push(HOLE);
            }
            other => {
                held.push((text.len(), other));
                text.push(HOLE);
            }
        }
    }

    let mut holes = Holes {
        text: &text,
        held: held.into_iter().peekable(),
    };
    let mut out = Vec::new();
    let mut last = 0;
    for caps in pattern.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        out.extend(holes.restore(last..whole.start()));
        out.push(build(&caps, &mut holes));
        last = whole.end();
    }
    out.extend(holes.restore(last..text.len()));
    out
}

/// Turns newlines in text into line breaks, inside bold and link bodies too.
fn split_lines(fragments: Vec<Fragment>) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        out.push(Fragment::LineBreak);
                    }
                    push_text(&mut out, line);
                }
            }
            Fragment::Bold(body) => out.push(Fragment::Bold(split_lines(body))),
            Fragment::Link { label, url } => out.push(Fragment::Link {
                label: split_lines(label),
                url,
            }),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Fragment {
        Fragment::Text(s.to_string())
    }

    #[test]
    fn formats_code_block_inline_code_and_bold() {
        let content = "before ```js\ncode\n``` after `x` **bold**";

        assert_eq!(
            parse(content),
            vec![
                text("before "),
                Fragment::CodeBlock {
                    language: Some("js".into()),
                    code: "code".into(),
                },
                text(" after "),
                Fragment::Code("x".into()),
                text(" "),
                Fragment::Bold(vec![text("bold")]),
            ]
        );
        assert_eq!(
            render_html(content),
            "before <pre><code>code</code></pre> after <code>x</code> <strong>bold</strong>"
        );
    }

    #[test]
    fn code_block_contents_are_escaped_and_not_reformatted() {
        let html = render_html("```\n<b>**not bold**</b>\nline two\n```");
        assert_eq!(
            html,
            "<pre><code>&lt;b&gt;**not bold**&lt;/b&gt;\nline two</code></pre>"
        );
    }

    #[test]
    fn inline_code_is_not_turned_into_links() {
        let fragments = parse("`[a](b)` and [docs](https://docs.rs)");
        assert_eq!(
            fragments,
            vec![
                Fragment::Code("[a](b)".into()),
                text(" and "),
                Fragment::Link {
                    label: vec![text("docs")],
                    url: "https://docs.rs".into(),
                },
            ]
        );
        assert_eq!(
            to_html(&fragments),
            "<code>[a](b)</code> and <a href=\"https://docs.rs\" target=\"_blank\">docs</a>"
        );
    }

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(
            parse("one\ntwo\n\n**three\nfour**"),
            vec![
                text("one"),
                Fragment::LineBreak,
                text("two"),
                Fragment::LineBreak,
                Fragment::LineBreak,
                Fragment::Bold(vec![text("three"), Fragment::LineBreak, text("four")]),
            ]
        );
        assert_eq!(render_html("a\nb"), "a<br>b");
    }

    #[test]
    fn bold_wraps_inline_code() {
        assert_eq!(
            parse("**Use `tokio` here**"),
            vec![Fragment::Bold(vec![
                text("Use "),
                Fragment::Code("tokio".into()),
                text(" here"),
            ])]
        );
        assert_eq!(
            render_html("**Use `tokio` here**"),
            "<strong>Use <code>tokio</code> here</strong>"
        );
    }

    #[test]
    fn link_labels_may_hold_code_and_bold() {
        assert_eq!(
            render_html("[`Cargo.toml`](https://x.io/Cargo.toml)"),
            "<a href=\"https://x.io/Cargo.toml\" target=\"_blank\"><code>Cargo.toml</code></a>"
        );
        assert_eq!(
            render_html("[**docs**](https://x.io)"),
            "<a href=\"https://x.io\" target=\"_blank\"><strong>docs</strong></a>"
        );
    }

    #[test]
    fn bold_wraps_a_link_and_code_stays_untouched() {
        assert_eq!(
            render_html("**see [docs](https://x.io)** and `**raw**`"),
            "<strong>see <a href=\"https://x.io\" target=\"_blank\">docs</a></strong> and <code>**raw**</code>"
        );
    }

    #[test]
    fn plain_text_drops_formatting() {
        assert_eq!(
            plain_text(&parse("**a `b`** [c](d)\ne")),
            "a b c\ne"
        );
    }

    #[test]
    fn unmatched_markup_stays_literal() {
        for input in [
            "```rust\nfn main() {}",
            "an `unterminated span",
            "[label](",
            "**half bold",
            "****",
            "",
        ] {
            let fragments = parse(input);
            let joined: String = fragments
                .iter()
                .map(|f| match f {
                    Fragment::Text(t) => t.clone(),
                    Fragment::LineBreak => "\n".to_string(),
                    other => panic!("unexpected fragment {other:?} for {input:?}"),
                })
                .collect();
            assert_eq!(joined, input);
        }
    }

    #[test]
    fn plain_text_is_escaped_in_html() {
        assert_eq!(
            render_html("<script>alert('x')</script> & more"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"
        );
    }
}
