//! Colored terminal output for one-shot commands.

use chat2repo_core::markup::{Fragment, parse};
use chat2repo_core::session::{SessionSummary, SessionTranscript};
use chat2repo_core::time::format_relative_time;
use chat2repo_core::{MessageRole, ToolCall};
use chrono::{DateTime, Utc};
use colored::Colorize;

/// Renders fragments with ANSI styling.
pub fn fragments_to_ansi(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    write_fragments(&mut out, fragments, Ink::default());
    out
}

/// Styling inherited from enclosing bold and link fragments.
#[derive(Debug, Clone, Copy, Default)]
struct Ink {
    bold: bool,
    link: bool,
}

impl Ink {
    fn paint(self, text: &str, code: bool) -> String {
        let mut painted = text.normal();
        if self.link {
            painted = painted.blue().underline();
        }
        if code {
            painted = painted.yellow();
        }
        if self.bold {
            painted = painted.bold();
        }
        painted.to_string()
    }
}

fn write_fragments(out: &mut String, fragments: &[Fragment], ink: Ink) {
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(&ink.paint(text, false)),
            Fragment::Bold(body) => write_fragments(out, body, Ink { bold: true, ..ink }),
            Fragment::Code(code) => out.push_str(&ink.paint(code, true)),
            Fragment::Link { label, url } => {
                write_fragments(out, label, Ink { link: true, ..ink });
                out.push_str(&format!(" <{url}>").bright_black().to_string());
            }
            Fragment::LineBreak => out.push('\n'),
            Fragment::CodeBlock { language, code } => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                if let Some(language) = language {
                    out.push_str(&format!("  [{language}]").bright_black().to_string());
                    out.push('\n');
                }
                for line in code.lines() {
                    out.push_str("    ");
                    out.push_str(&line.green().to_string());
                    out.push('\n');
                }
            }
        }
    }
}

fn role_header(role: MessageRole, timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let label = match role {
        MessageRole::User => role.label().bright_green().bold(),
        MessageRole::Assistant => role.label().bright_cyan().bold(),
    };
    match timestamp {
        Some(ts) => format!("{} {}", label, format!("· {}", format_relative_time(ts, now)).bright_black()),
        None => label.to_string(),
    }
}

pub fn print_message(
    role: MessageRole,
    content: &str,
    tool_calls: &[ToolCall],
    timestamp: Option<DateTime<Utc>>,
) {
    println!("{}", role_header(role, timestamp, Utc::now()));
    println!("{}", fragments_to_ansi(&parse(content)).trim_end());
    for call in tool_calls {
        println!("  {} {}", format!("⚙ {}", call.tool).magenta(), call.args.bright_black());
    }
    println!();
}

pub fn print_transcript(transcript: &SessionTranscript) {
    for message in &transcript.messages {
        print_message(message.role, &message.content, &[], message.timestamp);
    }
}

pub fn session_row(session: &SessionSummary, now: DateTime<Utc>) -> String {
    let when = session
        .updated_at
        .map(|ts| format_relative_time(ts, now))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {}  {}",
        session.session_id.bright_white().bold(),
        session.title(),
        when.bright_black()
    )
}
