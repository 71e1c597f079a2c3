//! Turns rendered messages into ratatui lines.

use chat2repo_core::conversation::{RenderedBody, RenderedMessage};
use chat2repo_core::markup::Fragment;
use chat2repo_core::time::format_relative_time;
use chat2repo_core::{MessageRole, ToolCall};
use chrono::{DateTime, Utc};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const DOT_COUNT: u64 = 3;

pub fn role_style(role: MessageRole) -> Style {
    match role {
        MessageRole::User => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        MessageRole::Assistant => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    }
}

/// All lines for one message: header, body, tool calls and a blank separator.
pub fn message_lines(
    message: &RenderedMessage,
    tick: u64,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(message.role.label().to_string(), role_style(message.role)),
        Span::styled(
            format!(" · {}", format_relative_time(message.timestamp, now)),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    match &message.body {
        RenderedBody::Loading => lines.push(loading_line(tick)),
        RenderedBody::Formatted(fragments) => lines.extend(fragment_lines(fragments)),
    }
    lines.extend(message.tool_calls.iter().map(tool_call_line));
    lines.push(Line::default());
    lines
}

/// Three dots with one lit, advancing with `tick`.
pub fn loading_line(tick: u64) -> Line<'static> {
    let lit = tick % DOT_COUNT;
    let spans = (0..DOT_COUNT)
        .map(|i| {
            if i == lit {
                Span::styled("● ", Style::default().fg(Color::Cyan))
            } else {
                Span::styled("○ ", Style::default().fg(Color::DarkGray))
            }
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

pub fn tool_call_line(call: &ToolCall) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ⚙ ", Style::default().fg(Color::Magenta)),
        Span::styled(
            call.tool.clone(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", call.args), Style::default().fg(Color::DarkGray)),
    ])
}

/// Lays fragments out as lines. Code blocks always occupy whole lines.
pub fn fragment_lines(fragments: &[Fragment]) -> Vec<Line<'static>> {
    let mut layout = LineLayout::default();
    layout.push_all(fragments, Style::default());
    layout.finish()
}

#[derive(Default)]
struct LineLayout {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineLayout {
    /// Pushes fragments, with `style` inherited from enclosing bold or link.
    fn push_all(&mut self, fragments: &[Fragment], style: Style) {
        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => self.current.push(Span::styled(text.clone(), style)),
                Fragment::Bold(body) => self.push_all(body, style.add_modifier(Modifier::BOLD)),
                Fragment::Code(code) => self.current.push(Span::styled(
                    code.clone(),
                    style.fg(Color::Yellow).bg(Color::Black),
                )),
                Fragment::Link { label, url } => {
                    self.push_all(
                        label,
                        style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    );
                    self.current.push(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Fragment::LineBreak => self.break_line(),
                Fragment::CodeBlock { language, code } => {
                    if !self.current.is_empty() {
                        self.break_line();
                    }
                    let border = Style::default().fg(Color::DarkGray);
                    self.lines.push(Line::from(Span::styled(
                        format!("┌─ {}", language.as_deref().unwrap_or("code")),
                        border,
                    )));
                    for code_line in code.trim_end_matches('\n').split('\n') {
                        self.lines.push(Line::from(vec![
                            Span::styled("│ ", border),
                            Span::styled(code_line.to_string(), Style::default().fg(Color::Green)),
                        ]));
                    }
                    self.lines.push(Line::from(Span::styled("└─", border)));
                }
            }
        }
    }

    fn break_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
    }
}

/// Largest scroll offset that still fills the viewport, given the wrapped
/// row count of the content.
pub fn max_scroll(total_rows: usize, viewport_rows: u16) -> u16 {
    u16::try_from(total_rows.saturating_sub(usize::from(viewport_rows))).unwrap_or(u16::MAX)
}
