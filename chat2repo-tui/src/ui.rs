use crate::app::{App, Focus};
use crate::render::{max_scroll, message_lines};
use chat2repo_core::ChatMode;
use chat2repo_core::mode::ConfigPanel;
use chat2repo_core::time::format_relative_time;
use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

const SIDEBAR_WIDTH: u16 = 32;

pub fn ui(f: &mut Frame, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(f.size());

    render_sidebar(f, app, columns[0]);

    let composer_width = columns[1].width.saturating_sub(2);
    let composer_height = app.widget.composer().rows(composer_width) + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // Mode tabs
            Constraint::Length(3),               // Mode config
            Constraint::Min(3),                  // Conversation
            Constraint::Length(composer_height), // Composer
            Constraint::Length(1),               // Status bar
        ])
        .split(columns[1]);

    render_mode_tabs(f, app, rows[0]);
    render_config_panel(f, app, rows[1]);
    render_conversation(f, app, rows[2]);
    render_composer(f, app, rows[3]);
    render_status_bar(f, app, rows[4]);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let sidebar = app.widget.sidebar();
    let focused = app.focus == Focus::Sidebar;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(format!("Sessions ({})", sidebar.sessions().len()));

    if sidebar.is_empty() {
        let empty = Paragraph::new("No conversations yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = sidebar
        .sessions()
        .iter()
        .map(|session| {
            let active = sidebar.is_active(&session.session_id);
            let title_style = if active {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if active { "● " } else { "  " };
            let when = session
                .updated_at
                .map(|ts| format_relative_time(ts, now))
                .unwrap_or_default();
            ListItem::new(vec![
                Line::from(Span::styled(format!("{marker}{}", session.title()), title_style)),
                Line::from(Span::styled(
                    format!("  {when}"),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if focused {
        state.select(Some(sidebar.cursor()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_mode_tabs(f: &mut Frame, app: &App, area: Rect) {
    let selected = match app.widget.mode().mode() {
        ChatMode::Tech => 0,
        ChatMode::Repo => 1,
    };
    let tabs = Tabs::new(vec![ChatMode::Tech.title(), ChatMode::Repo.title()])
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(false))
                .title("Mode (Ctrl+T)"),
        );
    f.render_widget(tabs, area);
}

fn field_spans(label: &str, value: &str, hint: &str, focused: bool) -> Vec<Span<'static>> {
    let value_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let shown = if value.is_empty() && !focused {
        Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(format!("{value} "), value_style)
    };
    vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        shown,
        Span::raw("   "),
    ]
}

fn render_config_panel(f: &mut Frame, app: &App, area: Rect) {
    let mode = app.widget.mode();
    let line = match mode.visible_panel() {
        ConfigPanel::Repository => {
            let repo = &mode.repo;
            let mut spans = field_spans("Owner", &repo.owner, "openharmony", app.focus == Focus::RepoOwner);
            spans.extend(field_spans("Name", &repo.name, "docs", app.focus == Focus::RepoName));
            spans.extend(field_spans("Ref", &repo.git_ref, "default branch", app.focus == Focus::RepoRef));
            Line::from(spans)
        }
        ConfigPanel::Language => {
            let focused = app.focus == Focus::Language;
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled("Language: ", Style::default().fg(Color::Gray)),
                Span::styled(format!("◀ {} ▶", mode.language.label()), style),
            ])
        }
    };
    let focused = matches!(
        app.focus,
        Focus::Language | Focus::RepoOwner | Focus::RepoName | Focus::RepoRef
    );
    let panel = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(match mode.visible_panel() {
                ConfigPanel::Repository => "Repository",
                ConfigPanel::Language => "Language",
            }),
    );
    f.render_widget(panel, area);
}

fn render_welcome(f: &mut Frame, app: &App, area: Rect, block: Block<'_>) {
    let mode = app.widget.mode().mode();
    let intro = match mode {
        ChatMode::Tech => "Ask about languages, libraries and open-source solutions.",
        ChatMode::Repo => "Ask questions about a Gitee repository. Fill in the owner and name first.",
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Welcome to chat2repo · {}", mode.title()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(intro),
        Line::default(),
        Line::from(Span::styled("Try one of these:", Style::default().fg(Color::Gray))),
    ];
    lines.extend(app.examples().iter().enumerate().map(|(i, example)| {
        Line::from(vec![
            Span::styled(format!("  F{}  ", i + 1), Style::default().fg(Color::Yellow)),
            Span::raw(*example),
        ])
    }));
    let welcome = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    f.render_widget(welcome, area);
}

fn render_conversation(f: &mut Frame, app: &mut App, area: Rect) {
    let conversation = app.widget.conversation();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(false))
        .title(format!("Conversation ({}) - PgUp/PgDn to scroll", conversation.len()));

    if conversation.is_empty() {
        render_welcome(f, app, area, block);
        return;
    }

    let now = Utc::now();
    let lines: Vec<Line> = conversation
        .rendered()
        .iter()
        .flat_map(|message| message_lines(message, app.tick, now))
        .collect();

    let inner = block.inner(area);
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let limit = max_scroll(paragraph.line_count(inner.width), inner.height);
    app.widget.conversation_mut().clamp_scroll(limit);
    let offset = limit - app.widget.conversation().scroll_from_bottom();

    let paragraph = paragraph.scroll((offset, 0)).block(block);
    f.render_widget(paragraph, area);
}

fn render_composer(f: &mut Frame, app: &App, area: Rect) {
    let composer = app.widget.composer();
    let focused = app.focus == Focus::Composer;
    let (title, style) = if composer.is_busy() {
        (
            "Waiting for the answer... (Esc to cancel)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "Ask a question (Enter to send, Alt+Enter for a new line)",
            Style::default().fg(Color::Yellow),
        )
    };

    let width = area.width.saturating_sub(2);
    let rows = usize::from(composer.rows(width));
    let lines = composer.wrapped_lines(width);
    let first_visible = lines.len().saturating_sub(rows);
    let visible = lines[first_visible..].join("\n");

    let input = Paragraph::new(visible).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(title),
    );
    f.render_widget(input, area);

    if focused && !composer.is_busy() {
        let last = lines.last().map(String::as_str).unwrap_or_default();
        let x = u16::try_from(last.chars().count())
            .unwrap_or(u16::MAX)
            .min(width.saturating_sub(1));
        let y = u16::try_from(lines.len() - first_visible - 1).unwrap_or(0);
        f.set_cursor(area.x + 1 + x, area.y + 1 + y);
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let session = app
        .widget
        .session_id()
        .map(|id| format!("session {id}"))
        .unwrap_or_else(|| "new chat".to_string());
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.widget.pipeline().label()),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::styled(format!(" {session} "), Style::default().fg(Color::Green)),
        Span::styled(format!("{} ", app.base_url), Style::default().fg(Color::DarkGray)),
    ];
    match &app.status_message {
        Some(message) => spans.push(Span::styled(
            format!("| {message}"),
            Style::default().fg(Color::Yellow),
        )),
        None => spans.push(Span::styled(
            "| Tab focus · Ctrl+N new · Ctrl+R refresh · Esc cancel · Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        )),
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
