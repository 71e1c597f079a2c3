mod app;
mod commands;
mod handlers;
mod logging;
mod render;
mod ui;

use anyhow::{Context, Result};
use app::{App, AppEvent};
use chat2repo_application::ChatWidget;
use chat2repo_interaction::{ChatBackend, ClientConfig, HttpChatBackend};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use handlers::handle_key_event;
use logging::LogTarget;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use ui::ui;

const TICK: Duration = Duration::from_millis(120);

#[derive(Parser)]
#[command(name = "chat2repo")]
#[command(about = "Chat with Gitee repositories and look up technical solutions", long_about = None)]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides config and CHAT2REPO_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (overrides config and CHAT2REPO_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to an alternative config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat interface (default)
    Ui,
    /// Ask a technical question
    Tech {
        question: String,
        /// Preferred programming language
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Ask a question about a repository
    Repo {
        owner: String,
        name: String,
        question: String,
        /// Branch, tag or commit
        #[arg(long = "ref")]
        git_ref: Option<String>,
    },
    /// Print the transcript of a stored session
    Session { session_id: String },
    /// List stored sessions
    Sessions,
    /// Delete a stored session
    Delete { session_id: String },
    /// Check that the backend is reachable
    Health,
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load_with(cli.config.as_deref())?;
    config.apply_overrides(cli.url.clone(), cli.timeout.map(|t| t.to_string()))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Ui);

    let target = match &command {
        Commands::Ui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _log_guard = logging::init(target, cli.verbose);

    let config = load_config(&cli).context("Failed to load configuration")?;
    tracing::debug!("[Config] Using backend {}", config.base_url);
    let http = Arc::new(HttpChatBackend::from_config(&config)?);
    let backend: Arc<dyn ChatBackend> = http.clone();

    match command {
        Commands::Ui => run_ui(ChatWidget::from_config(backend, &config), config.base_url).await?,
        Commands::Tech { question, language } => {
            let widget = ChatWidget::from_config(backend, &config);
            commands::ask::tech(widget, &question, language.as_deref()).await?
        }
        Commands::Repo {
            owner,
            name,
            question,
            git_ref,
        } => {
            let widget = ChatWidget::from_config(backend, &config);
            commands::ask::repo(widget, &owner, &name, git_ref.as_deref(), &question).await?
        }
        Commands::Session { session_id } => {
            commands::sessions::show(http.as_ref(), &session_id).await?
        }
        Commands::Sessions => commands::sessions::list(http.as_ref()).await?,
        Commands::Delete { session_id } => {
            commands::sessions::delete(http.as_ref(), &session_id).await?
        }
        Commands::Health => commands::health::check(http.as_ref(), http.base_url().as_str()).await?,
    }

    Ok(())
}

async fn run_ui(widget: ChatWidget, base_url: String) -> Result<()> {
    let (mut app, mut events_rx) = App::new(widget, base_url);
    app.refresh_sessions();

    // Setup terminal for TUI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut events_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Terminal interface failed")
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events_rx: &mut mpsc::Receiver<AppEvent>,
) -> io::Result<()> {
    let mut ticker = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| ui(f, app))?;

        let mut handled_event = false;

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                handled_event = true;
                if key.kind == KeyEventKind::Press {
                    handle_key_event(app, key);
                }
            }
        }

        while let Ok(event) = events_rx.try_recv() {
            handled_event = true;
            app.handle_event(event);
        }

        if !handled_event {
            tokio::select! {
                Some(event) = events_rx.recv() => app.handle_event(event),
                _ = ticker.tick() => app.on_tick(),
                _ = tokio::time::sleep(Duration::from_millis(30)) => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
