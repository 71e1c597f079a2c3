//! Tracing setup.
//!
//! The TUI owns the terminal, so it logs to a daily rolling file under
//! `~/.config/chat2repo/logs`. One-shot commands log to stderr.

use chat2repo_interaction::config::log_dir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Stderr,
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(target: LogTarget, verbose: bool) -> Option<WorkerGuard> {
    let filter = env_filter(verbose);
    match (target, log_dir()) {
        (LogTarget::File, Some(dir)) => {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("WARN: could not create log directory {}: {}", dir.display(), e);
                return None;
            }
            let appender = tracing_appender::rolling::daily(dir, "chat2repo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .init();
            Some(guard)
        }
        // No home directory: stay silent rather than draw over the TUI.
        (LogTarget::File, None) => None,
        (LogTarget::Stderr, _) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}
