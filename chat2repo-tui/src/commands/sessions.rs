use super::output::{print_transcript, session_row};
use anyhow::{Context, Result};
use chat2repo_interaction::ChatBackend;
use chrono::Utc;
use colored::Colorize;

pub async fn list(backend: &dyn ChatBackend) -> Result<()> {
    let sessions = backend
        .list_sessions()
        .await
        .context("Failed to load the session list")?;

    if sessions.is_empty() {
        println!("{}", "No sessions yet".bright_black());
        return Ok(());
    }

    let now = Utc::now();
    for session in &sessions {
        println!("{}", session_row(session, now));
    }
    Ok(())
}

pub async fn show(backend: &dyn ChatBackend, session_id: &str) -> Result<()> {
    let transcript = backend
        .get_session(session_id)
        .await
        .with_context(|| format!("Failed to load session {session_id}"))?;

    println!("{}", format!("=== Session {session_id} ===").bright_magenta().bold());
    println!();
    print_transcript(&transcript);
    Ok(())
}

pub async fn delete(backend: &dyn ChatBackend, session_id: &str) -> Result<()> {
    backend
        .delete_session(session_id)
        .await
        .with_context(|| format!("Failed to delete session {session_id}"))?;
    println!("{}", format!("Deleted session {session_id}").green());
    Ok(())
}
