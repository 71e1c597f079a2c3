use anyhow::{Context, Result};
use chat2repo_interaction::ChatBackend;
use colored::Colorize;

pub async fn check(backend: &dyn ChatBackend, base_url: &str) -> Result<()> {
    let health = backend
        .health()
        .await
        .with_context(|| format!("Backend at {base_url} is unreachable"))?;
    println!("{} {}", base_url.bright_white(), health.status.green());
    Ok(())
}
