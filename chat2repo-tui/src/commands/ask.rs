use super::output::print_message;
use anyhow::{Result, bail};
use chat2repo_application::{ChatWidget, SubmitReport};
use chat2repo_core::ChatMode;
use chat2repo_core::mode::{LanguageChoice, RepoTarget};
use colored::Colorize;

pub async fn tech(mut widget: ChatWidget, question: &str, language: Option<&str>) -> Result<()> {
    widget.switch_mode(ChatMode::Tech);
    if let Some(language) = language {
        widget.mode_mut().language = LanguageChoice::named(language);
    }
    ask(widget, question).await
}

pub async fn repo(
    mut widget: ChatWidget,
    owner: &str,
    name: &str,
    git_ref: Option<&str>,
    question: &str,
) -> Result<()> {
    widget.switch_mode(ChatMode::Repo);
    widget.mode_mut().repo = RepoTarget {
        owner: owner.to_string(),
        name: name.to_string(),
        git_ref: git_ref.unwrap_or_default().to_string(),
    };
    ask(widget, question).await
}

/// Sends one question and prints the answer.
async fn ask(mut widget: ChatWidget, question: &str) -> Result<()> {
    widget.edit_composer(|composer| composer.set_text(question));
    match widget.submit().await {
        SubmitReport::Answered => {
            if let Some(answer) = widget.conversation().messages().last() {
                print_message(
                    answer.role,
                    &answer.content,
                    &answer.tool_calls,
                    Some(answer.timestamp),
                );
            }
            if let Some(session_id) = widget.session_id() {
                println!("{}", format!("session: {session_id}").bright_black());
            }
            Ok(())
        }
        SubmitReport::Rejected(err) | SubmitReport::Failed(err) => Err(err.into()),
        SubmitReport::Ignored => bail!("Nothing to ask: the question is empty"),
        SubmitReport::Discarded => bail!("The response arrived for an abandoned conversation"),
    }
}
