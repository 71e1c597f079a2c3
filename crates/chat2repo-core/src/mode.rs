//! Query modes and the selector that switches between them.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which backend question-answering flavor the composer targets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatMode {
    /// General technical questions, optionally scoped to a language.
    #[default]
    Tech,
    /// Questions about one repository.
    Repo,
}

impl ChatMode {
    /// Parses a mode name, rejecting anything outside the closed set.
    pub fn parse(name: &str) -> Result<Self> {
        name.trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ChatError::UnknownMode(name.to_string()))
    }

    pub fn toggled(self) -> Self {
        match self {
            ChatMode::Tech => ChatMode::Repo,
            ChatMode::Repo => ChatMode::Tech,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChatMode::Tech => "Tech Q&A",
            ChatMode::Repo => "Repo Q&A",
        }
    }
}

/// The mode-specific configuration panel currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPanel {
    /// Owner / name / ref fields.
    Repository,
    /// Language choice.
    Language,
}

/// Languages offered by the language selector. The first entry means "any".
pub const LANGUAGES: &[&str] = &[
    "", "Python", "JavaScript", "TypeScript", "Java", "Go", "Rust", "C++", "C",
];

/// A cyclic choice over [`LANGUAGES`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LanguageChoice {
    index: usize,
}

impl LanguageChoice {
    /// Selects `name` case-insensitively; unknown names select "any".
    pub fn named(name: &str) -> Self {
        let index = LANGUAGES
            .iter()
            .position(|l| !l.is_empty() && l.eq_ignore_ascii_case(name.trim()))
            .unwrap_or(0);
        Self { index }
    }

    /// The selected language, `None` for "any".
    pub fn value(&self) -> Option<&'static str> {
        match LANGUAGES[self.index] {
            "" => None,
            language => Some(language),
        }
    }

    pub fn label(&self) -> &'static str {
        self.value().unwrap_or("Any language")
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % LANGUAGES.len();
    }

    pub fn previous(&mut self) {
        self.index = (self.index + LANGUAGES.len() - 1) % LANGUAGES.len();
    }
}

/// Repository coordinates typed into the repo panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
    /// Branch, tag or commit. Blank means the backend default.
    pub git_ref: String,
}

impl RepoTarget {
    /// Trimmed owner and name, or a validation error if either is blank.
    pub fn require(&self) -> Result<(String, String)> {
        let owner = self.owner.trim();
        let name = self.name.trim();
        if owner.is_empty() || name.is_empty() {
            return Err(ChatError::validation(
                "Please fill in both the repository owner and the repository name",
            ));
        }
        Ok((owner.to_string(), name.to_string()))
    }

    /// Trimmed ref, `None` when blank.
    pub fn git_ref(&self) -> Option<String> {
        let trimmed = self.git_ref.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Active mode plus the configuration of both panels.
///
/// Both panels keep their values while hidden, so switching back and forth
/// does not lose what the user typed.
#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    mode: ChatMode,
    pub repo: RepoTarget,
    pub language: LanguageChoice,
}

impl ModeSelector {
    pub fn new(mode: ChatMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn switch_mode(&mut self, mode: ChatMode) {
        self.mode = mode;
    }

    /// Switches by name; unknown names leave the selector untouched.
    pub fn switch_mode_named(&mut self, name: &str) -> Result<ChatMode> {
        let mode = ChatMode::parse(name)?;
        self.switch_mode(mode);
        Ok(mode)
    }

    pub fn visible_panel(&self) -> ConfigPanel {
        match self.mode {
            ChatMode::Repo => ConfigPanel::Repository,
            ChatMode::Tech => ConfigPanel::Language,
        }
    }

    /// Whether the mode button for `mode` is styled active.
    pub fn is_active(&self, mode: ChatMode) -> bool {
        self.mode == mode
    }
}
