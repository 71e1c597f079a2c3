//! The text box questions are typed into.

/// Fewest rows the composer occupies.
pub const MIN_ROWS: u16 = 1;
/// Most rows the composer grows to before scrolling.
pub const MAX_ROWS: u16 = 6;

/// Raw input text plus the busy flag that gates submission.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    text: String,
    busy: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Non-blank text and no response outstanding.
    pub fn can_submit(&self) -> bool {
        !self.busy && !self.text.trim().is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn insert_newline(&mut self) {
        self.text.push('\n');
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Replaces the text, e.g. with an example question.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Takes the trimmed question out of the composer, leaving it empty.
    ///
    /// Returns `None` without touching the text when submission is not allowed.
    pub fn take_question(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }
        let question = self.text.trim().to_string();
        self.text.clear();
        Some(question)
    }

    /// The text broken into display rows of at most `width` characters.
    ///
    /// Each newline starts a row; longer lines wrap onto following rows.
    pub fn wrapped_lines(&self, width: u16) -> Vec<String> {
        let width = usize::from(width.max(1));
        let mut rows = Vec::new();
        for line in self.text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            if chars.is_empty() {
                rows.push(String::new());
                continue;
            }
            rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
        }
        rows
    }

    /// Rows needed to show the current text at `width` columns, clamped to
    /// the auto-grow range.
    pub fn rows(&self, width: u16) -> u16 {
        let rows = u16::try_from(self.wrapped_lines(width).len()).unwrap_or(MAX_ROWS);
        rows.clamp(MIN_ROWS, MAX_ROWS)
    }

    /// Clears text and busy state.
    pub fn reset(&mut self) {
        self.text.clear();
        self.busy = false;
    }
}
