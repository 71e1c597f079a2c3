//! Session list state.

use crate::session::SessionSummary;

/// Prior sessions plus which one is active and which one the cursor is on.
#[derive(Debug, Clone, Default)]
pub struct SessionSidebar {
    sessions: Vec<SessionSummary>,
    active: Option<String>,
    cursor: usize,
}

impl SessionSidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Replaces the list; the active marker follows the session id.
    pub fn replace_sessions(&mut self, sessions: Vec<SessionSummary>) {
        self.sessions = sessions;
        self.cursor = self.cursor.min(self.sessions.len().saturating_sub(1));
    }

    pub fn mark_active(&mut self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        if let Some(index) = self.position(&session_id) {
            self.cursor = index;
        }
        self.active = Some(session_id);
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether the entry is styled active.
    pub fn is_active(&self, session_id: &str) -> bool {
        self.active.as_deref() == Some(session_id)
    }

    /// Number of entries currently styled active (0 or 1).
    pub fn active_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| self.is_active(&s.session_id))
            .count()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.sessions.len() {
            self.cursor += 1;
        }
    }

    /// The session under the cursor.
    pub fn highlighted(&self) -> Option<&SessionSummary> {
        self.sessions.get(self.cursor)
    }

    fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.session_id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            message_count: 2,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn active_marker_survives_refresh() {
        let mut sidebar = SessionSidebar::new();
        sidebar.replace_sessions(vec![summary("a"), summary("b")]);
        sidebar.mark_active("b");
        assert_eq!(sidebar.cursor(), 1);

        sidebar.replace_sessions(vec![summary("c"), summary("a"), summary("b")]);
        assert!(sidebar.is_active("b"));
        assert_eq!(sidebar.active_count(), 1);
    }

    #[test]
    fn clearing_active_unmarks_every_entry() {
        let mut sidebar = SessionSidebar::new();
        sidebar.replace_sessions(vec![summary("a"), summary("b")]);
        sidebar.mark_active("a");

        sidebar.clear_active();
        assert_eq!(sidebar.active(), None);
        assert_eq!(sidebar.active_count(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut sidebar = SessionSidebar::new();
        sidebar.move_down();
        sidebar.move_up();
        assert_eq!(sidebar.cursor(), 0);
        assert!(sidebar.highlighted().is_none());

        sidebar.replace_sessions(vec![summary("a"), summary("b"), summary("c")]);
        sidebar.move_down();
        sidebar.move_down();
        sidebar.move_down();
        assert_eq!(sidebar.highlighted().unwrap().session_id, "c");

        sidebar.replace_sessions(vec![summary("a")]);
        assert_eq!(sidebar.cursor(), 0);
    }
}
