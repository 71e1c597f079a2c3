//! Wire types of the chat2repo HTTP API.

use chat2repo_core::ToolCall;
use chat2repo_core::session::SessionSummary;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat/tech`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechChatRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body of `POST /api/chat/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoChatRequest {
    pub repo_owner: String,
    pub repo_name: String,
    pub question: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A question ready to be sent, shaped for the endpoint of its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionRequest {
    Tech(TechChatRequest),
    Repo(RepoChatRequest),
}

impl QuestionRequest {
    pub fn question(&self) -> &str {
        match self {
            QuestionRequest::Tech(req) => &req.question,
            QuestionRequest::Repo(req) => &req.question,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            QuestionRequest::Tech(_) => "/api/chat/tech",
            QuestionRequest::Repo(_) => "/api/chat/repo",
        }
    }
}

/// Response of both chat endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallRecord>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatResponse {
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls
            .iter()
            .flatten()
            .map(ToolCallRecord::to_tool_call)
            .collect()
    }
}

/// Tool-call record as sent by the backend.
///
/// The agent log uses `{function, arguments}` while older payloads use
/// `{tool, args}`; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    #[serde(alias = "function", default)]
    pub tool: Value,
    #[serde(alias = "arguments", default)]
    pub args: Value,
}

impl ToolCallRecord {
    pub fn to_tool_call(&self) -> ToolCall {
        let tool = match &self.tool {
            Value::Object(map) => map.get("name").map(value_text).unwrap_or_default(),
            other => value_text(other),
        };
        ToolCall::new(tool, value_text(&self.args))
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Response of `GET /api/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Response of `DELETE /api/sessions/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body of a non-success response.
///
/// `detail` is a string for handled errors but a list of objects for request
/// validation failures, so it is kept as raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}

/// Extracts the user-facing detail string from an error body, if any.
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_are_omitted() {
        let req = TechChatRequest {
            question: "How do lifetimes work?".into(),
            language: None,
            session_id: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"question": "How do lifetimes work?"})
        );
    }

    #[test]
    fn repo_request_uses_ref_key() {
        let req = RepoChatRequest {
            repo_owner: "openharmony".into(),
            repo_name: "docs".into(),
            question: "Where is the build guide?".into(),
            git_ref: Some("master".into()),
            session_id: Some("s-1".into()),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "repo_owner": "openharmony",
                "repo_name": "docs",
                "question": "Where is the build guide?",
                "ref": "master",
                "session_id": "s-1"
            })
        );
    }

    #[test]
    fn tool_calls_accept_both_spellings() {
        let response: ChatResponse = serde_json::from_value(json!({
            "answer": "done",
            "session_id": "s-9",
            "tool_calls": [
                {"function": "get_file_content", "arguments": {"path": "README.md"}},
                {"tool": "search_repositories", "args": "tokio"},
                {"function": {"name": "list_files", "arguments": "{}"}}
            ]
        }))
        .unwrap();

        let calls = response.tool_calls();
        assert_eq!(
            calls,
            vec![
                ToolCall::new("get_file_content", r#"{"path":"README.md"}"#),
                ToolCall::new("search_repositories", "tokio"),
                ToolCall::new("list_files", ""),
            ]
        );
    }

    #[test]
    fn missing_tool_calls_and_session_are_tolerated() {
        let response: ChatResponse = serde_json::from_str(r#"{"answer": "hi"}"#).unwrap();
        assert!(response.tool_calls().is_empty());
        assert_eq!(response.session_id, None);
    }

    #[test]
    fn error_detail_only_uses_strings() {
        assert_eq!(
            error_detail(r#"{"detail": "Session not found"}"#).as_deref(),
            Some("Session not found")
        );
        assert_eq!(
            error_detail(r#"{"detail": [{"loc": ["body", "question"], "msg": "field required"}]}"#),
            None
        );
        assert_eq!(error_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(error_detail("{}"), None);
    }
}
