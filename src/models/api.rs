use serde::{ Serialize, Deserialize };

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Deserialize, Debug)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Falls back to the shared default session when the caller sends none or a blank id.
pub fn resolve_session_id(session_id: Option<&str>) -> &str {
    match session_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => DEFAULT_SESSION_ID,
    }
}
