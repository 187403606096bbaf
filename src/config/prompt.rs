use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

use crate::models::chat::ChatMessage;

/// Maximum number of characters of extracted document text embedded in a prompt.
pub const DOCUMENT_CHAR_BUDGET: usize = 4000;

const DOCUMENT_PLACEHOLDER: &str = "{document}";

const DEFAULT_TUTOR_PROMPT: &str =
    "You are an AI tutor guiding a student.
Your goal is to:
1. Answer the user's question clearly and concisely.
2. Follow up with an engaging, open-ended question to encourage deeper thinking.
3. Remember previous responses and relate your responses with that.
4. Maintain a formal and professional tone, and do not use emojis.";

const DEFAULT_DOCUMENT_PROMPT: &str =
    "You are an AI assistant analyzing a document.
The user uploaded a file and has a question related to it.
Your goal is to:
1. Read and understand the document.
2. Answer the user's question based on the document.
3. Provide additional insights if relevant.

Document Content:
{document}";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt template '{0}' must contain the {{document}} placeholder")]
    MissingPlaceholder(String),
}

/// Which system prompt a request is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPrompt {
    Tutor,
    Document {
        excerpt: String,
    },
}

impl SystemPrompt {
    /// Builds the document variant, cutting the extracted text down to the character budget.
    pub fn document(extracted_text: &str) -> Self {
        SystemPrompt::Document {
            excerpt: truncate_chars(extracted_text, DOCUMENT_CHAR_BUDGET).to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub tutor: String,
    pub document: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            tutor: DEFAULT_TUTOR_PROMPT.to_string(),
            document: DEFAULT_DOCUMENT_PROMPT.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.document.contains(DOCUMENT_PLACEHOLDER) {
            return Err(PromptError::MissingPlaceholder("document".to_string()));
        }
        Ok(())
    }

    /// Renders a fresh system message. It is never written to history.
    pub fn system_message(&self, kind: &SystemPrompt) -> ChatMessage {
        match kind {
            SystemPrompt::Tutor => ChatMessage::system(self.tutor.clone()),
            SystemPrompt::Document { excerpt } =>
                ChatMessage::system(self.document.replace(DOCUMENT_PLACEHOLDER, excerpt)),
        }
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(&path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt templates from {}", path.as_ref().display());
    Ok(Arc::new(config))
}

pub fn load_prompts_or_default(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => load_prompts(p),
        None => {
            info!("No prompts file configured, using built-in templates");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

/// Returns the first `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use std::io::Write;

    #[test]
    fn tutor_prompt_is_a_system_message() {
        let msg = PromptConfig::default().system_message(&SystemPrompt::Tutor);
        assert_eq!(msg.role, Role::System);
        assert!(msg.content.contains("AI tutor"));
        assert!(msg.content.contains("do not use emojis"));
    }

    #[test]
    fn document_prompt_embeds_excerpt() {
        let msg = PromptConfig::default().system_message(&SystemPrompt::document("Chapter 1: Cells"));
        assert_eq!(msg.role, Role::System);
        assert!(msg.content.contains("analyzing a document"));
        assert!(msg.content.ends_with("Document Content:\nChapter 1: Cells"));
        assert!(!msg.content.contains(DOCUMENT_PLACEHOLDER));
    }

    #[test]
    fn long_document_keeps_exactly_first_4000_chars() {
        let text: String = "abcdefghij".repeat(450);
        let SystemPrompt::Document { excerpt } = SystemPrompt::document(&text) else {
            panic!("expected document prompt");
        };
        assert_eq!(excerpt.chars().count(), DOCUMENT_CHAR_BUDGET);
        assert_eq!(excerpt, &text[..DOCUMENT_CHAR_BUDGET]);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(4005);
        let cut = truncate_chars(&text, DOCUMENT_CHAR_BUDGET);
        assert_eq!(cut.chars().count(), 4000);
        assert_eq!(cut.len(), 8000);
        assert_eq!(truncate_chars("short", 4000), "short");
    }

    #[test]
    fn prompts_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tutor":"Be brief.","document":"Doc: {{document}}"}}"#).unwrap();

        let config = load_prompts(file.path()).unwrap();
        assert_eq!(config.system_message(&SystemPrompt::Tutor).content, "Be brief.");
        assert_eq!(
            config.system_message(&SystemPrompt::Document { excerpt: "x".into() }).content,
            "Doc: x"
        );
    }

    #[test]
    fn document_template_without_placeholder_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tutor":"a","document":"no slot"}}"#).unwrap();
        assert!(matches!(load_prompts(file.path()), Err(PromptError::MissingPlaceholder(_))));
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_prompts_or_default(None).unwrap();
        assert_eq!(config.tutor, DEFAULT_TUTOR_PROMPT);
        assert!(load_prompts_or_default(Some("/nonexistent/prompts.json")).is_err());
    }
}
