use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig, SystemPrompt };
use crate::error::AgentError;
use crate::extract::{ extract_text, ExtractError };
use crate::history::{ build_request_payload, initialize_history_store, HistoryStore };
use crate::llm::{ CompletionParams, LlmConfig, ProviderError };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::profile::{ create_profile_store, ProfileStore, UserProfile };

use log::{ info, warn, error };
use std::error::Error;
use std::io::Write;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Runs the chat and document-question flows against one provider.
#[derive(Clone)]
pub struct TutorAgent {
    chat_client: Option<Arc<dyn ChatClient>>,
    history_store: Arc<dyn HistoryStore>,
    profile_store: Option<Arc<dyn ProfileStore>>,
    prompt_config: Arc<PromptConfig>,
    params: CompletionParams,
    upload_dir: Option<PathBuf>,
}

impl TutorAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_config = LlmConfig {
            api_key: Some(args.chat_api_key.clone()),
            base_url: Some(args.chat_base_url.clone()),
            timeout: Duration::from_secs(args.request_timeout_secs),
            max_retries: args.max_retries,
            retry_backoff: Duration::from_millis(args.retry_backoff_ms),
        };
        let chat_client = match new_chat_client(&llm_config) {
            Ok(client) => {
                info!(
                    "Chat client configured: Model={}, BaseURL={}",
                    args.chat_model,
                    client.get_base_url()
                );
                Some(client)
            }
            Err(ProviderError::MissingCredential) => {
                warn!("OPENROUTER_API_KEY is not set; chat and upload requests will fail");
                None
            }
            Err(e) => {
                return Err(Box::new(e));
            }
        };

        let params = CompletionParams {
            model: args.chat_model.clone(),
            max_tokens: args.chat_max_tokens,
            temperature: args.chat_temperature,
        };
        let prompt_config = prompt::load_prompts_or_default(args.prompts_path.as_deref())?;

        let mut agent = Self::from_parts(chat_client, initialize_history_store(), prompt_config, params);
        agent.profile_store = create_profile_store(args);
        agent.upload_dir = args.upload_dir.as_ref().map(PathBuf::from);
        Ok(agent)
    }

    pub fn from_parts(
        chat_client: Option<Arc<dyn ChatClient>>,
        history_store: Arc<dyn HistoryStore>,
        prompt_config: Arc<PromptConfig>,
        params: CompletionParams
    ) -> Self {
        Self {
            chat_client,
            history_store,
            profile_store: None,
            prompt_config,
            params,
            upload_dir: None,
        }
    }

    pub fn with_profile_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profile_store = Some(store);
        self
    }

    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history_store
    }

    fn require_client(&self) -> Result<&Arc<dyn ChatClient>, AgentError> {
        self.chat_client.as_ref().ok_or(AgentError::Provider(ProviderError::MissingCredential))
    }

    /// Answers a chat message with the tutor prompt and the session's history.
    pub async fn process_message(
        &self,
        conversation_id: &str,
        message: &str
    ) -> Result<String, AgentError> {
        let client = self.require_client()?;
        self.converse(client.as_ref(), conversation_id, &SystemPrompt::Tutor, message).await
    }

    /// Answers a question about an uploaded file. The staged copy of the file is
    /// removed before this returns, whatever the outcome.
    pub async fn process_document(
        &self,
        conversation_id: &str,
        question: &str,
        file_name: &str,
        bytes: &[u8]
    ) -> Result<String, AgentError> {
        let client = self.require_client()?;

        let upload_dir = self.upload_dir.clone();
        let file_name = file_name.to_string();
        let bytes = bytes.to_vec();
        let extracted = tokio::task
            ::spawn_blocking(move || -> Result<String, AgentError> {
                let staged = stage_upload(upload_dir.as_deref(), &file_name, &bytes)?;
                info!(
                    "Staged upload '{}' ({} bytes) at {}",
                    file_name,
                    bytes.len(),
                    staged.path().display()
                );
                Ok(extract_text(staged.path())?)
            }).await
            .map_err(|e| ExtractError::Task(e.to_string()))??;
        let system_prompt = SystemPrompt::document(&extracted);

        self.converse(client.as_ref(), conversation_id, &system_prompt, question).await
    }

    async fn converse(
        &self,
        client: &dyn ChatClient,
        conversation_id: &str,
        system_prompt: &SystemPrompt,
        message: &str
    ) -> Result<String, AgentError> {
        let system_message = self.prompt_config.system_message(system_prompt);
        self.history_store.append_user_turn(conversation_id, message).await;

        let conversation = self.history_store.get_conversation(conversation_id).await;
        let payload = build_request_payload(system_message, &conversation);

        let reply = client.complete(&payload, &self.params).await.map_err(|e| {
            error!("Provider call for session {} failed: {}", conversation_id, e);
            e
        })?;

        self.history_store.append_assistant_turn(conversation_id, &reply).await;
        Ok(reply)
    }

    pub async fn lookup_profile(&self, id: &str) -> Result<Option<UserProfile>, AgentError> {
        match &self.profile_store {
            Some(store) => Ok(store.fetch_profile(id).await?),
            None => Ok(None),
        }
    }
}

/// Writes an upload to a named temp file that is removed when dropped. Only an
/// alphanumeric extension survives from the client's file name.
fn stage_upload(
    upload_dir: Option<&Path>,
    file_name: &str,
    bytes: &[u8]
) -> Result<NamedTempFile, AgentError> {
    let suffix = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let mut builder = tempfile::Builder::new();
    builder.prefix("upload_").suffix(&suffix);
    let mut file = match upload_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}
