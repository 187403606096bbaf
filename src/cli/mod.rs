use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Directory for temporary upload files. Defaults to the OS temp directory.
    #[arg(long, env = "UPLOAD_DIR")]
    pub upload_dir: Option<String>,

    /// Maximum accepted upload size in megabytes.
    #[arg(long, env = "MAX_UPLOAD_MB", default_value = "25")]
    pub max_upload_mb: usize,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    // --- Chat Provider Args ---
    /// API key for the chat completions provider. Requests fail with 500 when unset.
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Base URL of the provider API; `/chat/completions` is appended.
    #[arg(long, env = "OPENROUTER_API_URL", default_value = "https://openrouter.ai/api/v1")]
    pub chat_base_url: String,

    /// Model name sent with every completion request.
    #[arg(long, env = "CHAT_MODEL", default_value = "mistralai/mistral-7b-instruct")]
    pub chat_model: String,

    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "500")]
    pub chat_max_tokens: u32,

    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.3")]
    pub chat_temperature: f32,

    /// Per-attempt timeout for provider requests, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    /// Extra attempts after a transient provider failure (network error, 429, 5xx).
    #[arg(long, env = "MAX_RETRIES", default_value = "1")]
    pub max_retries: u32,

    /// Delay between provider attempts, in milliseconds.
    #[arg(long, env = "RETRY_BACKOFF_MS", default_value = "500")]
    pub retry_backoff_ms: u64,

    /// Optional JSON file with `tutor` and `document` prompt templates.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- Profile Store Args ---
    /// Supabase project URL for profile lookups (e.g., https://xyz.supabase.co)
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    #[arg(long, env = "PROFILE_TABLE", default_value = "ques_dir")]
    pub profile_table: String,

    #[arg(long, env = "PROFILE_KEY_COLUMN", default_value = "direction_id")]
    pub profile_key_column: String,
}
