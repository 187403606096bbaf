pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod llm;
pub mod models;
pub mod profile;
pub mod server;

use agent::TutorAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

fn set_or_unset(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.trim().is_empty() => "set",
        _ => "unset",
    }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Provider Base URL: {}", args.chat_base_url);
    info!("Provider API Key: {}", set_or_unset(Some(args.chat_api_key.as_str())));
    info!("Chat Model: {}", args.chat_model);
    info!("Max Tokens: {}", args.chat_max_tokens);
    info!("Temperature: {}", args.chat_temperature);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Max Retries: {}", args.max_retries);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("Upload Dir: {}", args.upload_dir.as_deref().unwrap_or("system temp"));
    info!("Max Upload: {} MB", args.max_upload_mb);
    info!("Profile Store URL: {}", args.supabase_url.as_deref().unwrap_or("unset"));
    info!("Profile Store Key: {}", set_or_unset(args.supabase_key.as_deref()));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = Arc::new(TutorAgent::new(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
