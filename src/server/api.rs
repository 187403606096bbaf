use crate::agent::TutorAgent;
use crate::error::AgentError;
use crate::models::api::{ resolve_session_id, ChatReply, ChatRequest };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ rejection::JsonRejection, DefaultBodyLimit, Multipart, State },
};
use serde_json::{ json, Value as JsonValue };
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error, debug };
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<TutorAgent>,
}

pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

pub fn router(agent: Arc<TutorAgent>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/chat/", post(chat_handler))
        .route("/upload/", post(upload_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    addr: &str,
    app: Router,
    tls: Option<TlsPaths>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;

    match tls {
        Some(paths) => {
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &paths.cert_path,
                &paths.key_path
            ).await?;
            info!("HTTPS server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service()).await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
                e
            })?;
            info!("HTTP server listening on: http://{}", addr);
            axum::serve(listener, app.into_make_service()).await?;
        }
    }

    Ok(())
}

async fn health_handler() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatReply>, AgentError> {
    let request_id = Uuid::new_v4();
    let Json(req) = payload.map_err(|e| AgentError::BadRequest(e.body_text()))?;
    let session_id = resolve_session_id(req.session_id.as_deref());
    info!("[{}] chat request for session {}", request_id, session_id);

    let reply = state.agent.process_message(session_id, &req.message).await?;
    debug!("[{}] reply has {} chars", request_id, reply.chars().count());
    Ok(Json(ChatReply { reply }))
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart
) -> Result<Json<ChatReply>, AgentError> {
    let request_id = Uuid::new_v4();
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut question: Option<String> = None;
    let mut session_id: Option<String> = None;

    while
        let Some(field) = multipart
            .next_field().await
            .map_err(|e| AgentError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes().await
                    .map_err(|e| AgentError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "question" | "session_id" => {
                let value = field
                    .text().await
                    .map_err(|e| AgentError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                if name == "question" {
                    question = Some(value);
                } else {
                    session_id = Some(value);
                }
            }
            other => {
                debug!("[{}] ignoring multipart field '{}'", request_id, other);
            }
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| AgentError::BadRequest("Missing 'file' field".into()))?;
    let question = question.ok_or_else(|| AgentError::BadRequest("Missing 'question' field".into()))?;
    let session_id = resolve_session_id(session_id.as_deref());
    info!(
        "[{}] upload request for session {}: '{}' ({} bytes)",
        request_id,
        session_id,
        file_name,
        bytes.len()
    );

    let reply = state.agent.process_document(session_id, &question, &file_name, &bytes).await?;
    Ok(Json(ChatReply { reply }))
}
