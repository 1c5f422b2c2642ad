use super::super::dto::{ChatRequest, ChatResponse, ErrorResponse};
use super::super::state::ServerState;
use crate::infrastructure::model::CompletionProvider;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    get,
    path = "/",
    tag = "chat",
    responses((status = 200, description = "Service banner"))
)]
pub(crate) async fn root_handler() -> &'static str {
    "Davenport Inventory Agent"
}

/// Start a new conversation: the agent mints the thread id.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply with a fresh conversation id", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 500, description = "Agent failed", body = ErrorResponse)
    )
)]
pub(crate) async fn start_chat_handler<P: CompletionProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("Received request to start a conversation");
    respond(state, payload, None).await
}

/// Continue an existing conversation under its thread id.
#[utoipa::path(
    post,
    path = "/chat/{id}",
    tag = "chat",
    request_body = ChatRequest,
    params(("id" = String, Path, description = "Thread identifier from a previous reply")),
    responses(
        (status = 200, description = "Reply within the existing conversation", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 500, description = "Agent failed", body = ErrorResponse)
    )
)]
pub(crate) async fn continue_chat_handler<P: CompletionProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Path(id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(thread_id = id.as_str(), "Received request to continue a conversation");
    respond(state, payload, Some(id)).await
}

async fn respond<P: CompletionProvider>(
    state: Arc<ServerState<P>>,
    payload: ChatRequest,
    thread_id: Option<String>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.message.trim().is_empty() {
        error!("Rejecting chat request due to empty message");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: "message cannot be empty".to_string(),
            }),
        ));
    }

    match state.agent().respond(&payload.message, thread_id).await {
        Ok(reply) => {
            info!(
                thread_id = reply.thread_id.as_str(),
                "Chat request completed successfully"
            );
            Ok(Json(ChatResponse {
                id: reply.thread_id,
                response: reply.reply,
            }))
        }
        Err(agent_error) => {
            // Full detail stays in the logs; the client only sees a generic
            // failure.
            error!(%agent_error, detail = agent_error.user_message(), "Agent run failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: "Internal Server Error".to_string(),
                }),
            ))
        }
    }
}
