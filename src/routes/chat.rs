use axum::{Json, extract::State};
use tracing::{error, info};

use crate::{
    error::AppError,
    message::{ChatRequest, ChatResponse},
    services::session_manager::Role,
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Mensaje vacío".to_string()));
    }

    let session_id = payload.session_id.as_str();
    state.sessions.record(session_id, Role::User, message).await;
    let history = state.sessions.history(session_id).await;
    let case = state.sessions.case(session_id).await;

    let (reply, next_case) = state
        .responder
        .respond(message, &history, case)
        .await
        .map_err(|e| {
            error!(error = %e, session_id, "responder failed");
            AppError::Internal("Error interno en el agente".to_string())
        })?;

    let step = next_case.step;
    state.sessions.set_case(session_id, next_case).await;
    state.sessions.record(session_id, Role::Assistant, &reply).await;
    info!(session_id, turns = history.len() + 1, ?step, "chat reply sent");

    Ok(Json(ChatResponse { reply }))
}
