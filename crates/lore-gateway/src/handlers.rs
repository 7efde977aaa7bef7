use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use lore_llm::LlmProvider;
use lore_rag::RagError;

use crate::server::AppState;

#[derive(serde::Deserialize)]
pub(crate) struct AskPayload {
    pub query: String,
    pub k: Option<usize>,
}

#[derive(serde::Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<String>,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn ask_handler<P: LlmProvider>(
    State(state): State<AppState<P>>,
    Json(payload): Json<AskPayload>,
) -> impl IntoResponse {
    let k = payload.k.unwrap_or(state.top_k);

    match state.chain.answer(&payload.query, k).await {
        Ok(result) => Json(AskResponse {
            answer: result.answer,
            sources: result.sources.iter().map(ToString::to_string).collect(),
        })
        .into_response(),
        Err(e @ RagError::IndexNotFound(_)) => {
            tracing::warn!("ask rejected: {e}");
            (StatusCode::CONFLICT, e.to_string()).into_response()
        }
        Err(RagError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg).into_response(),
        Err(e @ (RagError::Embedding(_) | RagError::Llm(_))) => {
            tracing::error!("provider failure: {e}");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("answer failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub(crate) async fn health_handler<P: LlmProvider>(
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
