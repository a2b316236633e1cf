use std::{collections::HashMap, sync::Arc};

use crate::{dto::StopDto, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use perron::board::SearchOutcome;
use tracing::error;

pub async fn search(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    if let Some(query) = params.get("q") {
        let count: usize = match params.get("count") {
            Some(value) => match value.parse() {
                Ok(value) => value,
                Err(_) => return Err(StatusCode::BAD_REQUEST),
            },
            None => usize::MAX,
        };
        match state.board.search(query).await {
            SearchOutcome::Cleared => Ok(Json(Vec::<StopDto>::new()).into_response()),
            SearchOutcome::Results(groups) => {
                let result: Vec<_> = groups.iter().take(count).map(StopDto::from).collect();
                Ok(Json(result).into_response())
            }
            SearchOutcome::Superseded => Ok(StatusCode::NO_CONTENT.into_response()),
            SearchOutcome::Failed(err) => {
                error!("Stop search failed: {err}");
                Err(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}
