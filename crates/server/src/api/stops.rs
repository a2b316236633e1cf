use std::{collections::HashMap, sync::Arc};

use crate::{
    dto::{ChangesDto, StopDto},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use perron::board::Action;
use tracing::error;

pub async fn add_stop(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(id) = params.get("id") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    match state.board.add_stop(id).await {
        Ok(Some(group)) => Ok(Json(StopDto::from(&group)).into_response()),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            error!("Failed to resolve stop {id}: {err}");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub async fn remove_stop(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let changes = state.board.dispatch(Action::RemoveStop(id)).await;
    if changes.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(ChangesDto::from(&changes)).into_response())
}
