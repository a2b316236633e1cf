use std::sync::Arc;

use crate::{dto::BoardDto, state::AppState};
use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};

pub async fn departures(State(state): State<Arc<AppState>>) -> Response {
    Json(BoardDto::from(&state.board.snapshot())).into_response()
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    state.board.refresh().await;
    Json(BoardDto::from(&state.board.snapshot())).into_response()
}
