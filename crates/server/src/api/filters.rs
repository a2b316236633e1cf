use std::{collections::HashMap, sync::Arc};

use crate::{
    api::flag,
    dto::{ChangesDto, FiltersDto},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use perron::{board::Action, projection::TransportMode};

pub async fn filters(State(state): State<Arc<AppState>>) -> Response {
    Json(FiltersDto::from(&state.board.snapshot())).into_response()
}

pub async fn select_platform(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(name) = params.get("name") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let action = Action::SelectPlatform {
        name: name.clone(),
        selected: flag(&params, "selected")?,
    };
    let changes = state.board.dispatch(action).await;
    Ok(Json(ChangesDto::from(&changes)).into_response())
}

pub async fn select_line(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(name) = params.get("name") else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let action = Action::SelectLine {
        name: name.clone(),
        selected: flag(&params, "selected")?,
    };
    let changes = state.board.dispatch(action).await;
    Ok(Json(ChangesDto::from(&changes)).into_response())
}

pub async fn select_mode(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let Some(mode) = params.get("mode").and_then(|mode| TransportMode::parse(mode)) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let visible = flag(&params, "visible")?;
    let changes = state
        .board
        .dispatch(Action::SetModeVisible(mode, visible))
        .await;
    Ok(Json(ChangesDto::from(&changes)).into_response())
}
