mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{delete, get, post};
use perron::{board::Board, config::Config};
use std::{sync::Arc, time::Instant};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let config = Config::from_env();
    if config.api_key.is_none() {
        info!("No API key configured, waiting for one to be set");
    }

    let board = match Board::from_config(&config) {
        Ok(board) => board,
        Err(err) => {
            error!("Failed to create board: {err}");
            std::process::exit(1);
        }
    };

    info!("Loading data...");
    let now = Instant::now();
    let stops = board.stops().clone();
    tokio::spawn(async move {
        if let Err(err) = stops.load().await {
            error!("Failed to load stops: {err}");
        }
    });
    if board.restore_preferences().await.is_empty() {
        board.refresh().await;
    }
    info!("Loading data took {:?}", now.elapsed());

    let state = Arc::new(AppState::new(board.clone()));
    state.scheduler.start(board);

    let app = axum::Router::new()
        .route("/departures", get(api::departures))
        .route("/refresh", post(api::refresh))
        .route("/search", get(api::search))
        .route("/stops", post(api::add_stop))
        .route("/stops/{id}", delete(api::remove_stop))
        .route("/filters", get(api::filters))
        .route("/filters/platform", post(api::select_platform))
        .route("/filters/line", post(api::select_line))
        .route("/filters/mode", post(api::select_mode))
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {}: {err}", config.port);
            std::process::exit(1);
        }
    };
    info!("Listening to port {}", config.port);
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}
