mod departures;
mod filters;
mod search;
mod stops;

pub use departures::*;
pub use filters::*;
pub use search::*;
pub use stops::*;

use axum::http::StatusCode;
use std::collections::HashMap;

fn flag(params: &HashMap<String, String>, name: &str) -> Result<bool, StatusCode> {
    match params.get(name).map(|value| value.trim().to_lowercase()) {
        None => Ok(true),
        Some(value) => match value.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(StatusCode::BAD_REQUEST),
        },
    }
}
