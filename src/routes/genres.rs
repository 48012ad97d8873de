use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::Track,
    routes::AppState,
};

/// Handler listing catalog genres in first-appearance order
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let catalog = state.catalog()?;
    Ok(Json(catalog.genres().to_vec()))
}

/// Handler listing the tracks of one genre, for the per-genre track picker
pub async fn tracks(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> AppResult<Json<Vec<Track>>> {
    let catalog = state.catalog()?;
    if !catalog.has_genre(&genre) {
        return Err(AppError::NotFound(format!("genre {}", genre)));
    }
    Ok(Json(
        catalog.tracks_in_genre(&genre).into_iter().cloned().collect(),
    ))
}
