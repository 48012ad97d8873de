use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        Catalog, CredentialsRequest, PageView, SelectGenresRequest, SelectTracksRequest, Session,
        SessionEvent,
    },
    routes::{state::session_not_found, AppState},
    services::accounts,
};

/// Handler opening a new session
pub async fn create(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<(StatusCode, Json<PageView>)> {
    let catalog = state.catalog()?;
    let session = Session::new();
    let view = state.render(catalog, &session);

    tracing::info!(request_id = %request_id, session_id = %session.id, "Session created");
    state.sessions.write().await.insert(session.id, session);

    Ok((StatusCode::CREATED, Json(view)))
}

/// Handler ending a session and discarding its selection state
pub async fn end(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| session_not_found(id))?;

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        username = session.username().unwrap_or("-"),
        "Session ended"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Handler re-rendering the current page without changing state
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
    Ok(Json(state.render(catalog, session)))
}

/// Handler for the genre multi-select
pub async fn select_genres(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectGenresRequest>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;
    let genres = validate_genres(catalog, request.genres)?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    ensure_access(&state, session, "log in to pick genres")?;

    let newly_warned = session.apply(SessionEvent::GenresSelected(genres), state.settings.threshold);

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        selected = session.selection.current_genres.len(),
        max_concentration = session.selection.max_concentration(),
        "Genres selected"
    );
    log_warnings(request_id, id, &newly_warned);

    Ok(Json(state.render(catalog, session)))
}

/// Handler for the per-genre track multi-select
pub async fn select_tracks(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectTracksRequest>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;
    let (genre, titles) = validate_tracks(catalog, request)?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    ensure_access(&state, session, "log in to pick tracks")?;

    let picked = titles.len();
    let newly_warned = session.apply(
        SessionEvent::TracksSelected {
            genre: genre.clone(),
            titles,
        },
        state.settings.threshold,
    );

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        genre = %genre,
        picked,
        concentration = session.selection.concentration(&genre),
        "Tracks selected"
    );
    log_warnings(request_id, id, &newly_warned);

    Ok(Json(state.render(catalog, session)))
}

/// Handler merging the session's genres into the account's saved preferences
pub async fn save_preferences(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;

    let (username, genres) = {
        let sessions = state.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
        let username = session
            .username()
            .ok_or_else(|| AppError::LoginRequired("log in to save preferences".to_string()))?
            .to_string();
        let mut genres = session.selection.current_genres.clone();
        genres.extend(session.selection.tracks.keys().cloned());
        (username, genres)
    };

    let saved = accounts::save_preferences(state.store.as_ref(), &username, &genres).await?;
    tracing::info!(request_id = %request_id, session_id = %id, saved = saved.len(), "Preferences stored");

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    if session.username() != Some(username.as_str()) {
        return Err(AppError::LoginRequired(
            "session logged out while saving preferences".to_string(),
        ));
    }
    session.apply(SessionEvent::PreferencesSaved(saved), state.settings.threshold);

    Ok(Json(state.render(catalog, session)))
}

/// Handler creating an account; the session stays logged out
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<PageView>)> {
    let catalog = state.catalog()?;
    ensure_logged_out(&state, id).await?;

    let username =
        accounts::register(state.store.as_ref(), &request.username, &request.password).await?;
    tracing::info!(request_id = %request_id, session_id = %id, username = %username, "Registered");

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    check_logged_out(session)?;
    session.apply(SessionEvent::Registered { username }, state.settings.threshold);

    Ok((StatusCode::CREATED, Json(state.render(catalog, session))))
}

/// Handler checking credentials and attaching the account to the session
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;
    ensure_logged_out(&state, id).await?;

    let (username, preferences) =
        accounts::login(state.store.as_ref(), &request.username, &request.password).await?;
    tracing::info!(request_id = %request_id, session_id = %id, username = %username, "Logged in");

    let mut sessions = state.sessions.write().await;
    // Another login may have landed while the store was checked
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    check_logged_out(session)?;
    session.apply(
        SessionEvent::LoggedIn {
            username,
            preferences,
        },
        state.settings.threshold,
    );

    Ok(Json(state.render(catalog, session)))
}

/// Handler detaching the account and clearing the selection history
pub async fn logout(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PageView>> {
    let catalog = state.catalog()?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
    if session.is_logged_in() {
        session.apply(SessionEvent::LoggedOut, state.settings.threshold);
        tracing::info!(request_id = %request_id, session_id = %id, "Logged out");
    }

    Ok(Json(state.render(catalog, session)))
}

/// Keeps catalog genres only, dropping duplicates but preserving order
fn validate_genres(catalog: &Catalog, requested: Vec<String>) -> AppResult<Vec<String>> {
    let mut genres: Vec<String> = Vec::with_capacity(requested.len());
    for genre in requested {
        let genre = genre.trim().to_string();
        if !catalog.has_genre(&genre) {
            return Err(AppError::InvalidInput(format!("unknown genre: {}", genre)));
        }
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    Ok(genres)
}

fn validate_tracks(
    catalog: &Catalog,
    request: SelectTracksRequest,
) -> AppResult<(String, Vec<String>)> {
    let genre = request.genre.trim().to_string();
    if !catalog.has_genre(&genre) {
        return Err(AppError::InvalidInput(format!("unknown genre: {}", genre)));
    }

    let mut titles: Vec<String> = Vec::with_capacity(request.titles.len());
    for title in request.titles {
        if !catalog.contains_track(&genre, &title) {
            return Err(AppError::InvalidInput(format!(
                "no track {} in genre {}",
                title, genre
            )));
        }
        if !titles.contains(&title) {
            titles.push(title);
        }
    }
    Ok((genre, titles))
}

fn ensure_access(state: &AppState, session: &Session, action: &str) -> AppResult<()> {
    if state.settings.require_login && !session.is_logged_in() {
        return Err(AppError::LoginRequired(action.to_string()));
    }
    Ok(())
}

async fn ensure_logged_out(state: &AppState, id: Uuid) -> AppResult<()> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| session_not_found(id))?;
    check_logged_out(session)
}

fn check_logged_out(session: &Session) -> AppResult<()> {
    match session.username() {
        Some(username) => Err(AppError::AlreadyLoggedIn(username.to_string())),
        None => Ok(()),
    }
}

fn log_warnings(request_id: RequestId, session_id: Uuid, genres: &[String]) {
    for genre in genres {
        tracing::info!(
            request_id = %request_id,
            session_id = %session_id,
            genre = %genre,
            "Genre concentration warning raised"
        );
    }
}
