use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::{Catalog, Session, Track};
use crate::services::engine;

pub const WARNING_MESSAGE: &str =
    "You've been listening to one genre a lot! Try exploring something new.";
pub const EMPTY_SELECTION_NOTICE: &str = "Select at least one genre to get recommendations.";
pub const NO_ALTERNATIVES_NOTICE: &str = "You have explored every genre in the catalog.";

/// Knobs that shape a rendered page
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub sample_size: usize,
    pub suggestion_limit: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sample_size: 5,
            suggestion_limit: Some(engine::DEFAULT_SUGGESTION_LIMIT),
        }
    }
}

/// Immutable snapshot of everything the page shows after one user action
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub session_id: Uuid,
    pub username: Option<String>,
    /// Options for the genre multi-select
    pub genres: Vec<String>,
    pub selected_genres: Vec<String>,
    pub selected_tracks: BTreeMap<String, BTreeSet<String>>,
    /// Sampled with replacement; may repeat tracks
    pub recommendations: Vec<Track>,
    pub genre_counts: BTreeMap<String, u32>,
    pub warning: Option<String>,
    pub warned_genres: Vec<String>,
    pub suggestions: Vec<String>,
    pub saved_preferences: Vec<String>,
    /// Informational message, not an error
    pub notice: Option<String>,
    /// Outcome of the last account action
    pub message: Option<String>,
}

impl PageView {
    /// Computes the page for a session
    pub fn render<R: Rng + ?Sized>(
        catalog: &Catalog,
        session: &Session,
        options: RenderOptions,
        rng: &mut R,
    ) -> Self {
        let selection = &session.selection;

        let recommendations = if selection.current_genres.is_empty() {
            Vec::new()
        } else {
            let pool = engine::filter_tracks(catalog, &selection.current_genres);
            engine::sample_tracks(&pool, options.sample_size, rng)
        };

        let mut notice = if selection.current_genres.is_empty() {
            Some(EMPTY_SELECTION_NOTICE.to_string())
        } else {
            None
        };

        let warned_genres: Vec<String> = selection.warned.iter().cloned().collect();
        let (warning, suggestions) = if warned_genres.is_empty() {
            (None, Vec::new())
        } else {
            let suggestions = engine::suggest_alternatives(
                selection.current_genres.as_slice(),
                catalog.genres(),
                options.suggestion_limit,
            );
            if suggestions.is_empty() && notice.is_none() {
                notice = Some(NO_ALTERNATIVES_NOTICE.to_string());
            }
            (Some(WARNING_MESSAGE.to_string()), suggestions)
        };

        Self {
            session_id: session.id,
            username: session.username().map(str::to_string),
            genres: catalog.genres().to_vec(),
            selected_genres: selection.current_genres.clone(),
            selected_tracks: selection.tracks.clone(),
            recommendations,
            genre_counts: selection.genre_counts.clone(),
            warning,
            warned_genres,
            suggestions,
            saved_preferences: session.saved_preferences.iter().cloned().collect(),
            notice,
            message: session.flash.clone(),
        }
    }
}
