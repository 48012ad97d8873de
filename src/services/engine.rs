//! Genre preference tracking and exploration nudges
//!
//! Pure functions over the catalog and a session's [`SelectionState`]. The
//! only randomness is in [`sample_tracks`], which takes its RNG explicitly.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Catalog, SelectionState, Track};

/// Selections in one genre that trigger the exploration nudge
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Number of alternative genres offered by default
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// Something the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Genre(String),
    Track { genre: String, title: String },
}

impl Selection {
    pub fn genre(&self) -> &str {
        match self {
            Selection::Genre(genre) => genre,
            Selection::Track { genre, .. } => genre,
        }
    }
}

/// Returns every track whose genre is selected, in catalog order
pub fn filter_tracks<'a, S: AsRef<str>>(
    catalog: &'a Catalog,
    selected_genres: &[S],
) -> Vec<&'a Track> {
    catalog
        .tracks()
        .iter()
        .filter(|track| selected_genres.iter().any(|g| g.as_ref() == track.genre))
        .collect()
}

/// Draws `n` tracks uniformly with replacement
///
/// The result may repeat tracks and differs between calls. An empty pool
/// yields an empty list.
pub fn sample_tracks<R: Rng + ?Sized>(pool: &[&Track], n: usize, rng: &mut R) -> Vec<Track> {
    if pool.is_empty() {
        return Vec::new();
    }
    (0..n)
        .filter_map(|_| pool.choose(&mut *rng))
        .map(|track| (*track).clone())
        .collect()
}

/// Records a selection and reports whether its genre just crossed the threshold
pub fn record_selection(state: &mut SelectionState, selection: Selection, threshold: u32) -> bool {
    let genre = selection.genre().to_string();
    match selection {
        Selection::Genre(genre) => {
            *state.genre_counts.entry(genre).or_insert(0) += 1;
        }
        Selection::Track { genre, title } => {
            state.tracks.entry(genre).or_default().insert(title);
        }
    }

    if state.warned.contains(&genre) {
        return false;
    }
    if should_warn(state.concentration(&genre), threshold) {
        tracing::debug!(genre = %genre, threshold, "Genre concentration threshold reached");
        state.warned.insert(genre);
        return true;
    }
    false
}

pub fn should_warn(count: u32, threshold: u32) -> bool {
    count >= threshold
}

/// Genres of `all_genres` not in `selected_genres`, in `all_genres` order
pub fn suggest_alternatives<S, T>(
    selected_genres: &[S],
    all_genres: &[T],
    limit: Option<usize>,
) -> Vec<String>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let alternatives = all_genres
        .iter()
        .map(|genre| genre.as_ref())
        .filter(|genre: &&str| !selected_genres.iter().any(|s| s.as_ref() == *genre))
        .map(str::to_string);

    match limit {
        Some(limit) => alternatives.take(limit).collect(),
        None => alternatives.collect(),
    }
}
