use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::services::engine::{self, Selection};

/// Per-session selection history
///
/// Counts only ever grow, so once a genre lands in `warned` it stays there
/// for the rest of the session.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SelectionState {
    /// Genres chosen in the most recent genre multi-select
    pub current_genres: Vec<String>,
    /// How many interactions selected each genre
    pub genre_counts: BTreeMap<String, u32>,
    /// Individually picked track titles, per genre
    pub tracks: BTreeMap<String, BTreeSet<String>>,
    /// Genres that crossed the concentration threshold
    pub warned: BTreeSet<String>,
}

impl SelectionState {
    /// Genre selections plus distinct tracks picked in that genre
    pub fn concentration(&self, genre: &str) -> u32 {
        let genre_count = self.genre_counts.get(genre).copied().unwrap_or(0);
        let track_count = self.tracks.get(genre).map_or(0, |titles| titles.len() as u32);
        genre_count + track_count
    }

    /// Highest concentration across all genres
    pub fn max_concentration(&self) -> u32 {
        self.genre_counts
            .keys()
            .chain(self.tracks.keys())
            .map(|genre| self.concentration(genre))
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.current_genres.is_empty() && self.tracks.is_empty()
    }
}

/// Login identity of a session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn {
        username: String,
    },
}

impl AuthState {
    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::LoggedOut => None,
            AuthState::LoggedIn { username } => Some(username),
        }
    }
}

/// A user action after it has been validated against the catalog and the store
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Replace the genre multi-select; each listed genre counts once
    GenresSelected(Vec<String>),
    /// Add picked tracks of one genre
    TracksSelected { genre: String, titles: Vec<String> },
    /// Account created; the session stays logged out
    Registered { username: String },
    /// Credentials accepted; saved preferences loaded from the store
    LoggedIn {
        username: String,
        preferences: BTreeSet<String>,
    },
    /// Preferences written to the store
    PreferencesSaved(BTreeSet<String>),
    LoggedOut,
}

/// Explicit per-visitor context handed to every handler
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub auth: AuthState,
    pub selection: SelectionState,
    /// Genres persisted for the logged-in account
    pub saved_preferences: BTreeSet<String>,
    /// Outcome of the last account action, shown once
    pub flash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            auth: AuthState::LoggedOut,
            selection: SelectionState::default(),
            saved_preferences: BTreeSet::new(),
            flash: None,
            created_at: Utc::now(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.auth.username()
    }

    pub fn is_logged_in(&self) -> bool {
        self.username().is_some()
    }

    /// Applies one user action, returning the genres newly past the threshold
    pub fn apply(&mut self, event: SessionEvent, threshold: u32) -> Vec<String> {
        self.flash = None;
        let mut newly_warned = Vec::new();

        match event {
            SessionEvent::GenresSelected(genres) => {
                for genre in &genres {
                    if engine::record_selection(
                        &mut self.selection,
                        Selection::Genre(genre.clone()),
                        threshold,
                    ) {
                        newly_warned.push(genre.clone());
                    }
                }
                self.selection.current_genres = genres;
            }
            SessionEvent::TracksSelected { genre, titles } => {
                for title in titles {
                    let selection = Selection::Track {
                        genre: genre.clone(),
                        title,
                    };
                    if engine::record_selection(&mut self.selection, selection, threshold) {
                        newly_warned.push(genre.clone());
                    }
                }
            }
            SessionEvent::Registered { username } => {
                self.flash = Some(format!("Account {} created. Please log in.", username));
            }
            SessionEvent::LoggedIn {
                username,
                preferences,
            } => {
                self.flash = Some(format!("Logged in as {}", username));
                self.auth = AuthState::LoggedIn { username };
                self.saved_preferences = preferences;
            }
            SessionEvent::PreferencesSaved(preferences) => {
                self.saved_preferences = preferences;
                self.flash = Some("Preferences saved".to_string());
            }
            SessionEvent::LoggedOut => {
                self.auth = AuthState::LoggedOut;
                self.selection = SelectionState::default();
                self.saved_preferences.clear();
                self.flash = Some("Logged out".to_string());
            }
        }

        newly_warned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = Session::new();
        assert_eq!(session.auth, AuthState::LoggedOut);
        assert!(session.selection.is_empty());
    }

    #[test]
    fn test_genre_selection_replaces_current_and_counts() {
        let mut session = Session::new();
        session.apply(SessionEvent::GenresSelected(genres(&["Rock", "Jazz"])), 5);
        session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);

        assert_eq!(session.selection.current_genres, genres(&["Rock"]));
        assert_eq!(session.selection.concentration("Rock"), 2);
        assert_eq!(session.selection.concentration("Jazz"), 1);
    }

    #[test]
    fn test_warning_fires_once_at_threshold() {
        let mut session = Session::new();
        for _ in 0..4 {
            let warned = session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
            assert!(warned.is_empty());
        }
        let warned = session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
        assert_eq!(warned, genres(&["Rock"]));

        let warned = session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
        assert!(warned.is_empty());
        assert!(session.selection.warned.contains("Rock"));
    }

    #[test]
    fn test_warning_survives_deselecting_genre() {
        let mut session = Session::new();
        for _ in 0..5 {
            session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
        }
        session.apply(SessionEvent::GenresSelected(genres(&["Jazz"])), 5);
        session.apply(SessionEvent::GenresSelected(Vec::new()), 5);
        assert!(session.selection.warned.contains("Rock"));
        assert_eq!(session.selection.concentration("Rock"), 5);
    }

    #[test]
    fn test_tracks_count_toward_concentration() {
        let mut session = Session::new();
        session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 3);
        let warned = session.apply(
            SessionEvent::TracksSelected {
                genre: "Rock".to_string(),
                titles: genres(&["Black Dog", "Paranoid", "Black Dog"]),
            },
            3,
        );
        assert_eq!(session.selection.concentration("Rock"), 3);
        assert_eq!(warned, genres(&["Rock"]));
    }

    #[test]
    fn test_register_keeps_session_logged_out() {
        let mut session = Session::new();
        session.apply(
            SessionEvent::Registered {
                username: "ana".to_string(),
            },
            5,
        );
        assert_eq!(session.auth, AuthState::LoggedOut);
        assert!(session.flash.as_deref().unwrap().contains("ana"));
    }

    #[test]
    fn test_login_then_logout() {
        let mut session = Session::new();
        session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
        session.apply(
            SessionEvent::LoggedIn {
                username: "ana".to_string(),
                preferences: ["Jazz".to_string()].into_iter().collect(),
            },
            5,
        );
        assert_eq!(session.username(), Some("ana"));
        assert!(session.saved_preferences.contains("Jazz"));

        session.apply(SessionEvent::LoggedOut, 5);
        assert_eq!(session.auth, AuthState::LoggedOut);
        assert!(session.saved_preferences.is_empty());
        assert!(session.selection.is_empty());
        assert_eq!(session.flash.as_deref(), Some("Logged out"));
    }

    #[test]
    fn test_flash_cleared_by_next_event() {
        let mut session = Session::new();
        session.apply(SessionEvent::PreferencesSaved(BTreeSet::new()), 5);
        assert!(session.flash.is_some());
        session.apply(SessionEvent::GenresSelected(genres(&["Rock"])), 5);
        assert!(session.flash.is_none());
    }

    #[test]
    fn test_max_concentration() {
        let mut state = SelectionState::default();
        assert_eq!(state.max_concentration(), 0);
        state.genre_counts.insert("Rock".to_string(), 2);
        state
            .tracks
            .entry("Jazz".to_string())
            .or_default()
            .extend(genres(&["a", "b", "c"]));
        assert_eq!(state.max_concentration(), 3);
    }
}
