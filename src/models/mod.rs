use serde::{Deserialize, Serialize};

pub mod account;
pub mod catalog;
pub mod session;
pub mod view;

pub use account::UserAccount;
pub use catalog::Catalog;
pub use session::{AuthState, SelectionState, Session, SessionEvent};
pub use view::PageView;

/// A single song in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub genre: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            genre: genre.into(),
        }
    }
}

// ============================================================================
// Catalog Source Types
// ============================================================================

/// One row of the catalog file as it appears on disk
///
/// Spreadsheet exports name the title column either `Title` or `Song Name`;
/// both (and their snake_case forms) are normalized onto `title`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogRow {
    #[serde(
        default,
        alias = "Title",
        alias = "Song Name",
        alias = "song_name",
        alias = "Song"
    )]
    pub title: Option<String>,
    #[serde(default, alias = "Artist")]
    pub artist: Option<String>,
    #[serde(default, alias = "Genre")]
    pub genre: Option<String>,
}

impl CatalogRow {
    /// Converts the row into a track, or `None` when title or genre is blank
    pub fn into_track(self) -> Option<Track> {
        let title = non_blank(self.title)?;
        let genre = non_blank(self.genre)?;
        let artist = non_blank(self.artist).unwrap_or_default();
        Some(Track {
            title,
            artist,
            genre,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Request Types
// ============================================================================

/// Genre multi-select submitted by the page
#[derive(Debug, Clone, Deserialize)]
pub struct SelectGenresRequest {
    pub genres: Vec<String>,
}

/// Track multi-select for one genre
#[derive(Debug, Clone, Deserialize)]
pub struct SelectTracksRequest {
    pub genre: String,
    pub titles: Vec<String>,
}

/// Username and password for login and registration
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
