use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::{CatalogRow, Track};

/// Errors raised while reading a catalog source
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed CSV catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory collection of tracks, indexed by genre
///
/// Every track has a non-empty title and genre. Genres are kept in the order
/// they first appear in the source.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    genres: Vec<String>,
    by_genre: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Builds a catalog from already-validated tracks
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut genres = Vec::new();
        let mut by_genre: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, track) in tracks.iter().enumerate() {
            let entry = by_genre.entry(track.genre.clone()).or_insert_with(|| {
                genres.push(track.genre.clone());
                Vec::new()
            });
            entry.push(index);
        }

        Self {
            tracks,
            genres,
            by_genre,
        }
    }

    /// Builds a catalog from raw rows, dropping rows without title or genre
    pub fn from_rows(rows: impl IntoIterator<Item = CatalogRow>) -> Self {
        Self::from_tracks(rows.into_iter().filter_map(CatalogRow::into_track).collect())
    }

    /// Parses a CSV source with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let rows = csv_reader
            .deserialize::<CatalogRow>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_rows(rows))
    }

    /// Parses a JSON array of row objects
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let rows: Vec<CatalogRow> = serde_json::from_reader(reader)?;
        Ok(Self::from_rows(rows))
    }

    /// Reads a catalog file, choosing the format from its extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_reader(reader)
        } else {
            Self::from_csv_reader(reader)
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Deduplicated genre names in first-appearance order
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.by_genre.contains_key(genre)
    }

    /// Tracks of one genre in catalog order
    pub fn tracks_in_genre(&self, genre: &str) -> Vec<&Track> {
        self.by_genre
            .get(genre)
            .map(|indices| indices.iter().map(|&i| &self.tracks[i]).collect())
            .unwrap_or_default()
    }

    /// Whether a title exists within the given genre
    pub fn contains_track(&self, genre: &str, title: &str) -> bool {
        self.tracks_in_genre(genre).iter().any(|t| t.title == title)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
