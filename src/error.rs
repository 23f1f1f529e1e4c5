//! Custom error types for showtracker.
//!
//! Every failure the tracker can report is a variant of [`TrackerError`].
//! Variants are grouped into kinds (see [`ErrorKind`]) so the command line
//! front end can pick a distinct exit status for "no such show",
//! "invalid code" and "out of range".

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No season-episode code could be found where one is required
    #[error("Could not find a season-episode code (e.g. S01E01) in '{0}'")]
    SeasonEpisodeParse(String),

    /// The requested season does not exist in the catalogue
    #[error("Season {season} is out of bounds: the show has {available} season(s)")]
    SeasonOutOfBounds { season: u32, available: usize },

    /// The season exists but the requested episode does not
    #[error(
        "Episode {episode} of season {season} is out of bounds: the season has {available} episode(s)"
    )]
    EpisodeOutOfBounds {
        season: u32,
        episode: u32,
        available: usize,
    },

    /// Show missing from the metadata provider or the show database
    #[error("Show not found: {0}")]
    ShowNotFound(String),

    /// The provider returned a film with the requested title
    #[error("Found a film named '{0}'; try adding the year to the title")]
    FoundFilm(String),

    /// The provider listed no episodes for a season that later seasons follow
    #[error("'{title}' has no episode listing for season {season}")]
    MissingSeason { title: String, season: u32 },

    /// Show missing from the tracker database
    #[error("Show is not tracked: {0}")]
    ShowNotTracked(String),

    /// Show is already in the tracker database
    #[error("Show is already tracked: {0}")]
    ShowAlreadyTracked(String),

    /// Short code belongs to a different show
    #[error("Short code {short_code} is already assigned to {title}")]
    ShortCodeAlreadyAssigned { short_code: String, title: String },

    /// Contradictory or invalid request
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// Watchlist file does not exist
    #[error("Watchlist not found: {}", .0.display())]
    WatchlistNotFound(PathBuf),

    /// Watchlist file contains no usable lines
    #[error("Watchlist is empty: {}", .0.display())]
    EmptyWatchlist(PathBuf),

    /// Another invocation holds the database lock
    #[error("Database is locked by another process (remove {} if this is stale)", .0.display())]
    DatabaseLocked(PathBuf),

    /// Stored document has the wrong type or an unknown schema version
    #[error("Unsupported database file {}: {reason}", path.display())]
    Schema { path: PathBuf, reason: String },

    /// Network/HTTP errors
    #[error("Network error: {0}")]
    Network(String),

    /// Response or file parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Broad classification of a [`TrackerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or absent season-episode code
    Parse,
    /// Season or episode outside the catalogue
    Bounds,
    /// Show missing from the catalogue, provider or tracker
    Lookup,
    /// Invalid request by the user
    Usage,
    /// Database held by another invocation
    Locked,
    /// I/O, network, configuration and storage failures
    Other,
}

impl TrackerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::SeasonEpisodeParse(_) => ErrorKind::Parse,
            TrackerError::SeasonOutOfBounds { .. } | TrackerError::EpisodeOutOfBounds { .. } => {
                ErrorKind::Bounds
            }
            TrackerError::ShowNotFound(_)
            | TrackerError::FoundFilm(_)
            | TrackerError::MissingSeason { .. }
            | TrackerError::ShowNotTracked(_) => ErrorKind::Lookup,
            TrackerError::ShowAlreadyTracked(_)
            | TrackerError::ShortCodeAlreadyAssigned { .. }
            | TrackerError::InvalidUsage(_)
            | TrackerError::WatchlistNotFound(_)
            | TrackerError::EmptyWatchlist(_) => ErrorKind::Usage,
            TrackerError::DatabaseLocked(_) => ErrorKind::Locked,
            TrackerError::Schema { .. }
            | TrackerError::Network(_)
            | TrackerError::Parse(_)
            | TrackerError::Config(_)
            | TrackerError::Io(_) => ErrorKind::Other,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Other => 1,
            ErrorKind::Lookup => 2,
            ErrorKind::Parse => 3,
            ErrorKind::Bounds => 4,
            ErrorKind::Usage => 5,
            ErrorKind::Locked => 6,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for TrackerError {
    fn from(err: toml::de::Error) -> Self {
        TrackerError::Config(err.to_string())
    }
}

/// Result type alias using TrackerError.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TrackerError = io_err.into();
        assert!(matches!(err, TrackerError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn test_bounds_errors_are_distinct_but_share_kind() {
        let season = TrackerError::SeasonOutOfBounds {
            season: 9,
            available: 7,
        };
        let episode = TrackerError::EpisodeOutOfBounds {
            season: 6,
            episode: 11,
            available: 10,
        };
        assert_eq!(season.kind(), ErrorKind::Bounds);
        assert_eq!(episode.kind(), ErrorKind::Bounds);
        assert!(season.to_string().contains("7 season"));
        assert!(episode.to_string().contains("10 episode"));
    }

    #[test]
    fn test_exit_codes_distinguish_lookup_parse_and_bounds() {
        let lookup = TrackerError::ShowNotTracked("house".to_string());
        let parse = TrackerError::SeasonEpisodeParse("house".to_string());
        let bounds = TrackerError::SeasonOutOfBounds {
            season: 99,
            available: 8,
        };
        assert_eq!(lookup.exit_code(), 2);
        assert_eq!(parse.exit_code(), 3);
        assert_eq!(bounds.exit_code(), 4);
    }

    #[test]
    fn test_error_not_found() {
        let err = TrackerError::ShowNotFound("Moonboy".to_string());
        assert!(err.to_string().contains("Moonboy"));
    }
}
