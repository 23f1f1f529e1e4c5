//! Reading watchlist files.
//!
//! A watchlist has one show per line:
//!
//! ```text
//! Game of Thrones S06E10 (Download 'Light of the Seven')
//! ```
//!
//! Notes are optional and may be wrapped in parentheses or square brackets.
//! Blank lines and lines starting with `#` are ignored.

use crate::cursor::{self, SeasonEpisode};
use crate::error::{Result, TrackerError};
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// One parsed watchlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub title: String,
    /// `None` when the line carries no season-episode code.
    pub code: Option<SeasonEpisode>,
    pub notes: Option<String>,
}

/// Split a line into title, code and notes.
///
/// # Examples
///
/// ```
/// use showtracker::cursor::SeasonEpisode;
/// use showtracker::watchlist::parse_line;
///
/// let entry = parse_line("Game of Thrones S06E10 (Download 'Light of the Seven')");
/// assert_eq!(entry.title, "Game of Thrones");
/// assert_eq!(entry.code, Some(SeasonEpisode::new(6, 10)));
/// assert_eq!(entry.notes.as_deref(), Some("Download 'Light of the Seven'"));
/// ```
pub fn parse_line(line: &str) -> WatchlistEntry {
    let line = line.trim();

    let (details, notes) = match line.find(['(', '[']) {
        Some(idx) => {
            let raw = line[idx + 1..].trim_end();
            let raw = raw
                .strip_suffix(')')
                .or_else(|| raw.strip_suffix(']'))
                .unwrap_or(raw)
                .trim();
            let notes = (!raw.is_empty()).then(|| raw.to_string());
            (line[..idx].trim_end(), notes)
        }
        None => (line, None),
    };

    let (title, code) = match cursor::find(details) {
        Some((se, range)) => {
            let mut title = String::with_capacity(details.len());
            title.push_str(&details[..range.start]);
            title.push(' ');
            title.push_str(&details[range.end..]);
            (title.split_whitespace().collect::<Vec<_>>().join(" "), Some(se))
        }
        None => (details.trim().to_string(), None),
    };

    WatchlistEntry { title, code, notes }
}

/// Read every usable entry of a watchlist file.
///
/// Fails with [`TrackerError::WatchlistNotFound`] if the file is missing and
/// [`TrackerError::EmptyWatchlist`] if it holds no show lines.
pub fn read_watchlist(path: &Path) -> Result<Vec<WatchlistEntry>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TrackerError::WatchlistNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let entries: Vec<WatchlistEntry> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_line)
        .filter(|entry| !entry.title.is_empty())
        .collect();

    debug!("Read {} entries from {}", entries.len(), path.display());

    if entries.is_empty() {
        return Err(TrackerError::EmptyWatchlist(path.to_path_buf()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_line_without_notes() {
        let entry = parse_line("Game of Thrones S05E09");
        assert_eq!(entry.title, "Game of Thrones");
        assert_eq!(entry.code, Some(SeasonEpisode::new(5, 9)));
        assert!(entry.notes.is_none());
    }

    #[test]
    fn test_line_with_bracket_notes() {
        let entry = parse_line("Mr. Robot s02e01 [season two]");
        assert_eq!(entry.title, "Mr. Robot");
        assert_eq!(entry.code, Some(SeasonEpisode::new(2, 1)));
        assert_eq!(entry.notes.as_deref(), Some("season two"));
    }

    #[test]
    fn test_line_without_code() {
        let entry = parse_line("Making a Murderer");
        assert_eq!(entry.title, "Making a Murderer");
        assert!(entry.code.is_none());
    }

    #[test]
    fn test_missing_watchlist() {
        let dir = TempDir::new().unwrap();
        let err = read_watchlist(&dir.path().join("watchlist.txt")).unwrap_err();
        assert!(matches!(err, TrackerError::WatchlistNotFound(_)));
    }

    #[test]
    fn test_empty_watchlist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("watchlist.txt");
        fs::write(&path, "\n# nothing yet\n   \n").unwrap();
        assert!(matches!(
            read_watchlist(&path).unwrap_err(),
            TrackerError::EmptyWatchlist(_)
        ));
    }

    #[test]
    fn test_read_watchlist_skips_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("watchlist.txt");
        fs::write(
            &path,
            "# shows\nGame of Thrones S06E10 (Download 'Light of the Seven')\n\nHouse S07E21\n",
        )
        .unwrap();

        let entries = read_watchlist(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title, "House");
        assert_eq!(entries[1].code, Some(SeasonEpisode::new(7, 21)));
    }
}
