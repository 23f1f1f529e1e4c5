//! Season-episode codes such as `S06E09`.
//!
//! A cursor is the textual, durable form of "what to watch next". Codes are
//! matched case-insensitively anywhere inside a larger string, so a whole
//! watchlist line or an `add` argument like `"house s07e21"` can be mined
//! for its code. Numbers are 1-based.

use crate::error::{Result, TrackerError};
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)s(\d{1,2})e(\d{1,2})").expect("valid season-episode regex"));

/// A 1-based season and episode pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

impl SeasonEpisode {
    /// The series premiere, `S01E01`.
    pub const FIRST: SeasonEpisode = SeasonEpisode {
        season: 1,
        episode: 1,
    };

    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl Default for SeasonEpisode {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for SeasonEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

impl FromStr for SeasonEpisode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        parse_strict(s)
    }
}

/// Locate the first season-episode code in `text`.
///
/// Returns the parsed code together with the byte range it occupies.
pub fn find(text: &str) -> Option<(SeasonEpisode, Range<usize>)> {
    let caps = SEASON_EPISODE.captures(text)?;
    let whole = caps.get(0)?;
    let season = caps[1].parse().ok()?;
    let episode = caps[2].parse().ok()?;
    Some((SeasonEpisode::new(season, episode), whole.range()))
}

/// Parse a season-episode code, failing when none is present.
///
/// # Examples
///
/// ```
/// use showtracker::cursor::{parse_strict, SeasonEpisode};
///
/// let se = parse_strict("Game of Thrones s06e10").unwrap();
/// assert_eq!(se, SeasonEpisode::new(6, 10));
/// assert!(parse_strict("Game of Thrones").is_err());
/// ```
pub fn parse_strict(text: &str) -> Result<SeasonEpisode> {
    find(text)
        .map(|(se, _)| se)
        .ok_or_else(|| TrackerError::SeasonEpisodeParse(text.to_string()))
}

/// Parse a season-episode code, falling back to `S01E01` when none is present.
pub fn parse_or_default(text: &str) -> SeasonEpisode {
    find(text).map(|(se, _)| se).unwrap_or_default()
}

/// Format a season and episode as an uppercase, zero-padded code.
pub fn format(season: u32, episode: u32) -> String {
    SeasonEpisode::new(season, episode).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercase() {
        assert_eq!(parse_strict("S06E10").unwrap(), SeasonEpisode::new(6, 10));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_strict("s07e21").unwrap(), SeasonEpisode::new(7, 21));
        assert_eq!(parse_strict("S5e9").unwrap(), SeasonEpisode::new(5, 9));
    }

    #[test]
    fn test_parse_inside_line() {
        let line = "Game of Thrones S06E10 (Download 'Light of the Seven')";
        assert_eq!(parse_strict(line).unwrap(), SeasonEpisode::new(6, 10));
    }

    #[test]
    fn test_parse_strict_missing_code() {
        let err = parse_strict("Making a Murderer").unwrap_err();
        assert!(matches!(err, TrackerError::SeasonEpisodeParse(ref s) if s == "Making a Murderer"));
    }

    #[test]
    fn test_parse_or_default_missing_code() {
        assert_eq!(parse_or_default("Making a Murderer"), SeasonEpisode::FIRST);
        assert_eq!(parse_or_default("house s07e21"), SeasonEpisode::new(7, 21));
    }

    #[test]
    fn test_find_reports_range() {
        let (se, range) = find("house s07e21").unwrap();
        assert_eq!(se, SeasonEpisode::new(7, 21));
        assert_eq!(&"house s07e21"[range], "s07e21");
    }

    #[test]
    fn test_format_pads_two_digits() {
        assert_eq!(format(1, 1), "S01E01");
        assert_eq!(format(12, 3), "S12E03");
    }

    #[test]
    fn test_round_trip() {
        for season in 1..=15 {
            for episode in [1, 9, 10, 24] {
                let text = format(season, episode);
                assert_eq!(parse_strict(&text).unwrap(), SeasonEpisode::new(season, episode));
            }
        }
    }

    #[test]
    fn test_from_str() {
        let se: SeasonEpisode = "S02E01".parse().unwrap();
        assert_eq!(se.to_string(), "S02E01");
    }
}
