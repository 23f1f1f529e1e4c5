//! Resolving cursors against a catalogue.
//!
//! A [`TrackedPosition`] stores its cursor text alongside zero-based
//! [`EpisodeIndex`] references into a [`ShowCatalogue`]. The references are
//! plain indices so a catalogue can be reloaded or refreshed without
//! invalidating borrowed state.

use crate::cursor::{self, SeasonEpisode};
use crate::error::{Result, TrackerError};
use crate::types::{Episode, ShowCatalogue};
use serde::{Deserialize, Serialize};

/// Zero-based season and episode indices into a catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpisodeIndex {
    pub season: usize,
    pub episode: usize,
}

impl EpisodeIndex {
    /// The series premiere.
    pub const FIRST: EpisodeIndex = EpisodeIndex {
        season: 0,
        episode: 0,
    };

    pub fn new(season: usize, episode: usize) -> Self {
        Self { season, episode }
    }

    /// The 1-based code for this index.
    pub fn to_season_episode(self) -> SeasonEpisode {
        SeasonEpisode::new(self.season as u32 + 1, self.episode as u32 + 1)
    }
}

/// Check that `index` addresses an episode of `catalogue`.
///
/// A missing season is reported before a missing episode.
pub fn validate(catalogue: &ShowCatalogue, index: EpisodeIndex) -> Result<()> {
    let se = index.to_season_episode();
    let season = catalogue
        .season(index.season)
        .ok_or(TrackerError::SeasonOutOfBounds {
            season: se.season,
            available: catalogue.season_count(),
        })?;

    if index.episode >= season.episodes_this_season() {
        return Err(TrackerError::EpisodeOutOfBounds {
            season: se.season,
            episode: se.episode,
            available: season.episodes_this_season(),
        });
    }

    Ok(())
}

/// Convert a 1-based code into a validated zero-based index.
pub fn locate(catalogue: &ShowCatalogue, se: SeasonEpisode) -> Result<EpisodeIndex> {
    let season = se
        .season
        .checked_sub(1)
        .ok_or(TrackerError::SeasonOutOfBounds {
            season: se.season,
            available: catalogue.season_count(),
        })? as usize;

    let episode = match se.episode.checked_sub(1) {
        Some(e) => e as usize,
        None => {
            // Season must still be checked first.
            let available = catalogue
                .season(season)
                .ok_or(TrackerError::SeasonOutOfBounds {
                    season: se.season,
                    available: catalogue.season_count(),
                })?
                .episodes_this_season();
            return Err(TrackerError::EpisodeOutOfBounds {
                season: se.season,
                episode: se.episode,
                available,
            });
        }
    };

    let index = EpisodeIndex::new(season, episode);
    validate(catalogue, index)?;
    Ok(index)
}

/// The episode immediately before `index`, crossing season boundaries.
///
/// Returns `None` for the series premiere. `index` must be valid.
pub fn previous_of(catalogue: &ShowCatalogue, index: EpisodeIndex) -> Option<EpisodeIndex> {
    match (index.season, index.episode) {
        (0, 0) => None,
        (s, 0) => {
            let last = catalogue.season(s - 1)?.episodes_this_season().checked_sub(1)?;
            Some(EpisodeIndex::new(s - 1, last))
        }
        (s, e) => Some(EpisodeIndex::new(s, e - 1)),
    }
}

/// Resolve a cursor to its next episode and the episode before it.
///
/// # Examples
///
/// ```
/// use showtracker::position::resolve;
/// use showtracker::types::{Episode, Season, ShowCatalogue};
///
/// let mut show = ShowCatalogue::new("Pilot Season");
/// show.add_season(Season::from_episodes(1, vec![
///     Episode::new(1, 1, "Pilot", Some(7.5)),
///     Episode::new(1, 2, "Second", None),
/// ]));
///
/// let (next, previous) = resolve(&show, "S01E02").unwrap();
/// assert_eq!(next.title, "Second");
/// assert_eq!(previous.unwrap().title, "Pilot");
/// ```
pub fn resolve<'a>(
    catalogue: &'a ShowCatalogue,
    cursor_text: &str,
) -> Result<(&'a Episode, Option<&'a Episode>)> {
    let position = TrackedPosition::resolve(catalogue, cursor_text)?;
    let next = position
        .next_episode(catalogue)
        .ok_or_else(|| TrackerError::SeasonEpisodeParse(cursor_text.to_string()))?;
    Ok((next, position.previous_episode(catalogue)))
}

/// Per-show tracking state.
///
/// The cursor is the source of truth; `next` and `previous` are the resolved
/// references. `previous` is only ever set alongside `next`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPosition {
    cursor: String,
    #[serde(default)]
    next: Option<EpisodeIndex>,
    #[serde(default)]
    previous: Option<EpisodeIndex>,
}

impl Default for TrackedPosition {
    fn default() -> Self {
        Self::unresolved(SeasonEpisode::FIRST)
    }
}

impl TrackedPosition {
    /// A position that has not been resolved against a catalogue yet.
    pub fn unresolved(se: SeasonEpisode) -> Self {
        Self {
            cursor: se.to_string(),
            next: None,
            previous: None,
        }
    }

    /// Resolve a cursor strictly against `catalogue`.
    pub fn resolve(catalogue: &ShowCatalogue, cursor_text: &str) -> Result<Self> {
        let se = cursor::parse_strict(cursor_text)?;
        let next = locate(catalogue, se)?;
        Ok(Self::at(catalogue, next))
    }

    /// The position whose next episode is `next`. `next` must be valid.
    pub fn at(catalogue: &ShowCatalogue, next: EpisodeIndex) -> Self {
        Self {
            cursor: next.to_season_episode().to_string(),
            next: Some(next),
            previous: previous_of(catalogue, next),
        }
    }

    pub(crate) fn from_parts(next: EpisodeIndex, previous: Option<EpisodeIndex>) -> Self {
        Self {
            cursor: next.to_season_episode().to_string(),
            next: Some(next),
            previous,
        }
    }

    /// Re-resolve the stored cursor, e.g. after the catalogue changed.
    pub fn reresolve(&self, catalogue: &ShowCatalogue) -> Result<Self> {
        Self::resolve(catalogue, &self.cursor)
    }

    /// The canonical cursor text, e.g. `S06E09`.
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn next(&self) -> Option<EpisodeIndex> {
        self.next
    }

    pub fn previous(&self) -> Option<EpisodeIndex> {
        self.previous
    }

    pub fn is_resolved(&self) -> bool {
        self.next.is_some()
    }

    /// The next episode to watch.
    pub fn next_episode<'a>(&self, catalogue: &'a ShowCatalogue) -> Option<&'a Episode> {
        catalogue.episode(self.next?)
    }

    /// The episode watched last.
    pub fn previous_episode<'a>(&self, catalogue: &'a ShowCatalogue) -> Option<&'a Episode> {
        catalogue.episode(self.previous?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Season;

    fn catalogue(episodes_per_season: &[u32]) -> ShowCatalogue {
        let mut show = ShowCatalogue::new("Test Show");
        for (idx, &count) in episodes_per_season.iter().enumerate() {
            let season = idx as u32 + 1;
            let episodes = (1..=count)
                .map(|e| Episode::new(season, e, &format!("{}x{}", season, e), Some(8.0)))
                .collect();
            show.add_season(Season::from_episodes(season, episodes));
        }
        show
    }

    #[test]
    fn test_resolve_premiere_has_no_previous() {
        let show = catalogue(&[3, 3]);
        let (next, previous) = resolve(&show, "S01E01").unwrap();
        assert_eq!(next.title, "1x1");
        assert!(previous.is_none());
    }

    #[test]
    fn test_resolve_season_premiere_previous_is_prior_finale() {
        let show = catalogue(&[3, 4]);
        let (next, previous) = resolve(&show, "S02E01").unwrap();
        assert_eq!(next.title, "2x1");
        assert_eq!(previous.unwrap().title, "1x3");
    }

    #[test]
    fn test_resolve_mid_season() {
        let show = catalogue(&[3, 4]);
        let (next, previous) = resolve(&show, "s02e04").unwrap();
        assert_eq!(next.title, "2x4");
        assert_eq!(previous.unwrap().title, "2x3");
    }

    #[test]
    fn test_resolve_season_out_of_bounds() {
        let show = catalogue(&[3, 4]);
        let err = resolve(&show, "S03E01").unwrap_err();
        assert!(matches!(
            err,
            TrackerError::SeasonOutOfBounds {
                season: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn test_resolve_episode_out_of_bounds() {
        let show = catalogue(&[3, 4]);
        let err = resolve(&show, "S01E04").unwrap_err();
        assert!(matches!(
            err,
            TrackerError::EpisodeOutOfBounds {
                season: 1,
                episode: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn test_resolve_zero_numbers_are_out_of_bounds() {
        let show = catalogue(&[3]);
        assert!(matches!(
            resolve(&show, "S00E01").unwrap_err(),
            TrackerError::SeasonOutOfBounds { .. }
        ));
        assert!(matches!(
            resolve(&show, "S01E00").unwrap_err(),
            TrackerError::EpisodeOutOfBounds { .. }
        ));
        assert!(matches!(
            resolve(&show, "S02E00").unwrap_err(),
            TrackerError::SeasonOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_resolve_parse_error() {
        let show = catalogue(&[3]);
        assert!(matches!(
            resolve(&show, "next week").unwrap_err(),
            TrackerError::SeasonEpisodeParse(_)
        ));
    }

    #[test]
    fn test_tracked_position_canonical_cursor() {
        let show = catalogue(&[10]);
        let position = TrackedPosition::resolve(&show, "s01e9").unwrap();
        assert_eq!(position.cursor(), "S01E09");
        assert_eq!(position.next(), Some(EpisodeIndex::new(0, 8)));
        assert_eq!(position.previous(), Some(EpisodeIndex::new(0, 7)));
    }

    #[test]
    fn test_unresolved_position() {
        let position = TrackedPosition::default();
        assert_eq!(position.cursor(), "S01E01");
        assert!(!position.is_resolved());
        assert!(position.previous().is_none());
    }

    #[test]
    fn test_previous_of_after_empty_season() {
        let show = catalogue(&[0, 2]);
        assert_eq!(previous_of(&show, EpisodeIndex::new(1, 0)), None);
    }
}
