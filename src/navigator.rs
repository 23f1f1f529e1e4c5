//! Moving a tracked position forwards and backwards.
//!
//! Both operations work on a copy of the position and only return it once
//! every step has succeeded, so a bounds error part-way through a multi-step
//! move leaves the caller's position untouched.
//!
//! Advancing and rewinding are not exact inverses at the series premiere:
//! advancing from S01E01 always moves, while rewinding at S01E01 clamps
//! (next stays on the premiere, previous stays absent) instead of failing.

use crate::error::{Result, TrackerError};
use crate::position::{self, EpisodeIndex, TrackedPosition};
use crate::types::ShowCatalogue;
use log::debug;

/// Direction of a navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Move `position` in `direction` by `by` episodes.
pub fn step(
    catalogue: &ShowCatalogue,
    position: &TrackedPosition,
    direction: Direction,
    by: i64,
) -> Result<TrackedPosition> {
    match direction {
        Direction::Forward => advance(catalogue, position, by),
        Direction::Backward => rewind(catalogue, position, by),
    }
}

/// Advance the next episode by `by` episodes.
///
/// Crossing a season finale moves to the next season's premiere. Moving
/// past the last known episode fails with a bounds error.
pub fn advance(
    catalogue: &ShowCatalogue,
    position: &TrackedPosition,
    by: i64,
) -> Result<TrackedPosition> {
    let steps = step_count(by)?;
    let start = starting_point(catalogue, position)?;
    let Some(mut next) = start.next() else {
        return Ok(start);
    };
    let mut previous = start.previous();

    for _ in 0..steps {
        let season_len = catalogue
            .season(next.season)
            .map(|s| s.episodes_this_season())
            .unwrap_or_default();

        let candidate = if next.episode + 1 >= season_len {
            EpisodeIndex::new(next.season + 1, 0)
        } else {
            EpisodeIndex::new(next.season, next.episode + 1)
        };

        position::validate(catalogue, candidate)?;

        previous = Some(next);
        next = candidate;
    }

    debug!(
        "Advanced {} by {} to {}",
        position.cursor(),
        steps,
        next.to_season_episode()
    );

    Ok(TrackedPosition::from_parts(next, previous))
}

/// Rewind the next episode by `by` episodes.
///
/// Crossing a season premiere moves to the previous season's finale.
/// Reaching the series premiere stops early without error.
pub fn rewind(
    catalogue: &ShowCatalogue,
    position: &TrackedPosition,
    by: i64,
) -> Result<TrackedPosition> {
    let steps = step_count(by)?;
    let start = starting_point(catalogue, position)?;
    let Some(mut next) = start.next() else {
        return Ok(start);
    };
    let mut previous = start.previous();

    for _ in 0..steps {
        let current = previous.unwrap_or(EpisodeIndex::FIRST);

        if current == EpisodeIndex::FIRST {
            next = EpisodeIndex::FIRST;
            previous = None;
            break;
        }

        let candidate = if current.episode == 0 {
            let season = current.season - 1;
            let season_len = catalogue
                .season(season)
                .map(|s| s.episodes_this_season())
                .unwrap_or_default();
            let Some(last) = season_len.checked_sub(1) else {
                return Err(TrackerError::EpisodeOutOfBounds {
                    season: season as u32 + 1,
                    episode: 0,
                    available: 0,
                });
            };
            EpisodeIndex::new(season, last)
        } else {
            EpisodeIndex::new(current.season, current.episode - 1)
        };

        position::validate(catalogue, candidate)?;

        next = current;
        previous = Some(candidate);
    }

    debug!(
        "Rewound {} by up to {} to {}",
        position.cursor(),
        steps,
        next.to_season_episode()
    );

    Ok(TrackedPosition::from_parts(next, previous))
}

fn step_count(by: i64) -> Result<u64> {
    u64::try_from(by).map_err(|_| {
        TrackerError::InvalidUsage(format!("step count must not be negative (got {})", by))
    })
}

/// The resolved position to navigate from.
///
/// Stored indices are trusted only while they still address the catalogue;
/// otherwise the cursor is resolved afresh.
fn starting_point(catalogue: &ShowCatalogue, position: &TrackedPosition) -> Result<TrackedPosition> {
    match position.next() {
        Some(next) if position::validate(catalogue, next).is_ok() => Ok(position.clone()),
        _ => position.reresolve(catalogue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Episode, Season};

    fn catalogue(episodes_per_season: &[u32]) -> ShowCatalogue {
        let mut show = ShowCatalogue::new("Test Show");
        for (idx, &count) in episodes_per_season.iter().enumerate() {
            let season = idx as u32 + 1;
            let episodes = (1..=count)
                .map(|e| Episode::new(season, e, &format!("{}x{}", season, e), None))
                .collect();
            show.add_season(Season::from_episodes(season, episodes));
        }
        show
    }

    fn at(show: &ShowCatalogue, cursor: &str) -> TrackedPosition {
        TrackedPosition::resolve(show, cursor).unwrap()
    }

    #[test]
    fn test_advance_within_season() {
        let show = catalogue(&[3, 3]);
        let moved = advance(&show, &at(&show, "S01E01"), 1).unwrap();
        assert_eq!(moved.cursor(), "S01E02");
        assert_eq!(moved.previous(), Some(EpisodeIndex::new(0, 0)));
    }

    #[test]
    fn test_advance_across_season_finale() {
        let show = catalogue(&[3, 3]);
        let moved = advance(&show, &at(&show, "S01E03"), 1).unwrap();
        assert_eq!(moved.cursor(), "S02E01");
        assert_eq!(moved.previous(), Some(EpisodeIndex::new(0, 2)));
    }

    #[test]
    fn test_advance_past_series_finale_fails() {
        let show = catalogue(&[3, 3]);
        let err = advance(&show, &at(&show, "S02E03"), 1).unwrap_err();
        assert!(matches!(err, TrackerError::SeasonOutOfBounds { season: 3, .. }));
    }

    #[test]
    fn test_failed_advance_leaves_position_untouched() {
        let show = catalogue(&[3, 3]);
        let original = at(&show, "S02E01");
        let snapshot = original.clone();
        assert!(advance(&show, &original, 5).is_err());
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_rewind_within_season() {
        let show = catalogue(&[3, 3]);
        let moved = rewind(&show, &at(&show, "S01E03"), 1).unwrap();
        assert_eq!(moved.cursor(), "S01E02");
        assert_eq!(moved.previous(), Some(EpisodeIndex::new(0, 0)));
    }

    #[test]
    fn test_rewind_onto_premiere_clears_previous() {
        let show = catalogue(&[3, 3]);
        let moved = rewind(&show, &at(&show, "S01E02"), 1).unwrap();
        assert_eq!(moved.cursor(), "S01E01");
        assert_eq!(moved.previous(), None);
    }

    #[test]
    fn test_rewind_stops_at_premiere() {
        let show = catalogue(&[3, 3]);
        let moved = rewind(&show, &at(&show, "S01E03"), 10).unwrap();
        assert_eq!(moved.cursor(), "S01E01");
        assert_eq!(moved.next(), Some(EpisodeIndex::FIRST));
        assert_eq!(moved.previous(), None);
    }

    #[test]
    fn test_premiere_asymmetry() {
        let show = catalogue(&[3, 3]);
        let premiere = at(&show, "S01E01");

        let rewound = rewind(&show, &premiere, 1).unwrap();
        assert_eq!(rewound, premiere);
        assert_eq!(rewind(&show, &rewound, 1).unwrap(), premiere);

        let advanced = advance(&show, &premiere, 1).unwrap();
        assert_ne!(advanced.next(), premiere.next());
    }

    #[test]
    fn test_advance_then_rewind_is_identity_away_from_boundaries() {
        let show = catalogue(&[4, 2, 5]);
        for start in ["S01E02", "S01E04", "S02E01", "S02E02"] {
            for k in 1..=4 {
                let original = at(&show, start);
                let Ok(forward) = advance(&show, &original, k) else {
                    continue;
                };
                let back = rewind(&show, &forward, k).unwrap();
                assert_eq!(back, original, "start {} k {}", start, k);
            }
        }
    }

    #[test]
    fn test_single_steps_are_strictly_increasing() {
        let show = catalogue(&[2, 1, 3]);
        let mut position = at(&show, "S01E01");
        let mut seen = vec![position.next().unwrap()];
        while let Ok(moved) = advance(&show, &position, 1) {
            let next = moved.next().unwrap();
            assert!(next > *seen.last().unwrap());
            seen.push(next);
            position = moved;
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_zero_steps_is_a_no_op() {
        let show = catalogue(&[3]);
        let original = at(&show, "S01E02");
        assert_eq!(advance(&show, &original, 0).unwrap(), original);
        assert_eq!(rewind(&show, &original, 0).unwrap(), original);
    }

    #[test]
    fn test_negative_steps_rejected() {
        let show = catalogue(&[3]);
        let original = at(&show, "S01E02");
        assert!(matches!(
            advance(&show, &original, -1).unwrap_err(),
            TrackerError::InvalidUsage(_)
        ));
        assert!(matches!(
            rewind(&show, &original, -3).unwrap_err(),
            TrackerError::InvalidUsage(_)
        ));
    }

    #[test]
    fn test_unresolved_position_is_resolved_first() {
        let show = catalogue(&[3, 3]);
        let unresolved = TrackedPosition::unresolved(crate::cursor::SeasonEpisode::new(1, 3));
        let moved = advance(&show, &unresolved, 1).unwrap();
        assert_eq!(moved.cursor(), "S02E01");
    }

    #[test]
    fn test_unresolvable_position_reports_bounds() {
        let show = catalogue(&[3]);
        let unresolved = TrackedPosition::unresolved(crate::cursor::SeasonEpisode::new(4, 1));
        assert!(matches!(
            advance(&show, &unresolved, 1).unwrap_err(),
            TrackerError::SeasonOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_step_dispatches_direction() {
        let show = catalogue(&[3]);
        let original = at(&show, "S01E02");
        assert_eq!(
            step(&show, &original, Direction::Forward, 1).unwrap().cursor(),
            "S01E03"
        );
        assert_eq!(
            step(&show, &original, Direction::Backward, 1).unwrap().cursor(),
            "S01E01"
        );
    }
}
