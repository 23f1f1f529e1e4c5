//! Type definitions for the showtracker catalogue.
//!
//! This module contains the episode map the navigation engine reads:
//! [`Episode`], [`Season`] and [`ShowCatalogue`], plus the title
//! normalisation helpers that key a show in both databases.

use crate::position::EpisodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rating source name used for IMDb ratings supplied by OMDb.
pub const IMDB: &str = "imdb";

/// A single episode of a show.
///
/// A `None` rating means the episode has not aired or has not been rated yet.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Season number, starting at 1.
    pub season: u32,

    /// Episode number within the season, starting at 1.
    pub episode_number: u32,

    /// Episode title (a placeholder such as "Episode #7.1" for unaired episodes).
    pub title: String,

    /// Map of rating source to rating.
    pub ratings: BTreeMap<String, Option<f64>>,
}

impl Episode {
    /// Create an episode with a single IMDb rating.
    pub fn new(season: u32, episode_number: u32, title: &str, imdb_rating: Option<f64>) -> Self {
        let mut ratings = BTreeMap::new();
        ratings.insert(IMDB.to_string(), imdb_rating);
        Self {
            season,
            episode_number,
            title: title.to_string(),
            ratings,
        }
    }

    /// Stand-in for an episode the provider skipped.
    pub fn placeholder(season: u32, episode_number: u32) -> Self {
        Self::new(
            season,
            episode_number,
            &format!("Episode #{}.{}", season, episode_number),
            None,
        )
    }

    /// The IMDb rating, if the episode has one.
    pub fn imdb_rating(&self) -> Option<f64> {
        self.ratings.get(IMDB).copied().flatten()
    }

    /// Format the episode for display.
    ///
    /// # Examples
    ///
    /// ```
    /// use showtracker::types::Episode;
    ///
    /// let ep = Episode::new(6, 10, "The Winds of Winter", Some(9.9));
    /// assert_eq!(ep.to_display(), "S06E10 - The Winds of Winter (9.9)");
    ///
    /// let unaired = Episode::placeholder(7, 1);
    /// assert_eq!(unaired.to_display(), "S07E01 - Episode #7.1 (N/A)");
    /// ```
    pub fn to_display(&self) -> String {
        let rating = match self.imdb_rating() {
            Some(r) => format!("{:.1}", r),
            None => "N/A".to_string(),
        };
        format!(
            "{} - {} ({})",
            crate::cursor::format(self.season, self.episode_number),
            self.title,
            rating
        )
    }
}

/// An ordered run of episodes, numbered from 1 without gaps.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub episodes: Vec<Episode>,
}

impl Season {
    /// Build a season from provider records.
    ///
    /// Episodes are sorted by number, duplicates keep the first record and
    /// missing numbers are filled with placeholders, so that index `i`
    /// always holds episode `i + 1`.
    pub fn from_episodes(season: u32, mut episodes: Vec<Episode>) -> Self {
        episodes.sort_by_key(|e| e.episode_number);
        episodes.dedup_by_key(|e| e.episode_number);

        let mut filled = Vec::with_capacity(episodes.len());
        let mut expected = 1;
        for episode in episodes {
            if episode.episode_number == 0 {
                continue;
            }
            while expected < episode.episode_number {
                filled.push(Episode::placeholder(season, expected));
                expected += 1;
            }
            filled.push(episode);
            expected += 1;
        }

        Self { episodes: filled }
    }

    /// Number of episodes in this season.
    pub fn episodes_this_season(&self) -> usize {
        self.episodes.len()
    }

    /// Episode at a zero-based index.
    pub fn get(&self, index: usize) -> Option<&Episode> {
        self.episodes.get(index)
    }
}

/// The full, ordered episode listing of one show.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ShowCatalogue {
    /// Display title of the show.
    pub title: String,

    /// Normalised key shared with the tracker database.
    pub key: String,

    /// Seasons in order, index 0 is season 1.
    pub seasons: Vec<Season>,
}

impl ShowCatalogue {
    /// Create an empty catalogue for a title.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            key: lunderize(title),
            seasons: Vec::new(),
        }
    }

    /// Append the next season.
    pub fn add_season(&mut self, season: Season) {
        self.seasons.push(season);
    }

    /// Number of seasons.
    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    /// Season at a zero-based index.
    pub fn season(&self, index: usize) -> Option<&Season> {
        self.seasons.get(index)
    }

    /// Episode at a zero-based position.
    pub fn episode(&self, index: EpisodeIndex) -> Option<&Episode> {
        self.season(index.season)?.get(index.episode)
    }

    /// Format the show for display.
    pub fn to_display(&self) -> String {
        let episodes: usize = self.seasons.iter().map(Season::episodes_this_season).sum();
        format!(
            "{} ({} seasons, {} eps)",
            self.title,
            self.seasons.len(),
            episodes
        )
    }
}

/// Lowercase, underscored key for a title.
///
/// # Examples
///
/// ```
/// use showtracker::types::lunderize;
///
/// assert_eq!(lunderize("The Cat in the Hat"), "the_cat_in_the_hat");
/// assert_eq!(lunderize("Mr. Robot"), "mr_robot");
/// ```
pub fn lunderize(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "_").replace('.', "")
}

/// Title suitable for a metadata request.
///
/// Everything after the first `:` is dropped along with any periods, and the
/// result is lowercased.
pub fn sanitize_title(title: &str) -> String {
    let head = title.split(':').next().unwrap_or_default();
    head.replace('.', "").trim().to_lowercase()
}

/// Capitalise a title, leaving short joining words lowercase.
///
/// # Examples
///
/// ```
/// use showtracker::types::titleize;
///
/// assert_eq!(titleize("the cat in the hat"), "The Cat in the Hat");
/// ```
pub fn titleize(title: &str) -> String {
    const MINOR: [&str; 5] = ["a", "of", "in", "the", "v"];

    title
        .split_whitespace()
        .enumerate()
        .map(|(idx, word)| {
            let lower = word.to_lowercase();
            if idx > 0 && MINOR.contains(&lower.as_str()) {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
