//! The two in-memory databases: catalogues and tracked shows.
//!
//! Both are keyed by the normalised title produced by
//! [`lunderize`](crate::types::lunderize). Tracked shows can additionally
//! be looked up by their short code.

use crate::error::{Result, TrackerError};
use crate::position::TrackedPosition;
use crate::types::{lunderize, ShowCatalogue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A show the user is following.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedShow {
    /// Display title of the show.
    pub title: String,
    /// Normalised key shared with the show database.
    pub key: String,
    /// Optional uppercase alias.
    #[serde(default)]
    pub short_code: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Where the user is in the show.
    pub position: TrackedPosition,
}

impl TrackedShow {
    pub fn new(title: &str, position: TrackedPosition) -> Self {
        Self {
            title: title.to_string(),
            key: lunderize(title),
            short_code: None,
            notes: None,
            position,
        }
    }

    /// Title to send to the metadata provider.
    ///
    /// Rebuilt from the key, i.e. from what the user typed when the show was
    /// added, not from the provider's display title.
    pub fn lookup_title(&self) -> String {
        self.key.replace('_', " ")
    }

    /// Whether `query` names this show by key or short code.
    pub fn matches(&self, query: &str) -> bool {
        if self.key == lunderize(query) {
            return true;
        }
        self.short_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(query.trim()))
    }
}

/// All catalogues, keyed by normalised title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowDatabase {
    pub shows: BTreeMap<String, ShowCatalogue>,
}

impl ShowDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a catalogue.
    pub fn insert(&mut self, show: ShowCatalogue) {
        self.shows.insert(show.key.clone(), show);
    }

    /// The catalogue stored under `key`.
    pub fn entry(&self, key: &str) -> Result<&ShowCatalogue> {
        self.shows
            .get(key)
            .ok_or_else(|| TrackerError::ShowNotFound(format!("'{}' is not in the show database", key)))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

/// All tracked shows, keyed by normalised title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerDatabase {
    pub shows: BTreeMap<String, TrackedShow>,
}

impl TrackerDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tracked show.
    pub fn insert(&mut self, show: TrackedShow) {
        self.shows.insert(show.key.clone(), show);
    }

    /// Key of the show named by `query` (title or short code).
    pub fn find_key(&self, query: &str) -> Result<String> {
        let key = lunderize(query);
        if self.shows.contains_key(&key) {
            return Ok(key);
        }

        self.shows
            .values()
            .find(|show| show.matches(query))
            .map(|show| show.key.clone())
            .ok_or_else(|| TrackerError::ShowNotTracked(query.trim().to_string()))
    }

    /// The show named by `query` (title or short code).
    pub fn get(&self, query: &str) -> Result<&TrackedShow> {
        let key = self.find_key(query)?;
        self.shows
            .get(&key)
            .ok_or_else(|| TrackerError::ShowNotTracked(query.to_string()))
    }

    /// Mutable access to the show named by `query`.
    pub fn get_mut(&mut self, query: &str) -> Result<&mut TrackedShow> {
        let key = self.find_key(query)?;
        self.shows
            .get_mut(&key)
            .ok_or_else(|| TrackerError::ShowNotTracked(query.to_string()))
    }

    /// Remove the show named by `query`.
    pub fn remove(&mut self, query: &str) -> Result<TrackedShow> {
        let key = self.find_key(query)?;
        self.shows
            .remove(&key)
            .ok_or_else(|| TrackerError::ShowNotTracked(query.to_string()))
    }

    pub fn contains(&self, query: &str) -> bool {
        self.find_key(query).is_ok()
    }

    /// Check that `short_code` is free for the show stored under `key`.
    pub fn ensure_short_code_available(&self, short_code: &str, key: &str) -> Result<()> {
        let owner = self.shows.values().find(|show| {
            show.key != key
                && show
                    .short_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(short_code))
        });

        match owner {
            Some(show) => Err(TrackerError::ShortCodeAlreadyAssigned {
                short_code: short_code.to_uppercase(),
                title: show.title.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Tracked shows sorted by display title.
    pub fn sorted(&self) -> Vec<&TrackedShow> {
        let mut shows: Vec<&TrackedShow> = self.shows.values().collect();
        shows.sort_by_key(|show| show.title.to_lowercase());
        shows
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}
