//! Command handlers.
//!
//! Each handler applies one logical operation to the in-memory databases.
//! Loading, locking and saving is left to the caller, and a handler that
//! fails leaves both databases as they were.

use crate::api::{build_catalogue, MetadataProvider};
use crate::cursor::{self, SeasonEpisode};
use crate::error::{ErrorKind, Result, TrackerError};
use crate::navigator::{self, Direction};
use crate::position::TrackedPosition;
use crate::storage::Store;
use crate::tracker::{ShowDatabase, TrackedShow, TrackerDatabase};
use crate::types::{lunderize, Episode};
use crate::ui;
use crate::watchlist::read_watchlist;
use log::{info, warn};
use std::path::Path;

/// Arguments of the `add` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRequest {
    /// Show title, optionally with an embedded code (`"house s07e21"`).
    pub show: String,
    /// Explicit episode code.
    pub episode: Option<String>,
    pub note: Option<String>,
    pub short_code: Option<String>,
}

impl AddRequest {
    /// The title with any embedded code removed, and the starting code.
    ///
    /// A code embedded in the title wins over the positional one; with
    /// neither the show starts at `S01E01`.
    pub fn title_and_code(&self) -> (String, SeasonEpisode) {
        match cursor::find(&self.show) {
            Some((se, range)) => {
                let title = format!("{} {}", &self.show[..range.start], &self.show[range.end..]);
                (title.split_whitespace().collect::<Vec<_>>().join(" "), se)
            }
            None => {
                let se = cursor::parse_or_default(self.episode.as_deref().unwrap_or_default());
                (self.show.split_whitespace().collect::<Vec<_>>().join(" "), se)
            }
        }
    }
}

/// Start tracking a show, or update notes and short code of a tracked one.
pub async fn add_show<P: MetadataProvider>(
    provider: &P,
    show_db: &mut ShowDatabase,
    tracker: &mut TrackerDatabase,
    request: &AddRequest,
) -> Result<TrackedShow> {
    let (title, se) = request.title_and_code();
    if title.is_empty() {
        return Err(TrackerError::InvalidUsage("no show title given".to_string()));
    }
    let short_code = request
        .short_code
        .as_deref()
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty());
    // A tracked show may be named by its short code as well as its title.
    let key = tracker.find_key(&title).unwrap_or_else(|_| lunderize(&title));

    if let Some(existing) = tracker.shows.get(&key) {
        if request.note.is_none() && short_code.is_none() {
            return Err(TrackerError::ShowAlreadyTracked(existing.title.clone()));
        }
        if let Some(code) = &short_code {
            tracker.ensure_short_code_available(code, &key)?;
        }

        let mut updated = existing.clone();
        if request.note.is_some() {
            updated.notes = request.note.clone();
        }
        if short_code.is_some() {
            updated.short_code = short_code;
        }
        info!("Updated details of '{}'", updated.title);
        tracker.insert(updated.clone());
        return Ok(updated);
    }

    if let Some(code) = &short_code {
        tracker.ensure_short_code_available(code, &key)?;
    }

    let fetched = if show_db.contains(&key) {
        None
    } else {
        Some(build_catalogue(provider, &title).await?)
    };
    let catalogue = match &fetched {
        Some(catalogue) => catalogue,
        None => show_db.entry(&key)?,
    };

    let position = TrackedPosition::resolve(catalogue, &se.to_string())?;
    let show = TrackedShow {
        title: catalogue.title.clone(),
        key: key.clone(),
        short_code,
        notes: request.note.clone(),
        position,
    };

    if let Some(catalogue) = fetched {
        show_db.insert(catalogue);
    }
    info!("Now tracking '{}' from {}", show.title, show.position.cursor());
    tracker.insert(show.clone());
    Ok(show)
}

/// Move a tracked show forwards or backwards by `by` episodes.
pub fn step_show(
    show_db: &ShowDatabase,
    tracker: &mut TrackerDatabase,
    query: &str,
    direction: Direction,
    by: i64,
) -> Result<TrackedShow> {
    let show = tracker.get_mut(query)?;
    let catalogue = show_db.entry(&show.key)?;
    show.position = navigator::step(catalogue, &show.position, direction, by)?;
    Ok(show.clone())
}

/// What `rm` did.
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// The show was dropped from the tracker.
    Show(TrackedShow),
    /// Only the requested fields were cleared.
    Fields(TrackedShow),
}

/// Remove a show, or clear its notes and/or short code.
pub fn remove(
    tracker: &mut TrackerDatabase,
    query: &str,
    clear_note: bool,
    clear_short_code: bool,
) -> Result<Removal> {
    if !clear_note && !clear_short_code {
        let removed = tracker.remove(query)?;
        info!("Stopped tracking '{}'", removed.title);
        return Ok(Removal::Show(removed));
    }

    let show = tracker.get_mut(query)?;
    if clear_note {
        show.notes = None;
    }
    if clear_short_code {
        show.short_code = None;
    }
    Ok(Removal::Fields(show.clone()))
}

/// The next episode of a tracked show.
pub fn next_episode<'a>(
    show_db: &'a ShowDatabase,
    tracker: &TrackerDatabase,
    query: &str,
) -> Result<&'a Episode> {
    let show = tracker.get(query)?;
    let catalogue = show_db.entry(&show.key)?;

    if let Some(episode) = show.position.next_episode(catalogue) {
        return Ok(episode);
    }

    let position = show.position.reresolve(catalogue)?;
    position
        .next_episode(catalogue)
        .ok_or_else(|| TrackerError::SeasonEpisodeParse(show.position.cursor().to_string()))
}

/// Re-fetch a show's catalogue and re-resolve its position.
pub async fn refresh_show<P: MetadataProvider>(
    provider: &P,
    show_db: &mut ShowDatabase,
    tracker: &mut TrackerDatabase,
    query: &str,
) -> Result<TrackedShow> {
    let show = tracker.get(query)?;
    let mut catalogue = build_catalogue(provider, &show.lookup_title()).await?;
    catalogue.key = show.key.clone();

    let position = show.position.reresolve(&catalogue)?;
    let mut updated = show.clone();
    updated.title = catalogue.title.clone();
    updated.position = position;

    info!("Refreshed '{}': {}", updated.title, catalogue.to_display());
    show_db.insert(catalogue);
    tracker.insert(updated.clone());
    Ok(updated)
}

/// Counts reported by [`import_watchlist`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Import every line of a watchlist into the tracker.
///
/// Lines without a code, unknown shows, films and out-of-range positions are
/// logged and skipped. Network and storage failures abort the import.
pub async fn import_watchlist<P: MetadataProvider>(
    provider: &P,
    show_db: &mut ShowDatabase,
    tracker: &mut TrackerDatabase,
    path: &Path,
) -> Result<ImportReport> {
    let entries = read_watchlist(path)?;
    let mut report = ImportReport::default();

    for entry in entries {
        let Some(se) = entry.code else {
            warn!("Skipping '{}': no season-episode code", entry.title);
            report.skipped += 1;
            continue;
        };
        let key = lunderize(&entry.title);

        if !show_db.contains(&key) {
            match build_catalogue(provider, &entry.title).await {
                Ok(catalogue) => show_db.insert(catalogue),
                Err(e) if skippable(&e) => {
                    warn!("Skipping '{}': {}", entry.title, e);
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        let catalogue = show_db.entry(&key)?;
        let position = match TrackedPosition::resolve(catalogue, &se.to_string()) {
            Ok(position) => position,
            Err(e) if skippable(&e) => {
                warn!("Skipping '{}': {}", entry.title, e);
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match tracker.shows.get_mut(&key) {
            Some(show) => {
                show.position = position;
                if entry.notes.is_some() {
                    show.notes = entry.notes;
                }
                report.updated += 1;
            }
            None => {
                let mut show = TrackedShow::new(&catalogue.title, position);
                show.key = key;
                show.notes = entry.notes;
                tracker.insert(show);
                report.imported += 1;
            }
        }
    }

    info!(
        "Imported watchlist {}: {} new, {} updated, {} skipped",
        path.display(),
        report.imported,
        report.updated,
        report.skipped
    );
    Ok(report)
}

fn skippable(error: &TrackerError) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Lookup | ErrorKind::Bounds | ErrorKind::Parse
    )
}

/// Render the `--list` table from the databases in `store`.
///
/// Fails with a usage error if there is no tracker database yet.
pub fn list_table(store: &Store) -> Result<String> {
    let Some(tracker) = store.load_tracker()? else {
        return Err(TrackerError::InvalidUsage(format!(
            "no tracker database in {}; add a show or import a watchlist first",
            store.dir().display()
        )));
    };
    let show_db = store.load_show_database()?.unwrap_or_default();
    Ok(ui::render_table(&show_db, &tracker))
}
