//! Terminal output for the showtracker CLI.
//!
//! This module renders the `--list` table of next episodes.

use crate::tracker::{ShowDatabase, TrackedShow, TrackerDatabase};
use crate::types::Episode;
use std::fmt::Write;

/// Spaces after every cell.
const PADDING: usize = 3;

const HEADERS: [&str; 4] = ["Show", "Next episode", "Rating", "Title"];

/// Width reserved for the episode code and rating columns.
const FIXED_WIDTH: usize = 6;

const UNRESOLVED: &str = "(unresolved)";

/// One rendered row of the table.
struct Row {
    show: String,
    code: String,
    rating: String,
    title: String,
}

impl Row {
    fn new(show: &TrackedShow, next: Option<&Episode>) -> Self {
        match next {
            Some(ep) => Row {
                show: show.title.clone(),
                code: crate::cursor::format(ep.season, ep.episode_number),
                rating: format_rating(ep.imdb_rating()),
                title: ep.title.clone(),
            },
            None => Row {
                show: show.title.clone(),
                code: show.position.cursor().to_string(),
                rating: format_rating(None),
                title: UNRESOLVED.to_string(),
            },
        }
    }

    fn cells(&self) -> [&str; 4] {
        [&self.show, &self.code, &self.rating, &self.title]
    }
}

/// Format a rating with one decimal, or `N/A`.
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{:.1}", r),
        None => "N/A".to_string(),
    }
}

/// Render the table of tracked shows and their next episodes.
///
/// Rows are sorted by show title. Shows whose catalogue is missing or whose
/// cursor doesn't resolve are listed with their raw cursor.
///
/// # Examples
///
/// ```
/// use showtracker::tracker::{ShowDatabase, TrackerDatabase};
/// use showtracker::ui::render_table;
///
/// let table = render_table(&ShowDatabase::new(), &TrackerDatabase::new());
/// assert!(table.starts_with("Show   Next episode   Rating   Title   \n"));
/// ```
pub fn render_table(show_db: &ShowDatabase, tracker: &TrackerDatabase) -> String {
    let rows: Vec<Row> = tracker
        .sorted()
        .into_iter()
        .map(|show| {
            let next = show_db
                .shows
                .get(&show.key)
                .and_then(|catalogue| show.position.next_episode(catalogue));
            Row::new(show, next)
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    widths[1] = widths[1].max(FIXED_WIDTH);
    widths[2] = widths[2].max(FIXED_WIDTH);
    for row in &rows {
        widths[0] = widths[0].max(row.show.chars().count());
        widths[3] = widths[3].max(row.title.chars().count());
    }

    let mut out = String::new();
    for (header, width) in HEADERS.iter().zip(widths) {
        let _ = write!(out, "{:<width$}{:pad$}", header, "", pad = PADDING);
    }
    out.push('\n');

    for width in widths {
        let _ = write!(out, "{:-<w$}{:pad$}", "", "", w = width + 1, pad = PADDING - 1);
    }
    out.push('\n');

    for row in &rows {
        for (cell, width) in row.cells().iter().zip(widths) {
            let _ = write!(out, "{:<width$}{:pad$}", cell, "", pad = PADDING);
        }
        out.push('\n');
    }

    out
}
