//! On-disk persistence for the show and tracker databases.
//!
//! Each database is a pretty-printed JSON document with an explicit type
//! tag and schema version:
//!
//! ```json
//! { "type": "tracker_database", "schema_version": 1, "shows": { ... } }
//! ```
//!
//! Writes go to a temporary file that is renamed over the target, and
//! mutating commands hold a [`DatabaseLock`] for their whole
//! read-modify-write cycle.

use crate::error::{Result, TrackerError};
use crate::tracker::{ShowDatabase, TrackedShow, TrackerDatabase};
use crate::types::ShowCatalogue;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of the show database.
pub const SHOW_DB_FILE: &str = ".showdb.json";

/// File name of the tracker database.
pub const TRACKER_FILE: &str = ".tracker.json";

const LOCK_FILE: &str = ".lock";

/// A stored database document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Document {
    ShowDatabase {
        schema_version: u32,
        shows: BTreeMap<String, ShowCatalogue>,
    },
    TrackerDatabase {
        schema_version: u32,
        shows: BTreeMap<String, TrackedShow>,
    },
}

impl Document {
    fn schema_version(&self) -> u32 {
        match self {
            Document::ShowDatabase { schema_version, .. }
            | Document::TrackerDatabase { schema_version, .. } => *schema_version,
        }
    }
}

/// The directory holding both databases.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default database directory, `~/.showtracker`.
    pub fn default_dir() -> std::result::Result<PathBuf, io::Error> {
        let home = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find home directory")
        })?;
        Ok(home.join(".showtracker"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn show_db_path(&self) -> PathBuf {
        self.dir.join(SHOW_DB_FILE)
    }

    pub fn tracker_path(&self) -> PathBuf {
        self.dir.join(TRACKER_FILE)
    }

    /// Load the show database.
    ///
    /// Returns `None` if the file doesn't exist.
    pub fn load_show_database(&self) -> Result<Option<ShowDatabase>> {
        let path = self.show_db_path();
        match read_document(&path)? {
            None => Ok(None),
            Some(Document::ShowDatabase { shows, .. }) => Ok(Some(ShowDatabase { shows })),
            Some(_) => Err(TrackerError::Schema {
                path,
                reason: "expected a show_database document".to_string(),
            }),
        }
    }

    /// Load the tracker database.
    ///
    /// Returns `None` if the file doesn't exist.
    pub fn load_tracker(&self) -> Result<Option<TrackerDatabase>> {
        let path = self.tracker_path();
        match read_document(&path)? {
            None => Ok(None),
            Some(Document::TrackerDatabase { shows, .. }) => Ok(Some(TrackerDatabase { shows })),
            Some(_) => Err(TrackerError::Schema {
                path,
                reason: "expected a tracker_database document".to_string(),
            }),
        }
    }

    /// Load both databases, substituting empty ones for missing files.
    pub fn load_all(&self) -> Result<(ShowDatabase, TrackerDatabase)> {
        let show_db = self.load_show_database()?.unwrap_or_default();
        let tracker = self.load_tracker()?.unwrap_or_default();
        Ok((show_db, tracker))
    }

    /// Save the show database.
    pub fn save_show_database(&self, db: &ShowDatabase) -> Result<()> {
        let doc = Document::ShowDatabase {
            schema_version: SCHEMA_VERSION,
            shows: db.shows.clone(),
        };
        write_document(&self.show_db_path(), &doc)
    }

    /// Save the tracker database.
    pub fn save_tracker(&self, db: &TrackerDatabase) -> Result<()> {
        let doc = Document::TrackerDatabase {
            schema_version: SCHEMA_VERSION,
            shows: db.shows.clone(),
        };
        write_document(&self.tracker_path(), &doc)
    }

    /// Save both databases.
    pub fn save_all(&self, show_db: &ShowDatabase, tracker: &TrackerDatabase) -> Result<()> {
        self.save_show_database(show_db)?;
        self.save_tracker(tracker)?;
        info!("Saved databases to {}", self.dir.display());
        Ok(())
    }

    /// Take the advisory lock for this directory.
    pub fn lock(&self) -> Result<DatabaseLock> {
        DatabaseLock::acquire(&self.dir)
    }
}

fn read_document(path: &Path) -> Result<Option<Document>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let doc: Document = serde_json::from_str(&content).map_err(|e| TrackerError::Schema {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if doc.schema_version() != SCHEMA_VERSION {
        return Err(TrackerError::Schema {
            path: path.to_path_buf(),
            reason: format!(
                "schema version {} is not supported (expected {})",
                doc.schema_version(),
                SCHEMA_VERSION
            ),
        });
    }

    debug!("Loaded {}", path.display());
    Ok(Some(doc))
}

fn write_document(path: &Path, doc: &Document) -> Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Exclusive advisory lock on a database directory.
///
/// The lock is a `.lock` file created with `create_new`; it is removed when
/// the guard is dropped.
#[derive(Debug)]
pub struct DatabaseLock {
    path: PathBuf,
}

impl DatabaseLock {
    pub fn acquire(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                debug!("Acquired lock {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(TrackerError::DatabaseLocked(path))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
