//! Docset search index (`docSet.dsidx`).
//!
//! The index is a SQLite database with a single `searchIndex` table. Paths are
//! unique; inserting a path that already exists is a no-op, which keeps
//! repeated runs over the same tree free of duplicates.

use std::path::{Path, PathBuf};

use docset_md::entry_name;
use rusqlite::{params, Connection, Transaction};
use walkdir::WalkDir;

use crate::builder::BuildError;

/// Extension of rendered pages picked up by the scan.
const HTML_EXTENSION: &str = ".html";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);
    CREATE UNIQUE INDEX IF NOT EXISTS anchor ON searchIndex (path);
";

const INSERT_SQL: &str = "INSERT OR IGNORE INTO searchIndex(name, type, path) VALUES (?1, ?2, ?3)";

/// One row of the search index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexEntry {
    /// Entry name shown in the docset browser
    pub name: String,

    /// Entry type (the category name)
    pub entry_type: String,

    /// Page path relative to `Documents/`
    pub path: String,
}

impl IndexEntry {
    /// Build the entry for a rendered file inside a category directory.
    pub fn for_file(category: &str, file_name: &str) -> Self {
        Self {
            name: entry_name(file_name).to_string(),
            entry_type: category.to_string(),
            path: format!("{}/{}", category, file_name),
        }
    }
}

/// Result of inserting a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,

    /// A row with the same path already exists; nothing was written.
    DuplicateIgnored,

    /// The insert failed for another reason.
    InsertFailed(String),
}

/// Counters for an index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Rows written
    pub inserted: usize,

    /// Entries skipped because their path was already indexed
    pub duplicates: usize,

    /// Entries whose insert failed
    pub failed: usize,
}

impl IndexReport {
    fn record(&mut self, outcome: &InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::DuplicateIgnored => self.duplicates += 1,
            InsertOutcome::InsertFailed(_) => self.failed += 1,
        }
    }

    fn merge(&mut self, other: IndexReport) {
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
    }
}

/// Handle to an open search index.
///
/// The connection is closed by [`SearchIndex::close`], or on drop when a
/// build bails out early.
pub struct SearchIndex {
    conn: Connection,
}

impl SearchIndex {
    /// Open or create the index at `path` and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, BuildError> {
        let conn = Connection::open(path)
            .map_err(|e| BuildError::IndexError(format!("{}: {}", path.display(), e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Insert all entries of one category inside a single transaction.
    ///
    /// Duplicates and failed inserts never abort the transaction; failures are
    /// logged with the entry that caused them.
    pub fn insert_category(
        &mut self,
        category: &str,
        entries: &[IndexEntry],
    ) -> Result<IndexReport, BuildError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        let mut report = IndexReport::default();

        for entry in entries {
            let outcome = insert(&tx, entry);

            match &outcome {
                InsertOutcome::Inserted => {}
                InsertOutcome::DuplicateIgnored => {
                    tracing::debug!(path = %entry.path, "Duplicate index entry ignored");
                }
                InsertOutcome::InsertFailed(reason) => {
                    tracing::error!(
                        category,
                        name = %entry.name,
                        entry_type = %entry.entry_type,
                        path = %entry.path,
                        "Failed to insert index entry: {}",
                        reason
                    );
                }
            }

            report.record(&outcome);
        }

        tx.commit()
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        Ok(report)
    }

    /// All rows, ordered by path.
    pub fn entries(&self) -> Result<Vec<IndexEntry>, BuildError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type, path FROM searchIndex ORDER BY path")
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(IndexEntry {
                    name: row.get(0)?,
                    entry_type: row.get(1)?,
                    path: row.get(2)?,
                })
            })
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        let entries = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BuildError::IndexError(e.to_string()))?;

        Ok(entries)
    }

    /// Close the underlying connection.
    pub fn close(self) -> Result<(), BuildError> {
        self.conn
            .close()
            .map_err(|(_, e)| BuildError::IndexError(e.to_string()))
    }
}

fn insert(tx: &Transaction<'_>, entry: &IndexEntry) -> InsertOutcome {
    let result = tx
        .prepare_cached(INSERT_SQL)
        .and_then(|mut stmt| stmt.execute(params![entry.name, entry.entry_type, entry.path]));

    match result {
        Ok(0) => InsertOutcome::DuplicateIgnored,
        Ok(_) => InsertOutcome::Inserted,
        Err(e) => InsertOutcome::InsertFailed(e.to_string()),
    }
}

/// Collect index entries from the rendered `Documents/` tree, grouped by
/// category.
///
/// Only `.html` files directly inside a category directory count; anything at
/// the top level of `documents_dir` that is not a directory is skipped.
pub fn scan_documents(documents_dir: &Path) -> Result<Vec<(String, Vec<IndexEntry>)>, BuildError> {
    let mut categories = Vec::new();

    for dir in WalkDir::new(documents_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let dir = dir.map_err(|e| BuildError::ReadError(e.to_string()))?;
        if !dir.file_type().is_dir() {
            continue;
        }

        let category = dir.file_name().to_string_lossy().into_owned();
        let mut entries = Vec::new();

        for file in WalkDir::new(dir.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let file = file.map_err(|e| BuildError::ReadError(e.to_string()))?;
            let file_name = file.file_name().to_string_lossy();

            if file.file_type().is_file() && file_name.ends_with(HTML_EXTENSION) {
                entries.push(IndexEntry::for_file(&category, &file_name));
            }
        }

        categories.push((category, entries));
    }

    Ok(categories)
}

/// Scan `documents_dir` and write every rendered page into the index at
/// `index_path`.
///
/// Must only run once every page has been written. The SQLite work happens on
/// the blocking pool.
pub async fn build_index(
    index_path: PathBuf,
    documents_dir: PathBuf,
) -> Result<IndexReport, BuildError> {
    tokio::task::spawn_blocking(move || -> Result<IndexReport, BuildError> {
        let categories = scan_documents(&documents_dir)?;
        let mut index = SearchIndex::open(&index_path)?;
        let mut report = IndexReport::default();

        for (category, entries) in &categories {
            let category_report = index.insert_category(category, entries)?;
            tracing::debug!(
                category = %category,
                inserted = category_report.inserted,
                duplicates = category_report.duplicates,
                "Indexed category"
            );
            report.merge(category_report);
        }

        index.close()?;

        Ok(report)
    })
    .await
    .map_err(|e| BuildError::TaskError(format!("Index build task failed: {}", e)))?
}
