//! Rollback ledger for one scaffolding run
//!
//! Every directory or file the run creates, and every rename it performs, is
//! recorded. Rolling back undoes the ledger in reverse order and only ever
//! touches recorded paths, so a directory that existed before the run is never
//! removed.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// One recorded filesystem mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    CreatedDir(PathBuf),
    CreatedFile(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

/// Changes that could not be undone
#[derive(Debug, Error)]
#[error("Rollback left {} change(s) in place: {}", .failures.len(), describe(.failures))]
pub struct RollbackError {
    pub failures: Vec<(Change, io::Error)>,
}

fn describe(failures: &[(Change, io::Error)]) -> String {
    failures
        .iter()
        .map(|(change, err)| format!("{:?} ({})", change, err))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ledger of changes made by the current run
#[derive(Debug, Default)]
pub struct Transaction {
    changes: Vec<Change>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn created_dir(&mut self, path: impl Into<PathBuf>) {
        self.record(Change::CreatedDir(path.into()));
    }

    pub fn created_file(&mut self, path: impl Into<PathBuf>) {
        self.record(Change::CreatedFile(path.into()));
    }

    pub fn renamed(&mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) {
        self.record(Change::Renamed {
            from: from.into(),
            to: to.into(),
        });
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Keep everything; the ledger is cleared
    pub fn commit(&mut self) {
        self.changes.clear();
    }

    /// Undo recorded changes, newest first. Returns how many were undone.
    ///
    /// Paths that are already gone count as undone. The ledger is empty
    /// afterwards, whether or not every change could be undone.
    pub fn rollback(&mut self) -> Result<usize, RollbackError> {
        let mut undone = 0;
        let mut failures = Vec::new();

        for change in self.changes.drain(..).rev() {
            match undo(&change) {
                Ok(()) => undone += 1,
                Err(err) => failures.push((change, err)),
            }
        }

        if failures.is_empty() {
            Ok(undone)
        } else {
            Err(RollbackError { failures })
        }
    }
}

fn undo(change: &Change) -> io::Result<()> {
    let result = match change {
        Change::CreatedFile(path) => std::fs::remove_file(path),
        Change::CreatedDir(path) => std::fs::remove_dir_all(path),
        Change::Renamed { from, to } => std::fs::rename(to, from),
    };

    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_removes_only_recorded_paths() {
        let root = tempfile::tempdir().unwrap();
        let existing = root.path().join("existing.txt");
        std::fs::write(&existing, "keep me").unwrap();

        let mut tx = Transaction::new();
        let dir = root.path().join("src");
        std::fs::create_dir(&dir).unwrap();
        tx.created_dir(&dir);
        let file = dir.join("a.cpp");
        std::fs::write(&file, "").unwrap();
        tx.created_file(&file);
        let loose = root.path().join("CMakeLists.txt");
        std::fs::write(&loose, "").unwrap();
        tx.created_file(&loose);

        assert_eq!(tx.rollback().unwrap(), 3);
        assert!(!dir.exists());
        assert!(!loose.exists());
        assert!(existing.exists());
        assert!(tx.is_empty());
    }

    #[test]
    fn test_rollback_reverses_renames() {
        let root = tempfile::tempdir().unwrap();
        let from = root.path().join("README.md");
        let docs = root.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        std::fs::write(&from, "# hello").unwrap();
        let to = docs.join("README.md");
        std::fs::rename(&from, &to).unwrap();

        let mut tx = Transaction::new();
        tx.renamed(&from, &to);
        tx.rollback().unwrap();

        assert_eq!(std::fs::read_to_string(&from).unwrap(), "# hello");
        assert!(!to.exists());
    }

    #[test]
    fn test_missing_paths_count_as_undone() {
        let root = tempfile::tempdir().unwrap();
        let mut tx = Transaction::new();
        let repo = root.path().join("repo");
        std::fs::create_dir(&repo).unwrap();
        tx.created_dir(&repo);
        tx.created_file(repo.join("never-written.txt"));
        tx.created_dir(repo.join("gone"));

        assert_eq!(tx.rollback().unwrap(), 3);
        assert!(!repo.exists());
    }

    #[test]
    fn test_commit_clears_ledger() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("kept");
        std::fs::create_dir(&dir).unwrap();

        let mut tx = Transaction::new();
        tx.created_dir(&dir);
        tx.commit();

        assert_eq!(tx.rollback().unwrap(), 0);
        assert!(dir.exists());
    }
}
