//! Repository skeleton: package directories, `.gitkeep` markers, and the
//! emptiness check on a freshly cloned repository

use crate::transaction::Transaction;
use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Marker that keeps an otherwise empty directory in git
pub const GITKEEP: &str = ".gitkeep";

/// Top-level entries a repository may have before scaffolding
const PRISTINE_LAYOUTS: &[&[&str]] = &[&[".git"], &[".git", "README.md"], &[".git", "docs"]];

/// The cloned repository already has work in it
#[derive(Debug, Error)]
#[error(
    "The repository cloned into {} already has content ({}).\n\
     Packages can only be generated in repositories which haven't yet been worked on.",
    .dir.display(),
    .entries.join(", ")
)]
pub struct NotEmptyError {
    pub dir: PathBuf,
    pub entries: Vec<String>,
}

/// Sorted top-level entry names of `dir`
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Fail unless `repo_dir` holds nothing but `.git` and optionally a README
/// or a `docs/` directory
pub fn check_pristine(repo_dir: &Path) -> Result<()> {
    let entries = list_entries(repo_dir)?;
    let pristine = PRISTINE_LAYOUTS
        .iter()
        .any(|layout| layout.iter().copied().eq(entries.iter().map(String::as_str)));

    if pristine {
        Ok(())
    } else {
        Err(NotEmptyError {
            dir: repo_dir.to_path_buf(),
            entries,
        }
        .into())
    }
}

/// Create `root/relative` and any missing parents, recording each directory
/// this call creates. A `.gitkeep` is added to the leaf if it has none.
pub fn make_package_dir(root: &Path, relative: &Path, tx: &mut Transaction) -> Result<PathBuf> {
    let mut dir = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => dir.push(part),
            _ => anyhow::bail!(
                "Package directory {} must be a plain relative path",
                relative.display()
            ),
        }
        if !dir.is_dir() {
            std::fs::create_dir(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            tx.created_dir(&dir);
        }
    }

    let gitkeep = dir.join(GITKEEP);
    if !gitkeep.exists() {
        std::fs::write(&gitkeep, "")
            .with_context(|| format!("Failed to write file: {}", gitkeep.display()))?;
        tx.created_file(&gitkeep);
    }

    Ok(dir)
}

/// Remove `.gitkeep` from every directory under `root` that holds anything
/// else. The `.git` directory is not visited. Returns the removed markers.
pub fn prune_gitkeeps(root: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    let dirs = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir());

    for entry in dirs {
        let gitkeep = entry.path().join(GITKEEP);
        if !gitkeep.is_file() {
            continue;
        }
        if list_entries(entry.path())? != [GITKEEP] {
            std::fs::remove_file(&gitkeep)
                .with_context(|| format!("Failed to remove {}", gitkeep.display()))?;
            removed.push(gitkeep);
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Change;

    fn repo_with(entries: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        for entry in entries {
            if entry.ends_with('/') {
                std::fs::create_dir(dir.path().join(entry)).unwrap();
            } else {
                std::fs::write(dir.path().join(entry), "").unwrap();
            }
        }
        dir
    }

    #[test]
    fn test_pristine_layouts_accepted() {
        for entries in [&[][..], &["README.md"][..], &["docs/"][..]] {
            let repo = repo_with(entries);
            check_pristine(repo.path()).unwrap();
        }
    }

    #[test]
    fn test_populated_repository_rejected() {
        let repo = repo_with(&["README.md", "CMakeLists.txt"]);
        let err = check_pristine(repo.path()).unwrap_err();
        let not_empty = err.downcast_ref::<NotEmptyError>().unwrap();
        assert_eq!(not_empty.entries, vec![".git", "CMakeLists.txt", "README.md"]);
        assert!(err.to_string().contains("already has content"));
    }

    #[test]
    fn test_missing_git_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_pristine(dir.path()).is_err());
    }

    #[test]
    fn test_make_package_dir_records_new_directories() {
        let root = tempfile::tempdir().unwrap();
        let mut tx = Transaction::new();

        let dir = make_package_dir(root.path(), Path::new("test/apps"), &mut tx).unwrap();
        assert_eq!(dir, root.path().join("test/apps"));
        assert!(dir.join(GITKEEP).is_file());
        assert!(!root.path().join("test").join(GITKEEP).exists());
        assert_eq!(
            tx.changes(),
            &[
                Change::CreatedDir(root.path().join("test")),
                Change::CreatedDir(root.path().join("test/apps")),
                Change::CreatedFile(root.path().join("test/apps").join(GITKEEP)),
            ]
        );

        // Second call is a no-op
        make_package_dir(root.path(), Path::new("test/apps"), &mut tx).unwrap();
        assert_eq!(tx.changes().len(), 3);
    }

    #[test]
    fn test_make_package_dir_rejects_escaping_paths() {
        let root = tempfile::tempdir().unwrap();
        let mut tx = Transaction::new();
        assert!(make_package_dir(root.path(), Path::new("../elsewhere"), &mut tx).is_err());
        assert!(tx.is_empty());
    }

    #[test]
    fn test_prune_only_non_empty_dirs() {
        let root = tempfile::tempdir().unwrap();
        let mut tx = Transaction::new();
        let src = make_package_dir(root.path(), Path::new("src"), &mut tx).unwrap();
        let docs = make_package_dir(root.path(), Path::new("docs"), &mut tx).unwrap();
        std::fs::write(docs.join("README.md"), "# docs").unwrap();
        std::fs::create_dir_all(root.path().join(".git/objects")).unwrap();
        std::fs::write(root.path().join(".git/objects").join(GITKEEP), "").unwrap();

        let removed = prune_gitkeeps(root.path()).unwrap();

        assert_eq!(removed, vec![docs.join(GITKEEP)]);
        assert!(src.join(GITKEEP).exists());
        assert!(root.path().join(".git/objects").join(GITKEEP).exists());
    }
}
