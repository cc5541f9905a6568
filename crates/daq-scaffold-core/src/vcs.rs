//! git operations on the package repository
//!
//! Each call runs one git subprocess to completion and turns a non-zero exit
//! into a [`VcsError`] naming the operation.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use url::Url;

/// git's exit code when the remote can't be found or the destination exists
pub const CLONE_UNAVAILABLE_EXIT_CODE: i32 = 128;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error(
        "git was either unable to find a {url} repository\n\
         or it already existed in {} and couldn't be overwritten",
        .dest.display()
    )]
    RepositoryUnavailable { url: Url, dest: PathBuf },

    #[error("Totally unexpected error (exit code {code}) occurred when running \"git clone {url}\"")]
    CloneFailed { url: Url, code: i32 },

    #[error("\"git {operation}\" failed in {} (exit code {code}): {stderr}", .dir.display())]
    CommandFailed {
        operation: String,
        dir: PathBuf,
        code: i32,
        stderr: String,
    },

    #[error("Failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs git commands
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
}

impl Default for Git {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl Git {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if git is available in PATH
    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Clone `url` into `dest`
    pub async fn clone_repo(&self, url: &Url, dest: &Path) -> Result<(), VcsError> {
        let output = TokioCommand::new(&self.program)
            .arg("clone")
            .arg(url.as_str())
            .arg(dest)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        match output.status.code() {
            Some(0) => Ok(()),
            Some(CLONE_UNAVAILABLE_EXIT_CODE) => Err(VcsError::RepositoryUnavailable {
                url: url.clone(),
                dest: dest.to_path_buf(),
            }),
            code => Err(VcsError::CloneFailed {
                url: url.clone(),
                code: code.unwrap_or(-1),
            }),
        }
    }

    /// Stage every change in the working tree
    pub async fn stage_all(&self, repo: &Path) -> Result<(), VcsError> {
        self.run(repo, &["add", "-A"]).await.map(|_| ())
    }

    /// Commit what is staged
    pub async fn commit(&self, repo: &Path, message: &str) -> Result<(), VcsError> {
        self.run(repo, &["commit", "-m", message]).await.map(|_| ())
    }

    /// Move a tracked file; paths are relative to the repository root
    pub async fn move_file(&self, repo: &Path, from: &str, to: &str) -> Result<(), VcsError> {
        self.run(repo, &["mv", from, to]).await.map(|_| ())
    }

    async fn run(&self, repo: &Path, args: &[&str]) -> Result<Output, VcsError> {
        let output = TokioCommand::new(&self.program)
            .args(args)
            .current_dir(repo)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(VcsError::CommandFailed {
                operation: args.join(" "),
                dir: repo.to_path_buf(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> VcsError {
        VcsError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}
