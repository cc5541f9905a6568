//! Package creation workflow
//!
//! [`PackageBuilder`] exposes each step of creating a package as its own
//! method so a UI can report progress between them. Every step records what
//! it creates; when a step fails the caller is expected to call
//! [`PackageBuilder::rollback`].
//!
//! Typical order:
//!
//! 1. [`PackageBuilder::new`] validates the request and plans every file
//! 2. [`clone_repository`](PackageBuilder::clone_repository)
//! 3. [`ensure_pristine`](PackageBuilder::ensure_pristine)
//! 4. [`generate`](PackageBuilder::generate)
//! 5. [`place_documentation`](PackageBuilder::place_documentation)
//! 6. [`fetch_cmake_config`](PackageBuilder::fetch_cmake_config)
//! 7. [`write_build_manifest`](PackageBuilder::write_build_manifest)
//! 8. [`prune_placeholders`](PackageBuilder::prune_placeholders)
//! 9. [`commit`](PackageBuilder::commit)

use crate::config::Settings;
use crate::fetch::Downloader;
use crate::generator::{self, Plan};
use crate::layout;
use crate::package::PackageDescriptor;
use crate::templates::TemplateSet;
use crate::transaction::{RollbackError, Transaction};
use crate::vcs::Git;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Name the generated commit message attributes the boilerplate to
pub const TOOL_NAME: &str = "create-dunedaq-package";

/// File the build manifest is written to
pub const BUILD_MANIFEST_FILE: &str = "CMakeLists.txt";

const README: &str = "README.md";
const DOCS_DIR: &str = "docs";

/// What happened to the package documentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsOutcome {
    /// A placeholder `docs/README.md` was written
    Placeholder(PathBuf),
    /// The repository's `README.md` was moved into `docs/`
    Moved(PathBuf),
    /// `docs/README.md` was already there
    Existing(PathBuf),
}

/// Date as written into generated files, e.g. `Sun Oct 18 14:03:12 +02:00 2026`.
/// The local time zone is given as its UTC offset.
pub fn generation_date() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Z %Y").to_string()
}

/// Message of the commit holding the generated boilerplate
pub fn commit_message(package: &str, command_line: &str) -> String {
    format!(
        "This {}-generated boilerplate for the {} package was created by this command: {}",
        TOOL_NAME, package, command_line
    )
}

/// Drives the creation of one package
pub struct PackageBuilder {
    descriptor: PackageDescriptor,
    settings: Settings,
    plan: Plan,
    repo_url: Url,
    repo_dir: PathBuf,
    git: Git,
    downloader: Downloader,
    transaction: Transaction,
}

impl PackageBuilder {
    /// Validate the request and plan every generated file. Nothing is touched
    /// on disk.
    pub fn new(
        descriptor: PackageDescriptor,
        settings: Settings,
        templates: &TemplateSet,
    ) -> Result<Self> {
        let plan = generator::plan(&descriptor, templates)?;
        let repo_url = settings.repo_url(&descriptor.name)?;
        let repo_dir = settings.repo_dir(&descriptor.name);

        Ok(Self {
            descriptor,
            settings,
            plan,
            repo_url,
            repo_dir,
            git: Git::new(),
            downloader: Downloader::new(TOOL_NAME),
            transaction: Transaction::new(),
        })
    }

    /// Use a specific git driver
    pub fn with_git(mut self, git: Git) -> Self {
        self.git = git;
        self
    }

    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn repo_url(&self) -> &Url {
        &self.repo_url
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Clone the package's remote repository into the work area
    pub async fn clone_repository(&mut self) -> Result<()> {
        let source_dir = self.settings.source_dir();
        if !source_dir.is_dir() {
            anyhow::bail!(
                "The work area source directory {} doesn't exist",
                source_dir.display()
            );
        }

        let existed = self.repo_dir.exists();
        self.git.clone_repo(&self.repo_url, &self.repo_dir).await?;
        if !existed {
            self.transaction.created_dir(&self.repo_dir);
        }
        Ok(())
    }

    /// Fail if the clone already has content
    pub fn ensure_pristine(&self) -> Result<()> {
        layout::check_pristine(&self.repo_dir)
    }

    /// Create the package directories and write every instantiated template.
    /// Returns the number of files written.
    pub fn generate(&mut self) -> Result<usize> {
        let written = self.plan.write(&self.repo_dir, &mut self.transaction)?;
        Ok(written.len())
    }

    /// Make sure the package documentation lives in `docs/README.md`
    pub async fn place_documentation(&mut self) -> Result<DocsOutcome> {
        let docs_readme = self.repo_dir.join(DOCS_DIR).join(README);
        let root_readme = self.repo_dir.join(README);

        if docs_readme.exists() {
            return Ok(DocsOutcome::Existing(docs_readme));
        }

        layout::make_package_dir(&self.repo_dir, Path::new(DOCS_DIR), &mut self.transaction)?;

        if root_readme.exists() {
            let target = format!("{}/{}", DOCS_DIR, README);
            self.git
                .move_file(&self.repo_dir, README, &target)
                .await
                .with_context(|| {
                    format!(
                        "There was a problem attempting a git mv of {} to {} in {}",
                        README,
                        target,
                        self.repo_dir.display()
                    )
                })?;
            self.transaction.renamed(&root_readme, &docs_readme);
            return Ok(DocsOutcome::Moved(docs_readme));
        }

        std::fs::write(
            &docs_readme,
            format!(
                "# No Official User Documentation Has Been Written Yet ({})\n",
                generation_date()
            ),
        )
        .with_context(|| format!("Failed to write file: {}", docs_readme.display()))?;
        self.transaction.created_file(&docs_readme);
        Ok(DocsOutcome::Placeholder(docs_readme))
    }

    /// Download the CMake package config template into `cmake/`
    pub async fn fetch_cmake_config(&mut self) -> Result<PathBuf> {
        let cmake_dir = layout::make_package_dir(
            &self.repo_dir,
            Path::new("cmake"),
            &mut self.transaction,
        )?;
        let dest = cmake_dir.join(format!("{}Config.cmake.in", self.descriptor.name));

        let existed = dest.exists();
        self.downloader
            .download(&self.settings.cmake_config_url, &dest)
            .await?;
        if !existed {
            self.transaction.created_file(&dest);
        }
        Ok(dest)
    }

    /// Render the build manifest into `CMakeLists.txt` at the repository root
    pub fn write_build_manifest(&mut self, generated_on: &str) -> Result<PathBuf> {
        let path = self.repo_dir.join(BUILD_MANIFEST_FILE);
        let existed = path.exists();
        std::fs::write(&path, self.plan.manifest.render(generated_on))
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        if !existed {
            self.transaction.created_file(&path);
        }
        Ok(path)
    }

    /// Drop `.gitkeep` markers from directories that have real content.
    /// Returns how many were removed.
    pub fn prune_placeholders(&mut self) -> Result<usize> {
        Ok(layout::prune_gitkeeps(&self.repo_dir)?.len())
    }

    /// Stage and commit everything locally. The run can no longer be rolled
    /// back afterwards.
    pub async fn commit(&mut self, command_line: &str) -> Result<()> {
        self.git.stage_all(&self.repo_dir).await.with_context(|| {
            format!(
                "There was a problem trying to \"git add\" the newly-created files and directories in {}",
                self.repo_dir.display()
            )
        })?;
        self.git
            .commit(
                &self.repo_dir,
                &commit_message(&self.descriptor.name, command_line),
            )
            .await
            .with_context(|| {
                format!(
                    "There was a problem trying to commit the newly generated files in {}",
                    self.repo_dir.display()
                )
            })?;
        self.transaction.commit();
        Ok(())
    }

    /// Undo everything this run created. Returns the number of changes undone.
    pub fn rollback(&mut self) -> Result<usize, RollbackError> {
        self.transaction.rollback()
    }
}
