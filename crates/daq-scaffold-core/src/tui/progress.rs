//! Step-by-step progress output for package creation

use crate::config::Settings;
use crate::package::PackageDescriptor;
use crate::templates::{version, TemplateSet, TemplateSource};
use crate::workflow::{self, DocsOutcome, PackageBuilder};
use anyhow::Result;
use cliclack::ProgressBar;
use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Style guide and daq-cmake docs, shown once the package exists
const NEXT_STEP_DOCS: &str = "https://dune-daq-sw.readthedocs.io/en/latest/packages/daq-cmake/";

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Name of the package, and of its repository
    pub package: String,

    /// Generate the package's main library
    pub main_library: bool,

    /// Generate python bindings for the main library
    pub python_bindings: bool,

    /// DAQModule plugins to generate
    pub daq_modules: Vec<String>,

    /// User applications to generate
    pub user_apps: Vec<String>,

    /// Test applications to generate
    pub test_apps: Vec<String>,

    /// Local directory to use for templates instead of the built-in set
    pub template_dir: Option<PathBuf>,
}

impl CreateArgs {
    pub fn descriptor(&self) -> PackageDescriptor {
        PackageDescriptor {
            name: self.package.clone(),
            main_library: self.main_library,
            python_bindings: self.python_bindings,
            daq_modules: self.daq_modules.clone(),
            user_apps: self.user_apps.clone(),
            test_apps: self.test_apps.clone(),
        }
    }
}

/// An error that has already been shown to the user
#[derive(Debug, Error)]
#[error("{0:#}")]
pub struct Reported(pub anyhow::Error);

/// Create the package, reporting each step. On failure everything this run
/// created is removed again, and the error is shown before being returned
/// wrapped in [`Reported`].
pub async fn run(args: CreateArgs, cli_version: &str, command_line: &str) -> Result<()> {
    cliclack::intro(workflow::TOOL_NAME)?;

    match create(&args, cli_version, command_line).await {
        Ok(builder) => print_next_steps(&builder),
        Err(err) => {
            let reported = match err.downcast::<Reported>() {
                Ok(reported) => reported,
                Err(err) => {
                    cliclack::log::error(format!("{:#}", err))?;
                    Reported(err)
                }
            };
            cliclack::outro_cancel(format!("{} was not created", args.package))?;
            Err(reported.into())
        }
    }
}

async fn create(
    args: &CreateArgs,
    cli_version: &str,
    command_line: &str,
) -> Result<PackageBuilder> {
    // Step 1: Environment
    let settings = Settings::from_env()?;
    cliclack::log::info(format!(
        "Work area: {} (daq-buildtools in {})",
        settings.area_root.display(),
        settings.tools_root.display()
    ))?;

    // Step 2: Templates
    let templates = load_templates(args.template_dir.clone(), cli_version)?;

    // Step 3: Validate and plan; nothing is on disk yet
    let mut builder = PackageBuilder::new(args.descriptor(), settings, &templates)?;

    // Step 4: Generate, rolling back on any failure
    if let Err(err) = create_package(&mut builder, command_line).await {
        cliclack::log::error(format!("{:#}", err))?;
        undo(&mut builder)?;
        return Err(Reported(err).into());
    }

    Ok(builder)
}

fn load_templates(template_dir: Option<PathBuf>, cli_version: &str) -> Result<TemplateSet> {
    let source = TemplateSource::from_option(template_dir);
    cliclack::log::info(format!("Using {}", source))?;

    let templates = TemplateSet::load(source)?;
    if let Some(warning) = version::check_compatibility(cli_version, &templates.manifest().version)
    {
        cliclack::log::warning(format!(
            "Version warning: {}",
            warning.lines().next().unwrap_or(&warning)
        ))?;
    }

    Ok(templates)
}

async fn create_package(builder: &mut PackageBuilder, command_line: &str) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start(format!("Cloning {}...", builder.repo_url()));
    let cloned = builder.clone_repository().await;
    finish(&spinner, cloned, "Clone failed")?;
    spinner.stop(format!("Cloned into {}", builder.repo_dir().display()));

    builder.ensure_pristine()?;

    let written = builder.generate()?;
    cliclack::log::success(format!("Generated {} files from templates", written))?;

    match builder.place_documentation().await? {
        DocsOutcome::Placeholder(path) => {
            cliclack::log::info(format!("Wrote placeholder {}", path.display()))?
        }
        DocsOutcome::Moved(path) => {
            cliclack::log::info(format!("Moved README.md to {}", path.display()))?
        }
        DocsOutcome::Existing(_) => {}
    }

    let spinner = cliclack::spinner();
    spinner.start("Downloading CMake package config...");
    let fetched = builder.fetch_cmake_config().await;
    let config_path = finish(&spinner, fetched, "Download failed")?;
    spinner.stop(format!("Downloaded {}", config_path.display()));

    let manifest = builder.write_build_manifest(&workflow::generation_date())?;
    cliclack::log::success(format!("Wrote {}", manifest.display()))?;

    builder.prune_placeholders()?;

    let spinner = cliclack::spinner();
    spinner.start("Committing locally...");
    let committed = builder.commit(command_line).await;
    finish(&spinner, committed, "Commit failed")?;
    spinner.stop("Committed locally");

    Ok(())
}

/// Stop `spinner` if `result` is an error, then pass it through
fn finish<T>(spinner: &ProgressBar, result: Result<T>, failed: &str) -> Result<T> {
    if result.is_err() {
        spinner.stop(failed);
    }
    result
}

fn undo(builder: &mut PackageBuilder) -> Result<()> {
    match builder.rollback() {
        Ok(0) => {}
        Ok(undone) => cliclack::log::warning(format!(
            "Rolled back {} change(s) made in {}",
            undone,
            builder.repo_dir().display()
        ))?,
        Err(err) => cliclack::log::error(format!(
            "{}\nYou may need to clean up {} by hand",
            err,
            builder.repo_dir().display()
        ))?,
    }
    Ok(())
}

fn print_next_steps(builder: &PackageBuilder) -> Result<()> {
    let package = &builder.descriptor().name;

    println!();
    println!("  {}", "Next steps".bold());
    println!();
    println!("  1.  cd {}", builder.repo_dir().display());
    println!(
        "  2.  Review the generated code, then {}",
        "git push".cyan()
    );
    println!("  3.  Build the work area with {}", "dbt-build".cyan());
    println!("  4.  See {}", NEXT_STEP_DOCS.underline());
    println!();

    cliclack::outro(format!("{} is ready", package))?;

    Ok(())
}
