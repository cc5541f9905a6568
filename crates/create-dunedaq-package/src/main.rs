//! create-dunedaq-package - Boilerplate generation for new DUNE DAQ packages

use anyhow::Result;
use clap::Parser;
use daq_scaffold_core::tui::{CreateArgs, Reported};
use std::path::PathBuf;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

const AFTER_HELP: &str = "\
The package's repository must already exist on GitHub under DUNE-DAQ and be empty
apart from an optional README.md or docs/ directory. It is cloned into
$DBT_AREA_ROOT/sourcecode/<PACKAGE>, filled with boilerplate, and committed locally;
nothing is pushed.

Module and application names must follow the DUNE DAQ style guide:
https://dune-daq-sw.readthedocs.io/en/latest/packages/styleguide/

Full documentation:
https://dune-daq-sw.readthedocs.io/en/latest/packages/daq-cmake/";

#[derive(Parser, Debug)]
#[command(name = "create-dunedaq-package")]
#[command(about = "Generate the boilerplate for a new DUNE DAQ package")]
#[command(after_help = AFTER_HELP)]
#[command(version)]
pub struct Args {
    /// Name of the package; its repository must be empty
    pub package: String,

    /// Generate the package's main library
    #[arg(long = "main-library")]
    pub main_library: bool,

    /// Generate python bindings for the main library (requires --main-library)
    #[arg(long = "python-bindings", requires = "main_library")]
    pub python_bindings: bool,

    /// DAQModule to generate, e.g. ReverseList (repeatable)
    #[arg(long = "daq-module", value_name = "NAME")]
    pub daq_modules: Vec<String>,

    /// User application to generate, e.g. list_app (repeatable)
    #[arg(long = "user-app", value_name = "NAME")]
    pub user_apps: Vec<String>,

    /// Test application to generate, e.g. list_test (repeatable)
    #[arg(long = "test-app", value_name = "NAME")]
    pub test_apps: Vec<String>,

    /// Local directory to use for templates instead of the built-in set (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            package: args.package,
            main_library: args.main_library,
            python_bindings: args.python_bindings,
            daq_modules: args.daq_modules,
            user_apps: args.user_apps,
            test_apps: args.test_apps,
            template_dir: args.template_dir,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    // Recorded verbatim in the commit message
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let args = Args::parse();

    let result = daq_scaffold_core::run(args.into(), CLI_VERSION, &command_line).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    // Already shown by the progress output
    if let Err(err) = &result {
        if err.is::<Reported>() {
            std::process::exit(1);
        }
    }

    result
}
