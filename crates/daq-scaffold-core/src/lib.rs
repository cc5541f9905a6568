//! DAQ Scaffold Core - Shared library for creating DUNE DAQ packages
//!
//! This library clones a freshly created, empty package repository, fills it
//! with boilerplate generated from templates (DAQModule plugins and their
//! schemas, applications, python bindings, a unit test, and the CMake build
//! manifest), and commits the result locally.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Validation, template substitution, manifest
//!   assembly, git, download, and a rollback ledger
//! - **Layer 2: Workflow Orchestration** - `PackageBuilder`, one method per step
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based progress output (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based progress module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use daq_scaffold_core::{PackageBuilder, PackageDescriptor, Settings, TemplateSet};
//!
//! let mut descriptor = PackageDescriptor::new("listrev");
//! descriptor.daq_modules.push("ReverseList".to_string());
//!
//! let templates = TemplateSet::builtin()?;
//! let mut builder = PackageBuilder::new(descriptor, Settings::from_env()?, &templates)?;
//! builder.clone_repository().await?;
//! // ... remaining steps, calling builder.rollback() on failure
//! ```

pub mod cmake;
pub mod config;
pub mod fetch;
pub mod generator;
pub mod layout;
pub mod package;
pub mod templates;
pub mod transaction;
pub mod vcs;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use cmake::{BuildManifest, Section};
pub use config::Settings;
pub use generator::{plan, Plan};
pub use package::{PackageDescriptor, ValidationError};
pub use templates::{TemplateSet, TemplateSource};
pub use transaction::Transaction;
pub use workflow::PackageBuilder;

#[cfg(feature = "tui")]
pub use tui::run;
