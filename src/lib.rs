//! Pattern Lab Installer - package install hooks
//!
//! Pattern Lab packages (pattern engines, starterkits, styleguidekits,
//! plug-ins) ship assets that have to land in the host project and config
//! options the project should pick up. This crate runs at two points of the
//! package manager's lifecycle to take care of that.
//!
//! # Features
//!
//! - **Directory Bootstrap**: Creates the source and plugin directories before anything is installed
//! - **Asset Placement**: Copies single files or mirrors whole asset trees declared by a package
//! - **Config Merging**: Adds new options and asks before overwriting existing ones
//! - **Unattended Mode**: `--yes` / `--no` or `PLINSTALL_OVERWRITE` answer the overwrite prompt
//!
//! # Architecture
//!
//! - [`hooks`] - Pre-install and post-package-install orchestration
//! - [`file_mover`] - Asset pattern resolution, copy and mirror
//! - [`package`] - Typed package descriptor and `extra` declarations
//! - [`config`] - Project config store
//! - [`confirm`] - Yes/no prompt abstraction
//! - [`filesystem`] - Filesystem abstraction with an in-memory mock
//! - [`error`] - Error kinds
//! - [`logging`] - `tracing` subscriber setup
//! - [`utils`] - Colored status output
//! - [`constants`] - Shared strings and defaults
//!
//! # Usage Example
//!
//! ```no_run
//! use patternlab_installer::file_mover::FileMover;
//! use patternlab_installer::filesystem::RealFileSystem;
//! use patternlab_installer::package::AssetEntry;
//! use std::path::Path;
//!
//! let fs = RealFileSystem::new();
//! let report = FileMover::new(&fs).place(
//!     Path::new("vendor/pattern-lab/styleguidekit-assets-default"),
//!     Path::new("public"),
//!     &[AssetEntry::new("*", "styleguide/*")],
//! );
//! assert!(report.is_complete());
//! ```

pub mod config;
pub mod confirm;
pub mod constants;
pub mod error;
pub mod file_mover;
pub mod filesystem;
pub mod hooks;
pub mod logging;
pub mod package;
pub mod utils;
