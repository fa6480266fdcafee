//! Error kinds raised by the install hooks
//!
//! Library functions return [`InstallerError`]; the binary converts it into
//! [`anyhow::Error`] with the `?` operator and adds context there.
//!
//! ```text
//! InstallerError
//! ├── DirectoryCreation: fatal, aborts pre-install
//! ├── AssetCopy: one asset entry failed, the rest continue
//! ├── MalformedExtra: a declaration was skipped with a warning
//! ├── Manifest: package descriptor unreadable or not JSON
//! └── Config*: config store read / parse / write / value errors
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for installer operations
pub type Result<T, E = InstallerError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum InstallerError {
    /// A required project directory could not be created.
    #[error("Failed to create directory {}: {reason}", path.display())]
    DirectoryCreation { path: PathBuf, reason: String },

    /// An asset mapping entry could not be copied or mirrored.
    #[error("Failed to place asset '{entry}': {reason}")]
    AssetCopy { entry: String, reason: String },

    /// A declaration in the package extras does not have the expected shape.
    #[error("Malformed '{section}' declaration: {detail}")]
    MalformedExtra { section: String, detail: String },

    /// The package descriptor could not be read or parsed.
    #[error("Invalid package descriptor {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("Failed to write config file {}: {reason}", path.display())]
    ConfigWrite { path: PathBuf, reason: String },

    /// A declared value has no representation in the config file.
    #[error("Config option '{option}' cannot store value: {reason}")]
    ConfigValue { option: String, reason: String },
}

impl InstallerError {
    pub(crate) fn malformed(section: impl Into<String>, detail: impl Into<String>) -> Self {
        InstallerError::MalformedExtra {
            section: section.into(),
            detail: detail.into(),
        }
    }

    /// Returns true for errors that must abort the running hook
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            InstallerError::AssetCopy { .. } | InstallerError::MalformedExtra { .. }
        )
    }
}
