//! Constants used throughout the installer
//!
//! This module centralizes the file names, default option values, message
//! templates and icons used by the install hooks. It provides a single
//! source of truth for strings that show up in user-facing output.
//!
//! # Organization
//!
//! Constants are organized into the following categories:
//! - **Files and directories**: Config file location, package layout
//! - **Config options**: Option names and their default values
//! - **Patterns**: Wildcard markers used by asset mappings
//! - **Environment**: Variables read by the binary
//! - **Messages**: Prompt, status and warning templates
//! - **Icons**: Status icons
//!
//! # Usage
//!
//! ```rust
//! use patternlab_installer::constants::{ICON_SUCCESS, OPTION_SOURCE_DIR};
//!
//! println!("{} {}", ICON_SUCCESS, OPTION_SOURCE_DIR);
//! ```

// Files and directories
pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const PACKAGE_MANIFEST_NAME: &str = "composer.json";
pub const PACKAGE_ASSETS_DIR: &str = "assets";

// Config options
pub const OPTION_SOURCE_DIR: &str = "sourceDir";
pub const OPTION_PUBLIC_DIR: &str = "publicDir";
pub const OPTION_PLUGIN_DIR: &str = "pluginDir";
pub const DEFAULT_SOURCE_DIR: &str = "source";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

// Extra declaration keys
pub const EXTRA_ASSETS: &str = "assets";
pub const EXTRA_CONFIG: &str = "config";
pub const EXTRA_PUBLIC_DIR: &str = "publicDir";
pub const EXTRA_SOURCE_DIR: &str = "sourceDir";

// Package types
pub const PACKAGE_TYPE_PREFIX: &str = "patternlab-";
pub const PACKAGE_TYPE_DEFAULT_LABEL: &str = "library";

// Patterns
pub const WILDCARD: &str = "*";
pub const WILDCARD_CHAR: char = '*';
pub const WILDCARD_TRIM_CHARS: &[char] = &['/', '*'];

// Directory depth limits
pub const MAX_DIRECTORY_DEPTH: usize = 50;

// Windows absolute path detection
pub const WINDOWS_PATH_MIN_LENGTH: usize = 3;
pub const COLON_POSITION_WINDOWS: usize = 1;

// Environment
pub const ENV_OVERWRITE_POLICY: &str = "PLINSTALL_OVERWRITE";
pub const ENV_LOG_FILTER: &str = "PLINSTALL_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

// Exit codes
pub const EXIT_FAILURE: i32 = 1;

// Prompt messages
pub const PROMPT_ANSWER_YES: &str = "y";
pub const PROMPT_SUFFIX: &str = "Y/n";

/// Builds the overwrite confirmation prompt for an existing option
pub fn config_update_prompt(option: &str, value: &str) -> String {
    format!("update the config option '{option}' with the value '{value}'? {PROMPT_SUFFIX}")
}

// Status messages
pub const CONFIG_UPDATED: &str = "updated...";
pub const CONFIG_NOT_UPDATED: &str = "not updated...";
pub const INFO_INSTALLING_PACKAGE: &str = "Installing";
pub const INFO_PLACING_ASSETS: &str = "Placing assets into";
pub const INFO_NO_ASSETS_PLACED: &str = "No assets were placed";
pub const INFO_CREATED_DIR: &str = "Created directory";
pub const INFO_DIRECTORIES_READY: &str = "Project directories are ready";
pub const SUCCESS_MIRRORED: &str = "Mirrored";
pub const SUCCESS_COPIED: &str = "Copied";
pub const FAILED_ASSET: &str = "Failed to place";
pub const WARNING_SKIPPED_DECLARATION: &str = "Skipping malformed declaration";
pub const WARNING_SKIPPING_SYMLINK: &str = "Skipping symlink: ";

// Error message fragments
pub const ERROR_SOURCE_NOT_FOUND: &str = "source path not found: ";
pub const ERROR_SOURCE_NOT_DIR: &str = "source is not a directory: ";
pub const ERROR_SOURCE_NOT_FILE: &str = "source is not a file: ";
pub const ERROR_DEPTH_EXCEEDED: &str = "maximum directory depth exceeded";

// UI Icons
pub const ICON_SUCCESS: &str = "✓";
pub const ICON_ERROR: &str = "✗";
pub const ICON_WARNING: &str = "⚠";
pub const ICON_INFO: &str = "ℹ️";
pub const ICON_PACKAGE: &str = "📦";
pub const ICON_SYMLINK_WARNING: &str = "🔗";
