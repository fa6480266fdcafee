//! Asset placement for installed packages
//!
//! A package declares which of its assets go where as a list of
//! `{ source: destination }` pairs. Sources are relative to the package's
//! `assets/` directory, destinations to the project directory being filled
//! (the public or the source directory). Each pair resolves to one
//! [`Placement`]:
//!
//! | source      | destination | placement                                          |
//! |-------------|-------------|----------------------------------------------------|
//! | `*`         | `*`         | mirror `assets/` onto the destination base         |
//! | `*`         | `dir/*`     | mirror `assets/` onto `base/dir`                   |
//! | `sub/*`     | `dir/*`     | mirror `assets/sub` onto `base/dir`                |
//! | `a/x.css`   | `css/x.css` | copy one file, creating `base/css` when missing    |
//!
//! A mirror makes the destination an exact copy of the source tree: files
//! are added and overwritten, and entries that do not exist in the source are
//! removed. A copy always overwrites.
//!
//! # Error handling
//!
//! Entries are independent. An entry that cannot be placed is reported and
//! recorded in the [`PlacementReport`], and the remaining entries are still
//! processed. Nothing placed by earlier entries is rolled back.

use anyhow::{anyhow, Context};
use colored::Colorize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::{
    COLON_POSITION_WINDOWS, ERROR_DEPTH_EXCEEDED, ERROR_SOURCE_NOT_DIR, ERROR_SOURCE_NOT_FILE,
    ERROR_SOURCE_NOT_FOUND, FAILED_ASSET, ICON_ERROR, ICON_SUCCESS, ICON_SYMLINK_WARNING,
    ICON_WARNING, MAX_DIRECTORY_DEPTH, PACKAGE_ASSETS_DIR, SUCCESS_COPIED, SUCCESS_MIRRORED,
    WARNING_SKIPPED_DECLARATION, WARNING_SKIPPING_SYMLINK, WILDCARD, WILDCARD_CHAR,
    WILDCARD_TRIM_CHARS, WINDOWS_PATH_MIN_LENGTH,
};
use crate::error::InstallerError;
use crate::filesystem::FileSystem;
use crate::package::AssetEntry;

/// What a single asset entry does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Mirror the whole assets directory onto the destination base
    MirrorAll,
    /// Mirror the whole assets directory onto a subdirectory of the base
    MirrorInto { destination: String },
    /// Mirror a subdirectory of the assets onto a subdirectory of the base
    MirrorSubpath { source: String, destination: String },
    /// Copy one file, overwriting
    CopyFile { source: String, destination: String },
}

impl Placement {
    /// Absolute source path under `source_base/assets`
    pub fn source_path(&self, source_base: &Path) -> PathBuf {
        let assets = source_base.join(PACKAGE_ASSETS_DIR);
        match self {
            Placement::MirrorAll | Placement::MirrorInto { .. } => assets,
            Placement::MirrorSubpath { source, .. } | Placement::CopyFile { source, .. } => {
                join_relative(&assets, source)
            }
        }
    }

    /// Absolute destination path under `destination_base`
    pub fn destination_path(&self, destination_base: &Path) -> PathBuf {
        match self {
            Placement::MirrorAll => destination_base.to_path_buf(),
            Placement::MirrorInto { destination }
            | Placement::MirrorSubpath { destination, .. }
            | Placement::CopyFile { destination, .. } => {
                join_relative(destination_base, destination)
            }
        }
    }

    pub fn is_mirror(&self) -> bool {
        !matches!(self, Placement::CopyFile { .. })
    }
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}

fn ends_with_wildcard(pattern: &str) -> bool {
    pattern.ends_with(WILDCARD_CHAR)
}

fn trim_wildcard(pattern: &str) -> &str {
    pattern.trim_end_matches(WILDCARD_TRIM_CHARS)
}

/// Resolves an asset entry into a placement
///
/// Cases are checked in order: full mirror, mirror into a subdirectory,
/// mirror a subpath, single file copy.
///
/// # Errors
///
/// `MalformedExtra` when a pattern is empty, absolute or contains `.` / `..`
/// components, or when a file copy has no file name to copy to.
pub fn resolve_entry(entry: &AssetEntry) -> Result<Placement, InstallerError> {
    let source = entry.source.as_str();
    let destination = entry.destination.as_str();

    let placement = if source == WILDCARD && destination == WILDCARD {
        Placement::MirrorAll
    } else if source == WILDCARD && ends_with_wildcard(destination) {
        Placement::MirrorInto {
            destination: trim_wildcard(destination).to_string(),
        }
    } else if ends_with_wildcard(source) {
        Placement::MirrorSubpath {
            source: trim_wildcard(source).to_string(),
            destination: trim_wildcard(destination).to_string(),
        }
    } else {
        if destination.ends_with('/') || destination.ends_with('\\') {
            return Err(malformed_entry(entry, "destination has no file name"));
        }
        Placement::CopyFile {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    };

    let (checked_source, checked_destination) = match &placement {
        Placement::MirrorAll => (None, ""),
        Placement::MirrorInto { destination } => (None, destination.as_str()),
        Placement::MirrorSubpath {
            source,
            destination,
        } => (Some(source.as_str()), destination.as_str()),
        Placement::CopyFile {
            source,
            destination,
        } => {
            if source.is_empty() || destination.is_empty() {
                return Err(malformed_entry(
                    entry,
                    "file copies need a source and a destination",
                ));
            }
            (Some(source.as_str()), destination.as_str())
        }
    };

    if let Some(source) = checked_source {
        if !is_safe_pattern(source) {
            return Err(malformed_entry(
                entry,
                "source must stay inside the package assets",
            ));
        }
    }
    if !is_safe_pattern(checked_destination) {
        return Err(malformed_entry(
            entry,
            "destination must stay inside the project directory",
        ));
    }

    Ok(placement)
}

fn malformed_entry(entry: &AssetEntry, detail: &str) -> InstallerError {
    InstallerError::malformed("assets", format!("'{entry}': {detail}"))
}

/// Validates that a relative pattern cannot escape its base directory
///
/// Empty patterns are accepted here (they address the base itself); callers
/// that need a file name check for it.
fn is_safe_pattern(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return false;
    }

    // Windows absolute paths (C:\, D:\, etc.)
    if path.len() >= WINDOWS_PATH_MIN_LENGTH
        && path.chars().nth(COLON_POSITION_WINDOWS) == Some(':')
    {
        return false;
    }

    path.split(&['/', '\\'][..])
        .all(|component| component != ".." && component != ".")
}

/// One successfully placed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedEntry {
    pub entry: AssetEntry,
    pub placement: Placement,
    /// Files copied or overwritten
    pub files: usize,
    /// Destination entries removed by a mirror
    pub removed: usize,
}

/// Outcome of [`FileMover::place`]
#[derive(Debug, Default)]
pub struct PlacementReport {
    pub placed: Vec<PlacedEntry>,
    /// `AssetCopy` and `MalformedExtra` errors, one per failed entry
    pub failed: Vec<InstallerError>,
}

impl PlacementReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn files(&self) -> usize {
        self.placed.iter().map(|p| p.files).sum()
    }

    pub fn merge(&mut self, other: PlacementReport) {
        self.placed.extend(other.placed);
        self.failed.extend(other.failed);
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MirrorStats {
    copied: usize,
    removed: usize,
}

impl std::ops::AddAssign for MirrorStats {
    fn add_assign(&mut self, other: Self) {
        self.copied += other.copied;
        self.removed += other.removed;
    }
}

/// Copies and mirrors package assets into a project directory
pub struct FileMover<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> FileMover<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Places every entry of `mapping` from `source_base/assets` into `destination_base`
    ///
    /// # Arguments
    ///
    /// * `source_base` - Install path of the package
    /// * `destination_base` - Project directory receiving the assets
    /// * `mapping` - Entries in declaration order
    ///
    /// # Returns
    ///
    /// A report of placed and failed entries. Failures never stop the
    /// remaining entries.
    pub fn place(
        &self,
        source_base: &Path,
        destination_base: &Path,
        mapping: &[AssetEntry],
    ) -> PlacementReport {
        let mut report = PlacementReport::default();

        for entry in mapping {
            let placement = match resolve_entry(entry) {
                Ok(placement) => placement,
                Err(e) => {
                    warn!(entry = %entry, error = %e, "skipping asset entry");
                    println!(
                        "  {} {WARNING_SKIPPED_DECLARATION}: {}",
                        ICON_WARNING.yellow(),
                        e.to_string().yellow()
                    );
                    report.failed.push(e);
                    continue;
                }
            };

            let source = placement.source_path(source_base);
            let destination = placement.destination_path(destination_base);
            debug!(
                entry = %entry,
                source = %source.display(),
                destination = %destination.display(),
                "placing asset entry"
            );

            let result = if placement.is_mirror() {
                self.mirror(&source, &destination)
            } else {
                self.copy_file(&source, &destination).map(|()| MirrorStats {
                    copied: 1,
                    removed: 0,
                })
            };

            match result {
                Ok(stats) => {
                    let verb = if placement.is_mirror() {
                        SUCCESS_MIRRORED
                    } else {
                        SUCCESS_COPIED
                    };
                    info!(entry = %entry, files = stats.copied, removed = stats.removed, "{verb}");
                    let plural = if stats.copied == 1 { "" } else { "s" };
                    println!(
                        "  {} {verb}: {} ({} file{plural})",
                        ICON_SUCCESS.green(),
                        entry.to_string().green(),
                        stats.copied
                    );
                    report.placed.push(PlacedEntry {
                        entry: entry.clone(),
                        placement,
                        files: stats.copied,
                        removed: stats.removed,
                    });
                }
                Err(e) => {
                    let error = InstallerError::AssetCopy {
                        entry: entry.to_string(),
                        reason: format!("{e:#}"),
                    };
                    warn!(error = %error, "asset entry failed");
                    println!(
                        "  {} {FAILED_ASSET} {}: {e:#}",
                        ICON_ERROR.red(),
                        entry.to_string().red()
                    );
                    report.failed.push(error);
                }
            }
        }

        report
    }

    /// Copies one file, creating the destination directory when missing
    ///
    /// A symlink at the destination is replaced, never written through.
    fn copy_file(&self, source: &Path, destination: &Path) -> anyhow::Result<()> {
        if !self.fs.exists(source) {
            return Err(anyhow!("{ERROR_SOURCE_NOT_FOUND}{}", source.display()));
        }
        if !self.fs.is_file(source) {
            return Err(anyhow!("{ERROR_SOURCE_NOT_FILE}{}", source.display()));
        }

        if let Some(parent) = destination.parent() {
            if !self.fs.is_dir(parent) {
                self.fs.create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }
        if self.fs.is_symlink(destination) {
            self.fs.remove_file(destination)?;
            debug!(path = %destination.display(), "replaced symlink");
        }

        self.fs.copy(source, destination).with_context(|| {
            format!(
                "Failed to copy file from {} to {}",
                source.display(),
                destination.display()
            )
        })?;
        debug!(source = %source.display(), destination = %destination.display(), "copied file");
        Ok(())
    }

    fn mirror(&self, source: &Path, destination: &Path) -> anyhow::Result<MirrorStats> {
        if !self.fs.exists(source) {
            return Err(anyhow!("{ERROR_SOURCE_NOT_FOUND}{}", source.display()));
        }
        if !self.fs.is_dir(source) {
            return Err(anyhow!("{ERROR_SOURCE_NOT_DIR}{}", source.display()));
        }
        self.mirror_recursive(source, destination, 0)
    }

    /// Makes `destination` an exact copy of `source`
    ///
    /// Symlinks in the source are skipped, so a destination entry with the
    /// same name is removed like any other entry missing from the source.
    fn mirror_recursive(
        &self,
        source: &Path,
        destination: &Path,
        depth: usize,
    ) -> anyhow::Result<MirrorStats> {
        if depth >= MAX_DIRECTORY_DEPTH {
            return Err(anyhow!(
                "{ERROR_DEPTH_EXCEEDED} ({MAX_DIRECTORY_DEPTH}) at {}",
                source.display()
            ));
        }

        let mut stats = MirrorStats::default();

        if self.fs.is_symlink(destination) || self.fs.is_file(destination) {
            self.fs.remove_file(destination)?;
            stats.removed += 1;
        }
        self.fs.create_dir_all(destination).with_context(|| {
            format!("Failed to create directory: {}", destination.display())
        })?;

        let mut mirrored: HashSet<OsString> = HashSet::new();

        for source_path in self.fs.read_dir(source)? {
            let Some(name) = source_path.file_name().map(|n| n.to_os_string()) else {
                continue;
            };
            let destination_path = destination.join(&name);

            if self.fs.is_symlink(&source_path) {
                warn!(path = %source_path.display(), "skipping symlink");
                println!(
                    "  {} {WARNING_SKIPPING_SYMLINK}{}",
                    ICON_SYMLINK_WARNING.yellow(),
                    source_path.display()
                );
                continue;
            }

            if self.fs.is_dir(&source_path) {
                stats += self.mirror_recursive(&source_path, &destination_path, depth + 1)?;
            } else if self.fs.is_file(&source_path) {
                if self.fs.is_symlink(&destination_path) {
                    self.fs.remove_file(&destination_path)?;
                    stats.removed += 1;
                } else if self.fs.is_dir(&destination_path) {
                    self.fs.remove_dir_all(&destination_path)?;
                    stats.removed += 1;
                }
                self.fs
                    .copy(&source_path, &destination_path)
                    .with_context(|| {
                        format!(
                            "Failed to copy file from {} to {}",
                            source_path.display(),
                            destination_path.display()
                        )
                    })?;
                debug!(destination = %destination_path.display(), "mirrored file");
                stats.copied += 1;
            } else {
                // sockets, fifos and the like
                continue;
            }

            mirrored.insert(name);
        }

        for existing in self.fs.read_dir(destination)? {
            let keep = existing
                .file_name()
                .is_some_and(|name| mirrored.contains(name));
            if keep {
                continue;
            }
            if self.fs.is_dir(&existing) && !self.fs.is_symlink(&existing) {
                self.fs.remove_dir_all(&existing)?;
            } else {
                self.fs.remove_file(&existing)?;
            }
            debug!(path = %existing.display(), "removed stale entry");
            stats.removed += 1;
        }

        Ok(stats)
    }
}
