//! Package manager install hooks
//!
//! Two lifecycle events are handled:
//!
//! - **pre-install**: runs once before the package manager installs
//!   anything. It loads the project config (tolerating a missing file) and
//!   creates the source and plugin directories.
//! - **post-package-install**: runs after each package is installed. It
//!   places the assets the package declares into the public and source
//!   directories, then merges the config options it declares.
//!
//! # Config merging
//!
//! Options are applied in declaration order. An option the project does not
//! have yet is set directly. An option that already exists is only
//! overwritten after the [`Confirmer`] accepts
//! `update the config option '<name>' with the value '<value>'? Y/n`.
//!
//! # Example
//!
//! ```no_run
//! use patternlab_installer::confirm::PolicyConfirmer;
//! use patternlab_installer::filesystem::RealFileSystem;
//! use patternlab_installer::hooks::{pre_install, InstallHooks, PackageEvent};
//! use patternlab_installer::package::PackageMetadata;
//! use std::path::Path;
//!
//! let fs = RealFileSystem::new();
//! let (mut config, _) = pre_install(Path::new("."), &fs).expect("bootstrap failed");
//!
//! let package = PackageMetadata::load(Path::new("vendor/pattern-lab/starterkit"))
//!     .expect("unreadable composer.json");
//! let confirmer = PolicyConfirmer::never();
//! let mut hooks = InstallHooks::new(&mut config, &fs, &confirmer);
//! hooks.post_package_install(&PackageEvent::new(package)).ok();
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{json_to_config_value, ConfigStore, InitMode};
use crate::confirm::Confirmer;
use crate::constants::{
    config_update_prompt, CONFIG_NOT_UPDATED, CONFIG_UPDATED, ICON_PACKAGE, INFO_CREATED_DIR,
    INFO_DIRECTORIES_READY, INFO_INSTALLING_PACKAGE, INFO_NO_ASSETS_PLACED, INFO_PLACING_ASSETS,
    OPTION_PLUGIN_DIR, OPTION_SOURCE_DIR,
};
use crate::error::{InstallerError, Result};
use crate::file_mover::{FileMover, PlacementReport};
use crate::filesystem::FileSystem;
use crate::package::{AssetMapping, ConfigEntry, PackageMetadata};
use crate::utils::{print_info, print_success, print_warning};

/// Directories created by [`bootstrap_directories`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: Vec<PathBuf>,
}

/// Initializes the config store leniently and creates the project directories
///
/// # Errors
///
/// * `ConfigRead` / `ConfigParse` - An existing config file is unusable
/// * `DirectoryCreation` - A directory could not be created; the install must abort
pub fn pre_install(
    project_root: &Path,
    fs: &dyn FileSystem,
) -> Result<(ConfigStore, BootstrapReport)> {
    let config = ConfigStore::init(project_root, InitMode::Lenient)?;
    let report = bootstrap_directories(&config, fs)?;
    Ok((config, report))
}

/// Creates the source and plugin directories when they are missing
///
/// Existing directories are left untouched, so running this any number of
/// times is safe.
pub fn bootstrap_directories(config: &ConfigStore, fs: &dyn FileSystem) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();

    for option in [OPTION_SOURCE_DIR, OPTION_PLUGIN_DIR] {
        let dir = config.dir(option)?;

        if fs.is_dir(&dir) {
            debug!(option, path = %dir.display(), "directory already exists");
            continue;
        }
        if fs.exists(&dir) {
            return Err(InstallerError::DirectoryCreation {
                path: dir,
                reason: "path exists and is not a directory".to_string(),
            });
        }

        fs.create_dir_all(&dir)
            .map_err(|e| InstallerError::DirectoryCreation {
                path: dir.clone(),
                reason: format!("{e:#}"),
            })?;
        info!(option, path = %dir.display(), "created directory");
        print_success(&format!("{INFO_CREATED_DIR}: {}", dir.display()));
        report.created.push(dir);
    }

    if report.created.is_empty() {
        debug!("{INFO_DIRECTORIES_READY}");
    }
    Ok(report)
}

/// Event delivered after a package has been installed
#[derive(Debug)]
pub struct PackageEvent {
    pub package: PackageMetadata,
}

impl PackageEvent {
    pub fn new(package: PackageMetadata) -> Self {
        Self { package }
    }
}

/// Outcome of [`InstallHooks::post_package_install`]
#[derive(Debug, Default)]
pub struct InstallReport {
    pub package: String,
    pub assets: PlacementReport,
    /// Options written to the config store, in order
    pub updated: Vec<String>,
    /// Existing options the user chose to keep
    pub declined: Vec<String>,
    /// Skipped declarations and values, as messages
    pub warnings: Vec<String>,
}

impl InstallReport {
    /// True when every declared asset and option was handled without error
    pub fn is_clean(&self) -> bool {
        self.assets.is_complete() && self.warnings.is_empty()
    }
}

/// Runs the post-install steps against one project
pub struct InstallHooks<'a> {
    config: &'a mut ConfigStore,
    fs: &'a dyn FileSystem,
    confirmer: &'a dyn Confirmer,
}

impl<'a> InstallHooks<'a> {
    pub fn new(
        config: &'a mut ConfigStore,
        fs: &'a dyn FileSystem,
        confirmer: &'a dyn Confirmer,
    ) -> Self {
        Self {
            config,
            fs,
            confirmer,
        }
    }

    /// Places the package's assets and merges its config options
    ///
    /// Sections absent from the package's extras cause no side effects.
    ///
    /// # Errors
    ///
    /// Only failures that leave the project in an unknown state are
    /// returned: an unusable directory option or a config file that cannot
    /// be written. Asset and declaration problems end up in the report.
    pub fn post_package_install(&mut self, event: &PackageEvent) -> Result<InstallReport> {
        let package = &event.package;
        let mut report = InstallReport {
            package: package.name.clone(),
            ..InstallReport::default()
        };

        println!(
            "{ICON_PACKAGE} {INFO_INSTALLING_PACKAGE} {} {}",
            package.package_type, package.name
        );
        info!(
            package = %package.name,
            kind = %package.package_type,
            path = %package.install_path.display(),
            "post-package-install"
        );

        for warning in &package.extra.warnings {
            warn!(package = %package.name, "{warning}");
            print_warning(&warning.to_string());
            report.warnings.push(warning.to_string());
        }

        if package.extra.is_empty() {
            debug!(package = %package.name, "no assets or config declared");
            return Ok(report);
        }

        let assets = &package.extra.assets;
        if let Some(mapping) = &assets.public_dir {
            let destination = self.config.public_dir()?;
            report
                .assets
                .merge(self.place_assets(&package.install_path, &destination, mapping));
        }
        if let Some(mapping) = &assets.source_dir {
            let destination = self.config.source_dir()?;
            report
                .assets
                .merge(self.place_assets(&package.install_path, &destination, mapping));
        }

        if let Some(delta) = &package.extra.config {
            self.apply_config(delta, &mut report)?;
        }

        Ok(report)
    }

    fn place_assets(
        &self,
        install_path: &Path,
        destination: &Path,
        mapping: &AssetMapping,
    ) -> PlacementReport {
        print_info(&format!("{INFO_PLACING_ASSETS} {}", destination.display()));
        let report = FileMover::new(self.fs).place(install_path, destination, mapping);
        if report.placed.is_empty() {
            print_info(INFO_NO_ASSETS_PLACED);
        }
        report
    }

    /// Applies config entries in declaration order
    ///
    /// A confirmer that fails to produce an answer counts as a decline.
    pub fn apply_config(&mut self, delta: &[ConfigEntry], report: &mut InstallReport) -> Result<()> {
        for entry in delta {
            let option = entry.option.as_str();
            let value = match json_to_config_value(&entry.value) {
                Ok(value) => value,
                Err(reason) => {
                    let error = InstallerError::ConfigValue {
                        option: option.to_string(),
                        reason,
                    };
                    warn!("{error}");
                    print_warning(&error.to_string());
                    report.warnings.push(error.to_string());
                    continue;
                }
            };

            if !self.config.contains(option) {
                self.config.update(option, value)?;
                info!(option, "config option added");
                report.updated.push(option.to_string());
                continue;
            }

            let prompt = config_update_prompt(option, &entry.display_value());
            let accepted = self.confirmer.confirm(&prompt).unwrap_or_else(|e| {
                warn!(option, error = %e, "no answer to overwrite prompt, keeping current value");
                false
            });

            if accepted {
                self.config.update(option, value)?;
                info!(option, "config option overwritten");
                print_success(&format!("config option '{option}' {CONFIG_UPDATED}"));
                report.updated.push(option.to_string());
            } else {
                info!(option, "config option kept");
                print_info(&format!("config option '{option}' {CONFIG_NOT_UPDATED}"));
                report.declined.push(option.to_string());
            }
        }
        Ok(())
    }
}
