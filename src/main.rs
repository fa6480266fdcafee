//! Pattern Lab Installer - command-line entry point
//!
//! The package manager calls this binary from its script hooks:
//!
//! ```json
//! "scripts": {
//!     "pre-install-cmd": ["plinstall pre-install"],
//!     "post-package-install": ["plinstall post-package-install --package-dir vendor/pattern-lab/starterkit-mustache-demo"]
//! }
//! ```
//!
//! Fatal errors are printed and end the process with a non-zero status so
//! the package manager aborts the install.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use patternlab_installer::config::{ConfigStore, InitMode};
use patternlab_installer::confirm::{confirmer_for, OverwritePolicy};
use patternlab_installer::constants::{
    ENV_OVERWRITE_POLICY, EXIT_FAILURE, ICON_ERROR, INFO_DIRECTORIES_READY,
};
use patternlab_installer::filesystem::RealFileSystem;
use patternlab_installer::hooks::{self, InstallHooks, PackageEvent};
use patternlab_installer::logging;
use patternlab_installer::package::PackageMetadata;
use patternlab_installer::utils::{print_info, print_success, print_warning, section_header};

/// Command-line arguments for the installer
#[derive(Parser)]
#[command(name = "plinstall", version)]
#[command(about = "Install hooks for Pattern Lab packages", long_about = None)]
struct Cli {
    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the source and plugin directories before packages are installed
    PreInstall {
        /// Project directory holding config/config.toml
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
    },

    /// Place a freshly installed package's assets and merge its config options
    PostPackageInstall {
        /// Directory the package was installed into
        #[arg(long)]
        package_dir: PathBuf,

        /// Package descriptor to read instead of <package-dir>/composer.json
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Project directory holding config/config.toml
        #[arg(long, default_value = ".")]
        project_root: PathBuf,

        /// Fail when the project has no config file yet
        #[arg(long)]
        strict_config: bool,

        /// What to do when a package changes an existing option: ask, always or never
        #[arg(long, env = ENV_OVERWRITE_POLICY, default_value = "ask")]
        overwrite: OverwritePolicy,

        /// Overwrite existing options without asking
        #[arg(long, short = 'y', conflicts_with = "no")]
        yes: bool,

        /// Keep existing options without asking
        #[arg(long, short = 'n')]
        no: bool,
    },
}

/// Main entry point for the installer
fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("{} {e:#}", style(format!("{ICON_ERROR} Error:")).red().bold());
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(command: Command) -> Result<()> {
    let fs = RealFileSystem::new();

    match command {
        Command::PreInstall { project_root } => {
            println!("{}", section_header("pre-install"));
            let (_config, report) = hooks::pre_install(&project_root, &fs)
                .context("Project directories could not be prepared")?;
            if report.created.is_empty() {
                print_info(INFO_DIRECTORIES_READY);
            }
            Ok(())
        }
        Command::PostPackageInstall {
            package_dir,
            manifest,
            project_root,
            strict_config,
            overwrite,
            yes,
            no,
        } => {
            println!("{}", section_header("post-package-install"));

            let policy = if yes {
                OverwritePolicy::Always
            } else if no {
                OverwritePolicy::Never
            } else {
                overwrite
            };

            let mode = if strict_config {
                InitMode::Strict
            } else {
                InitMode::Lenient
            };
            let mut config = ConfigStore::init(&project_root, mode)?;

            let package = match &manifest {
                Some(manifest) => PackageMetadata::load_from(&package_dir, manifest)?,
                None => PackageMetadata::load(&package_dir)?,
            };

            let confirmer = confirmer_for(policy);
            let mut hooks = InstallHooks::new(&mut config, &fs, confirmer.as_ref());
            let report = hooks
                .post_package_install(&PackageEvent::new(package))
                .context("Package post-install steps failed")?;

            if report.is_clean() {
                print_success(&format!("{} installed", report.package));
                return Ok(());
            }
            if !report.assets.is_complete() {
                print_warning(&format!(
                    "{} asset entr{} of {} could not be placed",
                    report.assets.failed.len(),
                    if report.assets.failed.len() == 1 { "y" } else { "ies" },
                    report.package
                ));
            }
            if !report.warnings.is_empty() {
                print_warning(&format!(
                    "{} declaration{} of {} skipped",
                    report.warnings.len(),
                    if report.warnings.len() == 1 { "" } else { "s" },
                    report.package
                ));
            }
            Ok(())
        }
    }
}
