use anyhow::Result;
use mockall::mock;
use mockall::predicate::eq;
use patternlab_installer::config::{ConfigStore, InitMode};
use patternlab_installer::confirm::{Confirmer, LineConfirmer, PolicyConfirmer};
use patternlab_installer::error::InstallerError;
use patternlab_installer::filesystem::RealFileSystem;
use patternlab_installer::hooks::{pre_install, InstallHooks, PackageEvent};
use patternlab_installer::package::PackageMetadata;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use toml::Value;

mock! {
    pub Prompt {}

    impl Confirmer for Prompt {
        fn confirm(&self, message: &str) -> anyhow::Result<bool>;
    }
}

/// Writes a package with `composer.json` and the given asset files
fn write_package(root: &Path, manifest: &str, assets: &[(&str, &str)]) -> Result<PackageMetadata> {
    let package_dir = root.join("vendor/pattern-lab/starterkit-mustache-demo");
    fs::create_dir_all(package_dir.join("assets"))?;
    fs::write(package_dir.join("composer.json"), manifest)?;
    for (path, content) in assets {
        let path = package_dir.join("assets").join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(PackageMetadata::load(&package_dir)?)
}

fn write_project_config(root: &Path, content: &str) -> Result<()> {
    fs::create_dir_all(root.join("config"))?;
    fs::write(root.join("config/config.toml"), content)?;
    Ok(())
}

const CONFIG_ONLY_MANIFEST: &str = r#"{
    "name": "pattern-lab/patternengine-twig",
    "type": "patternlab-patternengine",
    "extra": { "config": [{ "patternExtension": "twig" }] }
}"#;

#[test]
fn test_pre_install_creates_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fs_impl = RealFileSystem::new();

    let (_config, report) = pre_install(temp_dir.path(), &fs_impl)?;

    assert_eq!(report.created.len(), 2);
    assert!(temp_dir.path().join("source").is_dir());
    assert!(temp_dir.path().join("plugins").is_dir());
    assert!(!temp_dir.path().join("public").exists());
    Ok(())
}

#[test]
fn test_pre_install_leaves_existing_directories_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::create_dir_all(temp_dir.path().join("source/_patterns"))?;
    fs::create_dir_all(temp_dir.path().join("plugins"))?;
    fs::write(temp_dir.path().join("source/_patterns/keep.mustache"), "{{ x }}")?;
    let fs_impl = RealFileSystem::new();

    let (_config, report) = pre_install(temp_dir.path(), &fs_impl)?;

    assert!(report.created.is_empty());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("source/_patterns/keep.mustache"))?,
        "{{ x }}"
    );
    Ok(())
}

#[test]
fn test_pre_install_honours_configured_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_project_config(temp_dir.path(), "sourceDir = \"src/patterns\"\n")?;
    let fs_impl = RealFileSystem::new();

    pre_install(temp_dir.path(), &fs_impl)?;

    assert!(temp_dir.path().join("src/patterns").is_dir());
    assert!(!temp_dir.path().join("source").exists());
    Ok(())
}

#[test]
fn test_pre_install_fails_when_directory_is_blocked() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("source"), "a file")?;
    let fs_impl = RealFileSystem::new();

    let result = pre_install(temp_dir.path(), &fs_impl);
    assert!(matches!(
        result,
        Err(InstallerError::DirectoryCreation { .. })
    ));
    Ok(())
}

#[test]
fn test_post_package_install_places_assets_and_adds_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let package = write_package(
        temp_dir.path(),
        r#"{
            "name": "pattern-lab/starterkit-mustache-demo",
            "type": "patternlab-starterkit",
            "extra": {
                "assets": {
                    "publicDir": [{ "*": "styleguide/*" }],
                    "sourceDir": [{ "_patterns/atoms/logo.mustache": "_patterns/00-atoms/logo.mustache" }]
                },
                "config": [{ "starterKit": "mustache-demo" }]
            }
        }"#,
        &[
            ("index.html", "<html>"),
            ("_patterns/atoms/logo.mustache", "<img>"),
        ],
    )?;
    let fs_impl = RealFileSystem::new();
    let (mut config, _) = pre_install(temp_dir.path(), &fs_impl)?;
    let confirmer = MockPrompt::new();

    let report = InstallHooks::new(&mut config, &fs_impl, &confirmer)
        .post_package_install(&PackageEvent::new(package))?;

    assert!(report.is_clean());
    assert_eq!(report.updated, vec!["starterKit"]);
    assert!(temp_dir
        .path()
        .join("public/styleguide/index.html")
        .is_file());
    assert!(temp_dir
        .path()
        .join("public/styleguide/_patterns/atoms/logo.mustache")
        .is_file());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("source/_patterns/00-atoms/logo.mustache"))?,
        "<img>"
    );

    let reloaded = ConfigStore::init(temp_dir.path(), InitMode::Strict)?;
    assert_eq!(reloaded.get("starterKit"), Some(&Value::from("mustache-demo")));
    Ok(())
}

#[test]
fn test_existing_option_prompt_accepted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_project_config(temp_dir.path(), "patternExtension = \"mustache\"\n")?;
    let package = write_package(temp_dir.path(), CONFIG_ONLY_MANIFEST, &[])?;
    let fs_impl = RealFileSystem::new();
    let mut config = ConfigStore::init(temp_dir.path(), InitMode::Strict)?;

    let mut confirmer = MockPrompt::new();
    confirmer
        .expect_confirm()
        .with(eq(
            "update the config option 'patternExtension' with the value 'twig'? Y/n",
        ))
        .times(1)
        .returning(|_| Ok(true));

    let report = InstallHooks::new(&mut config, &fs_impl, &confirmer)
        .post_package_install(&PackageEvent::new(package))?;

    assert_eq!(report.updated, vec!["patternExtension"]);
    let reloaded = ConfigStore::init(temp_dir.path(), InitMode::Strict)?;
    assert_eq!(reloaded.get("patternExtension"), Some(&Value::from("twig")));
    Ok(())
}

#[test]
fn test_existing_option_prompt_answers_from_input() -> Result<()> {
    for (answer, expected) in [("y\n", "twig"), ("n\n", "mustache"), ("\n", "mustache")] {
        let temp_dir = TempDir::new()?;
        write_project_config(temp_dir.path(), "patternExtension = \"mustache\"\n")?;
        let package = write_package(temp_dir.path(), CONFIG_ONLY_MANIFEST, &[])?;
        let fs_impl = RealFileSystem::new();
        let mut config = ConfigStore::init(temp_dir.path(), InitMode::Strict)?;
        let confirmer = LineConfirmer::new(Cursor::new(answer), Vec::new());

        InstallHooks::new(&mut config, &fs_impl, &confirmer)
            .post_package_install(&PackageEvent::new(package))?;

        assert_eq!(
            config.get("patternExtension"),
            Some(&Value::from(expected)),
            "answer {answer:?}"
        );
        let printed = String::from_utf8(confirmer.into_output())?;
        assert_eq!(
            printed,
            "update the config option 'patternExtension' with the value 'twig'? Y/n\n"
        );
    }
    Ok(())
}

#[test]
fn test_never_policy_keeps_existing_values() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_project_config(temp_dir.path(), "patternExtension = \"mustache\"\n")?;
    let package = write_package(temp_dir.path(), CONFIG_ONLY_MANIFEST, &[])?;
    let fs_impl = RealFileSystem::new();
    let mut config = ConfigStore::init(temp_dir.path(), InitMode::Strict)?;
    let confirmer = PolicyConfirmer::never();

    let report = InstallHooks::new(&mut config, &fs_impl, &confirmer)
        .post_package_install(&PackageEvent::new(package))?;

    assert_eq!(report.declined, vec!["patternExtension"]);
    assert!(report.updated.is_empty());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("config/config.toml"))?,
        "patternExtension = \"mustache\"\n"
    );
    Ok(())
}

#[test]
fn test_package_without_extras_has_no_side_effects() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let package = write_package(
        temp_dir.path(),
        r#"{ "name": "pattern-lab/core", "type": "library" }"#,
        &[("ignored.css", "x")],
    )?;
    let fs_impl = RealFileSystem::new();
    let mut config = ConfigStore::init(temp_dir.path(), InitMode::Lenient)?;
    let confirmer = MockPrompt::new();

    let report = InstallHooks::new(&mut config, &fs_impl, &confirmer)
        .post_package_install(&PackageEvent::new(package))?;

    assert!(report.is_clean());
    assert!(report.assets.placed.is_empty());
    assert!(!temp_dir.path().join("public").exists());
    assert!(!temp_dir.path().join("config").exists());
    Ok(())
}

#[test]
fn test_failed_assets_are_reported_and_config_still_applied() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let package = write_package(
        temp_dir.path(),
        r#"{
            "name": "pattern-lab/plugin-broken",
            "type": "patternlab-plugin",
            "extra": {
                "assets": { "publicDir": [{ "missing/*": "missing/*" }, { "ok.js": "js/ok.js" }] },
                "config": [{ "plugins": { "broken": { "enabled": true } } }]
            }
        }"#,
        &[("ok.js", "ok")],
    )?;
    let fs_impl = RealFileSystem::new();
    let mut config = ConfigStore::init(temp_dir.path(), InitMode::Lenient)?;
    let confirmer = MockPrompt::new();

    let report = InstallHooks::new(&mut config, &fs_impl, &confirmer)
        .post_package_install(&PackageEvent::new(package))?;

    assert!(!report.is_clean());
    assert_eq!(report.assets.failed.len(), 1);
    assert_eq!(report.assets.placed.len(), 1);
    assert!(temp_dir.path().join("public/js/ok.js").is_file());
    assert_eq!(report.updated, vec!["plugins"]);
    Ok(())
}
