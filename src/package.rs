//! Package metadata read from an installed package's descriptor
//!
//! Every package ships a `composer.json`. The hooks only care about its
//! name, its type and the `extra` block, which may declare assets to place
//! into the project and config options to merge:
//!
//! ```json
//! {
//!     "name": "pattern-lab/styleguidekit-assets-default",
//!     "type": "patternlab-styleguidekit",
//!     "extra": {
//!         "assets": {
//!             "publicDir": [{ "*": "styleguide/*" }],
//!             "sourceDir": [{ "_meta/_00-head.mustache": "_meta/_00-head.mustache" }]
//!         },
//!         "config": [{ "patternExtension": "mustache" }]
//!     }
//! }
//! ```
//!
//! Parsing is tolerant below the top level: a malformed declaration is
//! dropped and recorded in [`ExtraDeclaration::warnings`] instead of failing
//! the whole install.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{
    EXTRA_ASSETS, EXTRA_CONFIG, EXTRA_PUBLIC_DIR, EXTRA_SOURCE_DIR, PACKAGE_MANIFEST_NAME,
    PACKAGE_TYPE_DEFAULT_LABEL, PACKAGE_TYPE_PREFIX,
};
use crate::error::{InstallerError, Result};

/// Kind of package being installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageType {
    MustacheHelper,
    PatternEngine,
    Plugin,
    StarterKit,
    StyleguideKit,
    Other(String),
    Unspecified,
}

impl PackageType {
    /// Parses a descriptor `type`, ignoring a leading `patternlab-`
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return PackageType::Unspecified;
        };
        let kind = raw.strip_prefix(PACKAGE_TYPE_PREFIX).unwrap_or(raw);
        match kind.to_lowercase().as_str() {
            "mustachehelper" => PackageType::MustacheHelper,
            "patternengine" => PackageType::PatternEngine,
            "plugin" => PackageType::Plugin,
            "starterkit" => PackageType::StarterKit,
            "styleguidekit" => PackageType::StyleguideKit,
            _ => PackageType::Other(raw.to_string()),
        }
    }

    /// Human readable label used in status output
    pub fn label(&self) -> &str {
        match self {
            PackageType::MustacheHelper => "mustache helper",
            PackageType::PatternEngine => "pattern engine",
            PackageType::Plugin => "plug-in",
            PackageType::StarterKit => "starterKit",
            PackageType::StyleguideKit => "styleguideKit",
            PackageType::Other(raw) => raw,
            PackageType::Unspecified => PACKAGE_TYPE_DEFAULT_LABEL,
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `{ source: destination }` pair of an asset mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub source: String,
    pub destination: String,
}

impl AssetEntry {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for AssetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Ordered list of asset entries
pub type AssetMapping = Vec<AssetEntry>;

/// One `{ option: value }` pair of a config declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub option: String,
    pub value: Value,
}

impl ConfigEntry {
    pub fn new(option: impl Into<String>, value: Value) -> Self {
        Self {
            option: option.into(),
            value,
        }
    }

    /// Value as shown to the user: strings unquoted, everything else as JSON
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Ordered list of config entries, applied in declaration order
pub type ConfigDelta = Vec<ConfigEntry>;

/// `extra.assets` of a package descriptor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetDeclaration {
    pub public_dir: Option<AssetMapping>,
    pub source_dir: Option<AssetMapping>,
}

/// Typed `extra` block of a package descriptor
#[derive(Debug, Default)]
pub struct ExtraDeclaration {
    pub assets: AssetDeclaration,
    pub config: Option<ConfigDelta>,
    /// Declarations that were skipped because of their shape
    pub warnings: Vec<InstallerError>,
}

impl ExtraDeclaration {
    /// Builds the typed declaration from the raw `extra` value
    ///
    /// A missing or `null` extra yields an empty declaration. Every other
    /// shape problem is recorded as a `MalformedExtra` warning and the
    /// offending section or entry is left out.
    pub fn from_value(extra: &Value) -> Self {
        let mut declaration = ExtraDeclaration::default();

        let extra = match extra {
            Value::Null => return declaration,
            Value::Object(map) => map,
            other => {
                declaration.warnings.push(InstallerError::malformed(
                    "extra",
                    format!("expected an object, found {}", json_type(other)),
                ));
                return declaration;
            }
        };

        match extra.get(EXTRA_ASSETS) {
            None | Some(Value::Null) => {}
            Some(Value::Object(assets)) => {
                declaration.assets.public_dir = assets.get(EXTRA_PUBLIC_DIR).and_then(|v| {
                    parse_asset_mapping(
                        &format!("{EXTRA_ASSETS}.{EXTRA_PUBLIC_DIR}"),
                        v,
                        &mut declaration.warnings,
                    )
                });
                declaration.assets.source_dir = assets.get(EXTRA_SOURCE_DIR).and_then(|v| {
                    parse_asset_mapping(
                        &format!("{EXTRA_ASSETS}.{EXTRA_SOURCE_DIR}"),
                        v,
                        &mut declaration.warnings,
                    )
                });
            }
            Some(other) => declaration.warnings.push(InstallerError::malformed(
                EXTRA_ASSETS,
                format!("expected an object, found {}", json_type(other)),
            )),
        }

        declaration.config = extra
            .get(EXTRA_CONFIG)
            .and_then(|v| parse_config_delta(v, &mut declaration.warnings));

        declaration
    }

    /// True when nothing would be placed or merged
    pub fn is_empty(&self) -> bool {
        self.assets.public_dir.is_none()
            && self.assets.source_dir.is_none()
            && self.config.is_none()
    }
}

/// Parses a list of single-entry `{ key: value }` objects
///
/// Returns the (key, value) pairs of the well-formed entries; malformed
/// entries are reported in `warnings`. `None` means the section itself was
/// unusable.
fn parse_pairs<'a>(
    section: &str,
    value: &'a Value,
    warnings: &mut Vec<InstallerError>,
) -> Option<Vec<(&'a String, &'a Value)>> {
    let items = match value {
        Value::Null => return None,
        Value::Array(items) => items,
        other => {
            warnings.push(InstallerError::malformed(
                section,
                format!("expected a list, found {}", json_type(other)),
            ));
            return None;
        }
    };

    let mut pairs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(map) if map.len() == 1 => {
                if let Some(pair) = map.iter().next() {
                    pairs.push(pair);
                }
            }
            Value::Object(map) => warnings.push(InstallerError::malformed(
                section,
                format!(
                    "entry {index} must have exactly one key, found {}",
                    map.len()
                ),
            )),
            other => warnings.push(InstallerError::malformed(
                section,
                format!("entry {index} must be an object, found {}", json_type(other)),
            )),
        }
    }
    Some(pairs)
}

fn parse_asset_mapping(
    section: &str,
    value: &Value,
    warnings: &mut Vec<InstallerError>,
) -> Option<AssetMapping> {
    let pairs = parse_pairs(section, value, warnings)?;
    let mut mapping = AssetMapping::with_capacity(pairs.len());
    for (source, destination) in pairs {
        match destination {
            Value::String(destination) => mapping.push(AssetEntry::new(source, destination)),
            other => warnings.push(InstallerError::malformed(
                section,
                format!(
                    "destination for '{source}' must be a string, found {}",
                    json_type(other)
                ),
            )),
        }
    }
    Some(mapping)
}

fn parse_config_delta(value: &Value, warnings: &mut Vec<InstallerError>) -> Option<ConfigDelta> {
    let pairs = parse_pairs(EXTRA_CONFIG, value, warnings)?;
    Some(
        pairs
            .into_iter()
            .map(|(option, value)| ConfigEntry::new(option, value.clone()))
            .collect(),
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: Option<String>,
    #[serde(rename = "type")]
    package_type: Option<String>,
    #[serde(default)]
    extra: Value,
}

/// Metadata of one installed package
#[derive(Debug)]
pub struct PackageMetadata {
    pub install_path: PathBuf,
    pub name: String,
    pub package_type: PackageType,
    pub extra: ExtraDeclaration,
}

impl PackageMetadata {
    /// Reads `composer.json` from the package's install path
    pub fn load(install_path: &Path) -> Result<Self> {
        Self::load_from(install_path, &install_path.join(PACKAGE_MANIFEST_NAME))
    }

    /// Reads the descriptor at `manifest_path` for a package installed at `install_path`
    pub fn load_from(install_path: &Path, manifest_path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(manifest_path).map_err(|e| InstallerError::Manifest {
                path: manifest_path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::from_manifest_str(install_path, manifest_path, &content)
    }

    /// Parses descriptor JSON
    ///
    /// A missing `name` falls back to the install directory's name.
    pub fn from_manifest_str(
        install_path: &Path,
        manifest_path: &Path,
        content: &str,
    ) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(content).map_err(|e| InstallerError::Manifest {
                path: manifest_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let name = manifest.name.unwrap_or_else(|| {
            install_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        Ok(Self {
            install_path: install_path.to_path_buf(),
            name,
            package_type: PackageType::parse(manifest.package_type.as_deref()),
            extra: ExtraDeclaration::from_value(&manifest.extra),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_package_type_labels() {
        assert_eq!(PackageType::parse(Some("patternlab-plugin")).label(), "plug-in");
        assert_eq!(
            PackageType::parse(Some("patternengine")).label(),
            "pattern engine"
        );
        assert_eq!(
            PackageType::parse(Some("patternlab-styleguidekit")),
            PackageType::StyleguideKit
        );
        assert_eq!(PackageType::parse(Some("library")).label(), "library");
        assert_eq!(PackageType::parse(None), PackageType::Unspecified);
        assert_eq!(PackageType::parse(Some("  ")), PackageType::Unspecified);
    }

    #[test]
    fn test_config_entry_display_value() {
        assert_eq!(ConfigEntry::new("a", json!("twig")).display_value(), "twig");
        assert_eq!(ConfigEntry::new("a", json!(true)).display_value(), "true");
        assert_eq!(ConfigEntry::new("a", json!([1, 2])).display_value(), "[1,2]");
    }

    #[test]
    fn test_parse_pairs_keeps_order() {
        let mut warnings = Vec::new();
        let value = json!([{ "b": 1 }, { "a": 2 }]);
        let pairs = parse_pairs("config", &value, &mut warnings).unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_pairs_rejects_multi_key_entries() {
        let mut warnings = Vec::new();
        let value = json!([{ "a": 1, "b": 2 }, "loose", { "c": 3 }]);
        let pairs = parse_pairs("config", &value, &mut warnings).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(warnings.len(), 2);
    }
}
