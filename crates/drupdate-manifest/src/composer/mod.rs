//! composer.json decoding and field-preserving re-encoding

use crate::ManifestResult;
use drupdate_core::error::DrupdateError;
use drupdate_core::types::{extract_packages, Package, PackageKind};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::value::RawValue;
use std::collections::BTreeMap;

const REQUIRE: &str = "require";

/// A `composer.json` document.
///
/// `require` is decoded into a sorted map. Every top-level field, `require`
/// included, is also kept as raw JSON in its original order so encoding
/// reproduces everything else byte for byte.
#[derive(Debug, Clone, Default)]
pub struct ComposerJson {
    require: Option<BTreeMap<String, String>>,
    raw: IndexMap<String, Box<RawValue>>,
}

/// Value written for one top-level field
enum FieldValue<'a> {
    Raw(&'a RawValue),
    Require(&'a BTreeMap<String, String>),
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Raw(raw) => raw.serialize(serializer),
            FieldValue::Require(require) => require.serialize(serializer),
        }
    }
}

impl ComposerJson {
    /// Decode a document. Anything but a JSON object is rejected, as is a
    /// `require` that is not a string-to-string map. A missing or `null`
    /// `require` decodes to `None`.
    pub fn decode(bytes: &[u8]) -> ManifestResult<Self> {
        let raw: IndexMap<String, Box<RawValue>> =
            serde_json::from_slice(bytes).map_err(|e| DrupdateError::ManifestParse {
                message: format!("composer.json must be a JSON object: {}", e),
            })?;
        Self::from_fields(raw)
    }

    /// Build a manifest from an already split field bag
    pub fn from_fields(raw: IndexMap<String, Box<RawValue>>) -> ManifestResult<Self> {
        let require = match raw.get(REQUIRE) {
            Some(value) => serde_json::from_str(value.get()).map_err(|e| {
                DrupdateError::ManifestParse {
                    message: format!("failed to decode require: {}", e),
                }
            })?,
            None => None,
        };
        Ok(Self { require, raw })
    }

    /// Encode with four-space indentation and a trailing newline.
    ///
    /// `require` keeps its original position (or is appended when new) and
    /// is written in sorted key order. With `require` set to `None` the key
    /// is left out.
    pub fn encode(&self) -> ManifestResult<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| DrupdateError::ManifestParse {
                message: format!("failed to encode composer.json: {}", e),
            })?;
        out.push(b'\n');
        Ok(out)
    }

    fn fields(&self) -> Vec<(&str, FieldValue<'_>)> {
        let mut fields: Vec<_> = self
            .raw
            .iter()
            .filter_map(|(key, value)| {
                if key != REQUIRE {
                    return Some((key.as_str(), FieldValue::Raw(value)));
                }
                self.require
                    .as_ref()
                    .map(|require| (REQUIRE, FieldValue::Require(require)))
            })
            .collect();

        if let Some(require) = &self.require {
            if !self.raw.contains_key(REQUIRE) {
                fields.push((REQUIRE, FieldValue::Require(require)));
            }
        }
        fields
    }

    pub fn require(&self) -> Option<&BTreeMap<String, String>> {
        self.require.as_ref()
    }

    /// Replace the dependency map; `None` drops `require` on encode
    pub fn set_require(&mut self, require: Option<BTreeMap<String, String>>) {
        self.require = require;
    }

    /// Raw JSON of an original top-level field
    pub fn field(&self, key: &str) -> Option<&RawValue> {
        self.raw.get(key).map(|value| value.as_ref())
    }

    /// Current constraint of a required package
    pub fn constraint(&self, package: &str) -> Option<&str> {
        self.require.as_ref()?.get(package).map(String::as_str)
    }

    /// Set the constraint of a package that is already required.
    ///
    /// Returns whether the stored constraint changed. Packages missing from
    /// `require` are never added.
    pub fn set_constraint(&mut self, package: &str, constraint: &str) -> bool {
        match self.require.as_mut().and_then(|r| r.get_mut(package)) {
            Some(current) if current.as_str() != constraint => {
                *current = constraint.to_string();
                true
            },
            _ => false,
        }
    }

    /// Apply a batch of chosen constraints, returning how many changed
    pub fn apply_constraints<'a, I>(&mut self, constraints: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        constraints
            .into_iter()
            .filter(|(package, constraint)| self.set_constraint(package, constraint))
            .count()
    }

    /// `drupal/core` and `drupal/core-*` requirements
    pub fn core_packages(&self) -> Vec<Package> {
        self.packages(PackageKind::Core)
    }

    /// `drupal/*` requirements other than core
    pub fn module_packages(&self) -> Vec<Package> {
        self.packages(PackageKind::Module)
    }

    /// Remaining requirements, platform entries excluded
    pub fn other_packages(&self) -> Vec<Package> {
        self.packages(PackageKind::Other)
    }

    fn packages(&self, kind: PackageKind) -> Vec<Package> {
        self.require
            .as_ref()
            .map(|require| extract_packages(require, kind))
            .unwrap_or_default()
    }
}

impl Serialize for ComposerJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ComposerJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Box<RawValue>>::deserialize(deserializer)?;
        Self::from_fields(raw).map_err(D::Error::custom)
    }
}

/// Load and decode composer.json from file path
pub async fn load_from_file(path: &camino::Utf8Path) -> ManifestResult<ComposerJson> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| DrupdateError::io(format!("Failed to read {}", path), e))?;

    ComposerJson::decode(&content).map_err(|e| match e {
        DrupdateError::ManifestParse { message } => DrupdateError::ManifestParse {
            message: format!("In file {}: {}", path, message),
        },
        other => other,
    })
}

/// Encode and write composer.json to file path
pub async fn write_to_file(path: &camino::Utf8Path, manifest: &ComposerJson) -> ManifestResult<()> {
    let content = manifest.encode()?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| DrupdateError::io(format!("Failed to write {}", path), e))
}
