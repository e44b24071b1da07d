//! # Metadata Schema
//!
//! The field contract for `project.metadata.json` is carried by a schema
//! document (a JSON-Schema-style object), not by hand-maintained validation
//! code. [`SchemaValidator`] interprets the document directly, so the
//! shipped `schema/project.metadata.schema.json` is the normative source
//! for field-level rules; a different document can be supplied with
//! `--schema`.
//!
//! Supported facets: `required`, per-property `type`
//! (`string`/`array`/`object`), `pattern`, `minLength`, `maxLength`,
//! `items`, `additionalProperties`. Other JSON Schema keywords are ignored.
//!
//! ## Strict vs. lax
//!
//! Two facets are mode-sensitive. `maxLength` overruns and unknown
//! top-level fields are hard violations only under `--strict`; in lax mode
//! an overrun becomes an [`Advisory`] (surfaced as a warning, repository
//! still included) and unknown fields are dropped for forward
//! compatibility. Everything else is a hard violation in both modes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The schema document compiled into the binary, used when `--schema` is
/// not given.
pub const DEFAULT_SCHEMA_JSON: &str = include_str!("../schema/project.metadata.schema.json");

/// A parsed schema document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDoc {
    #[serde(default)]
    pub title: Option<String>,
    /// Top-level fields that must be present.
    #[serde(default)]
    pub required: Vec<String>,
    /// Per-field rules, keyed by field name.
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSpec>,
    /// Whether top-level fields outside `properties` are allowed.
    #[serde(default = "default_true")]
    pub additional_properties: bool,
}

/// Rules for a single field (or for array items / object values, nested).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Anchored regular expression the value must match (strings only).
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Element rules for arrays.
    #[serde(default)]
    pub items: Option<Box<FieldSpec>>,
    /// Value rules for objects (keys are always strings in JSON).
    #[serde(default)]
    pub additional_properties: Option<Box<FieldSpec>>,
}

/// The JSON value kinds the contract distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Array,
    Object,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        };
        f.write_str(name)
    }
}

fn default_true() -> bool {
    true
}

/// A soft schema finding that does not exclude the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub field: String,
    pub message: String,
}

/// Validates parsed metadata objects against a [`SchemaDoc`].
///
/// Patterns are compiled once at construction so per-repository validation
/// never recompiles a regex.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    doc: SchemaDoc,
    patterns: BTreeMap<String, Regex>,
}

impl SchemaValidator {
    /// Build a validator from an already-parsed document.
    pub fn from_doc(doc: SchemaDoc) -> Result<Self> {
        let mut patterns = BTreeMap::new();
        for (name, spec) in &doc.properties {
            if let Some(pattern) = &spec.pattern {
                patterns.insert(name.clone(), Regex::new(pattern)?);
            }
        }
        Ok(Self { doc, patterns })
    }

    /// Parse a schema document from JSON text and build a validator.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SchemaDoc = serde_json::from_str(json).map_err(|e| Error::Schema {
            message: format!("unparseable schema document: {e}"),
        })?;
        Self::from_doc(doc)
    }

    /// Load a schema document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::Schema {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Build a validator from the embedded default document.
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_SCHEMA_JSON)
    }

    /// Validate one metadata object.
    ///
    /// Returns the advisories gathered in lax mode; a hard violation is an
    /// [`Error::Validation`] naming the offending field. `path` is the
    /// metadata file the object came from, used only for error context.
    pub fn validate(
        &self,
        path: &Path,
        data: &Map<String, Value>,
        strict: bool,
    ) -> Result<Vec<Advisory>> {
        for field in &self.doc.required {
            if !data.contains_key(field) {
                return Err(self.violation(path, field, format!("missing required field: {field}")));
            }
        }

        let mut advisories = Vec::new();
        for (field, value) in data {
            if let Some(spec) = self.doc.properties.get(field) {
                self.check_field(path, field, spec, value, strict, &mut advisories)?;
            }
        }

        if !self.doc.additional_properties {
            // serde_json's map is BTreeMap-backed, so extras come out sorted
            let extras: Vec<&str> = data
                .keys()
                .filter(|k| !self.doc.properties.contains_key(*k))
                .map(String::as_str)
                .collect();
            if !extras.is_empty() {
                if strict {
                    return Err(self.violation(
                        path,
                        &extras.join(", "),
                        format!("unexpected fields: {extras:?}"),
                    ));
                }
                log::debug!(
                    "{}: ignoring unknown fields: {:?}",
                    path.display(),
                    extras
                );
            }
        }

        Ok(advisories)
    }

    fn check_field(
        &self,
        path: &Path,
        field: &str,
        spec: &FieldSpec,
        value: &Value,
        strict: bool,
        advisories: &mut Vec<Advisory>,
    ) -> Result<()> {
        match spec.kind {
            FieldKind::String => {
                let Some(text) = value.as_str() else {
                    return Err(self.violation(path, field, format!("{field} must be string")));
                };
                if let Some(regex) = self.patterns.get(field) {
                    if !regex.is_match(text) {
                        let pattern = spec.pattern.as_deref().unwrap_or_default();
                        return Err(self.violation(
                            path,
                            field,
                            format!("{field} must match pattern {pattern}"),
                        ));
                    }
                }
                // length in code points, not bytes
                let length = text.chars().count();
                if let Some(min) = spec.min_length {
                    if length < min {
                        return Err(self.violation(
                            path,
                            field,
                            format!("{field} shorter than minimum length {min}"),
                        ));
                    }
                }
                if let Some(max) = spec.max_length {
                    if length > max {
                        let message = format!("{field} exceeds {max} chars");
                        if strict {
                            return Err(self.violation(path, field, message));
                        }
                        advisories.push(Advisory {
                            field: field.to_string(),
                            message,
                        });
                    }
                }
            }
            FieldKind::Array => {
                let Some(items) = value.as_array() else {
                    return Err(self.violation(path, field, format!("{field} must be array")));
                };
                if let Some(item_spec) = &spec.items {
                    if !items.iter().all(|item| matches_kind(item, item_spec.kind)) {
                        return Err(self.violation(
                            path,
                            field,
                            format!("{field} must be array of {}s", item_spec.kind),
                        ));
                    }
                }
            }
            FieldKind::Object => {
                let Some(object) = value.as_object() else {
                    return Err(self.violation(path, field, format!("{field} must be object")));
                };
                if let Some(value_spec) = &spec.additional_properties {
                    if !object.values().all(|v| matches_kind(v, value_spec.kind)) {
                        return Err(self.violation(
                            path,
                            field,
                            format!("{field} keys and values must be {}s", value_spec.kind),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn violation(&self, path: &Path, field: &str, message: String) -> Error {
        Error::Validation {
            path: path.to_path_buf(),
            field: field.to_string(),
            message,
        }
    }
}

fn matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
    }
}
