//! Typed resource records as produced by a wiring file or a live cluster reader.
//!
//! A record is the loosest possible shape: a `kind` discriminator, an optional
//! `metadata.name` and a free-form `spec` map. Extraction decides what each kind means.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Switch,
    Server,
    Node,
    Connection,
    External,
    ExternalAttachment,
}

impl RecordKind {
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "Switch" => Some(Self::Switch),
            "Server" => Some(Self::Server),
            "Node" => Some(Self::Node),
            "Connection" => Some(Self::Connection),
            "External" => Some(Self::External),
            "ExternalAttachment" => Some(Self::ExternalAttachment),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "Switch",
            Self::Server => "Server",
            Self::Node => "Node",
            Self::Connection => "Connection",
            Self::External => "External",
            Self::ExternalAttachment => "ExternalAttachment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: String,
    pub name: Option<String>,
    #[serde(default)]
    pub spec: Value,
}

impl Record {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, spec: Value) -> Self {
        Self {
            kind: kind.into(),
            name: Some(name.into()),
            spec,
        }
    }

    pub fn record_kind(&self) -> Option<RecordKind> {
        RecordKind::from_kind(&self.kind)
    }

    /// Returns the record name, treating blank names as missing.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Looks up a nested spec value by key path (`["external", "link", "switch", "port"]`).
    pub fn spec_at(&self, path: &[&str]) -> Option<&Value> {
        let mut cur = &self.spec;
        for key in path {
            cur = cur.as_object()?.get(*key)?;
        }
        Some(cur)
    }

    pub fn spec_str(&self, path: &[&str]) -> Option<&str> {
        self.spec_at(path)?.as_str()
    }
}

/// Parses a multi-document YAML record stream.
///
/// Kubernetes-style list documents (`kind: List` / `kind: SwitchList` with `items`) are
/// flattened. Empty documents and documents that are not mappings are skipped; only a stream
/// that fails to parse as YAML is an error.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    if text.trim().is_empty() {
        return Ok(out);
    }

    for (document, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(de).map_err(|err| Error::RecordStream {
            document,
            message: err.to_string(),
        })?;
        collect_records(value, &mut out);
    }
    Ok(out)
}

fn collect_records(value: Value, out: &mut Vec<Record>) {
    let Value::Object(mut obj) = value else {
        if !value.is_null() {
            tracing::debug!("skipping record document that is not a mapping");
        }
        return;
    };

    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();

    if kind.ends_with("List") {
        if let Some(Value::Array(items)) = obj.remove("items") {
            for item in items {
                collect_records(item, out);
            }
            return;
        }
    }

    if kind.is_empty() {
        tracing::debug!("skipping record without kind");
        return;
    }

    let name = obj
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let spec = obj.remove("spec").unwrap_or(Value::Null);

    out.push(Record { kind, name, spec });
}
