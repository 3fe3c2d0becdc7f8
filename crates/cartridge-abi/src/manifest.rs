//! API manifest
//!
//! The versioned, wire-level description of every host-exposed function:
//! namespace, name, and the flattened argument/return tag sequences, plus
//! one canonical flattened layout per record type. The manifest is the sole
//! contract the guest toolchain compiles against, so its JSON serialization
//! must be deterministic; the record-layout table is a `BTreeMap` and every
//! other collection preserves declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{PrimitiveTag, ValueTag};

/// Descriptor for one host-exposed function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionManifest {
    /// Operation name within its namespace (e.g. `Clear`). The wasm export
    /// is `<namespace><name>` (e.g. `GraphicsClear`).
    pub name: String,
    /// Argument tags in declared order. Record tags resolve through the
    /// manifest's record-layout table.
    pub args: Vec<ValueTag>,
    /// Return tags in declared order.
    pub rets: Vec<ValueTag>,
}

/// One API namespace and its functions, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceManifest {
    pub name: String,
    pub functions: Vec<FunctionManifest>,
}

/// The versioned API manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiManifest {
    /// API version tag. Guest and host must be generated from the same
    /// version; a mismatch is a build-time defect, not a runtime condition.
    pub version: String,
    /// Canonical flattened layout per record type name.
    pub record_layouts: BTreeMap<String, Vec<PrimitiveTag>>,
    pub namespaces: Vec<NamespaceManifest>,
}

impl ApiManifest {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            record_layouts: BTreeMap::new(),
            namespaces: Vec::new(),
        }
    }

    /// Flatten a declared tag into its primitive lane sequence using the
    /// record-layout table. `None` when a record name has no layout entry,
    /// which means the manifest is inconsistent.
    pub fn flatten(&self, tag: &ValueTag) -> Option<Vec<PrimitiveTag>> {
        match tag {
            ValueTag::Prim(p) => Some(vec![*p]),
            ValueTag::Record(name) => self.record_layouts.get(name).cloned(),
        }
    }

    /// Total number of stack lanes a tag sequence occupies, or `None` when
    /// any record tag is missing from the layout table.
    pub fn lane_count(&self, tags: &[ValueTag]) -> Option<usize> {
        let mut total = 0;
        for tag in tags {
            total += self.flatten(tag)?.iter().map(|p| p.lanes()).sum::<usize>();
        }
        Some(total)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiManifest {
        let mut manifest = ApiManifest::new("0.1.0");
        manifest.record_layouts.insert(
            "Color".to_string(),
            vec![
                PrimitiveTag::F32,
                PrimitiveTag::F32,
                PrimitiveTag::F32,
                PrimitiveTag::F32,
            ],
        );
        manifest.namespaces.push(NamespaceManifest {
            name: "Graphics".to_string(),
            functions: vec![FunctionManifest {
                name: "Clear".to_string(),
                args: vec![ValueTag::Record("Color".to_string())],
                rets: vec![],
            }],
        });
        manifest
    }

    #[test]
    fn json_round_trip() {
        let manifest = sample();
        let json = manifest.to_json().unwrap();
        let parsed = ApiManifest::from_json(&json).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn json_shape() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"recordLayouts\""));
        assert!(json.contains("\"namespaces\""));
        assert!(json.contains("\"Color\""));
    }

    #[test]
    fn serialization_is_deterministic() {
        let a = sample().to_json().unwrap();
        let b = sample().to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn lane_counts_through_records() {
        let manifest = sample();
        // Clear takes one Color record: four f32 lanes.
        assert_eq!(
            manifest.lane_count(&manifest.namespaces[0].functions[0].args),
            Some(4)
        );
        // A string plus a record: 2 + 4 lanes.
        let tags = vec![
            ValueTag::Prim(PrimitiveTag::Str),
            ValueTag::Record("Color".to_string()),
        ];
        assert_eq!(manifest.lane_count(&tags), Some(6));
    }

    #[test]
    fn missing_record_layouts_are_detected() {
        let manifest = sample();
        let unknown = ValueTag::Record("Vec2".to_string());

        assert_eq!(manifest.flatten(&unknown), None);
        assert_eq!(
            manifest.lane_count(&[ValueTag::Prim(PrimitiveTag::F32), unknown]),
            None
        );
    }
}
