//! API schema declarations
//!
//! The hand-maintained input to the generator. The schema names record
//! types and namespaced functions with their declared (un-flattened) types;
//! the generator resolves record layouts and produces the manifest plus the
//! host wrapper table from it.

use serde::Deserialize;

use cartridge_abi::ValueTag;

/// Root of the API schema file.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSchema {
    pub version: String,
    #[serde(default)]
    pub records: Vec<RecordDecl>,
    pub namespaces: Vec<NamespaceDecl>,
}

/// A record type: an ordered list of named fields.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueTag,
}

/// One namespace and its functions, in declaration order.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub functions: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgDecl>,
    #[serde(default)]
    pub rets: Vec<ValueTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueTag,
}

impl ApiSchema {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartridge_abi::PrimitiveTag;

    #[test]
    fn parses_a_schema() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "records": [
                    {"name": "Color", "fields": [
                        {"name": "r", "type": "f32"},
                        {"name": "g", "type": "f32"},
                        {"name": "b", "type": "f32"},
                        {"name": "a", "type": "f32"}
                    ]}
                ],
                "namespaces": [
                    {"name": "Graphics", "functions": [
                        {"name": "Clear", "args": [{"name": "color", "type": "Color"}]}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.version, "0.1.0");
        assert_eq!(schema.records[0].fields.len(), 4);
        assert_eq!(
            schema.records[0].fields[0].ty,
            ValueTag::Prim(PrimitiveTag::F32)
        );
        let clear = &schema.namespaces[0].functions[0];
        assert_eq!(clear.args[0].ty, ValueTag::Record("Color".into()));
        assert!(clear.rets.is_empty());
    }
}
