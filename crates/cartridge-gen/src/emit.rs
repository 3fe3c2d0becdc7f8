//! Manifest and wrapper-table emission
//!
//! Resolves the schema's record layouts into flat lane sequences (memoized,
//! one canonical layout per record), builds the versioned manifest, and
//! renders the host wrapper table as Rust source. Output is deterministic:
//! generating twice from the same schema yields byte-identical files.

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Write};

use thiserror::Error;

use cartridge_abi::{
    ApiManifest, FunctionManifest, NamespaceManifest, PrimitiveTag, ValueTag, STACK_LANES,
};

use crate::schema::{ApiSchema, FunctionDecl, NamespaceDecl, RecordDecl};

#[derive(Debug, Error)]
pub enum GenError {
    #[error("unknown record type: {0}")]
    UnknownRecord(String),
    #[error("record {0} is defined in terms of itself")]
    RecursiveRecord(String),
    #[error("record {record}, field {field}: strings cannot appear inside records")]
    StringField { record: String, field: String },
    #[error("{namespace}.{function}: return type {ty} is not supported")]
    UnsupportedReturn {
        namespace: String,
        function: String,
        ty: String,
    },
    #[error("{namespace}.{function}: call needs {lanes} stack lanes, stack holds {max}")]
    CallTooWide {
        namespace: String,
        function: String,
        lanes: usize,
        max: usize,
    },
    #[error("formatting generated source failed")]
    Fmt(#[from] fmt::Error),
}

/// Holds a parsed schema plus its resolved record layouts.
pub struct Generator<'a> {
    schema: &'a ApiSchema,
    layouts: BTreeMap<String, Vec<PrimitiveTag>>,
}

impl<'a> Generator<'a> {
    pub fn new(schema: &'a ApiSchema) -> Result<Self, GenError> {
        let mut layouts = BTreeMap::new();
        let mut in_progress = HashSet::new();
        for record in &schema.records {
            resolve_layout(schema, &record.name, &mut layouts, &mut in_progress)?;
        }
        let generator = Self { schema, layouts };
        generator.validate()?;
        Ok(generator)
    }

    /// Build the versioned manifest: record layouts plus every namespace's
    /// functions with their declared tags, in declaration order.
    pub fn manifest(&self) -> ApiManifest {
        let mut manifest = ApiManifest::new(&self.schema.version);
        manifest.record_layouts = self.layouts.clone();
        for ns in &self.schema.namespaces {
            manifest.namespaces.push(NamespaceManifest {
                name: ns.name.clone(),
                functions: ns
                    .functions
                    .iter()
                    .map(|f| FunctionManifest {
                        name: f.name.clone(),
                        args: f.args.iter().map(|a| a.ty.clone()).collect(),
                        rets: f.rets.clone(),
                    })
                    .collect(),
            });
        }
        manifest
    }

    /// Render the host wrapper table: record structs, one wrapper function
    /// per API function, and the `register` entry point.
    pub fn emit_rust(&self) -> Result<String, GenError> {
        let mut out = String::new();
        self.render(&mut out)?;
        Ok(out)
    }

    fn validate(&self) -> Result<(), GenError> {
        for ns in &self.schema.namespaces {
            for func in &ns.functions {
                let mut arg_lanes = 0usize;
                for arg in &func.args {
                    arg_lanes += self
                        .flatten(&arg.ty)?
                        .iter()
                        .map(|p| p.lanes())
                        .sum::<usize>();
                }
                let mut ret_lanes = 0usize;
                for ret in &func.rets {
                    match ret {
                        ValueTag::Prim(PrimitiveTag::Str) | ValueTag::Record(_) => {
                            return Err(GenError::UnsupportedReturn {
                                namespace: ns.name.clone(),
                                function: func.name.clone(),
                                ty: ret.as_str().to_string(),
                            });
                        }
                        ValueTag::Prim(_) => ret_lanes += 1,
                    }
                }
                let widest = arg_lanes.max(ret_lanes);
                if widest > STACK_LANES {
                    return Err(GenError::CallTooWide {
                        namespace: ns.name.clone(),
                        function: func.name.clone(),
                        lanes: widest,
                        max: STACK_LANES,
                    });
                }
            }
        }
        Ok(())
    }

    fn flatten(&self, tag: &ValueTag) -> Result<Vec<PrimitiveTag>, GenError> {
        match tag {
            ValueTag::Prim(p) => Ok(vec![*p]),
            ValueTag::Record(name) => self
                .layouts
                .get(name)
                .cloned()
                .ok_or_else(|| GenError::UnknownRecord(name.clone())),
        }
    }

    /// Records reachable from any function argument, in declaration order.
    /// Only these get a struct in the wrapper table.
    fn records_in_args(&self) -> Vec<&'a RecordDecl> {
        let mut used = HashSet::new();
        for ns in &self.schema.namespaces {
            for func in &ns.functions {
                for arg in &func.args {
                    if let ValueTag::Record(name) = &arg.ty {
                        self.collect_record(name, &mut used);
                    }
                }
            }
        }
        self.schema
            .records
            .iter()
            .filter(|r| used.contains(&r.name))
            .collect()
    }

    fn collect_record(&self, name: &str, used: &mut HashSet<String>) {
        if !used.insert(name.to_string()) {
            return;
        }
        if let Some(record) = self.schema.records.iter().find(|r| r.name == name) {
            for field in &record.fields {
                if let ValueTag::Record(inner) = &field.ty {
                    self.collect_record(inner, used);
                }
            }
        }
    }

    fn render(&self, out: &mut String) -> Result<(), GenError> {
        let any_strings = self.schema.namespaces.iter().any(|ns| {
            ns.functions
                .iter()
                .any(|f| f.args.iter().any(|a| a.ty == ValueTag::Prim(PrimitiveTag::Str)))
        });
        let any_rets = self
            .schema
            .namespaces
            .iter()
            .any(|ns| ns.functions.iter().any(|f| !f.rets.is_empty()));

        writeln!(out, "// Code generated by cartridge-gen. DO NOT EDIT.")?;
        writeln!(out, "// API version {}", self.schema.version)?;
        writeln!(out)?;
        writeln!(
            out,
            "use wasmtime::{{Caller, Engine, FuncType, Linker, Val, ValType}};"
        )?;
        writeln!(out)?;
        let mut items = Vec::new();
        if any_rets {
            items.push("RetKind");
        }
        items.push("load_stack");
        if any_strings {
            items.push("read_guest_string");
        }
        if any_rets {
            items.push("store_results");
        }
        writeln!(out, "use crate::api::support::{{{}}};", items.join(", "))?;
        writeln!(out, "use crate::context::StoreData;")?;

        for record in self.records_in_args() {
            writeln!(out)?;
            self.emit_record(out, record)?;
        }
        for ns in &self.schema.namespaces {
            for func in &ns.functions {
                writeln!(out)?;
                self.emit_wrapper(out, ns, func)?;
            }
        }
        writeln!(out)?;
        self.emit_register(out)?;
        Ok(())
    }

    fn emit_record(&self, out: &mut String, record: &RecordDecl) -> Result<(), GenError> {
        let lanes = self.layouts[&record.name].len();
        writeln!(
            out,
            "/// Record type `{}`, flattened to {} stack lanes.",
            record.name, lanes
        )?;
        writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq)]")?;
        writeln!(out, "pub struct {} {{", record.name)?;
        for field in &record.fields {
            writeln!(
                out,
                "    pub {}: {},",
                snake_case(&field.name),
                rust_type(&field.ty)
            )?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl {} {{", record.name)?;
        writeln!(out, "    pub fn read_lanes(lanes: &[u64]) -> Self {{")?;
        writeln!(out, "        Self {{")?;
        let mut off = 0usize;
        for field in &record.fields {
            let name = snake_case(&field.name);
            match &field.ty {
                ValueTag::Prim(p) => {
                    writeln!(
                        out,
                        "            {}: cartridge_abi::{}(lanes[{}]),",
                        name,
                        decode_fn(*p),
                        off
                    )?;
                    off += 1;
                }
                ValueTag::Record(inner) => {
                    let end = off + self.layouts[inner.as_str()].len();
                    writeln!(
                        out,
                        "            {}: {}::read_lanes(&lanes[{}..{}]),",
                        name, inner, off, end
                    )?;
                    off = end;
                }
            }
        }
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn emit_wrapper(
        &self,
        out: &mut String,
        ns: &NamespaceDecl,
        func: &FunctionDecl,
    ) -> Result<(), GenError> {
        let fn_name = method_name(&ns.name, &func.name);
        let has_rets = !func.rets.is_empty();
        writeln!(out, "fn {}(", fn_name)?;
        writeln!(out, "    mut caller: Caller<'_, StoreData>,")?;
        writeln!(out, "    params: &[Val],")?;
        if has_rets {
            writeln!(out, "    results: &mut [Val],")?;
        } else {
            writeln!(out, "    _results: &mut [Val],")?;
        }
        writeln!(out, ") -> wasmtime::Result<()> {{")?;
        if func.args.is_empty() {
            writeln!(out, "    load_stack(&mut caller, params);")?;
        } else {
            writeln!(out, "    let lanes = load_stack(&mut caller, params);")?;
        }

        let mut off = 0usize;
        let mut call_args = Vec::new();
        for arg in &func.args {
            let name = snake_case(&arg.name);
            match &arg.ty {
                ValueTag::Prim(PrimitiveTag::Str) => {
                    writeln!(
                        out,
                        "    let {} = read_guest_string(&mut caller, lanes[{}], lanes[{}]);",
                        name,
                        off,
                        off + 1
                    )?;
                    off += 2;
                    call_args.push(format!("&{}", name));
                }
                ValueTag::Prim(p) => {
                    writeln!(
                        out,
                        "    let {} = cartridge_abi::{}(lanes[{}]);",
                        name,
                        decode_fn(*p),
                        off
                    )?;
                    off += 1;
                    call_args.push(name);
                }
                ValueTag::Record(rec) => {
                    let end = off + self.layouts[rec.as_str()].len();
                    writeln!(
                        out,
                        "    let {} = {}::read_lanes(&lanes[{}..{}]);",
                        name, rec, off, end
                    )?;
                    off = end;
                    call_args.push(name);
                }
            }
        }

        writeln!(out, "    let ctx = caller.data().ctx.clone();")?;
        let args_joined = call_args.join(", ");
        if has_rets {
            let bind = if func.rets.len() == 1 {
                "ret0".to_string()
            } else {
                let names: Vec<String> =
                    (0..func.rets.len()).map(|i| format!("ret{}", i)).collect();
                format!("({})", names.join(", "))
            };
            writeln!(
                out,
                "    let {} = ctx.lock().{}({});",
                bind, fn_name, args_joined
            )?;
            let mut lanes_list = Vec::new();
            let mut kinds_list = Vec::new();
            for (i, ret) in func.rets.iter().enumerate() {
                let prim = match ret {
                    ValueTag::Prim(p) => *p,
                    ValueTag::Record(_) => unreachable!("record returns are rejected"),
                };
                lanes_list.push(format!("cartridge_abi::{}(ret{})", encode_fn(prim), i));
                kinds_list.push(ret_kind(prim).to_string());
            }
            writeln!(
                out,
                "    store_results(&mut caller, results, &[{}], &[{}]);",
                lanes_list.join(", "),
                kinds_list.join(", ")
            )?;
        } else {
            writeln!(out, "    ctx.lock().{}({});", fn_name, args_joined)?;
        }
        writeln!(out, "    Ok(())")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn emit_register(&self, out: &mut String) -> Result<(), GenError> {
        writeln!(
            out,
            "/// Install every host API function on the linker under the `env` module."
        )?;
        writeln!(
            out,
            "pub fn register(engine: &Engine, linker: &mut Linker<StoreData>) -> wasmtime::Result<()> {{"
        )?;
        for ns in &self.schema.namespaces {
            for func in &ns.functions {
                let mut params = Vec::new();
                for arg in &func.args {
                    for prim in self.flatten(&arg.ty)? {
                        push_val_types(&mut params, prim);
                    }
                }
                let mut results = Vec::new();
                for ret in &func.rets {
                    if let ValueTag::Prim(p) = ret {
                        push_val_types(&mut results, *p);
                    }
                }
                writeln!(out, "    linker.func_new(")?;
                writeln!(out, "        \"env\",")?;
                writeln!(out, "        \"{}{}\",", ns.name, func.name)?;
                writeln!(out, "        FuncType::new(")?;
                writeln!(out, "            engine,")?;
                write_val_types(out, &params)?;
                write_val_types(out, &results)?;
                writeln!(out, "        ),")?;
                writeln!(out, "        {},", method_name(&ns.name, &func.name))?;
                writeln!(out, "    )?;")?;
            }
        }
        writeln!(out, "    Ok(())")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}

fn resolve_layout(
    schema: &ApiSchema,
    name: &str,
    layouts: &mut BTreeMap<String, Vec<PrimitiveTag>>,
    in_progress: &mut HashSet<String>,
) -> Result<(), GenError> {
    if layouts.contains_key(name) {
        return Ok(());
    }
    if !in_progress.insert(name.to_string()) {
        return Err(GenError::RecursiveRecord(name.to_string()));
    }
    let record = schema
        .records
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| GenError::UnknownRecord(name.to_string()))?;
    let mut layout = Vec::new();
    for field in &record.fields {
        match &field.ty {
            ValueTag::Prim(PrimitiveTag::Str) => {
                return Err(GenError::StringField {
                    record: name.to_string(),
                    field: field.name.clone(),
                });
            }
            ValueTag::Prim(p) => layout.push(*p),
            ValueTag::Record(inner) => {
                resolve_layout(schema, inner, layouts, in_progress)?;
                layout.extend(layouts[inner.as_str()].iter().copied());
            }
        }
    }
    in_progress.remove(name);
    layouts.insert(name.to_string(), layout);
    Ok(())
}

/// `SetWindowSize` -> `set_window_size`; namespaced wrapper and context
/// method names are `<namespace>_<function>` in this form.
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn method_name(namespace: &str, function: &str) -> String {
    format!("{}_{}", snake_case(namespace), snake_case(function))
}

fn rust_type(tag: &ValueTag) -> String {
    match tag {
        ValueTag::Prim(PrimitiveTag::Bool) => "bool".to_string(),
        ValueTag::Prim(PrimitiveTag::I32) => "i32".to_string(),
        ValueTag::Prim(PrimitiveTag::U32) => "u32".to_string(),
        ValueTag::Prim(PrimitiveTag::F32) => "f32".to_string(),
        ValueTag::Prim(PrimitiveTag::Str) => "String".to_string(),
        ValueTag::Record(name) => name.clone(),
    }
}

fn decode_fn(prim: PrimitiveTag) -> &'static str {
    match prim {
        PrimitiveTag::Bool => "decode_bool",
        PrimitiveTag::I32 => "decode_i32",
        PrimitiveTag::U32 => "decode_u32",
        PrimitiveTag::F32 => "decode_f32",
        PrimitiveTag::Str => unreachable!("strings are read from guest memory, not lanes"),
    }
}

fn encode_fn(prim: PrimitiveTag) -> &'static str {
    match prim {
        PrimitiveTag::Bool => "encode_bool",
        PrimitiveTag::I32 => "encode_i32",
        PrimitiveTag::U32 => "encode_u32",
        PrimitiveTag::F32 => "encode_f32",
        PrimitiveTag::Str => unreachable!("string returns are rejected"),
    }
}

/// Wasm-level value types for one flattened primitive. A string is two i32
/// parameters (byte offset, byte length); every other scalar is one value.
fn push_val_types(out: &mut Vec<&'static str>, prim: PrimitiveTag) {
    match prim {
        PrimitiveTag::F32 => out.push("ValType::F32"),
        PrimitiveTag::Str => {
            out.push("ValType::I32");
            out.push("ValType::I32");
        }
        PrimitiveTag::Bool | PrimitiveTag::I32 | PrimitiveTag::U32 => out.push("ValType::I32"),
    }
}

fn ret_kind(prim: PrimitiveTag) -> &'static str {
    match prim {
        PrimitiveTag::F32 => "RetKind::F32",
        _ => "RetKind::I32",
    }
}

fn write_val_types(out: &mut String, types: &[&'static str]) -> fmt::Result {
    if types.is_empty() {
        writeln!(out, "            [ValType::I32; 0],")
    } else {
        writeln!(out, "            [")?;
        for t in types {
            writeln!(out, "                {},", t)?;
        }
        writeln!(out, "            ],")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_JSON: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../api/schema.json"));

    fn bundled() -> ApiSchema {
        ApiSchema::from_json(SCHEMA_JSON).unwrap()
    }

    #[test]
    fn snake_case_names() {
        assert_eq!(snake_case("SetWindowSize"), "set_window_size");
        assert_eq!(snake_case("CursorX"), "cursor_x");
        assert_eq!(snake_case("Log"), "log");
        assert_eq!(method_name("Graphics", "TextureEx"), "graphics_texture_ex");
    }

    #[test]
    fn bundled_schema_generates() {
        let schema = bundled();
        let generator = Generator::new(&schema).unwrap();
        let manifest = generator.manifest();

        assert_eq!(manifest.version, schema.version);
        assert_eq!(
            manifest.record_layouts["Color"],
            vec![PrimitiveTag::F32; 4]
        );
        let names: Vec<&str> = manifest.namespaces.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Config", "Platform", "Input", "Graphics", "Asset"]);

        let source = generator.emit_rust().unwrap();
        assert!(source.starts_with("// Code generated by cartridge-gen. DO NOT EDIT.\n"));
        assert!(source.contains("pub struct Color {"));
        assert!(source.contains("fn graphics_texture_ex("));
        assert!(source.contains("\"GraphicsTextureEx\","));
        assert!(source.contains("pub fn register("));
    }

    #[test]
    fn checked_in_artifacts_are_fresh() {
        let schema = bundled();
        let generator = Generator::new(&schema).unwrap();

        let manifest = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../api/manifest.json"
        ));
        assert_eq!(
            generator.manifest().to_json().unwrap(),
            manifest,
            "api/manifest.json is stale, rerun cartridge-gen"
        );

        let wrappers = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../crates/cartridge-runtime/src/api/gen.rs"
        ));
        assert_eq!(
            generator.emit_rust().unwrap(),
            wrappers,
            "gen.rs is stale, rerun cartridge-gen"
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = bundled();
        let a = Generator::new(&schema).unwrap();
        let b = Generator::new(&schema).unwrap();
        assert_eq!(a.manifest().to_json().unwrap(), b.manifest().to_json().unwrap());
        assert_eq!(a.emit_rust().unwrap(), b.emit_rust().unwrap());
    }

    #[test]
    fn nested_records_flatten_with_one_layout_per_record() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "records": [
                    {"name": "Outer", "fields": [
                        {"name": "tint", "type": "Inner"},
                        {"name": "solid", "type": "bool"}
                    ]},
                    {"name": "Inner", "fields": [
                        {"name": "x", "type": "f32"},
                        {"name": "y", "type": "f32"}
                    ]}
                ],
                "namespaces": [
                    {"name": "Test", "functions": [
                        {"name": "Draw", "args": [{"name": "o", "type": "Outer"}]}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let generator = Generator::new(&schema).unwrap();
        let manifest = generator.manifest();
        assert_eq!(manifest.record_layouts.len(), 2);
        assert_eq!(
            manifest.record_layouts["Outer"],
            vec![PrimitiveTag::F32, PrimitiveTag::F32, PrimitiveTag::Bool]
        );
        assert_eq!(
            manifest.lane_count(&manifest.namespaces[0].functions[0].args),
            Some(3)
        );
    }

    #[test]
    fn string_fields_in_records_are_rejected() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "records": [
                    {"name": "Label", "fields": [{"name": "text", "type": "string"}]}
                ],
                "namespaces": []
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Generator::new(&schema),
            Err(GenError::StringField { .. })
        ));
    }

    #[test]
    fn unknown_record_is_rejected() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "namespaces": [
                    {"name": "Test", "functions": [
                        {"name": "Draw", "args": [{"name": "v", "type": "Vec2"}]}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Generator::new(&schema),
            Err(GenError::UnknownRecord(name)) if name == "Vec2"
        ));
    }

    #[test]
    fn string_returns_are_rejected() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "namespaces": [
                    {"name": "Test", "functions": [
                        {"name": "Name", "rets": ["string"]}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Generator::new(&schema),
            Err(GenError::UnsupportedReturn { .. })
        ));
    }

    #[test]
    fn calls_wider_than_the_stack_are_rejected() {
        let schema = ApiSchema::from_json(
            r#"{
                "version": "0.1.0",
                "namespaces": [
                    {"name": "Test", "functions": [
                        {"name": "Wide", "args": [
                            {"name": "a", "type": "string"},
                            {"name": "b", "type": "string"},
                            {"name": "c", "type": "string"},
                            {"name": "d", "type": "string"},
                            {"name": "e", "type": "string"},
                            {"name": "f", "type": "string"},
                            {"name": "g", "type": "string"},
                            {"name": "h", "type": "string"},
                            {"name": "i", "type": "string"}
                        ]}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            Generator::new(&schema),
            Err(GenError::CallTooWide { lanes: 18, .. })
        ));
    }
}
