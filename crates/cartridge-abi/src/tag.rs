//! Boundary type tags
//!
//! Closed enumerations for every type that can cross the host/guest
//! boundary. A `PrimitiveTag` maps to a fixed number of stack lanes; a
//! `ValueTag` additionally names record types, whose flattened layouts live
//! in the manifest's record-layout table.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error produced when a schema or manifest names an unknown type.
#[derive(Debug, Error)]
#[error("unknown primitive tag: {0:?}")]
pub struct TagParseError(pub String);

/// Primitive boundary types. These are the only types that appear in a
/// flattened record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    Bool,
    I32,
    U32,
    F32,
    /// A string is a (byte offset, byte length) pair into guest linear
    /// memory and always occupies exactly two lanes.
    Str,
}

impl PrimitiveTag {
    /// Number of 64-bit stack lanes this primitive occupies.
    pub fn lanes(self) -> usize {
        match self {
            PrimitiveTag::Str => crate::STRING_LANES,
            PrimitiveTag::Bool | PrimitiveTag::I32 | PrimitiveTag::U32 | PrimitiveTag::F32 => 1,
        }
    }

    /// The manifest spelling of this tag.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveTag::Bool => "bool",
            PrimitiveTag::I32 => "i32",
            PrimitiveTag::U32 => "u32",
            PrimitiveTag::F32 => "f32",
            PrimitiveTag::Str => "string",
        }
    }

    pub fn parse(s: &str) -> Result<Self, TagParseError> {
        match s {
            "bool" => Ok(PrimitiveTag::Bool),
            "i32" => Ok(PrimitiveTag::I32),
            "u32" => Ok(PrimitiveTag::U32),
            "f32" => Ok(PrimitiveTag::F32),
            "string" => Ok(PrimitiveTag::Str),
            other => Err(TagParseError(other.to_string())),
        }
    }
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PrimitiveTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PrimitiveTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PrimitiveTag::parse(&s).map_err(de::Error::custom)
    }
}

/// A value as declared in a function signature: either a primitive or a
/// named record type flattened per the manifest's record-layout table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Prim(PrimitiveTag),
    Record(String),
}

impl ValueTag {
    /// Parse a schema/manifest type name. Anything that is not a primitive
    /// spelling is treated as a record name.
    pub fn parse(s: &str) -> Self {
        match PrimitiveTag::parse(s) {
            Ok(prim) => ValueTag::Prim(prim),
            Err(_) => ValueTag::Record(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ValueTag::Prim(p) => p.as_str(),
            ValueTag::Record(name) => name,
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ValueTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ValueTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl Visitor<'_> for TagVisitor {
            type Value = ValueTag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a primitive tag or record type name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ValueTag, E> {
                Ok(ValueTag::parse(v))
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}
