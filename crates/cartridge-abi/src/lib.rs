//! Cartridge ABI
//!
//! The shared contract between the host runtime and guest modules:
//! - Tag enums describing every value that can cross the boundary
//! - The versioned API manifest (the wire-level description both the host
//!   wrapper table and the guest binding stubs are generated from)
//! - The flat-stack lane codec: every argument and return value travels as
//!   one or more 64-bit lanes in a shared call-stack buffer
//!
//! This crate is pure data and codec; it knows nothing about wasmtime.

mod manifest;
mod stack;
mod tag;

pub use manifest::{ApiManifest, FunctionManifest, NamespaceManifest};
pub use stack::{
    decode_bool, decode_f32, decode_i32, decode_u32, encode_bool, encode_f32, encode_i32,
    encode_u32, Lane, StackBuffer, STACK_LANES, STRING_LANES,
};
pub use tag::{PrimitiveTag, TagParseError, ValueTag};
