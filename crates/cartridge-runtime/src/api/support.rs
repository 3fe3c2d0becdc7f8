//! Marshaling helpers shared by the generated wrapper table
//!
//! Every host call follows the same protocol: clear the store's stack
//! buffer, copy the wasm-level params in as 64-bit lanes, decode, call into
//! the context, encode any results back out. Strings arrive as
//! (offset, length) lane pairs into guest linear memory.

use tracing::warn;
use wasmtime::{Caller, Extern, Val};

use cartridge_abi::{Lane, STACK_LANES};

use crate::context::StoreData;

/// Wasm-level shape of one result lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetKind {
    I32,
    F32,
}

/// Clear the store's stack buffer, load the call's params into it, and
/// return a copy of the lane array. Clearing first guarantees a prior call
/// with a wider shape can never leak lanes into this one.
pub fn load_stack(caller: &mut Caller<'_, StoreData>, params: &[Val]) -> [Lane; STACK_LANES] {
    let stack = &mut caller.data_mut().stack;
    stack.clear();
    for (i, val) in params.iter().enumerate() {
        stack.set(i, val_to_lane(val));
    }
    stack.lanes()
}

/// Write result lanes into the store's stack buffer and convert them to the
/// wasm-level results per the declared kind.
pub fn store_results(
    caller: &mut Caller<'_, StoreData>,
    results: &mut [Val],
    lanes: &[Lane],
    kinds: &[RetKind],
) {
    let stack = &mut caller.data_mut().stack;
    for (i, lane) in lanes.iter().enumerate() {
        stack.set(i, *lane);
    }
    for (slot, (lane, kind)) in results.iter_mut().zip(lanes.iter().zip(kinds)) {
        *slot = match kind {
            RetKind::I32 => Val::I32(*lane as u32 as i32),
            RetKind::F32 => Val::F32(*lane as u32),
        };
    }
}

/// Read a guest string from its (offset, length) lanes. An out-of-bounds
/// range or a missing memory export yields an empty string and a log line;
/// a bad string never fails the call.
pub fn read_guest_string(caller: &mut Caller<'_, StoreData>, offset: Lane, len: Lane) -> String {
    let Some(Extern::Memory(memory)) = caller.get_export("memory") else {
        warn!("guest exports no memory, reading string as empty");
        return String::new();
    };
    let data = memory.data(&caller);
    let start = offset as usize;
    let Some(end) = start.checked_add(len as usize) else {
        warn!(offset, len, "string range overflows, reading as empty");
        return String::new();
    };
    let Some(bytes) = data.get(start..end) else {
        warn!(
            offset,
            len,
            memory_len = data.len(),
            "string range out of bounds, reading as empty"
        );
        return String::new();
    };
    String::from_utf8_lossy(bytes).into_owned()
}

fn val_to_lane(val: &Val) -> Lane {
    match val {
        Val::I32(v) => *v as u32 as Lane,
        Val::I64(v) => *v as Lane,
        Val::F32(bits) => *bits as Lane,
        Val::F64(bits) => *bits,
        _ => 0,
    }
}
