//! Flat-stack lane codec
//!
//! Every value crossing the boundary travels through 64-bit lanes in a
//! shared call-stack buffer. One primitive encodes to one lane (a string to
//! two: byte offset and byte length into guest linear memory; the bytes
//! themselves are never inlined). Booleans serialize as u32 0/1; i32 as its
//! zero-extended bit pattern; f32 as its raw bits.

/// One 64-bit call-stack slot.
pub type Lane = u64;

/// Capacity of the shared stack buffer, in lanes. Sized for the widest
/// call in the API with room to spare.
pub const STACK_LANES: usize = 16;

/// A string argument always occupies exactly this many lanes.
pub const STRING_LANES: usize = 2;

pub fn encode_u32(v: u32) -> Lane {
    v as Lane
}

pub fn decode_u32(lane: Lane) -> u32 {
    lane as u32
}

pub fn encode_i32(v: i32) -> Lane {
    v as u32 as Lane
}

pub fn decode_i32(lane: Lane) -> i32 {
    lane as u32 as i32
}

pub fn encode_f32(v: f32) -> Lane {
    v.to_bits() as Lane
}

pub fn decode_f32(lane: Lane) -> f32 {
    f32::from_bits(lane as u32)
}

pub fn encode_bool(v: bool) -> Lane {
    if v { 1 } else { 0 }
}

pub fn decode_bool(lane: Lane) -> bool {
    lane as u32 == 1
}

/// Fixed-capacity lane buffer reused across every callback and host-call
/// invocation. Only the first N lanes (per call arity) carry meaning;
/// `clear` zeroes all of them so a differently-shaped prior call can never
/// leak stale lanes into the next one.
#[derive(Debug, Clone)]
pub struct StackBuffer {
    lanes: [Lane; STACK_LANES],
}

impl StackBuffer {
    pub fn new() -> Self {
        Self {
            lanes: [0; STACK_LANES],
        }
    }

    pub fn clear(&mut self) {
        self.lanes = [0; STACK_LANES];
    }

    pub fn set(&mut self, index: usize, lane: Lane) {
        debug_assert!(index < STACK_LANES, "stack lane {index} out of range");
        if let Some(slot) = self.lanes.get_mut(index) {
            *slot = lane;
        }
    }

    pub fn lane(&self, index: usize) -> Lane {
        self.lanes.get(index).copied().unwrap_or(0)
    }

    /// Copy of the full lane array. Cheap, and lets marshaling code read
    /// lanes without holding a borrow on the buffer's owner.
    pub fn lanes(&self) -> [Lane; STACK_LANES] {
        self.lanes
    }
}

impl Default for StackBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_round_trip() {
        for v in [0u32, 1, 0xFFFF_FFFF, 0x8000_0000] {
            assert_eq!(decode_u32(encode_u32(v)), v);
        }
    }

    #[test]
    fn i32_round_trip() {
        for v in [0i32, 1, -1, i32::MIN, i32::MAX] {
            assert_eq!(decode_i32(encode_i32(v)), v);
        }
        // Negative values zero-extend: the upper 32 bits stay clear.
        assert_eq!(encode_i32(-1), 0xFFFF_FFFF);
    }

    #[test]
    fn f32_round_trip() {
        for v in [0.0f32, -0.0, 1.5, -3.25, f32::MAX, f32::MIN_POSITIVE] {
            assert_eq!(decode_f32(encode_f32(v)).to_bits(), v.to_bits());
        }
    }

    #[test]
    fn bool_encodes_as_u32_zero_one() {
        assert_eq!(encode_bool(true), 1);
        assert_eq!(encode_bool(false), 0);
        assert!(decode_bool(1));
        assert!(!decode_bool(0));
        // Anything other than exactly 1 decodes to false.
        assert!(!decode_bool(2));
    }

    #[test]
    fn buffer_clear_zeroes_every_lane() {
        let mut stack = StackBuffer::new();
        for i in 0..STACK_LANES {
            stack.set(i, (i as Lane) + 1);
        }
        assert_eq!(stack.lane(STACK_LANES - 1), STACK_LANES as Lane);

        stack.clear();
        for i in 0..STACK_LANES {
            assert_eq!(stack.lane(i), 0);
        }
    }

    #[test]
    fn out_of_range_lane_reads_zero() {
        let stack = StackBuffer::new();
        assert_eq!(stack.lane(STACK_LANES + 5), 0);
    }
}
