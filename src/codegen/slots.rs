//! Stack-slot allocation.
//!
//! Every distinct `IRVar` mentioned anywhere in the instruction list -
//! including operator names used as a `Call`'s `fun` field - gets its own
//! slot, assigned in first-occurrence order. This is deliberately not an
//! optimization pass: slots are never reused or coalesced, matching the
//! textual, non-optimizing allocation the assembly generator is scoped to.

use crate::ir::{IRVar, Instruction};
use std::collections::HashMap;

pub struct SlotAllocator {
    offsets: HashMap<IRVar, i64>,
    count: usize,
}

impl SlotAllocator {
    pub fn allocate(instructions: &[Instruction]) -> Self {
        let mut offsets = HashMap::new();
        let mut count = 0usize;
        for instruction in instructions {
            for var in instruction.vars() {
                if !offsets.contains_key(var) {
                    count += 1;
                    offsets.insert(var.clone(), -(8 * count as i64));
                }
            }
        }
        SlotAllocator { offsets, count }
    }

    /// The assembly operand text for a variable's stack slot, e.g. `-8(%rbp)`.
    pub fn operand(&self, var: &IRVar) -> String {
        let offset = self
            .offsets
            .get(var)
            .unwrap_or_else(|| panic!("{var} was not seen during slot allocation"));
        format!("{offset}(%rbp)")
    }

    /// Total stack frame size in bytes, including one sentinel slot.
    pub fn frame_bytes(&self) -> i64 {
        8 * (self.count as i64 + 1)
    }
}
