// langur-vm - Call frames for the Langur VM
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Call frames.

use std::rc::Rc;

use langur_core::object::Closure;

/// A call frame: the closure being executed, its instruction pointer, and
/// the operand-stack slot of the callee. Locals live directly above the
/// base pointer.
#[derive(Debug, Clone)]
pub struct Frame {
    pub closure: Rc<Closure>,
    pub ip: usize,
    pub base_pointer: usize,
}

impl Frame {
    pub fn new(closure: Rc<Closure>, base_pointer: usize) -> Self {
        Frame {
            closure,
            ip: 0,
            base_pointer,
        }
    }

    /// The instruction bytes this frame executes.
    #[inline]
    pub fn instructions(&self) -> &[u8] {
        &self.closure.func.instructions
    }
}
