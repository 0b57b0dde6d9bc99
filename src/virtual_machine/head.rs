//! Read/write heads over the genome and memory buffers.
//!
//! A head is a cursor permanently bound to one buffer. Heads do not hold a
//! reference to the buffer they walk; the CPU resolves every dereference,
//! which keeps heads trivially copyable and lets an out-of-range position
//! mean "reads zero, writes are dropped" instead of being a fault.

use std::fmt;

/// Buffer a head is bound to. The binding is fixed for the head's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Genome,
    Memory,
}

/// The six head slots of a CPU, in nop-argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadRole {
    /// Instruction pointer.
    Ip = 0,
    /// Where the copy loop reads parent codes from.
    GenomeRead = 1,
    /// Where the copy loop writes offspring codes to.
    GenomeWrite = 2,
    MemoryRead = 3,
    MemoryWrite = 4,
    /// Scratch head for flow-control tricks.
    Flow = 5,
}

impl HeadRole {
    pub const ALL: [HeadRole; 6] = [
        HeadRole::Ip,
        HeadRole::GenomeRead,
        HeadRole::GenomeWrite,
        HeadRole::MemoryRead,
        HeadRole::MemoryWrite,
        HeadRole::Flow,
    ];

    /// Index of this role in the CPU's head array.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Buffer this role is bound to.
    pub const fn target(self) -> Target {
        match self {
            HeadRole::MemoryRead | HeadRole::MemoryWrite => Target::Memory,
            _ => Target::Genome,
        }
    }
}

/// A position cursor over one buffer.
///
/// Positions use wrapping arithmetic: assigning a negative value or
/// stepping back past zero parks the head far out of range, where reads
/// return zero and writes are dropped, and advancing from there eventually
/// wraps back in. No bound is enforced at the head level.
#[derive(Debug, Clone, Copy)]
pub struct Head {
    pos: usize,
    target: Target,
}

impl Head {
    pub fn new(target: Target, pos: usize) -> Self {
        Self { pos, target }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Steps the head forward by one.
    pub fn advance(&mut self) {
        self.pos = self.pos.wrapping_add(1);
    }

    /// Moves the head to an absolute position.
    pub fn move_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Moves the head to a popped word. Negative words land out of range.
    pub fn set_pos(&mut self, value: i32) {
        self.pos = value as usize;
    }

    /// Shifts the head by a signed delta, wrapping past zero.
    pub fn offset(&mut self, delta: i32) {
        self.pos = self.pos.wrapping_add(delta as usize);
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = match self.target {
            Target::Genome => "genome",
            Target::Memory => "memory",
        };
        write!(f, "[{buffer}:{}]", self.pos)
    }
}
