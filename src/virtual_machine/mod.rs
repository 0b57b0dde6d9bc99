//! Self-replicating virtual CPU.
//!
//! The machine executed here is its own substrate: the program (the
//! "genome") is a byte sequence the running program can read, overwrite,
//! grow, and cut apart. A genome that copies itself through the read/write
//! heads and then divides produces an offspring genome, which the host can
//! instantiate as a new CPU.
//!
//! # Hardware model
//!
//! - **Genome**: a resizable sequence of instruction codes, both program
//!   and copy material ([`genome::Genome`])
//! - **Memory**: a fixed block of signed words, reached only through heads
//! - **Heads**: six cursors, each bound for life to the genome or the
//!   memory buffer ([`head::Head`])
//! - **Stacks**: six fixed-depth ring stacks with wraparound push/pop
//!   ([`stack::Stack`])
//! - **Instruction table**: shared read-only registry mapping codes to
//!   instructions and symbols ([`inst_set::InstSet`])
//!
//! # Modules
//!
//! - [`cpu`]: the interpreter itself, one instruction per step
//! - [`errors`]: construction and configuration error types
//! - [`genome`]: the mutable code sequence
//! - [`head`]: position cursors over the two buffers
//! - [`inst_set`]: the instruction registry and genome text factories
//! - [`isa`]: canonical instruction definitions

pub mod cpu;
pub mod errors;
pub mod genome;
pub mod head;
pub mod inst_set;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod stack;
