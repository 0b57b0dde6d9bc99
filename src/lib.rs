//! Replivm library.
//!
//! A self-replicating virtual CPU: a register/stack machine whose program
//! is also the mutable material it copies to produce offspring.

pub mod utils;
pub mod virtual_machine;
