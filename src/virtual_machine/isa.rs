//! Instruction Set Architecture (ISA) definitions.
//!
//! Defines the replicator CPU's instruction set. The
//! [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction definitions and invokes a callback macro for code
//! generation. This enables multiple modules to generate instruction-related
//! code without duplicating definitions.
//!
//! This module generates:
//! - The [`Instruction`] enum with code mappings
//! - `TryFrom<u8>` for decoding genome codes
//!
//! # Table Layout
//!
//! The table opens with six nop modifiers (codes 0 through 5). Executed on
//! their own they do nothing, but an instruction that follows its own code
//! with nops consumes them as arguments: the nop ordinal selects a stack, a
//! head, a constant, or a scope depending on what the instruction asks for.
//! Every later entry is an operational instruction over the stacks, the
//! heads, the genome, or the memory buffer.

use crate::virtual_machine::errors::CpuError;

/// Number of nop modifiers heading the table.
///
/// Doubles as the number of stacks, heads, and scope slots a CPU carries,
/// since nop ordinals address all three.
pub const NUM_NOPS: usize = 6;

/// Invokes a callback macro with the complete instruction definition list.
///
/// Each row reads `Name = code, "display-name" => kind` where `kind` is
/// `nop` for a modifier and `op` for an operational instruction. This macro
/// enables code generation for instructions in multiple modules without
/// duplicating the instruction definitions.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Modifiers
            // =========================
            /// Names slot 0 when consumed as an argument; no effect alone
            NopA = 0x00, "Nop-A" => nop,
            /// Names slot 1 when consumed as an argument; no effect alone
            NopB = 0x01, "Nop-B" => nop,
            /// Names slot 2 when consumed as an argument; no effect alone
            NopC = 0x02, "Nop-C" => nop,
            /// Names slot 3 when consumed as an argument; no effect alone
            NopD = 0x03, "Nop-D" => nop,
            /// Names slot 4 when consumed as an argument; no effect alone
            NopE = 0x04, "Nop-E" => nop,
            /// Names slot 5 when consumed as an argument; no effect alone
            NopF = 0x05, "Nop-F" => nop,
            // =========================
            // Arithmetic and logic
            // =========================
            /// CONST [idx] [dst] ; push table constant idx onto stack dst
            Const = 0x06, "Const" => op,
            /// NOT [s] ; pop X from s, push 1 if X == 0 else 0
            Not = 0x07, "Not" => op,
            /// SHIFT [s1] [s2] [dst] ; pop X, Y, push X << (Y mod word bits)
            Shift = 0x08, "Shift" => op,
            /// ADD [s1] [s2] [dst] ; pop X, Y, push X + Y
            Add = 0x09, "Add" => op,
            /// SUB [s1] [s2] [dst] ; pop X, Y, push X - Y
            Sub = 0x0A, "Sub" => op,
            /// MULT [s1] [s2] [dst] ; pop X, Y, push X * Y
            Mult = 0x0B, "Mult" => op,
            /// DIV [s1] [s2] [dst] ; pop X, Y, push X / Y (zero Y is a soft error)
            Div = 0x0C, "Div" => op,
            /// MOD [s1] [s2] [dst] ; pop X, Y, push X % Y (zero Y is a soft error)
            Mod = 0x0D, "Mod" => op,
            /// EXP [s1] [s2] [dst] ; pop X, Y, push X ** Y (negative Y yields 0)
            Exp = 0x0E, "Exp" => op,
            /// SORT [s1] [s2] [d1] [d2] ; pop X, Y, push them back ordered
            Sort = 0x0F, "Sort" => op,
            /// TESTLESS [s1] [s2] [dst] ; pop X, Y, push 1 if X < Y else 0
            TestLess = 0x10, "TestLess" => op,
            /// TESTEQU [s1] [s2] [dst] ; pop X, Y, push 1 if X == Y else 0
            TestEqu = 0x11, "TestEqu" => op,
            /// NAND [s1] [s2] [dst] ; pop X, Y, push !(X & Y)
            Nand = 0x12, "Nand" => op,
            /// XOR [s1] [s2] [dst] ; pop X, Y, push X ^ Y
            Xor = 0x13, "Xor" => op,
            // =========================
            // Control flow
            // =========================
            /// IF [s] ; pop X from s, skip the next instruction when X == 0
            If = 0x14, "If" => op,
            /// SCOPE [n] ; enter scope n, recording where it starts
            Scope = 0x15, "Scope" => op,
            /// CONTINUE [n] ; jump back to the recorded start of scope n
            Continue = 0x16, "Continue" => op,
            /// BREAK [n] ; scan forward and resume past the end of scope n
            Break = 0x17, "Break" => op,
            // =========================
            // Stack manipulation
            // =========================
            /// STACKPOP [s] ; pop s and discard the value
            StackPop = 0x18, "StackPop" => op,
            /// STACKDUP [s] [dst] ; push a copy of s's top onto dst
            StackDup = 0x19, "StackDup" => op,
            /// STACKSWAP [s1] [s2] [d1] [d2] ; exchange the tops of two stacks
            StackSwap = 0x1A, "StackSwap" => op,
            /// STACKMOVE [s1] [s2] ; pop s1, push onto s2 (defaults to the next stack)
            StackMove = 0x1B, "StackMove" => op,
            // =========================
            // Replication and memory
            // =========================
            /// COPY [from] [to] ; copy one code from under the read head to the write head
            Copy = 0x1C, "Copy" => op,
            /// LOAD [h] [dst] ; push the value under head h onto stack dst
            Load = 0x1D, "Load" => op,
            /// STORE [s] [h] ; pop from s and write under head h
            Store = 0x1E, "Store" => op,
            /// ALLOCATE ; grow the genome to make room for an offspring copy
            Allocate = 0x1F, "Allocate" => op,
            /// DIVIDECELL ; split the genome between read and write heads into an offspring
            DivideCell = 0x20, "DivideCell" => op,
            // =========================
            // Head manipulation
            // =========================
            /// HEADPOS [h] [dst] ; push the position of head h onto stack dst
            HeadPos = 0x21, "HeadPos" => op,
            /// SETHEAD [s] [h] ; pop from s and move head h there
            SetHead = 0x22, "SetHead" => op,
            /// JUMPHEAD [h1] [h2] ; move head h1 to head h2's position
            JumpHead = 0x23, "JumpHead" => op,
            /// OFFSETHEAD [s] [h] ; pop a delta from s and shift head h by it
            OffsetHead = 0x24, "OffsetHead" => op,
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:expr, $display:literal => $kind:ident
        ),* $(,)?
    ) => {
        // =========================
        // CPU instruction enum
        // =========================
        /// One entry of the canonical instruction table.
        ///
        /// Discriminants equal the table ordinals, so `Instruction as u8` is
        /// the genome code under the canonical layout.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for Instruction {
            type Error = CpuError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Instruction::$name), )*
                    _ => Err(CpuError::CodeOutOfRange {
                        code: value,
                        position: 0,
                        table_len: Instruction::COUNT,
                    }),
                }
            }
        }

        impl Instruction {
            /// Number of instructions in the canonical table.
            pub const COUNT: usize = [$($opcode),*].len();

            /// Every instruction, in canonical table order.
            pub const ALL: [Instruction; Instruction::COUNT] = [$(Instruction::$name),*];

            /// Returns the display name used in genome text and status dumps.
            pub const fn name(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $display, )*
                }
            }

            /// Returns whether this entry is a nop modifier.
            pub const fn is_nop(&self) -> bool {
                match self {
                    $( Instruction::$name => define_instructions!(@is_nop $kind), )*
                }
            }
        }
    };

    // ---------- classification ----------
    (@is_nop nop) => { true };
    (@is_nop op)  => { false };
}

for_each_instruction!(define_instructions);
