//! Instruction table: the registry a CPU decodes genome codes against.
//!
//! A table is built once per run configuration and shared read-only across
//! every CPU in the population. The genome code of an instruction is its
//! position in the table, so two tables registered in different orders give
//! the same byte different meanings. The first [`NUM_NOPS`] entries are
//! reserved for the nop modifiers and must be registered before anything
//! else.
//!
//! Each entry also carries a one-character symbol, assigned sequentially at
//! registration (`a`-`z`, then `A`-`Z`, then `0`-`9`). Symbols are the
//! textual form of genomes: one character per code.

use rand::Rng;

use crate::virtual_machine::cpu::Cpu;
use crate::virtual_machine::errors::CpuError;
use crate::virtual_machine::genome::Genome;
use crate::virtual_machine::isa::{Instruction, NUM_NOPS};

/// Most entries a table can hold; genome codes are single bytes.
pub const MAX_ENTRIES: usize = 256;

/// One registered instruction with its auto-assigned symbol.
#[derive(Debug, Clone, Copy)]
pub struct InstEntry {
    pub inst: Instruction,
    pub symbol: char,
}

impl InstEntry {
    /// Display name of the registered instruction.
    pub fn name(&self) -> &'static str {
        self.inst.name()
    }
}

/// Ordered registry of instructions.
#[derive(Debug, Clone)]
pub struct InstSet {
    entries: Vec<InstEntry>,
}

impl Default for InstSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InstSet {
    /// Creates an empty table. Register modifiers first, then operations.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds the canonical table with every instruction in opcode order.
    pub fn default_set() -> Self {
        let mut entries = Vec::with_capacity(Instruction::COUNT);
        for inst in Instruction::ALL {
            entries.push(InstEntry {
                inst,
                symbol: symbol_for(entries.len()),
            });
        }
        Self { entries }
    }

    /// Registers one of the leading nop modifier slots.
    pub fn add_nop(&mut self, inst: Instruction) -> Result<(), CpuError> {
        if !inst.is_nop() {
            return Err(CpuError::NotAModifier { name: inst.name() });
        }
        if self.entries.len() >= NUM_NOPS {
            return Err(CpuError::TooManyNops { limit: NUM_NOPS });
        }
        self.push_entry(inst);
        Ok(())
    }

    /// Registers an operational instruction after the modifier block.
    pub fn add_inst(&mut self, inst: Instruction) -> Result<(), CpuError> {
        if inst.is_nop() {
            return Err(CpuError::NotAnOperation { name: inst.name() });
        }
        if self.entries.len() < NUM_NOPS {
            return Err(CpuError::NopsNotContiguous {
                registered: self.entries.len(),
                expected: NUM_NOPS,
            });
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(CpuError::TableFull {
                capacity: MAX_ENTRIES,
            });
        }
        self.push_entry(inst);
        Ok(())
    }

    fn push_entry(&mut self, inst: Instruction) {
        self.entries.push(InstEntry {
            inst,
            symbol: symbol_for(self.entries.len()),
        });
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered entries in code order.
    pub fn entries(&self) -> &[InstEntry] {
        &self.entries
    }

    /// Reduces an arbitrary byte to a valid table index.
    ///
    /// Mutation can leave any byte in a genome; rather than faulting, a
    /// byte past the table is folded back in modulo the table length. The
    /// table must be non-empty.
    pub fn reduce(&self, code: u8) -> usize {
        code as usize % self.entries.len()
    }

    /// Decodes a genome code to its instruction, reducing first.
    pub fn decode(&self, code: u8) -> Instruction {
        self.entries[self.reduce(code)].inst
    }

    /// Returns whether a code lands in the modifier block.
    pub fn is_nop_code(&self, code: u8) -> bool {
        self.reduce(code) < NUM_NOPS.min(self.entries.len())
    }

    /// Display name of the instruction a code decodes to.
    pub fn name_of(&self, code: u8) -> &'static str {
        self.decode(code).name()
    }

    /// Symbol of the instruction a code decodes to.
    pub fn symbol_of(&self, code: u8) -> char {
        self.entries[self.reduce(code)].symbol
    }

    /// Finds the code registered under a display name. Linear scan; the
    /// table stays small enough that nothing faster pays for itself.
    pub fn id_of(&self, name: &str) -> Result<usize, CpuError> {
        self.entries
            .iter()
            .position(|entry| entry.name() == name)
            .ok_or_else(|| CpuError::UnknownName(name.to_string()))
    }

    /// Finds the code registered under a symbol.
    pub fn id_of_symbol(&self, symbol: char) -> Result<usize, CpuError> {
        self.entries
            .iter()
            .position(|entry| entry.symbol == symbol)
            .ok_or(CpuError::UnknownSymbol(symbol))
    }

    /// Runs one code against a CPU. Modifier codes do nothing here; they
    /// only matter when an instruction consumes them as arguments.
    pub fn execute(&self, cpu: &mut Cpu<'_>, code: u8) {
        if self.is_nop_code(code) {
            return;
        }
        cpu.exec(self.decode(code));
    }

    // =========================
    // Genome factories
    // =========================

    /// Parses a genome from its symbol-per-code textual form.
    pub fn genome_from_text(&self, text: &str) -> Result<Genome, CpuError> {
        let mut genome = Genome::new();
        for symbol in text.chars() {
            genome.push(self.id_of_symbol(symbol)? as u8);
        }
        Ok(genome)
    }

    /// Renders a genome as one symbol per code.
    pub fn genome_to_text(&self, genome: &Genome) -> String {
        genome
            .codes()
            .iter()
            .map(|&code| self.symbol_of(code))
            .collect()
    }

    /// Draws `len` codes uniformly over the whole table.
    pub fn random_genome(&self, rng: &mut impl Rng, len: usize) -> Genome {
        let mut genome = Genome::new();
        for _ in 0..len {
            genome.push(rng.gen_range(0..self.entries.len()) as u8);
        }
        genome
    }

    /// Draws `len` codes with a fixed probability of picking a modifier.
    ///
    /// `nop_ratio` is clamped to `[0, 1]`. Within each class the draw is
    /// uniform.
    pub fn random_genome_with_nop_ratio(
        &self,
        rng: &mut impl Rng,
        len: usize,
        nop_ratio: f64,
    ) -> Genome {
        let nops = NUM_NOPS.min(self.entries.len());
        let mut genome = Genome::new();
        for _ in 0..len {
            // A table holding nothing past the modifier block has no
            // operational class to draw from.
            let code = if nops == self.entries.len() || rng.gen_bool(nop_ratio.clamp(0.0, 1.0)) {
                rng.gen_range(0..nops)
            } else {
                rng.gen_range(nops..self.entries.len())
            };
            genome.push(code as u8);
        }
        genome
    }
}

/// Symbol assigned to the entry at `ordinal`: `a`-`z`, `A`-`Z`, `0`-`9`,
/// then `?` once the printable range runs out.
fn symbol_for(ordinal: usize) -> char {
    match ordinal {
        0..=25 => (b'a' + ordinal as u8) as char,
        26..=51 => (b'A' + (ordinal - 26) as u8) as char,
        52..=61 => (b'0' + (ordinal - 52) as u8) as char,
        _ => '?',
    }
}
