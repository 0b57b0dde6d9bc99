//! The virtual CPU: a self-replicating interpreter.
//!
//! A [`Cpu`] owns one genome, one memory block, six ring stacks, and six
//! heads, and executes one instruction per [`Cpu::step`]. The genome is
//! both the program and the material being copied: the copy loop reads the
//! genome through one head and writes it through another, and
//! `DivideCell` cuts the copied span out into an offspring genome for the
//! host to collect.
//!
//! # Failure model
//!
//! Anything a running program can do wrong (divide by zero, bad scope
//! target, out-of-range memory write, bad division span) increments a soft
//! error counter and execution continues; `step()` never fails. Only the
//! construction boundary returns [`CpuError`]s: bad configurations,
//! genomes with codes outside the table, or tables missing their modifier
//! block.

use crate::virtual_machine::errors::CpuError;
use crate::virtual_machine::genome::Genome;
use crate::virtual_machine::head::{Head, HeadRole, Target};
use crate::virtual_machine::inst_set::InstSet;
use crate::virtual_machine::isa::{Instruction, NUM_NOPS};
use crate::virtual_machine::stack::Stack;

const IP: usize = HeadRole::Ip as usize;

/// Values pushed by `Const`, indexed by its modifier argument.
const CONST_TABLE: [i32; NUM_NOPS] = [1, 2, 4, 16, 256, -1];

/// Hardware sizing, fixed when a CPU is built.
#[derive(Debug, Clone)]
pub struct CpuConfig {
    /// Slots per ring stack.
    pub stack_depth: usize,
    /// Words in the memory block.
    pub memory_size: usize,
    /// Ceiling the genome may grow to; appends past it are dropped.
    pub max_genome_size: usize,
    /// Whether reset parks the genome-write head at the genome end
    /// instead of position 0.
    pub write_head_at_end: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            stack_depth: 16,
            memory_size: 64,
            max_genome_size: 1024,
            write_head_at_end: false,
        }
    }
}

impl CpuConfig {
    /// Rejects configurations the interpreter cannot run on.
    pub fn validate(&self) -> Result<(), CpuError> {
        if self.stack_depth == 0 {
            return Err(CpuError::InvalidConfig("stack_depth must be at least 1"));
        }
        if self.max_genome_size == 0 {
            return Err(CpuError::InvalidConfig("max_genome_size must be at least 1"));
        }
        Ok(())
    }
}

/// One organism's virtual hardware.
///
/// The instruction table is shared read-only across all CPUs of a run;
/// everything else is owned exclusively by this instance.
pub struct Cpu<'a> {
    /// Table this CPU decodes and dispatches against.
    inst_set: &'a InstSet,
    config: CpuConfig,
    /// The program, which is also the material the program copies.
    genome: Genome,
    /// Genome cut out by the last successful division, awaiting the host.
    offspring: Option<Genome>,
    /// Scratch memory block, fixed size.
    memory: Vec<i32>,
    heads: [Head; NUM_NOPS],
    stacks: [Stack; NUM_NOPS],
    /// Innermost scope depth currently active.
    cur_scope: usize,
    /// Genome position where each scope depth most recently began.
    scope_starts: [usize; NUM_NOPS],
    /// Soft failures absorbed so far.
    error_count: usize,
}

impl<'a> Cpu<'a> {
    /// Builds a CPU with the default configuration.
    pub fn new(inst_set: &'a InstSet, genome: Genome) -> Result<Self, CpuError> {
        Self::with_config(inst_set, genome, CpuConfig::default())
    }

    /// Builds a CPU, validating the table, the genome, and the config.
    pub fn with_config(
        inst_set: &'a InstSet,
        genome: Genome,
        config: CpuConfig,
    ) -> Result<Self, CpuError> {
        config.validate()?;
        if inst_set.len() < NUM_NOPS {
            return Err(CpuError::TableIncomplete {
                len: inst_set.len(),
                required: NUM_NOPS,
            });
        }
        genome.validate(inst_set.len())?;
        if genome.len() > config.max_genome_size {
            return Err(CpuError::GenomeTooLarge {
                size: genome.len(),
                max: config.max_genome_size,
            });
        }

        let mut cpu = Self {
            inst_set,
            memory: vec![0; config.memory_size],
            stacks: std::array::from_fn(|_| Stack::new(config.stack_depth)),
            heads: std::array::from_fn(|_| Head::new(Target::Genome, 0)),
            genome,
            offspring: None,
            cur_scope: 0,
            scope_starts: [0; NUM_NOPS],
            error_count: 0,
            config,
        };
        cpu.reset();
        Ok(cpu)
    }

    /// Executes exactly one instruction.
    ///
    /// Reads the code under the instruction pointer (out-of-range reads
    /// yield code 0, a modifier, hence a safe no-op), advances the
    /// pointer, then dispatches through the table. Never fails; runtime
    /// anomalies are absorbed into the error counter.
    pub fn step(&mut self) {
        let code = self.read_ip_code();
        self.heads[IP].advance();
        let set = self.inst_set;
        set.execute(self, code);
    }

    /// Runs `steps` instructions. Bounding execution is the host's job;
    /// the CPU itself has no halting notion.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    // =========================
    // Fetch and argument resolution
    // =========================

    fn read_ip_code(&self) -> u8 {
        self.genome.get(self.heads[IP].pos()).unwrap_or(0)
    }

    /// Resolves one operand.
    ///
    /// If the code under the instruction pointer reduces to a modifier,
    /// its ordinal is the operand and the pointer consumes it. Otherwise
    /// `default` is used and the pointer stays put, so the following code
    /// runs as the next instruction. Each operand an instruction needs is
    /// resolved independently, and defaults chain off earlier operands.
    fn get_arg(&mut self, default: usize) -> usize {
        let idx = self.inst_set.reduce(self.read_ip_code());
        if idx < NUM_NOPS {
            self.heads[IP].advance();
            idx
        } else {
            default
        }
    }

    fn get_stack_arg(&mut self, default: usize) -> usize {
        self.get_arg(default)
    }

    fn get_head_arg(&mut self, default: HeadRole) -> usize {
        self.get_arg(default.index())
    }

    /// Advances the instruction pointer past any modifier codes, stopping
    /// at the genome end.
    fn skip_modifiers(&mut self) {
        while self.heads[IP].pos() < self.genome.len()
            && self.inst_set.is_nop_code(self.read_ip_code())
        {
            self.heads[IP].advance();
        }
    }

    // =========================
    // Head dereferencing
    // =========================

    /// Value under a head, or 0 when the head is out of range.
    fn read_head(&self, head: usize) -> i32 {
        let pos = self.heads[head].pos();
        match self.heads[head].target() {
            Target::Genome => self.genome.get(pos).map(i32::from).unwrap_or(0),
            Target::Memory => self.memory.get(pos).copied().unwrap_or(0),
        }
    }

    /// Writes a value under a head.
    ///
    /// Genome writes overwrite in place when inside the genome and append
    /// at the end otherwise; appends past the configured ceiling are
    /// dropped and counted. Memory writes out of range are dropped and
    /// counted.
    fn write_head(&mut self, head: usize, value: i32) {
        let pos = self.heads[head].pos();
        match self.heads[head].target() {
            Target::Genome => {
                if pos < self.genome.len() {
                    self.genome.set(pos, value as u8);
                } else if self.genome.len() < self.config.max_genome_size {
                    self.genome.push(value as u8);
                } else {
                    self.error_count += 1;
                }
            }
            Target::Memory => match self.memory.get_mut(pos) {
                Some(slot) => *slot = value,
                None => self.error_count += 1,
            },
        }
    }

    // =========================
    // Dispatch
    // =========================

    pub(crate) fn exec(&mut self, inst: Instruction) {
        match inst {
            // Modifiers
            Instruction::NopA
            | Instruction::NopB
            | Instruction::NopC
            | Instruction::NopD
            | Instruction::NopE
            | Instruction::NopF => {}
            // Arithmetic and logic
            Instruction::Const => self.op_const(),
            Instruction::Not => self.op_not(),
            Instruction::Shift => self.op_shift(),
            Instruction::Add => self.op_add(),
            Instruction::Sub => self.op_sub(),
            Instruction::Mult => self.op_mult(),
            Instruction::Div => self.op_div(),
            Instruction::Mod => self.op_mod(),
            Instruction::Exp => self.op_exp(),
            Instruction::Sort => self.op_sort(),
            Instruction::TestLess => self.op_test_less(),
            Instruction::TestEqu => self.op_test_equ(),
            Instruction::Nand => self.op_nand(),
            Instruction::Xor => self.op_xor(),
            // Control flow
            Instruction::If => self.op_if(),
            Instruction::Scope => self.op_scope(),
            Instruction::Continue => self.op_continue(),
            Instruction::Break => self.op_break(),
            // Stack manipulation
            Instruction::StackPop => self.op_stack_pop(),
            Instruction::StackDup => self.op_stack_dup(),
            Instruction::StackSwap => self.op_stack_swap(),
            Instruction::StackMove => self.op_stack_move(),
            // Replication and memory
            Instruction::Copy => self.op_copy(),
            Instruction::Load => self.op_load(),
            Instruction::Store => self.op_store(),
            Instruction::Allocate => self.op_allocate(),
            Instruction::DivideCell => self.op_divide_cell(),
            // Head manipulation
            Instruction::HeadPos => self.op_head_pos(),
            Instruction::SetHead => self.op_set_head(),
            Instruction::JumpHead => self.op_jump_head(),
            Instruction::OffsetHead => self.op_offset_head(),
        }
    }

    // =========================
    // Arithmetic and logic
    // =========================

    /// Pops X from the first resolved stack and Y from a second stack
    /// whose default chains off the first. Returns the first stack index
    /// so the push destination can default to it too.
    fn binary_args(&mut self) -> (i32, i32, usize) {
        let x_id = self.get_arg(0);
        let x = self.stacks[x_id].pop();
        let y_id = self.get_stack_arg(x_id);
        let y = self.stacks[y_id].pop();
        (x, y, x_id)
    }

    fn push_result(&mut self, default_id: usize, value: i32) {
        let dst = self.get_stack_arg(default_id);
        self.stacks[dst].push(value);
    }

    fn op_const(&mut self) {
        let value = CONST_TABLE[self.get_arg(0)];
        let dst = self.get_stack_arg(0);
        self.stacks[dst].push(value);
    }

    fn op_not(&mut self) {
        let x_id = self.get_arg(0);
        let x = self.stacks[x_id].pop();
        self.push_result(x_id, (x == 0) as i32);
    }

    fn op_shift(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, x.wrapping_shl(y.rem_euclid(32) as u32));
    }

    fn op_add(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, x.wrapping_add(y));
    }

    fn op_sub(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, x.wrapping_sub(y));
    }

    fn op_mult(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, x.wrapping_mul(y));
    }

    fn op_div(&mut self) {
        let (x, y, x_id) = self.binary_args();
        if y == 0 {
            self.error_count += 1;
        } else {
            self.push_result(x_id, x.wrapping_div(y));
        }
    }

    fn op_mod(&mut self) {
        let (x, y, x_id) = self.binary_args();
        if y == 0 {
            self.error_count += 1;
        } else {
            self.push_result(x_id, x.wrapping_rem(y));
        }
    }

    fn op_exp(&mut self) {
        let (x, y, x_id) = self.binary_args();
        let value = if y < 0 { 0 } else { x.wrapping_pow(y as u32) };
        self.push_result(x_id, value);
    }

    fn op_sort(&mut self) {
        let x_id = self.get_arg(0);
        let y_id = self.get_arg(x_id);
        let mut x = self.stacks[x_id].pop();
        let mut y = self.stacks[y_id].pop();
        if x < y {
            std::mem::swap(&mut x, &mut y);
        }
        self.push_result(x_id, x);
        self.push_result(y_id, y);
    }

    fn op_test_less(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, (x < y) as i32);
    }

    fn op_test_equ(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, (x == y) as i32);
    }

    fn op_nand(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, !(x & y));
    }

    fn op_xor(&mut self) {
        let (x, y, x_id) = self.binary_args();
        self.push_result(x_id, x ^ y);
    }

    // =========================
    // Control flow
    // =========================

    fn op_if(&mut self) {
        let src = self.get_stack_arg(0);
        let x = self.stacks[src].pop();
        if x == 0 {
            // Skip the next instruction together with the modifiers it
            // would have consumed.
            self.heads[IP].advance();
            self.skip_modifiers();
        }
    }

    fn op_scope(&mut self) {
        let new_scope = self.get_arg(0);
        // Entering deeper scopes records where each one starts; dropping
        // back to a shallower scope implicitly closes the deeper ones.
        let start = self.heads[IP].pos();
        for scope in self.cur_scope..=new_scope {
            self.scope_starts[scope] = start;
        }
        self.cur_scope = new_scope;
    }

    fn op_continue(&mut self) {
        let target = self.get_arg(self.cur_scope);
        if target > self.cur_scope {
            // Continuing a scope we are not inside.
            self.error_count += 1;
            return;
        }
        self.heads[IP].move_to(self.scope_starts[target]);
        self.cur_scope = target;
        self.skip_modifiers();
    }

    fn op_break(&mut self) {
        let target = self.get_arg(self.cur_scope);
        if target > self.cur_scope {
            self.error_count += 1;
            return;
        }
        // Scan forward for the next scope marker declaring a depth at or
        // above the target and resume past it. An unmodified marker
        // declares depth 0. Without such a marker the pointer parks at
        // the genome end.
        let len = self.genome.len();
        let mut pos = self.heads[IP].pos();
        while pos < len {
            let code = self.genome.get(pos).unwrap_or(0);
            pos += 1;
            if self.inst_set.decode(code) != Instruction::Scope {
                continue;
            }
            let mut depth = 0;
            if pos < len {
                if let Some(next) = self.genome.get(pos) {
                    let idx = self.inst_set.reduce(next);
                    if idx < NUM_NOPS {
                        depth = idx;
                        pos += 1;
                    }
                }
            }
            if depth <= target {
                break;
            }
        }
        self.heads[IP].move_to(pos.min(len));
    }

    // =========================
    // Stack manipulation
    // =========================

    fn op_stack_pop(&mut self) {
        let idx = self.get_stack_arg(0);
        self.stacks[idx].pop();
    }

    fn op_stack_dup(&mut self) {
        let src = self.get_arg(0);
        let value = self.stacks[src].top();
        let dst = self.get_stack_arg(src);
        self.stacks[dst].push(value);
    }

    fn op_stack_swap(&mut self) {
        let s1 = self.get_arg(0);
        let s2 = self.get_arg(s1);
        let x = self.stacks[s1].pop();
        let y = self.stacks[s2].pop();
        self.push_result(s2, x);
        self.push_result(s1, y);
    }

    fn op_stack_move(&mut self) {
        let src = self.get_arg(0);
        let dst = self.get_arg((src + 1) % NUM_NOPS);
        if src != dst {
            let value = self.stacks[src].pop();
            self.stacks[dst].push(value);
        }
    }

    // =========================
    // Replication and memory
    // =========================

    fn op_copy(&mut self) {
        let from = self.get_head_arg(HeadRole::GenomeRead);
        let to = self.get_head_arg(HeadRole::GenomeWrite);
        let value = self.read_head(from);
        self.write_head(to, value);
        self.heads[from].advance();
        self.heads[to].advance();
    }

    fn op_load(&mut self) {
        let from = self.get_head_arg(HeadRole::MemoryRead);
        let value = self.read_head(from);
        let dst = self.get_stack_arg(0);
        self.stacks[dst].push(value);
        self.heads[from].advance();
    }

    fn op_store(&mut self) {
        let src = self.get_stack_arg(0);
        let value = self.stacks[src].pop();
        let to = self.get_head_arg(HeadRole::MemoryWrite);
        self.write_head(to, value);
        self.heads[to].advance();
    }

    fn op_allocate(&mut self) {
        // Doubles the genome (up to the ceiling), zero-filling the new
        // space, and parks the write head at its start.
        let start = self.genome.len();
        let grown = start.saturating_mul(2).min(self.config.max_genome_size);
        self.genome.grow(grown);
        self.heads[HeadRole::GenomeWrite.index()].move_to(start);
    }

    fn op_divide_cell(&mut self) {
        let read = self.get_head_arg(HeadRole::GenomeRead);
        let write = self.get_head_arg(HeadRole::GenomeWrite);
        if self.heads[read].target() != Target::Genome
            || self.heads[write].target() != Target::Genome
        {
            self.error_count += 1;
            return;
        }
        if self.offspring.is_some() {
            // The host has not collected the previous offspring yet.
            self.error_count += 1;
            return;
        }
        let a = self.heads[read].pos();
        let b = self.heads[write].pos();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo == hi || hi > self.genome.len() {
            self.error_count += 1;
            return;
        }
        match self.genome.extract(lo, hi - lo) {
            Ok(child) => {
                self.offspring = Some(child);
                self.heads[read].move_to(0);
                self.heads[write].move_to(lo);
            }
            Err(_) => self.error_count += 1,
        }
    }

    // =========================
    // Head manipulation
    // =========================

    fn op_head_pos(&mut self) {
        let head = self.get_head_arg(HeadRole::Flow);
        let pos = self.heads[head].pos() as i32;
        let dst = self.get_stack_arg(0);
        self.stacks[dst].push(pos);
    }

    fn op_set_head(&mut self) {
        let src = self.get_stack_arg(0);
        let pos = self.stacks[src].pop();
        let head = self.get_head_arg(HeadRole::Flow);
        self.heads[head].set_pos(pos);
    }

    fn op_jump_head(&mut self) {
        // Only the position moves; a head's buffer binding is for life.
        let jumping = self.get_head_arg(HeadRole::Ip);
        let source = self.get_head_arg(HeadRole::Flow);
        let pos = self.heads[source].pos();
        self.heads[jumping].move_to(pos);
    }

    fn op_offset_head(&mut self) {
        let head = self.get_head_arg(HeadRole::Flow);
        let src = self.get_stack_arg(0);
        let delta = self.stacks[src].pop();
        self.heads[head].offset(delta);
    }

    // =========================
    // Lifecycle and inspection
    // =========================

    /// Reinitializes heads, stacks, scopes, and the error counter, and
    /// drops any pending offspring. Memory contents are kept.
    pub fn reset(&mut self) {
        let write_pos = if self.config.write_head_at_end {
            self.genome.len()
        } else {
            0
        };
        for role in HeadRole::ALL {
            let pos = match role {
                HeadRole::GenomeWrite => write_pos,
                _ => 0,
            };
            self.heads[role.index()] = Head::new(role.target(), pos);
        }
        for stack in &mut self.stacks {
            stack.reset();
        }
        self.offspring = None;
        self.cur_scope = 0;
        self.scope_starts = [0; NUM_NOPS];
        self.error_count = 0;
    }

    /// Installs a new genome and resets.
    pub fn reset_with(&mut self, genome: Genome) -> Result<(), CpuError> {
        genome.validate(self.inst_set.len())?;
        if genome.len() > self.config.max_genome_size {
            return Err(CpuError::GenomeTooLarge {
                size: genome.len(),
                max: self.config.max_genome_size,
            });
        }
        self.genome = genome;
        self.reset();
        Ok(())
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn memory(&self) -> &[i32] {
        &self.memory
    }

    pub fn head(&self, role: HeadRole) -> &Head {
        &self.heads[role.index()]
    }

    pub fn current_scope(&self) -> usize {
        self.cur_scope
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_offspring(&self) -> bool {
        self.offspring.is_some()
    }

    /// Hands the pending offspring to the host, clearing the slot so the
    /// next division can proceed.
    pub fn take_offspring(&mut self) -> Option<Genome> {
        self.offspring.take()
    }

    /// Human-readable state dump for tracing.
    ///
    /// Shows the genome with a `|` marker at the instruction pointer, the
    /// memory block, every head, every stack (oldest slot first), the
    /// scope depth, the error count, and the next instruction.
    pub fn status(&self) -> String {
        let ip = self.heads[IP].pos();
        let mut out = String::from("Genome: ");
        for (i, &code) in self.genome.codes().iter().enumerate() {
            if i == ip {
                out.push('|');
            }
            out.push(self.inst_set.symbol_of(code));
        }
        if ip >= self.genome.len() {
            out.push('|');
        }

        out.push_str("\nMemory: ");
        for (i, value) in self.memory.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&value.to_string());
        }

        out.push_str("\nHeads: ");
        for (i, head) in self.heads.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&head.to_string());
        }

        out.push_str("\nStacks: ");
        for (i, stack) in self.stacks.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push((b'A' + i as u8) as char);
            out.push(':');
            out.push_str(&stack.to_string());
        }

        out.push_str(&format!(
            "\nScope: {}\nErrors: {}\nNext: {}",
            self.cur_scope,
            self.error_count,
            self.inst_set.name_of(self.read_ip_code())
        ));
        out
    }
}
