use replivm_derive::Error;

/// Errors surfaced at construction and configuration boundaries.
///
/// Runtime anomalies inside `step()` (division by zero, invalid scope
/// targets, out-of-range writes, bad division spans) are not represented
/// here: they increment the per-CPU soft error counter and execution
/// continues. This enum covers the precondition violations a host can make
/// while building tables, genomes, or CPUs.
#[derive(Debug, Error)]
pub enum CpuError {
    /// Genome code does not map to a registered instruction.
    #[error("instruction code {code} at position {position} exceeds table size {table_len}")]
    CodeOutOfRange {
        code: u8,
        position: usize,
        table_len: usize,
    },
    /// Unrecognized instruction display name.
    #[error("unknown instruction name: {0}")]
    UnknownName(String),
    /// Character does not map to any registered instruction symbol.
    #[error("unknown instruction symbol: '{0}'")]
    UnknownSymbol(char),
    /// Registry has no free slots left.
    #[error("instruction table is full ({capacity} entries)")]
    TableFull { capacity: usize },
    /// Operational instruction registered before the modifier block is done.
    #[error(
        "all {expected} nop modifiers must be registered before operational instructions ({registered} present)"
    )]
    NopsNotContiguous { registered: usize, expected: usize },
    /// Modifier registered past the reserved block.
    #[error("cannot register more than {limit} nop modifiers")]
    TooManyNops { limit: usize },
    /// Operational instruction offered to a modifier slot.
    #[error("{name} is not a nop modifier")]
    NotAModifier { name: &'static str },
    /// Modifier offered to an operational slot.
    #[error("{name} is a nop modifier, not an operational instruction")]
    NotAnOperation { name: &'static str },
    /// Destructive cut would reach past the end of the genome.
    #[error("extracting {length} codes at {start} exceeds genome size {size}")]
    ExtractOutOfRange {
        start: usize,
        length: usize,
        size: usize,
    },
    /// Genome larger than the configured ceiling.
    #[error("genome size {size} exceeds maximum {max}")]
    GenomeTooLarge { size: usize, max: usize },
    /// Instruction table not populated enough to run a CPU.
    #[error("instruction table holds {len} entries but at least {required} are required")]
    TableIncomplete { len: usize, required: usize },
    /// Rejected hardware configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
