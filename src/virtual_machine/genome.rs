//! Genome buffer: the program a CPU executes and copies.
//!
//! A [`Genome`] is a flat sequence of instruction codes. The same buffer is
//! read by the instruction pointer, written by the copy loop, and cut in two
//! when the cell divides, so every mutation a replicator suffers lives here.

use crate::virtual_machine::errors::CpuError;

/// A mutable sequence of instruction codes.
///
/// Codes are raw bytes. Whether a byte names a valid instruction is decided
/// by the table that executes it, not by the genome, so mutated or
/// half-copied programs stay representable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genome {
    codes: Vec<u8>,
}

impl Genome {
    /// Creates an empty genome.
    pub fn new() -> Self {
        Self { codes: Vec::new() }
    }

    /// Number of codes in the genome.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns whether the genome holds no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the code at `pos`, or `None` past the end.
    pub fn get(&self, pos: usize) -> Option<u8> {
        self.codes.get(pos).copied()
    }

    /// Overwrites the code at `pos`. Returns whether the write landed.
    pub fn set(&mut self, pos: usize, code: u8) -> bool {
        match self.codes.get_mut(pos) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => false,
        }
    }

    /// Appends a code at the end.
    pub fn push(&mut self, code: u8) {
        self.codes.push(code);
    }

    /// Inserts a code before `pos`, shifting the tail right.
    ///
    /// Positions at or past the end append instead, so inserting can never
    /// fail.
    pub fn insert(&mut self, pos: usize, code: u8) {
        if pos >= self.codes.len() {
            self.codes.push(code);
        } else {
            self.codes.insert(pos, code);
        }
    }

    /// Grows the genome to `new_len`, filling new slots with code 0.
    ///
    /// Shrinking requests are ignored; use [`Genome::extract`] to cut codes
    /// out.
    pub fn grow(&mut self, new_len: usize) {
        if new_len > self.codes.len() {
            self.codes.resize(new_len, 0);
        }
    }

    /// Cuts `length` codes starting at `start` out of the genome and
    /// returns them as a new genome.
    ///
    /// The remaining prefix and suffix close ranks. The span must lie fully
    /// inside the genome; a span reaching past the end leaves the genome
    /// untouched and fails.
    pub fn extract(&mut self, start: usize, length: usize) -> Result<Genome, CpuError> {
        let end = start.checked_add(length).ok_or(CpuError::ExtractOutOfRange {
            start,
            length,
            size: self.codes.len(),
        })?;
        if end > self.codes.len() {
            return Err(CpuError::ExtractOutOfRange {
                start,
                length,
                size: self.codes.len(),
            });
        }
        Ok(Genome {
            codes: self.codes.drain(start..end).collect(),
        })
    }

    /// Checks that every code indexes into a table of `table_len` entries.
    ///
    /// Execution itself tolerates out-of-range codes by reducing them, but
    /// programs handed in from outside are validated strictly so that typos
    /// surface at the boundary instead of silently aliasing an instruction.
    pub fn validate(&self, table_len: usize) -> Result<(), CpuError> {
        for (position, &code) in self.codes.iter().enumerate() {
            if code as usize >= table_len {
                return Err(CpuError::CodeOutOfRange {
                    code,
                    position,
                    table_len,
                });
            }
        }
        Ok(())
    }

    /// Raw view of the codes.
    pub fn codes(&self) -> &[u8] {
        &self.codes
    }
}

impl From<Vec<u8>> for Genome {
    fn from(codes: Vec<u8>) -> Self {
        Self { codes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set() {
        let mut genome = Genome::from(vec![1, 2, 3]);
        assert_eq!(genome.get(0), Some(1));
        assert_eq!(genome.get(2), Some(3));
        assert_eq!(genome.get(3), None);

        assert!(genome.set(1, 9));
        assert_eq!(genome.get(1), Some(9));
        assert!(!genome.set(3, 9));
        assert_eq!(genome.len(), 3);
    }

    #[test]
    fn push_appends() {
        let mut genome = Genome::new();
        assert!(genome.is_empty());
        genome.push(7);
        genome.push(8);
        assert_eq!(genome.codes(), &[7, 8]);
    }

    #[test]
    fn insert_shifts_the_tail_or_appends() {
        let mut genome = Genome::from(vec![1, 2, 3]);
        genome.insert(1, 9);
        assert_eq!(genome.codes(), &[1, 9, 2, 3]);

        genome.insert(4, 7);
        assert_eq!(genome.codes(), &[1, 9, 2, 3, 7]);
        genome.insert(100, 8);
        assert_eq!(genome.codes(), &[1, 9, 2, 3, 7, 8]);

        let mut empty = Genome::new();
        empty.insert(0, 5);
        assert_eq!(empty.codes(), &[5]);
    }

    #[test]
    fn grow_fills_with_zero_and_never_shrinks() {
        let mut genome = Genome::from(vec![5, 6]);
        genome.grow(5);
        assert_eq!(genome.codes(), &[5, 6, 0, 0, 0]);
        genome.grow(1);
        assert_eq!(genome.len(), 5);
    }

    #[test]
    fn extract_cuts_the_middle_out() {
        let mut genome = Genome::from(vec![0, 1, 2, 3, 4, 5]);
        let cut = genome.extract(2, 3).unwrap();
        assert_eq!(cut.codes(), &[2, 3, 4]);
        assert_eq!(genome.codes(), &[0, 1, 5]);
    }

    #[test]
    fn extract_whole_genome() {
        let mut genome = Genome::from(vec![1, 2, 3]);
        let cut = genome.extract(0, 3).unwrap();
        assert_eq!(cut.codes(), &[1, 2, 3]);
        assert!(genome.is_empty());
    }

    #[test]
    fn extract_rejects_spans_past_the_end() {
        let mut genome = Genome::from(vec![1, 2, 3]);
        assert!(matches!(
            genome.extract(2, 2),
            Err(CpuError::ExtractOutOfRange {
                start: 2,
                length: 2,
                size: 3
            })
        ));
        assert!(matches!(
            genome.extract(usize::MAX, 2),
            Err(CpuError::ExtractOutOfRange { .. })
        ));
        assert_eq!(genome.codes(), &[1, 2, 3]);
    }

    #[test]
    fn validate_reports_the_first_bad_code() {
        let genome = Genome::from(vec![0, 5, 36]);
        assert!(genome.validate(37).is_ok());

        let genome = Genome::from(vec![0, 37, 1]);
        assert!(matches!(
            genome.validate(37),
            Err(CpuError::CodeOutOfRange {
                code: 37,
                position: 1,
                table_len: 37
            })
        ));
    }
}
