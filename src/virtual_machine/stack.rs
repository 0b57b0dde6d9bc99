//! Fixed-depth ring stack.
//!
//! Each CPU carries six of these. A stack never refuses anything: pushing
//! past the depth silently overwrites the oldest slot, and popping an
//! "empty" stack returns whatever the slot last held. There is no empty or
//! full state, only a rotating window of the last pushes.

use std::fmt;

/// Ring buffer of signed words with a write cursor.
///
/// Depth is fixed when the stack is built and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Stack {
    slots: Vec<i32>,
    cursor: usize,
}

impl Stack {
    /// Creates a zeroed stack of the given depth.
    pub fn new(depth: usize) -> Self {
        Self {
            slots: vec![0; depth],
            cursor: 0,
        }
    }

    /// Number of slots.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Stores `value` at the cursor and advances it, wrapping at the depth.
    ///
    /// Once the stack has wrapped, this overwrites the oldest value.
    pub fn push(&mut self, value: i32) {
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Retreats the cursor, wrapping at zero, and returns the value there.
    ///
    /// The slot is not cleared, so popping more than was pushed yields
    /// stale values instead of failing.
    pub fn pop(&mut self) -> i32 {
        self.cursor = match self.cursor {
            0 => self.slots.len() - 1,
            c => c - 1,
        };
        self.slots[self.cursor]
    }

    /// Returns the most recently pushed value without moving the cursor.
    pub fn top(&self) -> i32 {
        let last = match self.cursor {
            0 => self.slots.len() - 1,
            c => c - 1,
        };
        self.slots[last]
    }

    /// Zeroes every slot and rewinds the cursor.
    pub fn reset(&mut self) {
        self.slots.fill(0);
        self.cursor = 0;
    }
}

impl fmt::Display for Stack {
    /// Renders all slots oldest first, newest last.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.slots.len() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.slots[(i + self.cursor) % self.slots.len()])?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_reverse_pushes() {
        let mut stack = Stack::new(16);
        for v in 1..=5 {
            stack.push(v);
        }
        for v in (1..=5).rev() {
            assert_eq!(stack.pop(), v);
        }
    }

    #[test]
    fn push_past_depth_overwrites_the_oldest() {
        let mut stack = Stack::new(4);
        for v in 1..=5 {
            stack.push(v);
        }
        assert_eq!(stack.pop(), 5);
        assert_eq!(stack.pop(), 4);
        assert_eq!(stack.pop(), 3);
        assert_eq!(stack.pop(), 2);
        // Slot 1 was recycled by the fifth push, so 1 is gone.
        assert_eq!(stack.pop(), 5);
    }

    #[test]
    fn pop_past_depth_wraps_to_the_first_pop() {
        let mut stack = Stack::new(4);
        for v in 1..=4 {
            stack.push(v);
        }
        let first = stack.pop();
        for _ in 0..3 {
            stack.pop();
        }
        assert_eq!(stack.pop(), first);
    }

    #[test]
    fn pop_on_fresh_stack_returns_zero() {
        let mut stack = Stack::new(16);
        assert_eq!(stack.pop(), 0);
        assert_eq!(stack.pop(), 0);
    }

    #[test]
    fn top_peeks_without_moving_the_cursor() {
        let mut stack = Stack::new(16);
        stack.push(42);
        assert_eq!(stack.top(), 42);
        assert_eq!(stack.top(), 42);
        assert_eq!(stack.pop(), 42);
        assert_eq!(stack.top(), 0);
    }

    #[test]
    fn reset_zeroes_slots_and_cursor() {
        let mut stack = Stack::new(4);
        for v in 1..=3 {
            stack.push(v);
        }
        stack.reset();
        assert_eq!(stack.top(), 0);
        assert_eq!(stack.pop(), 0);
        assert_eq!(stack.to_string(), "[0, 0, 0, 0]");
    }

    #[test]
    fn display_orders_oldest_to_newest() {
        let mut stack = Stack::new(4);
        for v in 1..=5 {
            stack.push(v);
        }
        assert_eq!(stack.to_string(), "[2, 3, 4, 5]");
    }
}
