//! Conversation memory: the ordered turn log owned by one engine.
//!
//! Insertion order is the only ordering guarantee. Turns are never
//! mutated once appended: the memory only hands out shared references.

use crate::error::MemoryError;
use crate::message::{Role, Turn};

/// An ordered, appendable log of turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end of the log.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Remove the last `n` turns.
    pub fn truncate(&mut self, n: usize) -> Result<(), MemoryError> {
        if n > self.turns.len() {
            return Err(MemoryError::InvalidRange {
                requested: n,
                available: self.turns.len(),
            });
        }
        self.turns.truncate(self.turns.len() - n);
        Ok(())
    }

    /// Drop every turn (no-memory mode).
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Turns authored by `role`, lazily and in insertion order.
    ///
    /// The returned iterator is `Clone`, so it can be restarted.
    pub fn filter(&self, role: Role) -> impl Iterator<Item = &Turn> + Clone {
        self.turns.iter().filter(move |t| t.role() == role)
    }

    /// The current length, usable as a checkpoint for [`Self::slice`].
    pub fn checkpoint(&self) -> usize {
        self.turns.len()
    }

    /// Turns appended at or after `from_index`.
    pub fn slice(&self, from_index: usize) -> Result<&[Turn], MemoryError> {
        self.turns
            .get(from_index..)
            .ok_or(MemoryError::InvalidRange {
                requested: from_index,
                available: self.turns.len(),
            })
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Get the total token count estimate.
    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(Turn::estimated_tokens).sum()
    }
}
