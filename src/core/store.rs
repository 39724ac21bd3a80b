//! # Conversation Store
//!
//! Ordered list of exchanged entries, newest first. Position 0 is always the
//! latest entry; the visualization relies on that.
//!
//! ```text
//!  Loading ──(history loaded | history failed)──▶ Ready
//! ```
//!
//! Every mutation bumps `revision` so observers can tell the store changed
//! without comparing contents.

use std::collections::VecDeque;

use crate::api::ConversationEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    /// History request still in flight.
    Loading,
    /// History resolved (successfully or not).
    Ready,
}

#[derive(Debug)]
pub struct ConversationStore {
    phase: StorePhase,
    entries: VecDeque<ConversationEntry>,
    revision: u64,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            phase: StorePhase::Loading,
            entries: VecDeque::new(),
            revision: 0,
        }
    }

    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest entry, if any.
    pub fn latest(&self) -> Option<&ConversationEntry> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&ConversationEntry> {
        self.entries.get(index)
    }

    /// Entries newest first (store order).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ConversationEntry> {
        self.entries.iter()
    }

    /// Entries oldest first (reading order).
    pub fn chronological(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter().rev()
    }

    /// Put a new entry at position 0. Never touches the network.
    pub fn append(&mut self, entry: ConversationEntry) {
        self.entries.push_front(entry);
        self.revision += 1;
    }

    /// Merge the server history (newest first) behind anything appended locally
    /// while the request was in flight, and mark the store ready.
    pub fn apply_history(&mut self, history: Vec<ConversationEntry>) {
        self.entries.extend(history);
        self.phase = StorePhase::Ready;
        self.revision += 1;
    }

    /// History could not be loaded; keep what we have and carry on.
    pub fn mark_ready(&mut self) {
        if self.phase != StorePhase::Ready {
            self.phase = StorePhase::Ready;
            self.revision += 1;
        }
    }
}
