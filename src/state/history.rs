/// Undo/redo history over full board snapshots
///
/// Every entry is an independent clone of the document, so the live
/// editing state can keep mutating after a snapshot is recorded.
/// The history is a sliding window: once it holds `MAX_HISTORY`
/// entries the oldest one is dropped on every push.

use std::collections::VecDeque;

use super::data::Board;

/// Maximum number of snapshots retained per editing session
pub const MAX_HISTORY: usize = 50;

/// Result of an undo or redo request
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryStep<T> {
    /// The cursor moved; carries a copy of the snapshot now current
    Restored(T),
    /// Nothing left in that direction
    Exhausted,
}

impl<T> HistoryStep<T> {
    pub fn into_snapshot(self) -> Option<T> {
        match self {
            HistoryStep::Restored(snapshot) => Some(snapshot),
            HistoryStep::Exhausted => None,
        }
    }
}

/// Bounded linear history with a single cursor
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    entries: VecDeque<T>,
    /// Index of the current snapshot, `None` when empty
    cursor: Option<usize>,
    capacity: usize,
}

/// History of a board being edited
pub type BoardHistory = History<Board>;

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl<T: Clone> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// History retaining at most `capacity` snapshots (minimum one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: None,
            capacity,
        }
    }

    /// Drop everything and start from `snapshot`
    pub fn initialize(&mut self, snapshot: &T) {
        self.clear();
        self.entries.push_back(snapshot.clone());
        self.cursor = Some(0);
    }

    /// Record a new snapshot, discarding any redo branch
    pub fn push(&mut self, snapshot: &T) {
        let keep = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot.clone());

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn undo(&mut self) -> HistoryStep<T> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                HistoryStep::Restored(self.entries[i - 1].clone())
            }
            _ => HistoryStep::Exhausted,
        }
    }

    pub fn redo(&mut self) -> HistoryStep<T> {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                HistoryStep::Restored(self.entries[i + 1].clone())
            }
            _ => HistoryStep::Exhausted,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(i) if i + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The snapshot under the cursor
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Retained snapshots, oldest first
    pub fn snapshots(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Board, Card};

    fn board(title: &str) -> Board {
        let mut board = Board::new(title);
        board.id = "board".into();
        board.updated_at = 0;
        board
    }

    #[test]
    fn test_empty_history() {
        let mut history: History<u32> = History::new();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(), HistoryStep::Exhausted);
        assert_eq!(history.redo(), HistoryStep::Exhausted);
    }

    #[test]
    fn test_push_on_empty_history_starts_at_zero() {
        let mut history = History::new();
        history.push(&7u32);
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.current(), Some(&7));
    }

    #[test]
    fn test_initialize_resets() {
        let mut history = History::new();
        history.push(&1u32);
        history.push(&2);
        history.initialize(&9);
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_bounded_to_most_recent_fifty() {
        let mut history = History::new();
        history.initialize(&0u32);
        for i in 1..=120u32 {
            history.push(&i);
        }

        assert_eq!(history.len(), MAX_HISTORY);
        let retained: Vec<u32> = history.snapshots().copied().collect();
        let expected: Vec<u32> = (71..=120).collect();
        assert_eq!(retained, expected);
        assert_eq!(history.current(), Some(&120));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_inverse() {
        let s0 = board("s0");
        let mut s1 = s0.clone();
        s1.add_card(Card::new("one", ""));
        let mut s2 = s1.clone();
        s2.set_columns(6);

        let mut history = BoardHistory::new();
        history.initialize(&s0);
        history.push(&s1);
        history.push(&s2);

        assert_eq!(history.undo(), HistoryStep::Restored(s1.clone()));
        assert_eq!(history.undo(), HistoryStep::Restored(s0.clone()));
        assert_eq!(history.undo(), HistoryStep::Exhausted);

        assert_eq!(history.redo(), HistoryStep::Restored(s1));
        assert_eq!(history.redo(), HistoryStep::Restored(s2));
        assert_eq!(history.redo(), HistoryStep::Exhausted);
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut history = History::new();
        history.initialize(&"s0");
        history.push(&"s1");
        history.push(&"s2");

        assert_eq!(history.undo(), HistoryStep::Restored("s1"));
        history.push(&"s3");

        assert!(!history.can_redo());
        assert_eq!(history.redo(), HistoryStep::Exhausted);
        let retained: Vec<&str> = history.snapshots().copied().collect();
        assert_eq!(retained, vec!["s0", "s1", "s3"]);
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut live = board("live");
        let mut history = BoardHistory::new();
        history.initialize(&live);

        live.add_card(Card::new("apple", ""));
        history.push(&live);

        // keep editing the live copy after it was recorded
        live.cards[0].label = "changed".into();
        live.set_title("mutated");

        assert_eq!(history.current().map(|b| b.title.as_str()), Some("live"));
        let restored = history.undo().into_snapshot().unwrap();
        assert!(restored.cards.is_empty());
        let redone = history.redo().into_snapshot().unwrap();
        assert_eq!(redone.cards[0].label, "apple");
    }

    #[test]
    fn test_cap_does_not_advance_past_window() {
        let mut history = History::with_capacity(3);
        history.initialize(&0u32);
        for i in 1..=5u32 {
            history.push(&i);
            assert!(history.cursor().unwrap() < 3);
        }
        assert_eq!(history.undo(), HistoryStep::Restored(4));
        assert_eq!(history.undo(), HistoryStep::Restored(3));
        assert_eq!(history.undo(), HistoryStep::Exhausted);
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.initialize(&1u32);
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
    }
}
