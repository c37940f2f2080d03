/// Board editing session
///
/// The editor owns a working copy of the board that is disconnected
/// from history until a change is committed through [`BoardEditor::apply`].

use super::data::Board;
use super::history::{BoardHistory, HistoryStep};

#[derive(Debug, Clone)]
pub struct BoardEditor {
    board: Board,
    history: BoardHistory,
}

impl BoardEditor {
    /// Open a board for editing; history starts with the board as loaded
    pub fn open(board: Board) -> Self {
        let mut history = BoardHistory::new();
        history.initialize(&board);
        Self { board, history }
    }

    /// The board as currently displayed
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &BoardHistory {
        &self.history
    }

    /// Commit a change: mutate the working copy, touch the timestamp and
    /// record a snapshot. Returns the updated board for persisting, or
    /// `None` if the change left the board as it was.
    pub fn apply<F>(&mut self, change: F) -> Option<&Board>
    where
        F: FnOnce(&mut Board),
    {
        let before = self.board.clone();
        change(&mut self.board);
        if self.board == before {
            return None;
        }
        self.board.touch();
        self.history.push(&self.board);
        Some(&self.board)
    }

    /// Step back; `true` if the displayed board changed
    pub fn undo(&mut self) -> bool {
        let step = self.history.undo();
        self.restore(step)
    }

    /// Step forward; `true` if the displayed board changed
    pub fn redo(&mut self) -> bool {
        let step = self.history.redo();
        self.restore(step)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Close the session and hand back the working copy
    pub fn into_board(self) -> Board {
        self.board
    }

    fn restore(&mut self, step: HistoryStep<Board>) -> bool {
        match step {
            HistoryStep::Restored(snapshot) => {
                self.board = snapshot;
                true
            }
            HistoryStep::Exhausted => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Card;

    #[test]
    fn test_apply_records_history() {
        let mut editor = BoardEditor::open(Board::new("Morning"));
        assert!(!editor.can_undo());

        editor.apply(|b| b.add_card(Card::new("Wake up", "")));
        editor.apply(|b| b.set_columns(3));

        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.board().grid_columns, 3);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_no_op_change_is_not_recorded() {
        let mut board = Board::new("Morning");
        board.add_card(Card::new("Wake up", ""));
        board.updated_at = 7;
        let mut editor = BoardEditor::open(board);

        assert!(editor.apply(|b| b.set_columns(4)).is_none());
        assert!(editor.apply(|b| {
            b.remove_card("missing");
        })
        .is_none());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.board().updated_at, 7);
        assert!(!editor.can_undo());

        assert!(editor.apply(|b| b.set_columns(3)).is_some());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_undo_redo_restores_working_copy() {
        let mut editor = BoardEditor::open(Board::new("Morning"));
        editor.apply(|b| b.add_card(Card::new("Wake up", "")));

        assert!(editor.undo());
        assert!(editor.board().cards.is_empty());
        assert!(!editor.undo());

        assert!(editor.redo());
        assert_eq!(editor.board().cards.len(), 1);
        assert!(!editor.redo());
    }

    #[test]
    fn test_edit_after_undo_drops_redo() {
        let mut editor = BoardEditor::open(Board::new("Morning"));
        editor.apply(|b| b.set_title("One"));
        editor.apply(|b| b.set_title("Two"));
        editor.undo();
        editor.apply(|b| b.set_title("Three"));

        assert!(!editor.can_redo());
        assert_eq!(editor.into_board().title, "Three");
    }
}
