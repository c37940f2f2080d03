/// Grid geometry shared by the editor grid and the printable view

use super::data::Board;

/// A cell rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Square cells laid out row by row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: u32,
    pub gap: f32,
    pub cell_size: f32,
}

impl GridLayout {
    /// Fit `columns` square cells separated by `gap` into `width`
    pub fn new(width: f32, columns: u32, gap: f32) -> Self {
        let columns = columns.max(1);
        let gap = gap.max(0.0);
        let gutters = gap * (columns - 1) as f32;
        let cell_size = ((width - gutters) / columns as f32).max(0.0);
        Self {
            columns,
            gap,
            cell_size,
        }
    }

    pub fn for_board(board: &Board, width: f32) -> Self {
        Self::new(width, board.grid_columns, board.grid_gap as f32)
    }

    pub fn rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns as usize)
    }

    /// Rectangle of the `index`-th card
    pub fn cell(&self, index: usize) -> Cell {
        let columns = self.columns as usize;
        let (row, column) = (index / columns, index % columns);
        let step = self.cell_size + self.gap;
        Cell {
            x: column as f32 * step,
            y: row as f32 * step,
            width: self.cell_size,
            height: self.cell_size,
        }
    }

    /// Total height occupied by `count` cards
    pub fn height(&self, count: usize) -> f32 {
        let rows = self.rows(count);
        if rows == 0 {
            return 0.0;
        }
        rows as f32 * self.cell_size + (rows - 1) as f32 * self.gap
    }

    /// Index of the card under a point, used to resolve drop targets
    pub fn index_at(&self, x: f32, y: f32, count: usize) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let step = self.cell_size + self.gap;
        if step <= 0.0 {
            return None;
        }
        let column = (x / step) as usize;
        let row = (y / step) as usize;
        if column >= self.columns as usize {
            return None;
        }
        let index = row * self.columns as usize + column;
        (index < count).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_fill_width() {
        let grid = GridLayout::new(460.0, 4, 20.0);
        assert_eq!(grid.cell_size, 100.0);
        assert_eq!(grid.cell(0), Cell { x: 0.0, y: 0.0, width: 100.0, height: 100.0 });
        assert_eq!(grid.cell(5).x, 120.0);
        assert_eq!(grid.cell(5).y, 120.0);
    }

    #[test]
    fn test_height_and_rows() {
        let grid = GridLayout::new(460.0, 4, 20.0);
        assert_eq!(grid.rows(0), 0);
        assert_eq!(grid.height(0), 0.0);
        assert_eq!(grid.rows(5), 2);
        assert_eq!(grid.height(5), 220.0);
    }

    #[test]
    fn test_index_at() {
        let grid = GridLayout::new(460.0, 4, 20.0);
        assert_eq!(grid.index_at(10.0, 10.0, 6), Some(0));
        assert_eq!(grid.index_at(130.0, 130.0, 6), Some(5));
        assert_eq!(grid.index_at(250.0, 130.0, 6), None);
        assert_eq!(grid.index_at(-1.0, 0.0, 6), None);
    }

    #[test]
    fn test_zero_columns_treated_as_one() {
        let grid = GridLayout::new(100.0, 0, 10.0);
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.cell_size, 100.0);
    }
}
