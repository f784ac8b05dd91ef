use crate::calculator::CalculatorKind;

/// Binary alive/dead matrix for the current generation plus a working buffer.
///
/// Cells are stored row-major as `0` or `1`. After [`Grid::advance`] the working
/// buffer holds the generation that was just replaced, which is what the
/// overlay diffs against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
    scratch: Vec<u8>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        let len = rows
            .checked_mul(cols)
            .expect("grid cell count must fit in usize");
        Self {
            rows,
            cols,
            cells: vec![0; len],
            scratch: vec![0; len],
        }
    }

    /// Build a grid from rows of `0`/`1` values. Any non-zero value counts as alive.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut grid = Self::new(height, width);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(row.len(), width, "all rows must have the same length");
            for (c, &value) in row.iter().enumerate() {
                grid.set(r, c, value);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Cell value at `(row, col)`. Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[self.index(row, col)]
    }

    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col) != 0
    }

    /// Set a cell, normalizing any non-zero value to `1`. Returns the previous value.
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> u8 {
        let idx = self.index(row, col);
        let old = self.cells[idx];
        self.cells[idx] = u8::from(value != 0);
        old
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Generation replaced by the most recent [`Grid::advance`].
    pub fn previous(&self) -> &[u8] {
        &self.scratch
    }

    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub fn count_alive(&self) -> usize {
        self.cells.iter().map(|&c| c as usize).sum()
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
        self.scratch.fill(0);
    }

    /// Compute the next generation with `calculator` and swap buffers.
    pub fn advance(&mut self, calculator: CalculatorKind) {
        calculator.compute(&self.cells, &mut self.scratch, self.rows, self.cols);
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }
}
