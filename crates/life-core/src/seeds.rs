use crate::grid::Grid;
use thiserror::Error;

/// A named seed matrix. Rows use `O` for live cells and `.` for dead ones;
/// rows shorter than the widest are padded with dead cells.
#[derive(Debug, PartialEq, Eq)]
pub struct Pattern {
    pub name: &'static str,
    pub rows: &'static [&'static str],
}

impl Pattern {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// `1` when the cell at `(row, col)` of the bounding box is alive.
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.rows
            .get(row)
            .and_then(|r| r.as_bytes().get(col))
            .map(|&b| u8::from(b == b'O'))
            .unwrap_or(0)
    }

    pub fn population(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.bytes().filter(|&b| b == b'O').count())
            .sum()
    }

    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        (0..self.height())
            .map(|r| (0..self.width()).map(|c| self.cell(r, c)).collect())
            .collect()
    }
}

pub const PATTERNS: &[Pattern] = &[
    // Still lifes
    Pattern {
        name: "block",
        rows: &["OO", "OO"],
    },
    Pattern {
        name: "beehive",
        rows: &[".OO.", "O..O", ".OO."],
    },
    Pattern {
        name: "loaf",
        rows: &[".OO.", "O..O", ".O.O", "..O."],
    },
    Pattern {
        name: "boat",
        rows: &["OO.", "O.O", ".O."],
    },
    Pattern {
        name: "tub",
        rows: &[".O.", "O.O", ".O."],
    },
    // Oscillators
    Pattern {
        name: "blinker",
        rows: &["OOO"],
    },
    Pattern {
        name: "toad",
        rows: &[".OOO", "OOO."],
    },
    Pattern {
        name: "beacon",
        rows: &["OO..", "OO..", "..OO", "..OO"],
    },
    Pattern {
        name: "clock",
        rows: &["..O.", "O.O.", ".O.O", ".O.."],
    },
    Pattern {
        name: "pulsar",
        rows: &[
            "..OOO...OOO..",
            ".............",
            "O....O.O....O",
            "O....O.O....O",
            "O....O.O....O",
            "..OOO...OOO..",
            ".............",
            "..OOO...OOO..",
            "O....O.O....O",
            "O....O.O....O",
            "O....O.O....O",
            ".............",
            "..OOO...OOO..",
        ],
    },
    Pattern {
        name: "pentadecathlon",
        rows: &["..O....O..", "OO.OOOO.OO", "..O....O.."],
    },
    // Spaceships
    Pattern {
        name: "glider",
        rows: &[".O.", "..O", "OOO"],
    },
    Pattern {
        name: "spaceship_light",
        rows: &[".O..O", "O....", "O...O", "OOOO."],
    },
    Pattern {
        name: "spaceship_medium",
        rows: &["...O..", ".O...O", "O.....", "O....O", "OOOOO."],
    },
    Pattern {
        name: "spaceship_heavy",
        rows: &["...OO..", ".O....O", "O......", "O.....O", "OOOOOO."],
    },
    // Methuselahs
    Pattern {
        name: "r_pentomino",
        rows: &[".OO", "OO.", ".O."],
    },
    Pattern {
        name: "diehard",
        rows: &["......O.", "OO......", ".O...OOO"],
    },
    Pattern {
        name: "acorn",
        rows: &[".O.....", "...O...", "OO..OOO"],
    },
    // Guns
    Pattern {
        name: "gosper_glider_gun",
        rows: &[
            "........................O",
            "......................O.O",
            "............OO......OO............OO",
            "...........O...O....OO............OO",
            "OO........O.....O...OO",
            "OO........O...O.OO....O.O",
            "..........O.....O.......O",
            "...........O...O",
            "............OO",
        ],
    },
];

pub fn find_pattern(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("unknown seed pattern: {0}")]
    UnknownPattern(String),
    #[error(
        "seed {pattern} ({height}x{width}) at ({row}, {col}) does not fit a {rows}x{cols} grid"
    )]
    OutOfBounds {
        pattern: String,
        row: usize,
        col: usize,
        height: usize,
        width: usize,
        rows: usize,
        cols: usize,
    },
}

/// A cell whose value was changed by a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub alive: bool,
}

/// Stamps patterns into a grid. Placements never clip or wrap.
pub struct SeedPlacer;

impl SeedPlacer {
    /// Resolve `name` and check that the whole pattern fits at `(row, col)`.
    pub fn check(
        name: &str,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<&'static Pattern, SeedError> {
        let pattern =
            find_pattern(name).ok_or_else(|| SeedError::UnknownPattern(name.to_string()))?;
        Self::check_bounds(pattern, row, col, rows, cols)?;
        Ok(pattern)
    }

    fn check_bounds(
        pattern: &Pattern,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<(), SeedError> {
        let fits = |start: usize, extent: usize, limit: usize| {
            start.checked_add(extent).is_some_and(|end| end <= limit)
        };
        if fits(row, pattern.height(), rows) && fits(col, pattern.width(), cols) {
            Ok(())
        } else {
            Err(SeedError::OutOfBounds {
                pattern: pattern.name.to_string(),
                row,
                col,
                height: pattern.height(),
                width: pattern.width(),
                rows,
                cols,
            })
        }
    }

    /// Write the full bounding box of `pattern` with its top-left at `(row, col)`.
    ///
    /// Dead pattern cells overwrite live grid cells. The grid is unchanged when
    /// the pattern does not fit.
    pub fn place(
        grid: &mut Grid,
        pattern: &Pattern,
        row: usize,
        col: usize,
    ) -> Result<Vec<CellChange>, SeedError> {
        Self::check_bounds(pattern, row, col, grid.rows(), grid.cols())?;
        let mut changes = Vec::new();
        for pr in 0..pattern.height() {
            for pc in 0..pattern.width() {
                let (r, c) = (row + pr, col + pc);
                let value = pattern.cell(pr, pc);
                if grid.set(r, c, value) != value {
                    changes.push(CellChange {
                        row: r,
                        col: c,
                        alive: value == 1,
                    });
                }
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_names_are_unique() {
        for (i, a) in PATTERNS.iter().enumerate() {
            for b in &PATTERNS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn pattern_rows_only_use_live_and_dead_markers() {
        for pattern in PATTERNS {
            for row in pattern.rows {
                assert!(
                    row.bytes().all(|b| b == b'O' || b == b'.'),
                    "{} has an invalid row {row:?}",
                    pattern.name
                );
            }
        }
    }

    #[test]
    fn known_pattern_sizes_and_populations() {
        let gun = find_pattern("gosper_glider_gun").expect("gun exists");
        assert_eq!((gun.height(), gun.width()), (9, 36));
        assert_eq!(gun.population(), 36);
        let pulsar = find_pattern("pulsar").expect("pulsar exists");
        assert_eq!((pulsar.height(), pulsar.width()), (13, 13));
        assert_eq!(pulsar.population(), 48);
        assert_eq!(find_pattern("glider").map(Pattern::population), Some(5));
    }

    #[test]
    fn short_rows_are_padded_with_dead_cells() {
        let gun = find_pattern("gosper_glider_gun").expect("gun exists");
        assert_eq!(gun.cell(8, 35), 0);
        assert_eq!(gun.to_matrix()[8].len(), 36);
    }

    #[test]
    fn place_writes_pattern_and_reports_changes() {
        let mut grid = Grid::new(6, 6);
        let glider = find_pattern("glider").expect("glider exists");
        let changes = SeedPlacer::place(&mut grid, glider, 1, 2).expect("glider fits");
        assert_eq!(changes.len(), 5);
        assert!(changes.iter().all(|c| c.alive));
        assert!(grid.is_alive(1, 3));
        assert!(grid.is_alive(2, 4));
        assert!(grid.is_alive(3, 2) && grid.is_alive(3, 3) && grid.is_alive(3, 4));
        assert_eq!(grid.count_alive(), 5);
    }

    #[test]
    fn overlapping_placements_overwrite_instead_of_merging() {
        let mut grid = Grid::new(5, 5);
        let block = find_pattern("block").expect("block exists");
        let tub = find_pattern("tub").expect("tub exists");
        SeedPlacer::place(&mut grid, block, 1, 1).expect("block fits");
        let changes = SeedPlacer::place(&mut grid, tub, 1, 1).expect("tub fits");
        // Block (1,1) and (2,2) are dead cells in the tub's box and get cleared.
        assert!(!grid.is_alive(1, 1));
        assert!(!grid.is_alive(2, 2));
        assert!(changes.contains(&CellChange {
            row: 1,
            col: 1,
            alive: false
        }));
        assert_eq!(grid.count_alive(), tub.population());
    }

    #[test]
    fn place_out_of_bounds_fails_without_mutation() {
        let mut grid = Grid::new(5, 5);
        let beacon = find_pattern("beacon").expect("beacon exists");
        SeedPlacer::place(&mut grid, beacon, 0, 0).expect("beacon fits");
        let before = grid.clone();
        let err = SeedPlacer::place(&mut grid, beacon, 2, 3).unwrap_err();
        assert!(matches!(err, SeedError::OutOfBounds { row: 2, col: 3, .. }));
        assert_eq!(grid, before);
    }

    #[test]
    fn check_rejects_offsets_that_overflow() {
        let err = SeedPlacer::check("block", usize::MAX, 0, 10, 10).unwrap_err();
        assert!(matches!(err, SeedError::OutOfBounds { .. }));
        assert_eq!(
            SeedPlacer::check("nope", 0, 0, 10, 10).unwrap_err(),
            SeedError::UnknownPattern("nope".to_string())
        );
    }
}
