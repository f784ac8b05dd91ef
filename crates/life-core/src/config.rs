use crate::calculator::CalculatorKind;
use crate::constants::{MAX_GRID_DIMENSION, MIN_GRID_DIMENSION};
use crate::grid::Grid;
use crate::seeds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Bounded grid; cells beyond the edge do not exist.
    #[default]
    Flat,
    /// Wrap-around grid; opposite edges are adjacent.
    Toroidal,
}

/// A named pattern stamped with its top-left corner at `(row, col)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedPlacement {
    pub pattern: String,
    pub row: usize,
    pub col: usize,
}

impl SeedPlacement {
    pub fn new(pattern: impl Into<String>, row: usize, col: usize) -> Self {
        Self {
            pattern: pattern.into(),
            row,
            col,
        }
    }
}

fn default_seeds() -> Vec<SeedPlacement> {
    [
        ("gosper_glider_gun", 7, 20),
        ("clock", 75, 100),
        ("boat", 5, 65),
        ("beacon", 24, 6),
        ("diehard", 37, 18),
        ("r_pentomino", 30, 60),
        ("toad", 48, 90),
        ("pentadecathlon", 15, 110),
        ("spaceship_light", 40, 44),
        ("pulsar", 60, 105),
        ("spaceship_heavy", 78, 60),
        ("acorn", 55, 20),
    ]
    .into_iter()
    .map(|(pattern, row, col)| SeedPlacement::new(pattern, row, col))
    .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UniverseConfig {
    /// Boundary policy of the grid.
    pub topology: Topology,
    /// Grid height in cells.
    pub rows: usize,
    /// Grid width in cells.
    pub cols: usize,
    /// Explicit generation strategy. `None` uses the topology default.
    pub calculator: Option<CalculatorKind>,
    /// Seeds stamped on reset, in order. An empty list starts an empty universe.
    pub seeds: Vec<SeedPlacement>,
    /// Number of random live cells added after the seeds on reset.
    pub random_cells: usize,
    /// Seed of the deterministic RNG used for random cell placement.
    pub rng_seed: u64,
    /// Maintain per-age statistics; when false only the live total is tracked.
    pub stats_enabled: bool,
    /// Hint for collaborators to poll statistics less often. Does not change values.
    pub coarse_stats: bool,
    /// Whether manual single-cell toggles are accepted.
    pub edit_allowed: bool,
    /// Render live cells as `1` instead of their age digit.
    pub cell_one_color: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Flat,
            rows: 90,
            cols: 137,
            calculator: None,
            seeds: default_seeds(),
            random_cells: 0,
            rng_seed: 42,
            stats_enabled: true,
            coarse_stats: false,
            edit_allowed: true,
            cell_one_color: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rows ({actual}) must be within [{min}, {max}]")]
    InvalidRows {
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("cols ({actual}) must be within [{min}, {max}]")]
    InvalidCols {
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("rows * cols overflows usize")]
    CellCountOverflow,
    #[error("calculator {calculator:?} does not support {topology:?} topology")]
    CalculatorTopologyMismatch {
        calculator: CalculatorKind,
        topology: Topology,
    },
    #[error("seed {index}: {source}")]
    InvalidSeed {
        index: usize,
        #[source]
        source: seeds::SeedError,
    },
    #[error("random_cells ({actual}) exceeds dead cells left after seeding ({max})")]
    TooManyRandomCells { max: usize, actual: usize },
}

impl UniverseConfig {
    pub const MAX_GRID_DIMENSION: usize = MAX_GRID_DIMENSION;

    /// Small empty universe, mostly useful for tests and editors.
    pub fn empty(topology: Topology, rows: usize, cols: usize) -> Self {
        Self {
            topology,
            rows,
            cols,
            seeds: Vec::new(),
            ..Self::default()
        }
    }

    /// Strategy the universe will run with.
    pub fn effective_calculator(&self) -> CalculatorKind {
        self.calculator
            .unwrap_or_else(|| CalculatorKind::for_topology(self.topology))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_dimensions()?;
        self.validate_calculator()?;
        self.validate_seeds()?;
        self.validate_random_cells()?;
        Ok(())
    }

    fn validate_dimensions(&self) -> Result<(), ConfigError> {
        let range = MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION;
        if !range.contains(&self.rows) {
            return Err(ConfigError::InvalidRows {
                min: MIN_GRID_DIMENSION,
                max: MAX_GRID_DIMENSION,
                actual: self.rows,
            });
        }
        if !range.contains(&self.cols) {
            return Err(ConfigError::InvalidCols {
                min: MIN_GRID_DIMENSION,
                max: MAX_GRID_DIMENSION,
                actual: self.cols,
            });
        }
        self.rows
            .checked_mul(self.cols)
            .ok_or(ConfigError::CellCountOverflow)?;
        Ok(())
    }

    fn validate_calculator(&self) -> Result<(), ConfigError> {
        let calculator = self.effective_calculator();
        if !calculator.supports(self.topology) {
            return Err(ConfigError::CalculatorTopologyMismatch {
                calculator,
                topology: self.topology,
            });
        }
        Ok(())
    }

    fn validate_seeds(&self) -> Result<(), ConfigError> {
        for (index, seed) in self.seeds.iter().enumerate() {
            seeds::SeedPlacer::check(&seed.pattern, seed.row, seed.col, self.rows, self.cols)
                .map_err(|source| ConfigError::InvalidSeed { index, source })?;
        }
        Ok(())
    }

    /// Random cells must fit in the dead cells the seeds leave behind.
    fn validate_random_cells(&self) -> Result<(), ConfigError> {
        if self.random_cells == 0 {
            return Ok(());
        }
        let mut grid = Grid::new(self.rows, self.cols);
        for (index, seed) in self.seeds.iter().enumerate() {
            let pattern =
                seeds::SeedPlacer::check(&seed.pattern, seed.row, seed.col, self.rows, self.cols)
                    .map_err(|source| ConfigError::InvalidSeed { index, source })?;
            seeds::SeedPlacer::place(&mut grid, pattern, seed.row, seed.col)
                .map_err(|source| ConfigError::InvalidSeed { index, source })?;
        }
        let max = grid.len() - grid.count_alive();
        if self.random_cells > max {
            return Err(ConfigError::TooManyRandomCells {
                max,
                actual: self.random_cells,
            });
        }
        Ok(())
    }
}
