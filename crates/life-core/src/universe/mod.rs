use crate::calculator::CalculatorKind;
use crate::config::{ConfigError, Topology, UniverseConfig};
use crate::constants::AGE_MAX;
use crate::grid::Grid;
use crate::metrics::{GenerationSample, RunSummary};
use crate::overlay::BoardOverlay;
use crate::seeds::{SeedError, SeedPlacer};
use crate::stats::{Stats, StatsMode, StatsTracker};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

/// Character used for dead or absent cells in snapshots.
pub const DEAD_CELL_CHAR: char = '·';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotStyle {
    /// Live cells show their age digit, 9 meaning "9 or older".
    #[default]
    Age,
    /// Live cells show `1` regardless of age.
    OneColor,
}

#[derive(Clone, Debug, Default)]
pub struct StepTimings {
    pub compute_us: u64,
    pub overlay_us: u64,
    pub total_us: u64,
}

impl StepTimings {
    fn accumulate(&mut self, other: &StepTimings) {
        self.compute_us += other.compute_us;
        self.overlay_us += other.overlay_us;
        self.total_us += other.total_us;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniverseError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("manual cell editing is disabled")]
    EditNotAllowed,
    #[error("cannot add {requested} random cells: only {available} dead cells left")]
    NotEnoughDeadCells { requested: usize, available: usize },
    #[error("calculator {calculator:?} does not support {topology:?} topology")]
    CalculatorTopologyMismatch {
        calculator: CalculatorKind,
        topology: Topology,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExperimentError {
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("target generation ({target}) is behind the current generation ({current})")]
    TargetBehind { target: u64, current: u64 },
    #[error("generations to run ({actual}) exceed supported maximum ({max})")]
    TooManyGenerations { max: u64, actual: u64 },
}

/// Grid, live-cell overlay and statistics advanced together one generation
/// at a time.
pub struct Universe {
    config: UniverseConfig,
    grid: Grid,
    overlay: BoardOverlay,
    tracker: StatsTracker,
    topology: Topology,
    calculator: CalculatorKind,
    generation: u64,
    rng: ChaCha12Rng,
}

impl Universe {
    pub const MAX_RUN_GENERATIONS: u64 = 10_000_000;

    pub fn new(config: UniverseConfig) -> Result<Self, UniverseError> {
        config.validate()?;
        let topology = config.topology;
        let calculator = config.effective_calculator();
        let mode = StatsMode::from_enabled(config.stats_enabled);
        Self::seeded(config, topology, calculator, mode)
    }

    /// Build a universe in its generation-1 state from a validated config.
    fn seeded(
        config: UniverseConfig,
        topology: Topology,
        calculator: CalculatorKind,
        mode: StatsMode,
    ) -> Result<Self, UniverseError> {
        let mut universe = Self {
            grid: Grid::new(config.rows, config.cols),
            overlay: BoardOverlay::new(config.rows, config.cols),
            tracker: StatsTracker::new(mode),
            topology,
            calculator,
            generation: 1,
            rng: ChaCha12Rng::seed_from_u64(config.rng_seed),
            config,
        };

        let seeds = universe.config.seeds.clone();
        for seed in &seeds {
            universe.place_seed(&seed.pattern, seed.row, seed.col)?;
        }
        if universe.config.random_cells > 0 {
            universe.add_random_cells(universe.config.random_cells)?;
        }
        debug!(
            rows = universe.grid.rows(),
            cols = universe.grid.cols(),
            seeds = seeds.len(),
            alive = universe.tracker.stats().total_alive,
            calculator = universe.calculator.name(),
            "universe seeded"
        );
        Ok(universe)
    }

    /// Clear the universe and re-apply the configured seeds.
    ///
    /// The active topology, calculator and stats mode are kept. On error the
    /// universe is left as it was.
    pub fn reset(&mut self) -> Result<(), UniverseError> {
        *self = Self::seeded(
            self.config.clone(),
            self.topology,
            self.calculator,
            self.tracker.mode(),
        )?;
        Ok(())
    }

    /// Compute the next generation and bring the overlay and stats in line.
    pub fn step(&mut self) -> StepTimings {
        let start = Instant::now();
        self.generation += 1;
        self.grid.advance(self.calculator);
        let computed = Instant::now();

        let tracker = &mut self.tracker;
        self.overlay
            .apply_generation(self.grid.previous(), self.grid.cells(), |t| {
                tracker.record(t)
            });
        let swept = self.overlay.sweep_if_needed();
        let done = Instant::now();

        if swept > 0 {
            debug!(generation = self.generation, swept, "swept dead overlay records");
        }
        trace!(
            generation = self.generation,
            alive = self.tracker.stats().total_alive,
            "generation computed"
        );
        StepTimings {
            compute_us: (computed - start).as_micros() as u64,
            overlay_us: (done - computed).as_micros() as u64,
            total_us: (done - start).as_micros() as u64,
        }
    }

    /// Compute `generations` steps in a row.
    pub fn advance(&mut self, generations: u64) -> StepTimings {
        let mut total = StepTimings::default();
        for _ in 0..generations {
            total.accumulate(&self.step());
        }
        total
    }

    /// Step until the generation counter reaches `stop_after_generation`,
    /// sampling statistics every `sample_every` generations.
    pub fn run_until(
        &mut self,
        stop_after_generation: u64,
        sample_every: u64,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if stop_after_generation < self.generation {
            return Err(ExperimentError::TargetBehind {
                target: stop_after_generation,
                current: self.generation,
            });
        }
        let to_run = stop_after_generation - self.generation;
        if to_run > Self::MAX_RUN_GENERATIONS {
            return Err(ExperimentError::TooManyGenerations {
                max: Self::MAX_RUN_GENERATIONS,
                actual: to_run,
            });
        }

        let start_generation = self.generation;
        let mut samples = vec![self.sample()];
        while self.generation < stop_after_generation {
            self.step();
            if (self.generation - start_generation) % sample_every == 0 {
                samples.push(self.sample());
            }
        }
        if samples.last().map(|s| s.generation) != Some(self.generation) {
            samples.push(self.sample());
        }

        Ok(RunSummary {
            schema_version: 1,
            start_generation,
            final_generation: self.generation,
            sample_every,
            final_alive: self.tracker.stats().total_alive,
            samples,
            final_snapshot: self.snapshot(),
        })
    }

    /// Stamp a named pattern with its top-left corner at `(row, col)`.
    ///
    /// Nothing changes when the pattern is unknown or does not fit.
    pub fn place_seed(&mut self, name: &str, row: usize, col: usize) -> Result<(), UniverseError> {
        let pattern = SeedPlacer::check(name, row, col, self.grid.rows(), self.grid.cols())?;
        let changes = SeedPlacer::place(&mut self.grid, pattern, row, col)?;
        for change in changes {
            self.apply_edit(change.row, change.col, change.alive);
        }
        Ok(())
    }

    /// Flip one cell outside of generation computation. Returns the new state.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<bool, UniverseError> {
        if !self.config.edit_allowed {
            return Err(UniverseError::EditNotAllowed);
        }
        self.check_cell(row, col)?;
        let alive = !self.grid.is_alive(row, col);
        self.grid.set(row, col, u8::from(alive));
        self.apply_edit(row, col, alive);
        Ok(alive)
    }

    /// Bring `n` distinct dead cells to life, chosen by the universe RNG.
    pub fn add_random_cells(&mut self, n: usize) -> Result<usize, UniverseError> {
        let mut dead: Vec<usize> = self
            .grid
            .cells()
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == 0)
            .map(|(idx, _)| idx)
            .collect();
        if n > dead.len() {
            return Err(UniverseError::NotEnoughDeadCells {
                requested: n,
                available: dead.len(),
            });
        }
        let chosen = dead.partial_shuffle(&mut self.rng, n).0.to_vec();
        for idx in chosen {
            let (row, col) = self.grid.coords(idx);
            self.grid.set(row, col, 1);
            self.apply_edit(row, col, true);
        }
        Ok(n)
    }

    fn apply_edit(&mut self, row: usize, col: usize, alive: bool) {
        if let Some(transition) = self.overlay.apply_edit(row, col, alive) {
            self.tracker.record(transition);
        }
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<(), UniverseError> {
        if self.grid.contains(row, col) {
            Ok(())
        } else {
            Err(UniverseError::CellOutOfBounds {
                row,
                col,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })
        }
    }

    /// Switch topology and its default calculator. Grid contents are kept.
    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
        self.calculator = CalculatorKind::for_topology(topology);
        debug!(?topology, calculator = self.calculator.name(), "topology switched");
    }

    pub fn set_calculator(&mut self, calculator: CalculatorKind) -> Result<(), UniverseError> {
        if !calculator.supports(self.topology) {
            return Err(UniverseError::CalculatorTopologyMismatch {
                calculator,
                topology: self.topology,
            });
        }
        self.calculator = calculator;
        debug!(calculator = calculator.name(), "calculator switched");
        Ok(())
    }

    pub fn set_stats_enabled(&mut self, enabled: bool) {
        self.tracker
            .set_mode(StatsMode::from_enabled(enabled), &self.overlay);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> &Stats {
        self.tracker.stats()
    }

    pub fn stats_mode(&self) -> StatsMode {
        self.tracker.mode()
    }

    /// Stats agree with the grid for the active mode.
    pub fn check_consistency(&self) -> bool {
        self.tracker.check_consistency(self.grid.count_alive())
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn calculator(&self) -> CalculatorKind {
        self.calculator
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    pub fn coarse_stats(&self) -> bool {
        self.config.coarse_stats
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn overlay(&self) -> &BoardOverlay {
        &self.overlay
    }

    /// Age of the cell at `(row, col)`; 0 when dead or out of range.
    pub fn cell_age(&self, row: usize, col: usize) -> u8 {
        if self.grid.contains(row, col) {
            self.overlay.age(row, col)
        } else {
            0
        }
    }

    /// Live cells and their ages in row-major order.
    pub fn overlay_ages(&self) -> impl Iterator<Item = ((usize, usize), u8)> + '_ {
        self.overlay.iter_ages()
    }

    pub fn sample(&self) -> GenerationSample {
        let stats = self.tracker.stats();
        GenerationSample {
            generation: self.generation,
            total_alive: stats.total_alive,
            alive_by_age: stats.alive_by_age(),
            deaths_by_age: stats.deaths_by_age(),
            overlay_records: self.overlay.len(),
        }
    }

    /// Text form of the grid in the configured style.
    pub fn snapshot(&self) -> String {
        let style = if self.config.cell_one_color {
            SnapshotStyle::OneColor
        } else {
            SnapshotStyle::Age
        };
        self.snapshot_with(style)
    }

    /// One character per cell, rows joined by `\n`.
    ///
    /// The last row has no trailing newline, so dumps that terminate every row
    /// differ by one final `\n`.
    pub fn snapshot_with(&self, style: SnapshotStyle) -> String {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let mut out = String::with_capacity(rows * (cols * DEAD_CELL_CHAR.len_utf8() + 1));
        for r in 0..rows {
            if r > 0 {
                out.push('\n');
            }
            for c in 0..cols {
                let ch = match (self.overlay.age(r, c), style) {
                    (0, _) => DEAD_CELL_CHAR,
                    (_, SnapshotStyle::OneColor) => '1',
                    (age, SnapshotStyle::Age) => char::from(b'0' + age.min(AGE_MAX)),
                };
                out.push(ch);
            }
        }
        out
    }
}
