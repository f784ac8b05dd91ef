pub mod calculator;
pub mod config;
pub mod constants;
pub mod grid;
pub mod metrics;
pub mod overlay;
pub mod seeds;
pub mod stats;
pub mod universe;

pub use calculator::CalculatorKind;
pub use config::{ConfigError, SeedPlacement, Topology, UniverseConfig};
pub use constants::{AGE_MAX, MAX_GRID_DIMENSION, STATS_AGE_BUCKETS};
pub use grid::Grid;
pub use metrics::{GenerationSample, RunSummary};
pub use overlay::{BoardOverlay, LiveCellRecord};
pub use seeds::{find_pattern, Pattern, SeedError, SeedPlacer, PATTERNS};
pub use stats::{AgeBucket, Stats, StatsMode, StatsTracker};
pub use universe::{ExperimentError, SnapshotStyle, StepTimings, Universe, UniverseError};
