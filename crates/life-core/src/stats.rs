use crate::constants::STATS_AGE_BUCKETS;
use crate::overlay::{BoardOverlay, Transition};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgeBucket {
    /// Cells currently alive in this bucket.
    pub alive: u64,
    /// Cells that died under the rule while in this bucket.
    pub deaths: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total_alive: u64,
    /// Buckets for ages 1..=8; the last one also holds ages above 8.
    pub buckets: [AgeBucket; STATS_AGE_BUCKETS],
}

impl Stats {
    /// Bucket index for a live age (1-based age, 0-based index).
    #[inline]
    pub fn bucket_index(age: u8) -> usize {
        debug_assert!(age > 0, "dead cells have no bucket");
        (age as usize).clamp(1, STATS_AGE_BUCKETS) - 1
    }

    /// Bucket for age `age`, where ages of 8 and above share the last bucket.
    pub fn bucket(&self, age: u8) -> &AgeBucket {
        &self.buckets[Self::bucket_index(age)]
    }

    pub fn alive_in_buckets(&self) -> u64 {
        self.buckets.iter().map(|b| b.alive).sum()
    }

    pub fn total_deaths(&self) -> u64 {
        self.buckets.iter().map(|b| b.deaths).sum()
    }

    pub fn alive_by_age(&self) -> [u64; STATS_AGE_BUCKETS] {
        self.buckets.map(|b| b.alive)
    }

    pub fn deaths_by_age(&self) -> [u64; STATS_AGE_BUCKETS] {
        self.buckets.map(|b| b.deaths)
    }

    /// Check the live total against the grid, and the buckets against the total
    /// when `with_buckets` is set.
    pub fn is_consistent(&self, grid_alive: usize, with_buckets: bool) -> bool {
        self.total_alive == grid_alive as u64
            && (!with_buckets || self.alive_in_buckets() == self.total_alive)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatsMode {
    /// Per-age alive and death counters plus the live total.
    #[default]
    WithStats,
    /// Only the live total.
    Standard,
}

impl StatsMode {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            StatsMode::WithStats
        } else {
            StatsMode::Standard
        }
    }
}

/// Incremental counters driven by overlay transitions.
#[derive(Clone, Debug, Default)]
pub struct StatsTracker {
    mode: StatsMode,
    stats: Stats,
}

impl StatsTracker {
    pub fn new(mode: StatsMode) -> Self {
        Self {
            mode,
            stats: Stats::default(),
        }
    }

    pub fn mode(&self) -> StatsMode {
        self.mode
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats = Stats::default();
    }

    pub fn record(&mut self, transition: Transition) {
        let with_buckets = self.mode == StatsMode::WithStats;
        let stats = &mut self.stats;
        match transition {
            Transition::Born => {
                stats.total_alive += 1;
                if with_buckets {
                    stats.buckets[0].alive += 1;
                }
            }
            Transition::Survived { from, to } => {
                if with_buckets {
                    let (old, new) = (Stats::bucket_index(from), Stats::bucket_index(to));
                    if old != new {
                        stats.buckets[old].alive -= 1;
                        stats.buckets[new].alive += 1;
                    }
                }
            }
            Transition::Died { age } => {
                stats.total_alive -= 1;
                if with_buckets {
                    let bucket = &mut stats.buckets[Stats::bucket_index(age)];
                    bucket.alive -= 1;
                    bucket.deaths += 1;
                }
            }
            Transition::Cleared { age } => {
                stats.total_alive -= 1;
                if with_buckets {
                    stats.buckets[Stats::bucket_index(age)].alive -= 1;
                }
            }
        }
    }

    /// Switch modes. Entering `Standard` zeroes the live bucket counters.
    /// Entering `WithStats` rebuilds them from the overlay; death counters keep
    /// the values they had when stats were last enabled.
    pub fn set_mode(&mut self, mode: StatsMode, overlay: &BoardOverlay) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        match mode {
            StatsMode::WithStats => self.rebuild_alive(overlay),
            StatsMode::Standard => {
                for bucket in &mut self.stats.buckets {
                    bucket.alive = 0;
                }
            }
        }
    }

    /// Live total matches the grid, and the live buckets sum to the total with
    /// stats enabled or are all zero without.
    pub fn check_consistency(&self, grid_alive: usize) -> bool {
        let buckets = self.stats.alive_in_buckets();
        self.stats.total_alive == grid_alive as u64
            && match self.mode {
                StatsMode::WithStats => buckets == self.stats.total_alive,
                StatsMode::Standard => buckets == 0,
            }
    }

    pub fn rebuild_alive(&mut self, overlay: &BoardOverlay) {
        for bucket in &mut self.stats.buckets {
            bucket.alive = 0;
        }
        let mut total = 0u64;
        for (_, age) in overlay.iter_ages() {
            self.stats.buckets[Stats::bucket_index(age)].alive += 1;
            total += 1;
        }
        self.stats.total_alive = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_index_caps_at_last_bucket() {
        assert_eq!(Stats::bucket_index(1), 0);
        assert_eq!(Stats::bucket_index(7), 6);
        assert_eq!(Stats::bucket_index(8), 7);
        assert_eq!(Stats::bucket_index(9), 7);
    }

    #[test]
    fn with_stats_moves_cells_between_buckets() {
        let mut tracker = StatsTracker::new(StatsMode::WithStats);
        tracker.record(Transition::Born);
        tracker.record(Transition::Born);
        tracker.record(Transition::Survived { from: 1, to: 2 });
        assert_eq!(tracker.stats().bucket(1).alive, 1);
        assert_eq!(tracker.stats().bucket(2).alive, 1);

        tracker.record(Transition::Died { age: 2 });
        let stats = tracker.stats();
        assert_eq!(stats.total_alive, 1);
        assert_eq!(stats.bucket(2).alive, 0);
        assert_eq!(stats.bucket(2).deaths, 1);
        assert!(stats.is_consistent(1, true));
    }

    #[test]
    fn aging_past_eight_stays_in_last_bucket() {
        let mut tracker = StatsTracker::new(StatsMode::WithStats);
        tracker.record(Transition::Born);
        for age in 1..9u8 {
            tracker.record(Transition::Survived { from: age, to: age + 1 });
        }
        tracker.record(Transition::Survived { from: 9, to: 9 });
        assert_eq!(tracker.stats().buckets[7].alive, 1);
        assert_eq!(tracker.stats().alive_in_buckets(), 1);
    }

    #[test]
    fn cleared_cells_do_not_count_as_deaths() {
        let mut tracker = StatsTracker::new(StatsMode::WithStats);
        let before = tracker.stats().clone();
        tracker.record(Transition::Born);
        tracker.record(Transition::Cleared { age: 1 });
        assert_eq!(tracker.stats(), &before);
    }

    #[test]
    fn standard_mode_tracks_only_total() {
        let mut tracker = StatsTracker::new(StatsMode::Standard);
        tracker.record(Transition::Born);
        tracker.record(Transition::Born);
        tracker.record(Transition::Survived { from: 1, to: 2 });
        tracker.record(Transition::Died { age: 2 });
        let stats = tracker.stats();
        assert_eq!(stats.total_alive, 1);
        assert_eq!(stats.alive_in_buckets(), 0);
        assert_eq!(stats.total_deaths(), 0);
        assert!(stats.is_consistent(1, false));
    }

    #[test]
    fn reenabling_rebuilds_alive_buckets_from_overlay() {
        let mut overlay = BoardOverlay::new(1, 3);
        let mut tracker = StatsTracker::new(StatsMode::Standard);
        overlay.apply_generation(&[0, 0, 0], &[1, 1, 1], |t| tracker.record(t));
        overlay.apply_generation(&[1, 1, 1], &[1, 1, 0], |t| tracker.record(t));
        assert_eq!(tracker.stats().alive_in_buckets(), 0);

        tracker.set_mode(StatsMode::WithStats, &overlay);
        let stats = tracker.stats();
        assert_eq!(stats.total_alive, 2);
        assert_eq!(stats.bucket(2).alive, 2);
        assert!(stats.is_consistent(2, true));
    }

    #[test]
    fn disabling_zeroes_alive_buckets_and_keeps_deaths() {
        let mut overlay = BoardOverlay::new(1, 3);
        let mut tracker = StatsTracker::new(StatsMode::WithStats);
        overlay.apply_generation(&[0, 0, 0], &[1, 1, 1], |t| tracker.record(t));
        overlay.apply_generation(&[1, 1, 1], &[1, 1, 0], |t| tracker.record(t));
        assert!(tracker.check_consistency(2));

        tracker.set_mode(StatsMode::Standard, &overlay);
        let stats = tracker.stats();
        assert_eq!(stats.total_alive, 2);
        assert_eq!(stats.alive_in_buckets(), 0);
        assert_eq!(stats.bucket(1).deaths, 1);
        assert!(tracker.check_consistency(2));

        overlay.apply_generation(&[1, 1, 0], &[1, 0, 0], |t| tracker.record(t));
        assert_eq!(tracker.stats().alive_in_buckets(), 0);
        assert!(tracker.check_consistency(1));
        assert!(!tracker.check_consistency(2));
    }

    #[test]
    fn serializes_as_plain_counters() {
        let mut tracker = StatsTracker::new(StatsMode::WithStats);
        tracker.record(Transition::Born);
        let json = serde_json::to_value(tracker.stats()).expect("stats serialize");
        assert_eq!(json["total_alive"], 1);
        assert_eq!(json["buckets"][0]["alive"], 1);
        assert_eq!(json["buckets"].as_array().map(Vec::len), Some(8));
    }
}
