use crate::constants::{AGE_MAX, DEAD_RECORDS_TOLERANCE};

/// Age bookkeeping for a cell that is alive or died recently.
///
/// `age == 0` marks a dead record kept until the next sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveCellRecord {
    pub age: u8,
    pub age_total: u64,
}

impl LiveCellRecord {
    fn newborn() -> Self {
        Self {
            age: 1,
            age_total: 1,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.age != 0
    }
}

/// Record change caused by one cell transition, consumed by the stats tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Dead cell came alive; its record starts at age 1.
    Born,
    /// Live cell stayed alive and aged.
    Survived { from: u8, to: u8 },
    /// Live cell died under the rule while at `age`.
    Died { age: u8 },
    /// Live cell was cleared by an edit or seed overwrite while at `age`.
    Cleared { age: u8 },
}

/// Live-cell overlay stored as a dense array parallel to the grid.
#[derive(Clone, Debug)]
pub struct BoardOverlay {
    cols: usize,
    records: Vec<Option<LiveCellRecord>>,
    record_count: usize,
    live_count: usize,
}

impl BoardOverlay {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            records: vec![None; rows * cols],
            record_count: 0,
            live_count: 0,
        }
    }

    /// Number of records, live and dead.
    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn dead_count(&self) -> usize {
        self.record_count - self.live_count
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&LiveCellRecord> {
        self.records.get(row * self.cols + col)?.as_ref()
    }

    /// Age of the cell at `(row, col)`, 0 when dead or absent.
    pub fn age(&self, row: usize, col: usize) -> u8 {
        self.get(row, col).map(|r| r.age).unwrap_or(0)
    }

    /// Records in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &LiveCellRecord)> + '_ {
        let cols = self.cols;
        self.records
            .iter()
            .enumerate()
            .filter_map(move |(idx, rec)| rec.as_ref().map(|r| ((idx / cols, idx % cols), r)))
    }

    /// Coordinates and ages of live cells, for rendering.
    pub fn iter_ages(&self) -> impl Iterator<Item = ((usize, usize), u8)> + '_ {
        self.iter()
            .filter(|(_, r)| r.is_alive())
            .map(|(pos, r)| (pos, r.age))
    }

    pub fn clear(&mut self) {
        self.records.fill(None);
        self.record_count = 0;
        self.live_count = 0;
    }

    fn birth(&mut self, idx: usize) -> Transition {
        let slot = &mut self.records[idx];
        if slot.is_none() {
            self.record_count += 1;
        }
        *slot = Some(LiveCellRecord::newborn());
        self.live_count += 1;
        Transition::Born
    }

    fn survive(&mut self, idx: usize) -> Option<Transition> {
        // Live cells always carry a live record.
        let record = self.records[idx].as_mut()?;
        let from = record.age;
        record.age = (record.age + 1).min(AGE_MAX);
        record.age_total += 1;
        Some(Transition::Survived {
            from,
            to: record.age,
        })
    }

    fn retire(&mut self, idx: usize) -> Option<u8> {
        let record = self.records[idx].as_mut().filter(|r| r.is_alive())?;
        let age = record.age;
        record.age = 0;
        self.live_count -= 1;
        Some(age)
    }

    /// Update records from a computed generation, reporting each transition.
    pub fn apply_generation(
        &mut self,
        previous: &[u8],
        current: &[u8],
        mut on_transition: impl FnMut(Transition),
    ) {
        debug_assert_eq!(previous.len(), self.records.len());
        debug_assert_eq!(current.len(), self.records.len());
        for (idx, (&was, &now)) in previous.iter().zip(current).enumerate() {
            let transition = match (was != 0, now != 0) {
                (false, false) => None,
                (false, true) => Some(self.birth(idx)),
                (true, true) => self.survive(idx),
                (true, false) => self.retire(idx).map(|age| Transition::Died { age }),
            };
            if let Some(t) = transition {
                on_transition(t);
            }
        }
    }

    /// Update the record of a single edited cell. Returns `None` when the edit
    /// did not change the cell's liveness.
    pub fn apply_edit(&mut self, row: usize, col: usize, alive: bool) -> Option<Transition> {
        let idx = row * self.cols + col;
        let currently_alive = self.records[idx].is_some_and(|r| r.is_alive());
        match (currently_alive, alive) {
            (false, true) => Some(self.birth(idx)),
            (true, false) => self.retire(idx).map(|age| Transition::Cleared { age }),
            _ => None,
        }
    }

    /// Drop every dead record once they exceed the tolerated backlog.
    ///
    /// Returns the number of records removed.
    pub fn sweep_if_needed(&mut self) -> usize {
        if self.record_count <= self.live_count + DEAD_RECORDS_TOLERANCE {
            return 0;
        }
        let mut removed = 0;
        for slot in &mut self.records {
            if slot.is_some_and(|r| !r.is_alive()) {
                *slot = None;
                removed += 1;
            }
        }
        self.record_count -= removed;
        removed
    }
}
