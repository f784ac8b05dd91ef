use crate::config::Topology;
use crate::constants::PARALLEL_MIN_CELLS;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Next state of a live cell indexed by neighbor count: survives with 2 or 3.
pub const SURVIVE: [u8; 9] = [0, 0, 1, 1, 0, 0, 0, 0, 0];
/// Next state of a dead cell indexed by neighbor count: born with exactly 3.
pub const BIRTH: [u8; 9] = [0, 0, 0, 1, 0, 0, 0, 0, 0];

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[inline]
pub fn apply_rule(cell: u8, neighbors: u8) -> u8 {
    if cell != 0 {
        SURVIVE[neighbors as usize]
    } else {
        BIRTH[neighbors as usize]
    }
}

/// Strategy used to derive the next generation from the current one.
///
/// Every variant applies B3/S23 and is a pure function of the previous grid.
/// They differ only in how neighbors are counted and which cells are updated:
///
/// - `FastStencil` slides a 3×3 window over interior rows. The outermost ring
///   is inert: it is copied unchanged, so border cells never change.
/// - `ToroidalShift` sums the eight cyclic shifts of the grid and updates every
///   cell.
/// - `NaiveLoop` counts each cell's clamped window one cell at a time. Cells
///   outside the grid count as dead. It exists to cross-check the other two.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    FastStencil,
    ToroidalShift,
    NaiveLoop,
}

impl CalculatorKind {
    pub const ALL: [CalculatorKind; 3] = [
        CalculatorKind::FastStencil,
        CalculatorKind::ToroidalShift,
        CalculatorKind::NaiveLoop,
    ];

    /// Default strategy for a topology.
    pub fn for_topology(topology: Topology) -> Self {
        match topology {
            Topology::Flat => CalculatorKind::FastStencil,
            Topology::Toroidal => CalculatorKind::ToroidalShift,
        }
    }

    pub fn supports(self, topology: Topology) -> bool {
        match self {
            CalculatorKind::FastStencil | CalculatorKind::NaiveLoop => topology == Topology::Flat,
            CalculatorKind::ToroidalShift => topology == Topology::Toroidal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CalculatorKind::FastStencil => "fast_stencil",
            CalculatorKind::ToroidalShift => "toroidal_shift",
            CalculatorKind::NaiveLoop => "naive_loop",
        }
    }

    /// Write the generation following `current` into `next`.
    ///
    /// Both slices are `rows * cols` row-major cells.
    pub fn compute(self, current: &[u8], next: &mut [u8], rows: usize, cols: usize) {
        debug_assert_eq!(current.len(), rows * cols);
        debug_assert_eq!(next.len(), rows * cols);
        match self {
            CalculatorKind::FastStencil => fast_stencil(current, next, rows, cols),
            CalculatorKind::ToroidalShift => toroidal_shift(current, next, rows, cols),
            CalculatorKind::NaiveLoop => naive_loop(current, next, rows, cols),
        }
    }

    /// Neighbor count of every cell as this strategy sees it.
    ///
    /// `FastStencil` reports 0 on its inert border.
    pub fn neighbor_counts(self, current: &[u8], rows: usize, cols: usize) -> Vec<u8> {
        let mut counts = vec![0u8; rows * cols];
        match self {
            CalculatorKind::FastStencil => {
                for r in 1..rows.saturating_sub(1) {
                    stencil_counts_row(current, cols, r, &mut counts[r * cols..(r + 1) * cols]);
                }
            }
            CalculatorKind::ToroidalShift => {
                for (r, row) in counts.chunks_mut(cols).enumerate() {
                    shifted_counts_row(current, rows, cols, r, row);
                }
            }
            CalculatorKind::NaiveLoop => {
                for (idx, count) in counts.iter_mut().enumerate() {
                    *count = clamped_count(current, rows, cols, idx / cols, idx % cols);
                }
            }
        }
        counts
    }
}

/// Run `f` over every `cols`-wide row of `out`, in parallel for large grids.
///
/// Rows are independent, so both paths produce identical output.
fn for_each_row<F>(out: &mut [u8], cols: usize, total_cells: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync + Send,
{
    if total_cells >= PARALLEL_MIN_CELLS {
        out.par_chunks_mut(cols)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        out.chunks_mut(cols)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}

/// Interior neighbor counts for row `r` via a sliding 3×3 window.
///
/// Column sums of the three rows are slid across the row; the first and last
/// columns are left at 0.
fn stencil_counts_row(current: &[u8], cols: usize, r: usize, out: &mut [u8]) {
    let up = &current[(r - 1) * cols..r * cols];
    let mid = &current[r * cols..(r + 1) * cols];
    let down = &current[(r + 1) * cols..(r + 2) * cols];
    let column_sum = |c: usize| up[c] + mid[c] + down[c];

    out[0] = 0;
    out[cols - 1] = 0;
    let mut left = column_sum(0);
    let mut centre = column_sum(1);
    for c in 1..cols - 1 {
        let right = column_sum(c + 1);
        out[c] = left + centre + right - mid[c];
        left = centre;
        centre = right;
    }
}

fn fast_stencil(current: &[u8], next: &mut [u8], rows: usize, cols: usize) {
    debug_assert!(rows >= 3 && cols >= 3, "stencil needs a 3x3 grid");
    let last_row = (rows - 1) * cols;
    next[..cols].copy_from_slice(&current[..cols]);
    next[last_row..].copy_from_slice(&current[last_row..]);

    for_each_row(&mut next[cols..last_row], cols, rows * cols, |i, out| {
        let r = i + 1;
        stencil_counts_row(current, cols, r, out);
        let mid = &current[r * cols..(r + 1) * cols];
        for c in 1..cols - 1 {
            out[c] = apply_rule(mid[c], out[c]);
        }
        out[0] = mid[0];
        out[cols - 1] = mid[cols - 1];
    });
}

#[inline]
fn wrap(index: usize, delta: isize, len: usize) -> usize {
    (index as isize + delta).rem_euclid(len as isize) as usize
}

/// Neighbor counts for row `r` as the sum of the eight cyclic shifts.
fn shifted_counts_row(current: &[u8], rows: usize, cols: usize, r: usize, out: &mut [u8]) {
    out.fill(0);
    for (dr, dc) in NEIGHBOR_OFFSETS {
        let src_r = wrap(r, dr, rows);
        let src = &current[src_r * cols..(src_r + 1) * cols];
        // out[c] += src[(c + dc) mod cols]
        let (head, tail) = src.split_at(wrap(0, dc, cols));
        for (count, &cell) in out.iter_mut().zip(tail.iter().chain(head)) {
            *count += cell;
        }
    }
}

fn toroidal_shift(current: &[u8], next: &mut [u8], rows: usize, cols: usize) {
    for_each_row(next, cols, rows * cols, |r, out| {
        shifted_counts_row(current, rows, cols, r, out);
        let mid = &current[r * cols..(r + 1) * cols];
        for (slot, &cell) in out.iter_mut().zip(mid) {
            *slot = apply_rule(cell, *slot);
        }
    });
}

fn clamped_count(current: &[u8], rows: usize, cols: usize, r: usize, c: usize) -> u8 {
    let r_end = (r + 1).min(rows - 1);
    let c_end = (c + 1).min(cols - 1);
    let mut sum = 0u8;
    for wr in r.saturating_sub(1)..=r_end {
        for wc in c.saturating_sub(1)..=c_end {
            sum += current[wr * cols + wc];
        }
    }
    sum - current[r * cols + c]
}

fn naive_loop(current: &[u8], next: &mut [u8], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            let idx = r * cols + c;
            next[idx] = apply_rule(current[idx], clamped_count(current, rows, cols, r, c));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step(kind: CalculatorKind, cells: &[u8], rows: usize, cols: usize) -> Vec<u8> {
        let mut next = vec![0u8; cells.len()];
        kind.compute(cells, &mut next, rows, cols);
        next
    }

    fn flatten(rows: &[&[u8]]) -> Vec<u8> {
        rows.iter().flat_map(|r| r.iter().copied()).collect()
    }

    #[test]
    fn rule_tables_encode_b3_s23() {
        for n in 0..=8u8 {
            assert_eq!(apply_rule(1, n), u8::from(n == 2 || n == 3), "survival at {n}");
            assert_eq!(apply_rule(0, n), u8::from(n == 3), "birth at {n}");
        }
    }

    #[test]
    fn default_strategy_follows_topology() {
        assert_eq!(
            CalculatorKind::for_topology(Topology::Flat),
            CalculatorKind::FastStencil
        );
        assert_eq!(
            CalculatorKind::for_topology(Topology::Toroidal),
            CalculatorKind::ToroidalShift
        );
        assert!(CalculatorKind::NaiveLoop.supports(Topology::Flat));
        assert!(!CalculatorKind::NaiveLoop.supports(Topology::Toroidal));
        assert!(!CalculatorKind::ToroidalShift.supports(Topology::Flat));
    }

    #[test]
    fn block_is_still_life_in_every_strategy() {
        let cells = flatten(&[
            &[0, 0, 0, 0],
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
            &[0, 0, 0, 0],
        ]);
        for kind in CalculatorKind::ALL {
            assert_eq!(step(kind, &cells, 4, 4), cells, "{}", kind.name());
        }
    }

    #[test]
    fn fast_stencil_border_is_inert() {
        // A full top row would die under B3/S23; the stencil leaves it alone and
        // never births cells on the left column despite three live neighbors.
        let cells = flatten(&[
            &[1, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let next = step(CalculatorKind::FastStencil, &cells, 5, 5);
        assert_eq!(&next[0..5], &[1, 1, 1, 1, 1]);
        assert_eq!(next[2 * 5], 1);
        // Interior row 1 sees the border row as live neighbors; (1, 0) would be
        // born under the clamped rule but stays dead on the inert border.
        assert_eq!(&next[5..10], &[0, 0, 1, 1, 0]);
    }

    #[test]
    fn naive_loop_clamps_instead_of_wrapping() {
        let cells = flatten(&[&[1, 0, 1], &[0, 0, 0], &[1, 0, 0]]);
        let counts = CalculatorKind::NaiveLoop.neighbor_counts(&cells, 3, 3);
        assert_eq!(counts, vec![0, 2, 0, 2, 3, 1, 0, 1, 0]);
        // Corner cells have no live neighbors inside the grid, so they all die.
        let next = step(CalculatorKind::NaiveLoop, &cells, 3, 3);
        assert_eq!(next, vec![0, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn toroidal_counts_on_3x3_match_shift_formula() {
        // On a 3x3 torus the eight shifts visit every other cell exactly once,
        // so each count is the live total minus the cell itself.
        let cells = flatten(&[&[1, 0, 1], &[0, 0, 0], &[1, 0, 0]]);
        let counts = CalculatorKind::ToroidalShift.neighbor_counts(&cells, 3, 3);
        assert_eq!(counts, vec![2, 3, 2, 3, 3, 3, 2, 3, 3]);

        let next = step(CalculatorKind::ToroidalShift, &cells, 3, 3);
        assert_eq!(next, vec![1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn toroidal_counts_wrap_across_edges() {
        let mut cells = vec![0u8; 25];
        cells[0] = 1; // (0, 0)
        let counts = CalculatorKind::ToroidalShift.neighbor_counts(&cells, 5, 5);
        for (r, c) in [(4, 4), (4, 0), (4, 1), (0, 4), (0, 1), (1, 4), (1, 0), (1, 1)] {
            assert_eq!(counts[r * 5 + c], 1, "({r}, {c})");
        }
        assert_eq!(counts.iter().map(|&n| n as usize).sum::<usize>(), 8);
    }

    #[test]
    fn blinker_crosses_toroidal_seam() {
        // Horizontal blinker centred on column 0 of row 2.
        let mut cells = vec![0u8; 25];
        for c in [4, 0, 1] {
            cells[2 * 5 + c] = 1;
        }
        let once = step(CalculatorKind::ToroidalShift, &cells, 5, 5);
        let expected_vertical: Vec<usize> = vec![5, 10, 15];
        let alive: Vec<usize> = (0..25).filter(|&i| once[i] == 1).collect();
        assert_eq!(alive, expected_vertical);
        assert_eq!(step(CalculatorKind::ToroidalShift, &once, 5, 5), cells);
    }

    #[test]
    fn parallel_rows_match_reference_on_large_grid() {
        use rand::{Rng, SeedableRng};
        let (rows, cols) = (96, 80);
        assert!(rows * cols >= PARALLEL_MIN_CELLS);
        let mut rng = rand_chacha::ChaCha12Rng::seed_from_u64(7);
        let cells: Vec<u8> = (0..rows * cols)
            .map(|_| u8::from(rng.random_bool(0.35)))
            .collect();
        let fast = step(CalculatorKind::FastStencil, &cells, rows, cols);
        let naive = step(CalculatorKind::NaiveLoop, &cells, rows, cols);
        for r in 1..rows - 1 {
            for c in 1..cols - 1 {
                assert_eq!(fast[r * cols + c], naive[r * cols + c], "({r}, {c})");
            }
        }
    }

    fn grid_strategy() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
        (3usize..24, 3usize..24).prop_flat_map(|(rows, cols)| {
            (
                Just(rows),
                Just(cols),
                proptest::collection::vec(0u8..=1, rows * cols),
            )
        })
    }

    proptest! {
        #[test]
        fn proptest_vectorized_strategies_match_reference_on_interior(
            (rows, cols, cells) in grid_strategy(),
        ) {
            let naive = step(CalculatorKind::NaiveLoop, &cells, rows, cols);
            let fast = step(CalculatorKind::FastStencil, &cells, rows, cols);
            let toroidal = step(CalculatorKind::ToroidalShift, &cells, rows, cols);
            for r in 1..rows - 1 {
                for c in 1..cols - 1 {
                    let idx = r * cols + c;
                    prop_assert_eq!(fast[idx], naive[idx]);
                    prop_assert_eq!(toroidal[idx], naive[idx]);
                }
            }
        }

        #[test]
        fn proptest_fast_stencil_never_touches_border(
            (rows, cols, cells) in grid_strategy(),
        ) {
            let fast = step(CalculatorKind::FastStencil, &cells, rows, cols);
            for r in 0..rows {
                for c in 0..cols {
                    if r == 0 || c == 0 || r == rows - 1 || c == cols - 1 {
                        prop_assert_eq!(fast[r * cols + c], cells[r * cols + c]);
                    }
                }
            }
        }
    }
}
