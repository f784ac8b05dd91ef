/// Largest supported grid dimension (rows or columns).
pub const MAX_GRID_DIMENSION: usize = 4096;

/// Smallest supported grid dimension. The stencil needs a full 3×3 window.
pub const MIN_GRID_DIMENSION: usize = 3;

/// Oldest age a live-cell record can reach; rendered as "9 or older".
pub const AGE_MAX: u8 = 9;

/// Number of statistics age buckets. The last bucket collects ages 8 and above.
pub const STATS_AGE_BUCKETS: usize = 8;

/// Dead records tolerated in the overlay before a sweep reclaims them.
pub const DEAD_RECORDS_TOLERANCE: usize = 5;

/// Grids with fewer cells than this are stepped on the calling thread only.
pub const PARALLEL_MIN_CELLS: usize = 64 * 64;
