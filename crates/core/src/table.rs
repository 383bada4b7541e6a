//! Dense in-memory row store
//!
//! A two-column (key, value) table written once by the single-threaded
//! loader and then frozen. Freezing is a type-level publish point: the
//! mutable [`RowTableBuilder`] is consumed and a shared-read [`RowTable`]
//! comes out, so "writes after publish" cannot compile.
//!
//! Rows are stored contiguously in row-major order (key at cell 0, value
//! at cell 1) so a sequential scan touches at most one cache line per row.

/// Column index of the group key.
pub const COL_KEY: usize = 0;

/// Column index of the aggregated value.
pub const COL_VALUE: usize = 1;

const N_COLS: usize = 2;

/// Single-threaded writer used by the loader to populate a table.
#[derive(Debug)]
pub struct RowTableBuilder {
    data: Vec<i64>,
    n_rows: usize,
}

impl RowTableBuilder {
    /// Allocate backing storage for `n_rows` rows, zero-initialised.
    pub fn new(n_rows: usize) -> Self {
        Self {
            data: vec![0; n_rows * N_COLS],
            n_rows,
        }
    }

    /// Store one cell. `col` is [`COL_KEY`] or [`COL_VALUE`].
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        debug_assert!(col < N_COLS);
        self.data[row * N_COLS + col] = value;
    }

    /// Store a whole row at once.
    #[inline]
    pub fn set_row(&mut self, row: usize, key: i64, value: i64) {
        let base = row * N_COLS;
        self.data[base] = key;
        self.data[base + 1] = value;
    }

    /// Publish: freeze the buffer into an immutable, shareable table.
    pub fn freeze(self) -> RowTable {
        RowTable {
            data: self.data,
            n_rows: self.n_rows,
        }
    }
}

/// Frozen two-column row store; safe for concurrent reads.
#[derive(Debug)]
pub struct RowTable {
    data: Vec<i64>,
    n_rows: usize,
}

impl RowTable {
    /// Build a table directly from (key, value) pairs. Test and generator
    /// convenience; the loader goes through [`RowTableBuilder`].
    pub fn from_rows(rows: &[(i64, i64)]) -> Self {
        let mut builder = RowTableBuilder::new(rows.len());
        for (r, &(key, value)) in rows.iter().enumerate() {
            builder.set_row(r, key, value);
        }
        builder.freeze()
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (always 2).
    #[inline]
    pub fn n_cols(&self) -> usize {
        N_COLS
    }

    /// True when the table holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Constant-time cell read.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        debug_assert!(col < N_COLS);
        self.data[row * N_COLS + col]
    }

    /// Group key of `row`.
    #[inline]
    pub fn key(&self, row: usize) -> i64 {
        self.data[row * N_COLS]
    }

    /// Value of `row`.
    #[inline]
    pub fn value(&self, row: usize) -> i64 {
        self.data[row * N_COLS + 1]
    }
}
