//! Fixed-capacity sliding window over multi-channel samples.
//!
//! The window is the ingestion buffer that feeds every time-domain
//! analyzer: a fixed-width ring of numeric rows (one row per frame, one
//! column per channel) with FIFO eviction once capacity is reached. A
//! parallel lane records the arrival timestamp of each row.
//!
//! The buffer is a flat arena indexed by start/length cursors, so an
//! append never reallocates. Single-owner mutation is assumed: exactly one
//! writer and no concurrent readers during a write. Callers that share a
//! window across tasks must wrap it in their own lock.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::types::Timestamp;

/// Ring buffer of fixed-width sample rows with FIFO eviction
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    buffer: Vec<f64>,
    timestamps: Vec<i64>,
    capacity: usize,
    columns: usize,
    start: usize,
    len: usize,
}

impl SlidingWindow {
    /// Create a window holding up to `capacity` rows of `columns` values each.
    ///
    /// Both dimensions must be at least 1.
    pub fn new(capacity: usize, columns: usize) -> Result<Self> {
        if capacity == 0 || columns == 0 {
            return Err(Error::WindowConfig { capacity, columns });
        }

        Ok(Self {
            buffer: vec![0.0; capacity * columns],
            timestamps: vec![0; capacity],
            capacity,
            columns,
            start: 0,
            len: 0,
        })
    }

    /// Append one row, stamped with the current wall-clock time.
    pub fn append(&mut self, row: &[f64]) -> Result<()> {
        self.append_at(row, Timestamp::now())
    }

    /// Append one row with an explicit timestamp.
    ///
    /// The row width must match the column count exactly. When the window
    /// is full the oldest row is evicted.
    pub fn append_at(&mut self, row: &[f64], timestamp: Timestamp) -> Result<()> {
        if row.len() != self.columns {
            return Err(Error::RowWidth {
                expected: self.columns,
                actual: row.len(),
            });
        }

        let slot = if self.len < self.capacity {
            let slot = (self.start + self.len) % self.capacity;
            self.len += 1;
            slot
        } else {
            let slot = self.start;
            self.start = (self.start + 1) % self.capacity;
            slot
        };

        let offset = slot * self.columns;
        self.buffer[offset..offset + self.columns].copy_from_slice(row);
        self.timestamps[slot] = timestamp.as_nanos();

        Ok(())
    }

    /// Snapshot of current contents in insertion order (oldest row first).
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len, self.columns), |(row, col)| {
            let slot = (self.start + row) % self.capacity;
            self.buffer[slot * self.columns + col]
        })
    }

    /// Timestamps aligned with `to_array` rows.
    pub fn timestamps(&self) -> Vec<Timestamp> {
        (0..self.len)
            .map(|row| {
                let slot = (self.start + row) % self.capacity;
                Timestamp::from_nanos(self.timestamps[slot])
            })
            .collect()
    }

    /// Copy of a single channel in insertion order.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.columns {
            return None;
        }

        Some(
            (0..self.len)
                .map(|row| {
                    let slot = (self.start + row) % self.capacity;
                    self.buffer[slot * self.columns + index]
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Whether enough rows have accumulated for an analyzer's minimum.
    pub fn is_ready(&self, min_rows: usize) -> bool {
        self.len >= min_rows
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Discard all rows while keeping the allocation.
    pub fn reset(&mut self) {
        self.start = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(SlidingWindow::new(0, 3).is_err());
        assert!(SlidingWindow::new(16, 0).is_err());
    }

    #[test]
    fn test_rejects_mismatched_row() {
        let mut window = SlidingWindow::new(4, 3).unwrap();
        let err = window.append(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::RowWidth {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = SlidingWindow::new(3, 1).unwrap();
        for i in 0..4 {
            window
                .append_at(&[i as f64], Timestamp::from_nanos(i))
                .unwrap();
        }

        assert_eq!(window.len(), 3);
        let snapshot = window.to_array();
        assert_eq!(snapshot[[0, 0]], 1.0, "oldest row should be evicted");
        assert_eq!(snapshot[[2, 0]], 3.0);
    }

    #[test]
    fn test_insertion_order_across_wrap() {
        let mut window = SlidingWindow::new(3, 2).unwrap();
        for i in 0..7 {
            window
                .append_at(&[i as f64, -(i as f64)], Timestamp::from_nanos(i))
                .unwrap();
        }

        let col = window.column(0).unwrap();
        assert_eq!(col, vec![4.0, 5.0, 6.0]);
        let stamps = window.timestamps();
        assert_eq!(stamps[0].as_nanos(), 4);
        assert_eq!(stamps[2].as_nanos(), 6);
    }

    #[test]
    fn test_readiness_and_reset() {
        let mut window = SlidingWindow::new(5, 1).unwrap();
        assert!(!window.is_ready(2));

        window.append(&[1.0]).unwrap();
        window.append(&[2.0]).unwrap();
        assert!(window.is_ready(2));
        assert!(!window.is_full());

        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 5);
    }

    #[test]
    fn test_missing_column() {
        let window = SlidingWindow::new(4, 2).unwrap();
        assert!(window.column(2).is_none());
    }
}
