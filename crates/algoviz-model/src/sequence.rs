//! Linear array of integer values used by the sorting visualizers.

use std::ops::Range;

use rand::Rng;

use crate::error::{MutationError, Result};

/// Default number of bars in a freshly generated sequence.
pub const DEFAULT_LEN: usize = 50;

/// Default half-open range of generated values (bar heights).
pub const DEFAULT_RANGE: Range<i64> = 20..300;

/// Longest sequence that can be generated.
pub const MAX_LEN: usize = 1000;

/// Ordered values with positional identity.
///
/// Length stays fixed while an algorithm runs; only `swap` and `set` change it
/// in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence {
    values: Vec<i64>,
}

impl Sequence {
    /// Wrap existing values.
    pub fn from_values(values: Vec<i64>) -> Self {
        Self { values }
    }

    /// Fill with `len` random integers drawn from `range`.
    ///
    /// An empty range yields a sequence of `range.start` values. Lengths above
    /// [`MAX_LEN`] are rejected.
    pub fn random<R: Rng + ?Sized>(len: usize, range: Range<i64>, rng: &mut R) -> Result<Self> {
        if len > MAX_LEN {
            return Err(MutationError::InvalidSize {
                value: len,
                min: 0,
                max: MAX_LEN,
            });
        }
        let values = if range.is_empty() {
            vec![range.start; len]
        } else {
            (0..len).map(|_| rng.gen_range(range.clone())).collect()
        };
        Ok(Self { values })
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sequence holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, if any.
    pub fn get(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// Borrow the values in order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Exchange two positions.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds; algorithms only swap within
    /// the range they were handed.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
    }

    /// Overwrite one position (user edit).
    pub fn set(&mut self, index: usize, value: i64) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(MutationError::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Overwrite one position from inside an algorithm run.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn put(&mut self, index: usize, value: i64) {
        self.values[index] = value;
    }

    /// Copy of the values in `range`.
    pub fn slice_to_vec(&self, range: Range<usize>) -> Vec<i64> {
        self.values[range].to_vec()
    }

    /// Whether the values are in non-decreasing order.
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }
}
