//! Array-backed binary heap.
//!
//! The array is read as a complete binary tree: the parent of `i` is
//! `(i - 1) / 2` and its children are `2i + 1` and `2i + 2`. Sifting lives in
//! the algorithm library so every swap can be observed; this type only
//! provides storage, index arithmetic and the order check.


/// Whether parents are ≤ or ≥ their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Polarity {
    Min,
    #[default]
    Max,
}

impl Polarity {
    /// Whether `a` belongs above `b` under this polarity.
    ///
    /// Strict: equal values never outrank each other.
    pub fn outranks(self, a: i64, b: i64) -> bool {
        match self {
            Polarity::Min => a < b,
            Polarity::Max => a > b,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Min => write!(f, "min-heap"),
            Polarity::Max => write!(f, "max-heap"),
        }
    }
}

/// Parent index of `i` (`i > 0`).
pub const fn parent(i: usize) -> usize {
    (i - 1) / 2
}

/// Left child index of `i`.
pub const fn left_child(i: usize) -> usize {
    2 * i + 1
}

/// Right child index of `i`.
pub const fn right_child(i: usize) -> usize {
    2 * i + 2
}

/// Heap storage with a fixed polarity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heap {
    items: Vec<i64>,
    polarity: Polarity,
}

impl Heap {
    /// Create an empty heap.
    pub fn new(polarity: Polarity) -> Self {
        Self {
            items: Vec::new(),
            polarity,
        }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn items(&self) -> &[i64] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Root value (min or max per polarity).
    pub fn peek(&self) -> Option<i64> {
        self.items.first().copied()
    }

    pub fn get(&self, i: usize) -> Option<i64> {
        self.items.get(i).copied()
    }

    /// Append to the end without restoring order; callers sift up next.
    pub fn append(&mut self, value: i64) -> usize {
        self.items.push(value);
        self.items.len() - 1
    }

    /// Move the last element to the root and return the old root.
    /// Callers sift down next.
    pub fn take_root(&mut self) -> Option<i64> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        self.items.pop()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.items.swap(i, j);
    }

    /// Whether the item at `i` outranks the item at `j`.
    pub fn outranks(&self, i: usize, j: usize) -> bool {
        self.polarity.outranks(self.items[i], self.items[j])
    }

    /// Child of `i` that should move up during sift-down, if any.
    /// Ties favor the left child.
    pub fn preferred_child(&self, i: usize) -> Option<usize> {
        let (l, r) = (left_child(i), right_child(i));
        if l >= self.items.len() {
            return None;
        }
        if r < self.items.len() && self.outranks(r, l) {
            Some(r)
        } else {
            Some(l)
        }
    }

    /// Whether every parent/child pair respects the polarity.
    pub fn check_invariant(&self) -> bool {
        (1..self.items.len()).all(|i| !self.outranks(i, parent(i)))
    }

    /// Change polarity and rebuild order by repeated sift-up.
    pub fn set_polarity(&mut self, polarity: Polarity) {
        if polarity == self.polarity {
            return;
        }
        self.polarity = polarity;
        let items = std::mem::take(&mut self.items);
        for value in items {
            self.push(value);
        }
    }

    /// Insert and restore order without observation (user edit, seeding).
    pub fn push(&mut self, value: i64) {
        let mut i = self.append(value);
        while i > 0 && self.outranks(i, parent(i)) {
            self.swap(i, parent(i));
            i = parent(i);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
