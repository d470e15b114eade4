//! Offset/limit windows for list results.

use serde::{Deserialize, Serialize};

/// A window over an already computed, ordered list.
///
/// `limit = None` means "everything from `offset` on".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Maximum number of items to return.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: usize,
}

impl PageWindow {
    /// Creates a window with both bounds set.
    #[must_use]
    pub const fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Slices `items` to this window without reordering them.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}
