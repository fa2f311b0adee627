// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use whitebox_extent::BoundingBox;

/// Visited extents with a cursor, like a browser history.
///
/// Pushing truncates everything after the cursor. Moving the cursor never
/// changes the list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtentHistory {
    entries: Vec<BoundingBox>,
    cursor: usize,
}

impl ExtentHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `extent` after the cursor and moves the cursor onto it.
    pub fn push(&mut self, extent: BoundingBox) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(extent);
        self.cursor = self.entries.len() - 1;
    }

    /// Extent under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<BoundingBox> {
        self.entries.get(self.cursor).copied()
    }

    /// Moves back one entry. Returns `false` at the start.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 || self.entries.is_empty() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves forward one entry. Returns `false` at the end.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Number of stored extents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
