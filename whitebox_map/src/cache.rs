// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Lazily regenerated derived data of a layer.
///
/// A cache starts dirty. Anything that changes what the layer would draw
/// calls [`LayerCache::invalidate`]; the renderer calls
/// [`LayerCache::get_or_update`], which regenerates only when dirty. The
/// generation counter increments on every store, so callers can tell whether
/// the value they saw last frame is still current.
#[derive(Clone, Debug)]
pub struct LayerCache<T> {
    value: Option<T>,
    dirty: bool,
    generation: u64,
}

impl<T> Default for LayerCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LayerCache<T> {
    /// Creates an empty, dirty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: None,
            dirty: true,
            generation: 0,
        }
    }

    /// Returns `true` if the next access regenerates.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the number of values stored so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the value stale. The stale value stays readable through
    /// [`LayerCache::get`] until it is replaced.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Returns the last stored value, current or not.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Stores a fresh value and clears the dirty flag.
    pub fn store(&mut self, value: T) -> &T {
        self.dirty = false;
        self.generation = self.generation.wrapping_add(1);
        self.value.insert(value)
    }

    /// Returns the value, regenerating it first when dirty.
    pub fn get_or_update(&mut self, update: impl FnOnce() -> T) -> &T {
        if self.dirty {
            self.value = None;
        }
        let dirty = &mut self.dirty;
        let generation = &mut self.generation;
        self.value.get_or_insert_with(|| {
            *dirty = false;
            *generation = generation.wrapping_add(1);
            update()
        })
    }
}
