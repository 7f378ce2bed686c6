//! Bounded Feeds
//!
//! Most-recent-first sequences with a fixed capacity. Pushing past capacity
//! drops the oldest entry.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedFeed<T, const N: usize> {
    entries: VecDeque<T>,
}

impl<T, const N: usize> Default for BoundedFeed<T, N> {
    fn default() -> Self {
        Self { entries: VecDeque::with_capacity(N) }
    }
}

impl<T, const N: usize> BoundedFeed<T, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert as newest, evicting the oldest beyond capacity
    pub fn push_front(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(N);
    }

    /// Replace the whole feed; `entries` is taken as newest first
    pub fn replace(&mut self, entries: impl IntoIterator<Item = T>) {
        self.entries = entries.into_iter().take(N).collect();
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone, const N: usize> BoundedFeed<T, N> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
