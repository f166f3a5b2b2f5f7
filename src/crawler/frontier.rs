//! Breadth-first crawl frontier
//!
//! The frontier pairs a FIFO queue with the visited set. A URL is marked
//! visited at the moment it is queued, never when it is fetched, so a page
//! discovered from several places is scheduled exactly once. Only the
//! dispatcher owns a frontier; workers never see it.

use std::collections::{HashSet, VecDeque};

/// FIFO queue of normalized URLs plus the set of everything ever queued
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `url` unless it was queued before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now at the back of the queue
    /// * `false` - The URL had already been queued; nothing changed
    pub fn push(&mut self, url: String) -> bool {
        if self.visited.contains(&url) {
            return false;
        }
        self.visited.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Takes the oldest queued URL
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Whether `url` has ever been queued
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs waiting for dispatch
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting for dispatch
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever queued
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
