//! Image cache: load state per identifier, decoupled from the bodies.
//!
//! The cache is a pure state machine; the actual network/decode work happens
//! at the platform layer, which drains `take_pending_loads` and reports back
//! through `resolve_loaded` / `resolve_failed`. Completions carry the cache
//! generation they were started under, so loads finishing after a teardown
//! are discarded instead of resurrecting stale entries.

use std::collections::HashMap;

/// Load state of a single image asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetState {
    /// Load started, pixels not available yet
    Requested,
    /// Decoded and render-ready, with natural pixel dimensions
    Loaded { width: u32, height: u32 },
    /// Load failed permanently; never retried
    Failed,
}

pub struct ImageCache {
    entries: HashMap<String, AssetState>,
    pending: Vec<String>,
    generation: u64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            pending: Vec::new(),
            generation: 0,
        }
    }

    /// Current generation; completions must echo it back.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking state lookup.
    pub fn get(&self, url: &str) -> Option<AssetState> {
        self.entries.get(url).copied()
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        matches!(self.get(url), Some(AssetState::Loaded { .. }))
    }

    /// Mark `url` as Requested unless it is already tracked. Queues a load
    /// request for the platform layer on first sight.
    pub fn ensure_loading(&mut self, url: &str) {
        if self.entries.contains_key(url) {
            return;
        }
        self.entries.insert(url.to_string(), AssetState::Requested);
        self.pending.push(url.to_string());
    }

    /// URLs whose platform load should start now.
    pub fn take_pending_loads(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    /// Completion callback for a successful load. Returns true when the
    /// entry actually transitioned (fresh generation, still Requested).
    pub fn resolve_loaded(&mut self, generation: u64, url: &str, width: u32, height: u32) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.entries.get_mut(url) {
            Some(state @ AssetState::Requested) => {
                *state = AssetState::Loaded { width, height };
                true
            }
            _ => false,
        }
    }

    /// Completion callback for a failed load. Loaded entries are never
    /// demoted. Returns true when the entry transitioned to Failed.
    pub fn resolve_failed(&mut self, generation: u64, url: &str) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.entries.get_mut(url) {
            Some(state @ AssetState::Requested) => {
                *state = AssetState::Failed;
                true
            }
            _ => false,
        }
    }

    /// Drop every entry and invalidate in-flight completions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_loading_queues_each_url_once() {
        let mut cache = ImageCache::new();
        cache.ensure_loading("a.png");
        cache.ensure_loading("a.png");
        cache.ensure_loading("b.png");

        assert_eq!(cache.take_pending_loads(), vec!["a.png", "b.png"]);
        assert!(cache.take_pending_loads().is_empty());
        assert_eq!(cache.get("a.png"), Some(AssetState::Requested));
    }

    #[test]
    fn loaded_state_is_terminal() {
        let mut cache = ImageCache::new();
        cache.ensure_loading("a.png");
        let generation = cache.generation();

        assert!(cache.resolve_loaded(generation, "a.png", 320, 240));
        assert_eq!(cache.get("a.png"), Some(AssetState::Loaded { width: 320, height: 240 }));

        // A late error report must not demote it.
        assert!(!cache.resolve_failed(generation, "a.png"));
        assert!(cache.is_loaded("a.png"));
    }

    #[test]
    fn failed_state_is_terminal() {
        let mut cache = ImageCache::new();
        cache.ensure_loading("a.png");
        let generation = cache.generation();

        assert!(cache.resolve_failed(generation, "a.png"));
        assert!(!cache.resolve_loaded(generation, "a.png", 1, 1));
        assert_eq!(cache.get("a.png"), Some(AssetState::Failed));
    }

    #[test]
    fn stale_generation_completions_are_discarded() {
        let mut cache = ImageCache::new();
        cache.ensure_loading("a.png");
        let old_generation = cache.generation();

        cache.clear();
        assert!(cache.is_empty());

        // The in-flight load from before the teardown lands now.
        assert!(!cache.resolve_loaded(old_generation, "a.png", 64, 64));
        assert!(cache.get("a.png").is_none());
    }

    #[test]
    fn completion_for_unknown_url_is_ignored() {
        let mut cache = ImageCache::new();
        let generation = cache.generation();
        assert!(!cache.resolve_loaded(generation, "ghost.png", 8, 8));
        assert!(cache.is_empty());
    }
}
