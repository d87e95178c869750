use super::SourceLocation;
use std::collections::HashMap;
use std::sync::Arc;

/// Memoised datasets keyed by where they were loaded from.
///
/// The cache lives as long as its owner; nothing is evicted implicitly.
#[derive(Debug)]
pub struct SourceCache<T> {
    entries: HashMap<SourceLocation, Arc<T>>,
}

impl<T> Default for SourceCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> SourceCache<T> {
    pub fn get(&self, location: &SourceLocation) -> Option<Arc<T>> {
        self.entries.get(location).cloned()
    }

    pub fn insert(&mut self, location: SourceLocation, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(location, Arc::clone(&value));
        value
    }

    pub fn invalidate(&mut self, location: &SourceLocation) -> bool {
        self.entries.remove(location).is_some()
    }

    pub fn clear(&mut self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn locations(&self) -> impl Iterator<Item = &SourceLocation> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_the_same_allocation() {
        let mut cache = SourceCache::default();
        let location = SourceLocation::parse("https://example.test/roster.csv");
        let stored = cache.insert(location.clone(), vec![1, 2, 3]);

        let hit = cache.get(&location).expect("cached");
        assert!(Arc::ptr_eq(&stored, &hit));
    }

    #[test]
    fn invalidation_is_per_location() {
        let mut cache = SourceCache::default();
        let roster = SourceLocation::parse("roster.csv");
        let departures = SourceLocation::parse("departures.csv");
        cache.insert(roster.clone(), "r");
        cache.insert(departures.clone(), "d");

        assert!(cache.invalidate(&roster));
        assert!(!cache.invalidate(&roster));
        assert!(cache.get(&roster).is_none());
        assert!(cache.get(&departures).is_some());
        assert_eq!(cache.clear(), 1);
        assert!(cache.is_empty());
    }
}
