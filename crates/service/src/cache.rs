use std::collections::HashMap;

/// Default positive-cache TTL for resolved names (§4.8). There is deliberately no negative cache:
/// a failed lookup is retried on the next request rather than remembered.
pub const DEFAULT_POSITIVE_TTL_SECS: u64 = 5 * 60;

struct Entry<V> {
    value: V,
    expires_at: u64,
}

/// Positive-only memoization of ONS/service lookups, keyed by name.
pub struct NameCache<V> {
    ttl_secs: u64,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> NameCache<V> {
    pub fn new() -> Self {
        Self { ttl_secs: DEFAULT_POSITIVE_TTL_SECS, entries: HashMap::new() }
    }

    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self { ttl_secs, entries: HashMap::new() }
    }

    pub fn insert(&mut self, name: String, value: V, now: u64) {
        self.entries.insert(name, Entry { value, expires_at: now + self.ttl_secs });
    }

    /// Look up `name`, evicting it first if it has expired. Only ever returns successful
    /// lookups; callers re-query on a miss regardless of whether it's a fresh name or an
    /// expired one.
    pub fn get(&mut self, name: &str, now: u64) -> Option<V> {
        match self.entries.get(name) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(name);
                None
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<V: Clone> Default for NameCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
