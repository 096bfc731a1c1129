//! Ordered property bags.
//!
//! `PropertyBag` backs the header, query, config, and body-field collections
//! of a pending request. Iteration follows insertion order; merge semantics
//! are last-writer-wins with a one-level deep merge for JSON object values.
//! Header bags normalize keys to lowercase so merges are case-insensitive.

use indexmap::IndexMap;

/// Value behavior on key collision during a merge.
///
/// Scalars are overwritten; `serde_json::Value` objects merge key-by-key one
/// level deep (the incoming side wins per key).
pub trait BagValue: Clone {
    fn merge_with(_existing: &Self, incoming: &Self) -> Self {
        incoming.clone()
    }
}

impl BagValue for String {}

impl BagValue for serde_json::Value {
    fn merge_with(existing: &Self, incoming: &Self) -> Self {
        match (existing, incoming) {
            (serde_json::Value::Object(old), serde_json::Value::Object(new)) => {
                let mut merged = old.clone();
                for (k, v) in new {
                    merged.insert(k.clone(), v.clone());
                }
                serde_json::Value::Object(merged)
            }
            _ => incoming.clone(),
        }
    }
}

/// Insertion-ordered string-keyed container with merge semantics.
#[derive(Debug, Clone)]
pub struct PropertyBag<V: BagValue> {
    entries: IndexMap<String, V>,
    normalize_keys: bool,
}

impl<V: BagValue> PropertyBag<V> {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            normalize_keys: false,
        }
    }

    /// Create an empty bag that lowercases keys on insert (headers).
    pub fn headers() -> Self {
        Self {
            entries: IndexMap::new(),
            normalize_keys: true,
        }
    }

    fn normalize(&self, key: &str) -> String {
        if self.normalize_keys {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        }
    }

    /// Set a key, overwriting any existing value.
    pub fn set(&mut self, key: impl AsRef<str>, value: V) {
        let key = self.normalize(key.as_ref());
        self.entries.insert(key, value);
    }

    /// Look up a key (case-insensitively for header bags).
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(&self.normalize(key))
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(&self.normalize(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&self.normalize(key))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot of all entries in insertion order.
    pub fn all(&self) -> Vec<(String, V)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Merge sources left to right; `None` sources are skipped. Later sources
    /// win on key collision, with `BagValue::merge_with` deciding how the
    /// colliding values combine.
    pub fn merge<'a, I>(&mut self, sources: I)
    where
        V: 'a,
        I: IntoIterator<Item = Option<&'a PropertyBag<V>>>,
    {
        for source in sources.into_iter().flatten() {
            for (key, incoming) in source.entries.iter() {
                let key = self.normalize(key);
                let merged = match self.entries.get(&key) {
                    Some(existing) => V::merge_with(existing, incoming),
                    None => incoming.clone(),
                };
                self.entries.insert(key, merged);
            }
        }
    }
}

impl<V: BagValue> Default for PropertyBag<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: BagValue> FromIterator<(String, V)> for PropertyBag<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.set(k, v);
        }
        bag
    }
}
