//! Fixed-size hash index of log objects, keyed by case-insensitive target
//! name.
//!
//! The hasher is SipHash with a key drawn at random once per index, so
//! clients cannot pick channel names that pile into one bucket.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::log::HistoryLogObject;

/// Default bucket count (a prime).
pub const DEFAULT_BUCKETS: usize = 1019;

pub struct HashIndex {
    buckets: Vec<Vec<HistoryLogObject>>,
    hasher: RandomState,
    objects: usize,
}

impl HashIndex {
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
            hasher: RandomState::new(),
            objects: 0,
        }
    }

    fn bucket_of(&self, name: &str) -> usize {
        let mut h = self.hasher.build_hasher();
        for b in name.bytes() {
            h.write_u8(b.to_ascii_lowercase());
        }
        (h.finish() % self.buckets.len() as u64) as usize
    }

    fn position(chain: &[HistoryLogObject], name: &str) -> Option<usize> {
        chain.iter().position(|o| o.name().eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&HistoryLogObject> {
        let chain = &self.buckets[self.bucket_of(name)];
        Self::position(chain, name).map(|i| &chain[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut HistoryLogObject> {
        let b = self.bucket_of(name);
        let chain = &mut self.buckets[b];
        Self::position(chain, name).map(move |i| &mut chain[i])
    }

    /// Find the object for `name`, creating an empty one when absent.
    pub fn get_or_create(&mut self, name: &str) -> &mut HistoryLogObject {
        let b = self.bucket_of(name);
        let chain = &mut self.buckets[b];
        let idx = match Self::position(chain, name) {
            Some(i) => i,
            None => {
                tracing::debug!("📜 History object created: {}", name);
                chain.push(HistoryLogObject::new(name));
                self.objects += 1;
                chain.len() - 1
            }
        };
        &mut chain[idx]
    }

    /// Unlink and return the object for `name`.
    pub fn remove(&mut self, name: &str) -> Option<HistoryLogObject> {
        let b = self.bucket_of(name);
        let chain = &mut self.buckets[b];
        let idx = Self::position(chain, name)?;
        self.objects -= 1;
        Some(chain.swap_remove(idx))
    }

    /// Number of objects held.
    pub fn len(&self) -> usize {
        self.objects
    }

    pub fn is_empty(&self) -> bool {
        self.objects == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryLogObject> {
        self.buckets.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut HistoryLogObject> {
        self.buckets.iter_mut().flatten()
    }
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS)
    }
}
