use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, Entry};

use self::error::{LaptopAlreadyExists, LaptopNotFound};
use crate::catalog_proto::{Filter, Laptop};
use crate::filter;
use crate::laptop::LaptopId;

pub mod error;

#[derive(Debug)]
struct StoredLaptop {
    seq: u64,
    laptop: Arc<Laptop>,
}

/// An in-memory laptop catalog keyed by [`LaptopId`].
///
/// Every saved laptop remembers when it was inserted, so [`search`](Self::search) returns
/// matches in insertion order regardless of how the map shards its entries.
#[derive(Debug)]
pub struct LaptopStore {
    laptops: DashMap<LaptopId, StoredLaptop, ahash::RandomState>,
    next_seq: AtomicU64,
}

impl LaptopStore {
    pub fn new() -> LaptopStore {
        Self::default()
    }

    /// Store a copy of `laptop` under its id.
    pub fn save(&self, laptop: Laptop) -> Result<LaptopId, LaptopAlreadyExists> {
        let laptop_id = LaptopId::from(laptop.id.as_str());

        match self.laptops.entry(laptop_id.clone()) {
            Entry::Occupied(entry) => Err(LaptopAlreadyExists {
                laptop_id: entry.key().clone(),
            }),

            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(StoredLaptop {
                    seq,
                    laptop: Arc::new(laptop),
                });
                Ok(laptop_id)
            }
        }
    }

    /// Return a copy of the laptop stored under `laptop_id`.
    pub fn find(&self, laptop_id: &LaptopId) -> Result<Laptop, LaptopNotFound> {
        self.laptops
            .get(laptop_id)
            .map(|entry| Laptop::clone(&entry.laptop))
            .ok_or_else(|| LaptopNotFound {
                laptop_id: laptop_id.clone(),
            })
    }

    /// All laptops satisfying `filter`, oldest first.
    pub fn search(&self, filter: &Filter) -> Vec<Laptop> {
        let mut found: Vec<(u64, Arc<Laptop>)> = self
            .laptops
            .iter()
            .filter(|entry| filter::matches(filter, &entry.laptop))
            .map(|entry| (entry.seq, Arc::clone(&entry.laptop)))
            .collect();

        found.sort_unstable_by_key(|(seq, _)| *seq);
        found
            .into_iter()
            .map(|(_, laptop)| Laptop::clone(&laptop))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.laptops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laptops.is_empty()
    }
}

impl Default for LaptopStore {
    fn default() -> Self {
        Self {
            laptops: DashMap::default(),
            next_seq: AtomicU64::new(0),
        }
    }
}
