use crate::record::{Record, RecordStore, RESET_RECORD_COUNT};
use crate::sorter::{PrioritySorter, SortKey, SwapOutcome, SwapSelection, WeightOrder};
use crate::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub initial_records: usize,
    /// Fixed RNG seed; entropy when `None`.
    pub rng_seed: Option<u64>,
    pub weight_order: WeightOrder,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            initial_records: RESET_RECORD_COUNT,
            rng_seed: None,
            weight_order: WeightOrder::default(),
        }
    }
}

impl SandboxConfig {
    fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Point-in-time view of a sandbox, records in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub weight_order: WeightOrder,
    pub armed: Option<SortKey>,
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Single owner of the record store, weight order and swap selection.
/// Every intent that changes either side re-sorts the whole collection.
#[derive(Debug)]
pub struct Sandbox {
    store: RecordStore,
    sorter: PrioritySorter,
    sorted: Vec<Record>,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Self {
        let mut store = RecordStore::new(config.rng());
        store.seed(config.initial_records);
        let mut sandbox = Self {
            store,
            sorter: PrioritySorter::new(config.weight_order),
            sorted: Vec::new(),
        };
        sandbox.resort();
        info!(
            event = "sandbox_start",
            records = sandbox.sorted.len(),
            order = %sandbox.weight_order()
        );
        sandbox
    }

    pub fn with_records(records: Vec<Record>, config: SandboxConfig) -> Result<Self> {
        let store = RecordStore::from_records(records, config.rng())?;
        let mut sandbox = Self {
            store,
            sorter: PrioritySorter::new(config.weight_order),
            sorted: Vec::new(),
        };
        sandbox.resort();
        Ok(sandbox)
    }

    pub fn sorted_records(&self) -> &[Record] {
        &self.sorted
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Record> {
        self.store.get(id)
    }

    pub fn weight_order(&self) -> WeightOrder {
        self.sorter.order()
    }

    pub fn armed_key(&self) -> Option<SortKey> {
        self.sorter.armed_key()
    }

    pub fn selection(&self) -> SwapSelection {
        self.sorter.selection()
    }

    /// Appends a new record and returns its id.
    pub fn add_record(&mut self) -> u32 {
        let id = self
            .store
            .append()
            .last()
            .map(|record| record.id)
            .unwrap_or_default();
        self.resort();
        info!(event = "record_added", id, records = self.sorted.len());
        id
    }

    /// Returns whether a record with `id` exists. A missing id changes nothing.
    pub fn acknowledge_record(&mut self, id: u32) -> bool {
        let found = self.store.get(id).is_some();
        self.store.acknowledge(id);
        self.resort();
        info!(event = "record_acknowledged", id, found);
        found
    }

    pub fn arm_or_swap_weight(&mut self, key: SortKey) -> SwapOutcome {
        let outcome = self.sorter.select_for_swap(key);
        if outcome.completed() {
            self.resort();
            info!(event = "weight_order_changed", order = %self.weight_order());
        }
        outcome
    }

    /// Reseeds the records only. The weight order and an armed selection
    /// carry over unchanged.
    pub fn reset_all(&mut self) {
        self.store.reset();
        self.resort();
        info!(
            event = "sandbox_reset",
            records = self.sorted.len(),
            armed = ?self.armed_key()
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            weight_order: self.weight_order(),
            armed: self.armed_key(),
            records: self.sorted.clone(),
        }
    }

    fn resort(&mut self) {
        let mut sorted = self.store.records().to_vec();
        self.sorter.sort(&mut sorted);
        self.sorted = sorted;
    }
}
