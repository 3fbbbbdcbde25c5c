//! Ordering engine for the sorting sandbox.
//!
//! A [`Sandbox`] owns a small set of notification [`Record`]s and a
//! [`PrioritySorter`] whose key precedence can be rearranged at runtime by a
//! two-step swap protocol. Every mutation re-sorts the full collection, so
//! [`Sandbox::sorted_records`] always reflects the current weight order.

pub mod record;
pub mod sandbox;
pub mod sorter;

use thiserror::Error;

pub use record::{Priority, Record, RecordStore, Status, RESET_RECORD_COUNT};
pub use sandbox::{Sandbox, SandboxConfig, Snapshot};
pub use sorter::{PrioritySorter, SortKey, SwapOutcome, SwapSelection, WeightOrder};

#[derive(Debug, Error)]
pub enum SortboxError {
    #[error("status {0} is outside 1..=4")]
    StatusOutOfRange(u8),
    #[error("priority {0} is outside 1..=3")]
    PriorityOutOfRange(u8),
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
    #[error("invalid weight order '{input}': {reason}")]
    InvalidWeightOrder { input: String, reason: String },
    #[error("duplicate record id {0}")]
    DuplicateRecordId(u32),
    #[error("record id {id} outside 0..{len}; ids must be dense from 0")]
    RecordIdOutOfRange { id: u32, len: usize },
    #[error("duplicate record time {0}")]
    DuplicateRecordTime(u64),
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SortboxError>;
