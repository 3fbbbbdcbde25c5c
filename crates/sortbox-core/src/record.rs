use crate::sorter::SortKey;
use crate::{Result, SortboxError};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Number of records a reset reseeds.
pub const RESET_RECORD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Status(u8);

impl Status {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;
    pub const NEW: Status = Status(1);
    pub const ACKNOWLEDGED: Status = Status(2);

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SortboxError::StatusOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Only new records accept the acknowledge action.
    pub fn is_actionable(self) -> bool {
        self == Self::NEW
    }

    fn random(rng: &mut StdRng) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }
}

impl TryFrom<u8> for Status {
    type Error = SortboxError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SortboxError::PriorityOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    fn random(rng: &mut StdRng) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }
}

impl TryFrom<u8> for Priority {
    type Error = SortboxError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One notification. `time` is a creation sequence number, not a clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub status: Status,
    pub priority: Priority,
    pub time: u64,
}

impl Record {
    pub fn new(id: u32, status: u8, priority: u8, time: u64) -> Result<Self> {
        Ok(Self {
            id,
            status: Status::new(status)?,
            priority: Priority::new(priority)?,
            time,
        })
    }

    pub fn key_value(&self, key: SortKey) -> u64 {
        match key {
            SortKey::Status => u64::from(self.status.value()),
            SortKey::Priority => u64::from(self.priority.value()),
            SortKey::Time => self.time,
        }
    }
}

/// Owns the record collection in insertion order. Ordering is the
/// sorter's concern.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    next_time: u64,
    rng: StdRng,
}

impl RecordStore {
    pub fn new(rng: StdRng) -> Self {
        Self {
            records: Vec::new(),
            next_time: 1,
            rng,
        }
    }

    /// Builds a store around existing records. Ids must cover exactly
    /// `0..len` so `append` keeps assigning fresh ones, and times must be
    /// unique. The time counter resumes after the largest time present.
    pub fn from_records(records: Vec<Record>, rng: StdRng) -> Result<Self> {
        let len = records.len();
        let mut seen_ids = HashSet::new();
        let mut seen_times = HashSet::new();
        for record in &records {
            if record.id as usize >= len {
                return Err(SortboxError::RecordIdOutOfRange { id: record.id, len });
            }
            if !seen_ids.insert(record.id) {
                return Err(SortboxError::DuplicateRecordId(record.id));
            }
            if !seen_times.insert(record.time) {
                return Err(SortboxError::DuplicateRecordTime(record.time));
            }
        }
        let next_time = records.iter().map(|r| r.time).max().unwrap_or(0) + 1;
        Ok(Self {
            records,
            next_time,
            rng,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn next_time(&self) -> u64 {
        self.next_time
    }

    pub fn get(&self, id: u32) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn seed(&mut self, count: usize) -> &[Record] {
        let mut records = Vec::with_capacity(count);
        for idx in 0..count {
            records.push(Record {
                id: idx as u32,
                status: Status::random(&mut self.rng),
                priority: Priority::random(&mut self.rng),
                time: idx as u64 + 1,
            });
        }
        self.records = records;
        self.next_time = count as u64 + 1;
        debug!(event = "records_seeded", count, next_time = self.next_time);
        &self.records
    }

    pub fn append(&mut self) -> &[Record] {
        // Ids come from the current length; that stays collision-free only
        // while nothing but a full reset removes records.
        let id = self.records.len() as u32;
        debug_assert!(
            self.get(id).is_none(),
            "record id {id} already present in store"
        );
        let record = Record {
            id,
            status: Status::NEW,
            priority: Priority::random(&mut self.rng),
            time: self.next_time,
        };
        self.next_time += 1;
        debug!(
            event = "record_appended",
            id,
            priority = record.priority.value(),
            time = record.time
        );
        self.records.push(record);
        &self.records
    }

    /// Sets status 2 on the matching record. Missing ids are ignored.
    pub fn acknowledge(&mut self, id: u32) -> &[Record] {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                debug!(event = "record_acknowledged", id, from = record.status.value());
                record.status = Status::ACKNOWLEDGED;
            }
            None => {
                debug!(event = "acknowledge_missing", id);
            }
        }
        &self.records
    }

    pub fn reset(&mut self) -> &[Record] {
        self.seed(RESET_RECORD_COUNT)
    }
}
