use crate::record::Record;
use crate::{Result, SortboxError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Status,
    Priority,
    Time,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Status, SortKey::Priority, SortKey::Time];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Status => "status",
            SortKey::Priority => "priority",
            SortKey::Time => "time",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SortboxError;

    fn from_str(input: &str) -> Result<Self> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "status" => Ok(SortKey::Status),
            "priority" => Ok(SortKey::Priority),
            "time" => Ok(SortKey::Time),
            _ => Err(SortboxError::UnknownSortKey(input.trim().to_string())),
        }
    }
}

/// Comparator precedence, most significant key first. Always a permutation
/// of [`SortKey::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SortKey>", into = "Vec<SortKey>")]
pub struct WeightOrder([SortKey; 3]);

impl Default for WeightOrder {
    fn default() -> Self {
        Self([SortKey::Status, SortKey::Priority, SortKey::Time])
    }
}

impl WeightOrder {
    pub fn new(keys: [SortKey; 3]) -> Result<Self> {
        for key in SortKey::ALL {
            if !keys.contains(&key) {
                return Err(SortboxError::InvalidWeightOrder {
                    input: join_keys(&keys, ","),
                    reason: format!("missing key '{key}'"),
                });
            }
        }
        Ok(Self(keys))
    }

    pub fn keys(&self) -> [SortKey; 3] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = SortKey> + '_ {
        self.0.iter().copied()
    }

    /// Slot index of `key`, 0 being most significant.
    pub fn position(&self, key: SortKey) -> usize {
        self.0
            .iter()
            .position(|candidate| *candidate == key)
            .unwrap_or_else(|| unreachable!("weight order always holds every key"))
    }

    pub fn swap(&mut self, a: SortKey, b: SortKey) {
        let first = self.position(a);
        let second = self.position(b);
        self.0.swap(first, second);
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.iter().fold(Ordering::Equal, |ordering, key| {
            ordering.then_with(|| a.key_value(key).cmp(&b.key_value(key)))
        })
    }

    /// Human-readable precedence, e.g. `status > priority > time`.
    pub fn label(&self) -> String {
        join_keys(&self.0, " > ")
    }
}

impl fmt::Display for WeightOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_keys(&self.0, ","))
    }
}

impl FromStr for WeightOrder {
    type Err = SortboxError;

    fn from_str(input: &str) -> Result<Self> {
        let keys = input
            .split(',')
            .map(SortKey::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::try_from(keys).map_err(|err| match err {
            SortboxError::InvalidWeightOrder { reason, .. } => SortboxError::InvalidWeightOrder {
                input: input.to_string(),
                reason,
            },
            other => other,
        })
    }
}

impl TryFrom<Vec<SortKey>> for WeightOrder {
    type Error = SortboxError;

    fn try_from(keys: Vec<SortKey>) -> Result<Self> {
        let keys: [SortKey; 3] = keys.try_into().map_err(|keys: Vec<SortKey>| {
            SortboxError::InvalidWeightOrder {
                input: join_keys(&keys, ","),
                reason: format!("expected 3 keys, got {}", keys.len()),
            }
        })?;
        Self::new(keys)
    }
}

impl From<WeightOrder> for Vec<SortKey> {
    fn from(order: WeightOrder) -> Self {
        order.0.to_vec()
    }
}

fn join_keys(keys: &[SortKey], separator: &str) -> String {
    keys.iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Two-step swap protocol: the first selection arms a key, the second
/// exchanges it with the armed one and disarms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapSelection {
    #[default]
    Idle,
    Armed(SortKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Armed(SortKey),
    Swapped { first: SortKey, second: SortKey },
    /// Same key selected twice; order untouched, selection cleared.
    Unchanged(SortKey),
}

impl SwapOutcome {
    pub fn completed(self) -> bool {
        !matches!(self, SwapOutcome::Armed(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrioritySorter {
    order: WeightOrder,
    selection: SwapSelection,
}

impl PrioritySorter {
    pub fn new(order: WeightOrder) -> Self {
        Self {
            order,
            selection: SwapSelection::Idle,
        }
    }

    pub fn order(&self) -> WeightOrder {
        self.order
    }

    pub fn selection(&self) -> SwapSelection {
        self.selection
    }

    pub fn armed_key(&self) -> Option<SortKey> {
        match self.selection {
            SwapSelection::Idle => None,
            SwapSelection::Armed(key) => Some(key),
        }
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.order.compare(a, b)
    }

    /// Stable sort by the current weight order.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }

    pub fn select_for_swap(&mut self, key: SortKey) -> SwapOutcome {
        let outcome = match std::mem::take(&mut self.selection) {
            SwapSelection::Idle => {
                self.selection = SwapSelection::Armed(key);
                SwapOutcome::Armed(key)
            }
            SwapSelection::Armed(prev) if prev == key => SwapOutcome::Unchanged(key),
            SwapSelection::Armed(prev) => {
                self.order.swap(prev, key);
                SwapOutcome::Swapped {
                    first: prev,
                    second: key,
                }
            }
        };
        debug!(event = "weight_selection", outcome = ?outcome, order = %self.order);
        outcome
    }
}
