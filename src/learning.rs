//! Learning from manual seat corrections.
//!
//! Every correction an operator makes is kept as a [`MoveRecord`]. The record
//! tells which neighbor exposure the move reduced, and those reductions nudge
//! the [`WeightVector`] the engine uses to rank seats. The vector is a plain
//! value: [`WeightVector::apply`] returns the next version instead of
//! mutating shared state.

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LearningConfig;
use crate::constraint::Traits;
use crate::model::entity::{Id, Occupant};
use crate::persist::{SnapshotStore, StoreError, WriteQueue};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("snapshot storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("snapshot (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    Schema { found: u32, expected: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preference {
    GenderBalance,
    CohortMix,
    NeighborIsolation,
    RiskAvoidance,
}

const PREFERENCES: [Preference; 4] = [
    Preference::GenderBalance,
    Preference::CohortMix,
    Preference::NeighborIsolation,
    Preference::RiskAvoidance,
];

/// Always sums to 1: deserialized vectors are normalized on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWeights", rename_all = "camelCase")]
pub struct WeightVector {
    pub version: u64,
    pub gender_balance: f64,
    pub cohort_mix: f64,
    pub neighbor_isolation: f64,
    pub risk_avoidance: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        WeightVector {
            version: 0,
            gender_balance: 0.25,
            cohort_mix: 0.25,
            neighbor_isolation: 0.25,
            risk_avoidance: 0.25,
        }
    }
}

/// Weights as written by hand or by an older build: possibly partial,
/// negative or not summing to 1.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawWeights {
    version: u64,
    gender_balance: f64,
    cohort_mix: f64,
    neighbor_isolation: f64,
    risk_avoidance: f64,
}

impl Default for RawWeights {
    fn default() -> Self {
        let weights = WeightVector::default();
        RawWeights {
            version: weights.version,
            gender_balance: weights.gender_balance,
            cohort_mix: weights.cohort_mix,
            neighbor_isolation: weights.neighbor_isolation,
            risk_avoidance: weights.risk_avoidance,
        }
    }
}

impl From<RawWeights> for WeightVector {
    fn from(raw: RawWeights) -> Self {
        let values = [raw.gender_balance, raw.cohort_mix, raw.neighbor_isolation, raw.risk_avoidance];
        let values = normalize(values.map(|value| if value.is_finite() { value.max(0.0) } else { 0.0 }));
        WeightVector::default().with_values(values, raw.version)
    }
}

impl WeightVector {
    pub fn values(&self) -> [f64; 4] {
        [self.gender_balance, self.cohort_mix, self.neighbor_isolation, self.risk_avoidance]
    }

    fn with_values(&self, values: [f64; 4], version: u64) -> WeightVector {
        WeightVector {
            version,
            gender_balance: values[0],
            cohort_mix: values[1],
            neighbor_isolation: values[2],
            risk_avoidance: values[3],
        }
    }

    pub fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Next version of the vector after one correction: each weight grows by
    /// `learning_rate * signal`, is clamped to the configured bounds and the
    /// whole vector is scaled back to sum 1.
    pub fn apply(&self, signals: &Signals, config: &LearningConfig) -> WeightVector {
        if signals.is_empty() {
            return self.clone();
        }
        let mut values = self.values();
        for (value, signal) in values.iter_mut().zip(signals.values()) {
            *value = (*value + config.learning_rate * signal).clamp(config.min_weight, config.max_weight);
        }
        self.with_values(normalize(values), self.version + 1)
    }

    /// Preferences from strongest to weakest.
    pub fn ranked(&self) -> Vec<(Preference, f64)> {
        let mut ranked: Vec<(Preference, f64)> = PREFERENCES.into_iter().zip(self.values()).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

fn normalize(values: [f64; 4]) -> [f64; 4] {
    let total: f64 = values.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return [0.25; 4];
    }
    values.map(|value| value / total)
}

/// How much one correction reduced each kind of neighbor exposure, each in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    pub gender_balance: f64,
    pub cohort_mix: f64,
    pub neighbor_isolation: f64,
    pub risk_avoidance: f64,
}

impl Signals {
    pub fn values(&self) -> [f64; 4] {
        [self.gender_balance, self.cohort_mix, self.neighbor_isolation, self.risk_avoidance]
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|value| *value <= 0.0)
    }
}

/// A seat as the operator saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskRef {
    pub room_id: Id,
    pub room_name: String,
    pub seat_id: Id,
    pub desk_number: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveContext {
    pub neighbors_before: Vec<Occupant>,
    pub neighbors_after: Vec<Occupant>,
}

/// One manual correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// `None` when the occupant was unplaced before the move.
    pub from: Option<DeskRef>,
    pub to: DeskRef,
    pub occupant: Occupant,
    pub context: MoveContext,
    pub at: DateTime<Utc>,
}

impl MoveRecord {
    pub fn signals(&self) -> Signals {
        let before = exposure(&self.occupant, &self.context.neighbors_before);
        let after = exposure(&self.occupant, &self.context.neighbors_after);
        let reduction = |i: usize| {
            if before[i] > 0.0 {
                ((before[i] - after[i]) / before[i]).max(0.0)
            } else {
                0.0
            }
        };
        Signals {
            gender_balance: reduction(0),
            cohort_mix: reduction(1),
            neighbor_isolation: reduction(2),
            risk_avoidance: reduction(3),
        }
    }
}

/// Same-gender, same-level, total and risky neighbor counts.
fn exposure(occupant: &Occupant, neighbors: &[Occupant]) -> [f64; 4] {
    let me = Traits::of(occupant);
    let others: Vec<Traits> = neighbors.iter().map(Traits::of).collect();
    let gender = others.iter().filter(|other| me.same_gender(other)).count();
    let cohort = others.iter().filter(|other| me.same_level(other)).count();
    let risky = if me.special_case {
        others.len()
    } else {
        others.iter().filter(|other| other.special_case).count()
    };
    [gender as f64, cohort as f64, others.len() as f64, risky as f64]
}

/// Totals that survive history resets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Counters {
    pub total_moves: u64,
    pub gender_balance: u64,
    pub cohort_mix: u64,
    pub neighbor_isolation: u64,
    pub risk_avoidance: u64,
}

impl Counters {
    fn count(&mut self, signals: &Signals) {
        self.total_moves += 1;
        self.gender_balance += (signals.gender_balance > 0.0) as u64;
        self.cohort_mix += (signals.cohort_mix > 0.0) as u64;
        self.neighbor_isolation += (signals.neighbor_isolation > 0.0) as u64;
        self.risk_avoidance += (signals.risk_avoidance > 0.0) as u64;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSnapshot {
    pub schema_version: u32,
    pub weights: WeightVector,
    pub counters: Counters,
    #[serde(default)]
    pub history: Vec<MoveRecord>,
}

/// Which pruning step a successful write needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneStage {
    Untouched,
    Capped,
    Aggressive,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Written(PruneStage),
    /// Storage stayed full even without history; nothing was written.
    Dropped,
}

pub struct LearningLoop<S> {
    config: LearningConfig,
    store: S,
    weights: WeightVector,
    counters: Counters,
    history: VecDeque<MoveRecord>,
    queue: WriteQueue,
}

impl<S: SnapshotStore> LearningLoop<S> {
    pub fn new(store: S, config: LearningConfig) -> LearningLoop<S> {
        let queue = WriteQueue::new(config.write_delay());
        LearningLoop {
            config,
            store,
            weights: WeightVector::default(),
            counters: Counters::default(),
            history: VecDeque::new(),
            queue,
        }
    }

    /// Starts from the stored snapshot, or from defaults when none exists.
    pub fn restore(store: S, config: LearningConfig) -> Result<LearningLoop<S>, LearningError> {
        let payload = store.load()?;
        let mut learning = LearningLoop::new(store, config);
        if let Some(payload) = payload {
            let snapshot: LearningSnapshot = serde_json::from_str(&payload)?;
            if snapshot.schema_version != SCHEMA_VERSION {
                return Err(LearningError::Schema { found: snapshot.schema_version, expected: SCHEMA_VERSION });
            }
            learning.weights = snapshot.weights;
            learning.counters = snapshot.counters;
            learning.history = snapshot.history.into();
            learning.retain_latest(learning.config.max_history);
            info!(
                version = learning.weights.version,
                history = learning.history.len(),
                "restored learning snapshot"
            );
        }
        Ok(learning)
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn history(&self) -> impl Iterator<Item = &MoveRecord> {
        self.history.iter()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_pending_write(&self) -> bool {
        self.queue.is_pending()
    }

    /// Learns from one correction and schedules a write.
    pub fn record(&mut self, record: MoveRecord, now: Instant) -> &WeightVector {
        let signals = record.signals();
        self.weights = self.weights.apply(&signals, &self.config);
        self.counters.count(&signals);
        self.history.push_back(record);
        self.retain_latest(self.config.max_history);
        self.queue.mark_dirty(now);
        debug!(version = self.weights.version, ?signals, "recorded manual move");
        &self.weights
    }

    /// Writes when the debounce deadline has passed. A failed write stays
    /// pending, so the next tick retries it.
    pub fn tick(&mut self, now: Instant) -> Result<Option<FlushOutcome>, LearningError> {
        if self.queue.is_due(now) {
            self.flush().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Writes immediately. Storage quota errors are absorbed by pruning
    /// history: first to `history_cap`, then to `aggressive_cap`, then to
    /// nothing. Counters and weights always survive. Pruning only sticks once
    /// a write succeeds; any other storage error leaves history and the
    /// pending write untouched.
    pub fn flush(&mut self) -> Result<FlushOutcome, LearningError> {
        let stages = [
            (PruneStage::Untouched, self.history.len()),
            (PruneStage::Capped, self.config.history_cap),
            (PruneStage::Aggressive, self.config.aggressive_cap),
            (PruneStage::Reset, 0),
        ];
        for (stage, keep) in stages {
            let keep = keep.min(self.history.len());
            let payload = serde_json::to_string(&self.snapshot_keeping(keep))?;
            match self.store.save(&payload) {
                Ok(()) => {
                    self.retain_latest(keep);
                    self.queue.clear();
                    debug!(?stage, bytes = payload.len(), "learning snapshot written");
                    return Ok(FlushOutcome::Written(stage));
                }
                Err(StoreError::QuotaExceeded { needed, limit }) => {
                    warn!(?stage, needed, limit, history = keep, "snapshot over quota, pruning history");
                }
                Err(err) => {
                    warn!(?stage, %err, "snapshot write failed, will retry");
                    return Err(err.into());
                }
            }
        }
        self.queue.clear();
        warn!("snapshot over quota even without history, write dropped");
        Ok(FlushOutcome::Dropped)
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        self.snapshot_keeping(self.history.len())
    }

    /// Snapshot with only the latest `keep` corrections.
    fn snapshot_keeping(&self, keep: usize) -> LearningSnapshot {
        let skip = self.history.len().saturating_sub(keep);
        LearningSnapshot {
            schema_version: SCHEMA_VERSION,
            weights: self.weights.clone(),
            counters: self.counters.clone(),
            history: self.history.iter().skip(skip).cloned().collect(),
        }
    }

    fn retain_latest(&mut self, keep: usize) {
        while self.history.len() > keep {
            self.history.pop_front();
        }
    }
}
