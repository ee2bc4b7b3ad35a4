//! store.rs — In-memory Indicator Store.
//!
//! Maps indicator id → series, and separately remembers indicators whose data
//! failed to load so consumers can tell "no data" apart from "load failed".

use std::collections::BTreeMap;

use crate::entities::IndicatorRecord;
use crate::ids::IndicatorId;

/// Outcome of loading one indicator's series.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorLoad {
    Loaded(Vec<IndicatorRecord>),
    Empty,
    Failed(String),
}

/// Result of a store lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesLookup<'a> {
    Found(&'a [IndicatorRecord]),
    Absent,
    Failed(&'a str),
}

impl<'a> SeriesLookup<'a> {
    /// Records, treating absence and failure alike as an empty series.
    pub fn records(self) -> &'a [IndicatorRecord] {
        match self {
            SeriesLookup::Found(rs) => rs,
            SeriesLookup::Absent | SeriesLookup::Failed(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorStore {
    series: BTreeMap<IndicatorId, Vec<IndicatorRecord>>,
    failures: BTreeMap<IndicatorId, String>,
}

impl IndicatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same id replace earlier ones (and clear a recorded failure).
    pub fn insert(&mut self, id: IndicatorId, records: Vec<IndicatorRecord>) {
        self.failures.remove(&id);
        self.series.insert(id, records);
    }

    pub fn record_failure(&mut self, id: IndicatorId, reason: impl Into<String>) {
        if !self.series.contains_key(&id) {
            self.failures.insert(id, reason.into());
        }
    }

    /// Fold one load outcome into the store.
    pub fn absorb(&mut self, id: IndicatorId, load: IndicatorLoad) {
        match load {
            IndicatorLoad::Loaded(records) => self.insert(id, records),
            IndicatorLoad::Empty => self.insert(id, Vec::new()),
            IndicatorLoad::Failed(reason) => self.record_failure(id, reason),
        }
    }

    pub fn lookup(&self, id: &IndicatorId) -> SeriesLookup<'_> {
        if let Some(rs) = self.series.get(id) {
            return SeriesLookup::Found(rs);
        }
        match self.failures.get(id) {
            Some(reason) => SeriesLookup::Failed(reason),
            None => SeriesLookup::Absent,
        }
    }

    pub fn records(&self, id: &IndicatorId) -> &[IndicatorRecord] {
        self.lookup(id).records()
    }

    pub fn ids(&self) -> impl Iterator<Item = &IndicatorId> {
        self.series.keys()
    }

    pub fn failures(&self) -> &BTreeMap<IndicatorId, String> {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<(IndicatorId, Vec<IndicatorRecord>)> for IndicatorStore {
    fn from_iter<T: IntoIterator<Item = (IndicatorId, Vec<IndicatorRecord>)>>(iter: T) -> Self {
        let mut store = IndicatorStore::new();
        for (id, rs) in iter {
            store.insert(id, rs);
        }
        store
    }
}
