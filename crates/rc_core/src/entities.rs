//! entities.rs — Records, indicator metadata, groups, and auxiliary lookups.
//!
//! All of these are loaded once and treated as read-only afterwards. The only
//! mutable piece of indicator metadata (relevance) is carried separately as a
//! snapshot by the pipeline; `IndicatorMeta::relevance` is the default.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, IndicatorId};
use crate::variables::{RelationMode, Relevance, ScaleMode, SortPolicy, WorldScope};

/// One observation: a country's value for a year (`None` = reported as missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

impl IndicatorRecord {
    pub fn new(country: impl Into<String>, year: i32, value: Option<f64>) -> Self {
        Self { country: country.into(), year, value }
    }

    /// Value usable in arithmetic (present and finite).
    #[inline]
    pub fn numeric(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Validated per-indicator descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMeta {
    pub id: IndicatorId,
    pub title: String,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub unit: String,
    pub sort: SortPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub scale: ScaleMode,
    #[serde(default)]
    pub relation_eligible: bool,
    #[serde(default)]
    pub relevance: Relevance,
    #[serde(default)]
    pub world: WorldScope,
}

impl IndicatorMeta {
    /// Minimal descriptor; remaining fields take their defaults.
    pub fn new(id: IndicatorId, title: impl Into<String>, sort: SortPolicy) -> Self {
        Self {
            id,
            title: title.into(),
            cluster: String::new(),
            unit: String::new(),
            sort,
            target_value: None,
            scale: ScaleMode::Auto,
            relation_eligible: false,
            relevance: Relevance::Normal,
            world: WorldScope::Countries,
        }
    }

    /// Target for `SortPolicy::Target` (absent target reads as 0).
    #[inline]
    pub fn target(&self) -> f64 {
        self.target_value.unwrap_or(0.0)
    }

    /// Group rows average (rather than sum) for percentage and ratio-like scales.
    pub fn aggregates_by_average(&self) -> bool {
        self.unit.contains('%') || self.scale.is_ratio_like()
    }

    /// Relation mode that actually applies: ineligible indicators stay absolute.
    pub fn effective_relation(&self, requested: RelationMode) -> RelationMode {
        if self.relation_eligible {
            requested
        } else {
            RelationMode::Absolute
        }
    }
}

/// Static, named set of countries (absent members are simply not aggregated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryGroup {
    pub id: GroupId,
    pub title: String,
    pub members: BTreeSet<String>,
}

impl CountryGroup {
    /// Display label: the title, or the id when the title is blank.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.title
        }
    }
}

/// Optional per-country metadata consumed by map/detail views only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub government: Option<String>,
}

/* -------------------------------------------------------------------------- */
/*                             Auxiliary lookups                              */
/* -------------------------------------------------------------------------- */

/// Exact (country, year) → value lookup used by relation transforms.
/// Only non-zero finite values are indexed; a zero divisor reads as a miss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxStore {
    index: BTreeMap<String, BTreeMap<i32, f64>>,
}

impl AuxStore {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = IndicatorRecord>,
    {
        let mut index: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
        for r in records {
            if let Some(v) = r.numeric().filter(|v| *v != 0.0) {
                index.entry(r.country).or_default().insert(r.year, v);
            }
        }
        Self { index }
    }

    #[inline]
    pub fn lookup(&self, country: &str, year: i32) -> Option<f64> {
        self.index.get(country).and_then(|years| years.get(&year)).copied()
    }

    pub fn len(&self) -> usize {
        self.index.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Population / GDP / area stores backing the three relation modes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxStores {
    pub population: AuxStore,
    pub gdp: AuxStore,
    pub area: AuxStore,
}

impl AuxStores {
    /// Store used as divisor for `mode`; `None` for `Absolute`.
    pub fn for_mode(&self, mode: RelationMode) -> Option<&AuxStore> {
        match mode {
            RelationMode::Absolute => None,
            RelationMode::PerCapita => Some(&self.population),
            RelationMode::PerGdp => Some(&self.gdp),
            RelationMode::PerKm2 => Some(&self.area),
        }
    }
}
