//! weights.rs — Relevance snapshot: metadata defaults merged with user overrides.
//!
//! The composite ranking reads one snapshot per recomputation; it never
//! observes a half-applied set of user changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::IndicatorMeta;
use crate::ids::IndicatorId;
use crate::params::TierWeights;
use crate::variables::Relevance;

/// Effective relevance tier per indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelevanceSnapshot {
    tiers: BTreeMap<IndicatorId, Relevance>,
}

impl RelevanceSnapshot {
    /// Defaults from metadata, replaced by any override whose id is known.
    /// Overrides for unknown indicators are ignored.
    pub fn build<'a, I>(metas: I, overrides: &BTreeMap<IndicatorId, Relevance>) -> Self
    where
        I: IntoIterator<Item = &'a IndicatorMeta>,
    {
        let tiers = metas
            .into_iter()
            .map(|m| {
                let tier = overrides.get(&m.id).copied().unwrap_or(m.relevance);
                (m.id.clone(), tier)
            })
            .collect();
        Self { tiers }
    }

    /// Tier for `meta`, falling back to its metadata default.
    pub fn tier(&self, meta: &IndicatorMeta) -> Relevance {
        self.tiers.get(&meta.id).copied().unwrap_or(meta.relevance)
    }

    pub fn weight(&self, meta: &IndicatorMeta, weights: &TierWeights) -> f64 {
        weights.weight(self.tier(meta))
    }

    pub fn set(&mut self, id: IndicatorId, tier: Relevance) {
        self.tiers.insert(id, tier);
    }

    /// Entries that differ from the metadata default (what gets persisted).
    pub fn overrides<'a, I>(&self, metas: I) -> BTreeMap<IndicatorId, Relevance>
    where
        I: IntoIterator<Item = &'a IndicatorMeta>,
    {
        metas
            .into_iter()
            .filter_map(|m| {
                let t = self.tiers.get(&m.id).copied()?;
                (t != m.relevance).then(|| (m.id.clone(), t))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndicatorId, &Relevance)> {
        self.tiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::SortPolicy;

    fn meta(id: &str, tier: Relevance) -> IndicatorMeta {
        let mut m = IndicatorMeta::new(id.parse().unwrap(), id, SortPolicy::Higher);
        m.relevance = tier;
        m
    }

    #[test]
    fn overrides_win_over_defaults() {
        let metas = vec![meta("a", Relevance::Normal), meta("b", Relevance::High)];
        let mut ov = BTreeMap::new();
        ov.insert("a".parse().unwrap(), Relevance::VeryHigh);
        ov.insert("ghost".parse().unwrap(), Relevance::Low);

        let snap = RelevanceSnapshot::build(&metas, &ov);
        assert_eq!(snap.tier(&metas[0]), Relevance::VeryHigh);
        assert_eq!(snap.tier(&metas[1]), Relevance::High);
        assert_eq!(snap.iter().count(), 2);
        assert_eq!(snap.weight(&metas[0], &TierWeights::default()), 1.0);
    }

    #[test]
    fn only_changed_tiers_are_persisted() {
        let metas = vec![meta("a", Relevance::Normal), meta("b", Relevance::High)];
        let mut snap = RelevanceSnapshot::build(&metas, &BTreeMap::new());
        snap.set("b".parse().unwrap(), Relevance::Irrelevant);
        let ov = snap.overrides(&metas);
        assert_eq!(ov.len(), 1);
        assert_eq!(ov.get(&"b".parse::<IndicatorId>().unwrap()), Some(&Relevance::Irrelevant));
    }
}
