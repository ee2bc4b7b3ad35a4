//! Composite ranking: relevance-weighted average of normalized indicators.
//!
//! Inputs:
//! - indicator metadata (sort policy, world scope, default relevance)
//! - the Indicator Store
//! - one relevance snapshot, read once for the whole computation
//! - ranking parameters (coverage threshold, minimum countries, tier weights)
//!
//! Rules in this layer:
//! - Eligible: rankable sort policy, not world-only, weight above zero.
//! - Per indicator: latest numeric value per country, min-max onto `[0,1]`,
//!   inverted for `lower`, multiplied by the weight. Fewer than
//!   `min_countries` numeric countries → skipped and reported as missing.
//! - Per country: score = mean weighted value over the indicators it has;
//!   coverage = that count / eligible indicator count.
//! - World-aggregate rows take part in normalization (country minimum, min/max)
//!   but never appear as entries.
//! - Countries below the coverage threshold are dropped.
//! - Order: score descending, then country name ascending.
//!
//! Nothing here fails: every per-indicator problem is recorded and skipped.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use rc_core::determinism::{cmp_country, cmp_f64};
use rc_core::{
    is_world_name, IndicatorId, IndicatorMeta, IndicatorStore, RankingParams, Relevance, RelevanceSnapshot,
    SeriesLookup, SortPolicy, WorldScope,
};

pub mod normalize;

use normalize::{latest_per_country, min_max};

/* ---------------------------------- Types ---------------------------------- */

#[derive(Clone, Copy, Debug)]
pub struct RankingInput<'a> {
    pub metas: &'a [IndicatorMeta],
    pub store: &'a IndicatorStore,
    pub relevance: &'a RelevanceSnapshot,
    pub params: &'a RankingParams,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub country: String,
    pub score: f64,
    pub indicators_used: usize,
    pub coverage: f64,
}

/// Why an eligible indicator did not contribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissingReason {
    NoData,
    LoadFailed { reason: String },
    TooFewCountries { found: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissingIndicator {
    pub id: IndicatorId,
    pub title: String,
    #[serde(flatten)]
    pub reason: MissingReason,
}

/// An indicator that contributed to the scores.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsedIndicator {
    pub id: IndicatorId,
    pub title: String,
    pub relevance: Relevance,
    pub weight: f64,
    pub countries: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompositeRanking {
    pub entries: Vec<RankingEntry>,
    /// Indicators passing the eligibility filter (the coverage denominator).
    pub eligible_count: usize,
    pub used: Vec<UsedIndicator>,
    pub missing: Vec<MissingIndicator>,
    /// Countries with some data that fell below the coverage threshold.
    pub below_coverage: usize,
}

impl CompositeRanking {
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Titles of skipped indicators, for the transparency note.
    pub fn missing_titles(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.title.as_str()).collect()
    }
}

/* ------------------------------- Eligibility ------------------------------- */

/// Weight of `meta` if it takes part in the composite ranking.
pub fn eligible_weight(
    meta: &IndicatorMeta,
    relevance: &RelevanceSnapshot,
    params: &RankingParams,
) -> Option<f64> {
    if !meta.sort.is_rankable() || meta.world == WorldScope::WorldOnly {
        return None;
    }
    let w = relevance.weight(meta, &params.tier_weights);
    (w > 0.0).then_some(w)
}

/* -------------------------------- Ranking ---------------------------------- */

#[derive(Default)]
struct Acc {
    sum: f64,
    count: usize,
}

pub fn rank_composite(input: &RankingInput<'_>) -> CompositeRanking {
    let params = input.params;
    let eligible: Vec<(&IndicatorMeta, f64)> = input
        .metas
        .iter()
        .filter_map(|m| eligible_weight(m, input.relevance, params).map(|w| (m, w)))
        .collect();

    let mut out = CompositeRanking { eligible_count: eligible.len(), ..Default::default() };
    let mut acc: BTreeMap<&str, Acc> = BTreeMap::new();

    for &(meta, weight) in &eligible {
        let series = match input.store.lookup(&meta.id) {
            SeriesLookup::Found(rs) => rs,
            SeriesLookup::Absent => {
                debug!(indicator = %meta.id, "no series; skipped");
                out.missing.push(missing(meta, MissingReason::NoData));
                continue;
            }
            SeriesLookup::Failed(reason) => {
                debug!(indicator = %meta.id, %reason, "series failed to load; skipped");
                out.missing.push(missing(meta, MissingReason::LoadFailed { reason: reason.to_string() }));
                continue;
            }
        };

        let latest = latest_per_country(series);
        if latest.len() < params.min_countries {
            debug!(indicator = %meta.id, found = latest.len(), "too few countries; skipped");
            let reason = if latest.is_empty() {
                MissingReason::NoData
            } else {
                MissingReason::TooFewCountries { found: latest.len() }
            };
            out.missing.push(missing(meta, reason));
            continue;
        }

        let normalized = min_max(&latest, meta.sort == SortPolicy::Lower);
        for (country, norm) in normalized {
            let a = acc.entry(country).or_default();
            a.sum += norm * weight;
            a.count += 1;
        }
        out.used.push(UsedIndicator {
            id: meta.id.clone(),
            title: meta.title.clone(),
            relevance: input.relevance.tier(meta),
            weight,
            countries: latest.len(),
        });
    }

    let denominator = out.eligible_count.max(1) as f64;
    let mut entries: Vec<RankingEntry> = Vec::with_capacity(acc.len());
    for (country, a) in acc {
        if is_world_name(country) {
            continue;
        }
        let coverage = a.count as f64 / denominator;
        if coverage < params.coverage_threshold {
            out.below_coverage += 1;
            continue;
        }
        entries.push(RankingEntry {
            rank: 0,
            country: country.to_string(),
            score: a.sum / a.count as f64,
            indicators_used: a.count,
            coverage,
        });
    }

    entries.sort_by(|a, b| cmp_f64(b.score, a.score).then_with(|| cmp_country(&a.country, &b.country)));
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = i as u32 + 1;
    }
    out.entries = entries;
    out
}

fn missing(meta: &IndicatorMeta, reason: MissingReason) -> MissingIndicator {
    MissingIndicator { id: meta.id.clone(), title: meta.title.clone(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::IndicatorRecord;

    fn meta(id: &str, sort: SortPolicy, tier: Relevance) -> IndicatorMeta {
        let mut m = IndicatorMeta::new(id.parse().unwrap(), id.to_uppercase(), sort);
        m.relevance = tier;
        m
    }

    fn series(points: &[(&str, f64)]) -> Vec<IndicatorRecord> {
        points.iter().map(|(c, v)| IndicatorRecord::new(*c, 2021, Some(*v))).collect()
    }

    fn run(metas: &[IndicatorMeta], store: &IndicatorStore) -> CompositeRanking {
        let snap = RelevanceSnapshot::build(metas, &BTreeMap::new());
        let params = RankingParams::default();
        rank_composite(&RankingInput { metas, store, relevance: &snap, params: &params })
    }

    #[test]
    fn eligibility_filter() {
        let p = RankingParams::default();
        let snap = RelevanceSnapshot::default();
        assert!(eligible_weight(&meta("a", SortPolicy::Higher, Relevance::Low), &snap, &p).is_some());
        assert!(eligible_weight(&meta("a", SortPolicy::Neutral, Relevance::High), &snap, &p).is_none());
        assert!(eligible_weight(&meta("a", SortPolicy::Target, Relevance::Irrelevant), &snap, &p).is_none());
        let mut world = meta("w", SortPolicy::Higher, Relevance::High);
        world.world = WorldScope::WorldOnly;
        assert!(eligible_weight(&world, &snap, &p).is_none());
        world.world = WorldScope::Both;
        assert_eq!(eligible_weight(&world, &snap, &p), Some(0.7));
    }

    #[test]
    fn skipped_indicators_are_reported_with_reasons() {
        let metas = vec![
            meta("ok", SortPolicy::Higher, Relevance::Normal),
            meta("solo", SortPolicy::Higher, Relevance::Normal),
            meta("gone", SortPolicy::Higher, Relevance::Normal),
            meta("broken", SortPolicy::Higher, Relevance::Normal),
        ];
        let mut store = IndicatorStore::new();
        store.insert("ok".parse().unwrap(), series(&[("A", 1.0), ("B", 2.0)]));
        store.insert("solo".parse().unwrap(), series(&[("A", 1.0)]));
        store.record_failure("broken".parse().unwrap(), "bad gzip");

        let r = run(&metas, &store);
        assert_eq!(r.eligible_count, 4);
        assert_eq!(r.used_count(), 1);
        assert_eq!(r.missing_titles(), vec!["SOLO", "GONE", "BROKEN"]);
        assert_eq!(r.missing[0].reason, MissingReason::TooFewCountries { found: 1 });
        assert_eq!(r.missing[1].reason, MissingReason::NoData);
        assert_eq!(r.missing[2].reason, MissingReason::LoadFailed { reason: "bad gzip".into() });
        // one indicator out of four → 25% coverage, below the cutoff
        assert!(r.entries.is_empty());
        assert_eq!(r.below_coverage, 2);
    }

    #[test]
    fn ties_break_alphabetically() {
        let metas = vec![meta("x", SortPolicy::Higher, Relevance::Normal)];
        let mut store = IndicatorStore::new();
        store.insert("x".parse().unwrap(), series(&[("Peru", 5.0), ("Chile", 5.0), ("Bolivia", 1.0)]));
        let r = run(&metas, &store);
        let order: Vec<&str> = r.entries.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(order, vec!["Chile", "Peru", "Bolivia"]);
        assert_eq!(r.entries.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn zero_range_contributes_zero_without_nan() {
        let metas = vec![
            meta("flat", SortPolicy::Lower, Relevance::VeryHigh),
            meta("x", SortPolicy::Higher, Relevance::VeryHigh),
        ];
        let mut store = IndicatorStore::new();
        store.insert("flat".parse().unwrap(), series(&[("A", 3.0), ("B", 3.0)]));
        store.insert("x".parse().unwrap(), series(&[("A", 1.0), ("B", 2.0)]));
        let r = run(&metas, &store);
        assert!(r.entries.iter().all(|e| e.score.is_finite()));
        assert_eq!(r.entries[0].country, "B");
        assert_eq!(r.entries[0].score, 0.5);
        assert_eq!(r.entries[1].score, 0.0);
    }

    #[test]
    fn score_averages_over_available_indicators_only() {
        let metas = vec![
            meta("a", SortPolicy::Higher, Relevance::VeryHigh),
            meta("b", SortPolicy::Higher, Relevance::VeryHigh),
            meta("c", SortPolicy::Higher, Relevance::VeryHigh),
        ];
        let mut store = IndicatorStore::new();
        store.insert("a".parse().unwrap(), series(&[("X", 10.0), ("Y", 0.0), ("Z", 5.0)]));
        store.insert("b".parse().unwrap(), series(&[("X", 10.0), ("Y", 0.0), ("Z", 5.0)]));
        store.insert("c".parse().unwrap(), series(&[("Y", 0.0), ("Z", 10.0)]));
        let r = run(&metas, &store);
        let x = r.entries.iter().find(|e| e.country == "X").unwrap();
        assert_eq!(x.score, 1.0);
        assert_eq!(x.indicators_used, 2);
        assert!((x.coverage - 2.0 / 3.0).abs() < 1e-12);
        let order: Vec<&str> = r.entries.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(order, vec!["X", "Z", "Y"]);
    }

    #[test]
    fn world_rows_never_ranked() {
        let metas = vec![meta("x", SortPolicy::Higher, Relevance::Normal)];
        let mut store = IndicatorStore::new();
        store.insert("x".parse().unwrap(), series(&[("World", 99.0), ("Welt", 98.0), ("A", 1.0), ("B", 2.0)]));
        let r = run(&metas, &store);
        assert!(r.entries.iter().all(|e| e.country != "World" && e.country != "Welt"));
        assert_eq!(r.entries.len(), 2);
        assert_eq!(r.entries[0].country, "B");
        // World stretches the range to [1, 99].
        assert!((r.entries[0].score - (2.0 - 1.0) / (99.0 - 1.0) * 0.4).abs() < 1e-12);
        assert_eq!(r.entries[1].score, 0.0);
        assert_eq!(r.below_coverage, 0);
    }

    #[test]
    fn world_row_counts_toward_country_minimum() {
        let metas = vec![meta("x", SortPolicy::Higher, Relevance::VeryHigh)];
        let mut store = IndicatorStore::new();
        store.insert("x".parse().unwrap(), series(&[("World", 100.0), ("A", 5.0)]));
        let r = run(&metas, &store);
        assert_eq!(r.used_count(), 1);
        assert!(r.missing.is_empty());
        let ranked: Vec<(&str, f64)> = r.entries.iter().map(|e| (e.country.as_str(), e.score)).collect();
        assert_eq!(ranked, vec![("A", 0.0)]);

        let mut store = IndicatorStore::new();
        store.insert("x".parse().unwrap(), series(&[("World", 100.0), ("A", 0.0), ("B", 10.0)]));
        let r = run(&metas, &store);
        let ranked: Vec<(&str, f64)> = r.entries.iter().map(|e| (e.country.as_str(), e.score)).collect();
        assert_eq!(ranked, vec![("B", 0.1), ("A", 0.0)]);
    }
}
