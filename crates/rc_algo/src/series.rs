//! Series shaping for charts: year axes, per-country lines, world series.
//!
//! Gaps stay gaps (`None`); nothing is interpolated.

use std::collections::BTreeSet;

use serde::Serialize;

use rc_core::{AuxStores, IndicatorMeta, IndicatorRecord, RelationMode, WORLD_SERIES_NAMES};

use crate::transform::apply_relation;

/// Countries a single chart compares at most.
pub const MAX_CHART_COUNTRIES: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLine {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub years: Vec<i32>,
    pub lines: Vec<ChartLine>,
}

/// Distinct years of a series, newest first (comparison-year choices).
pub fn comparison_years(series: &[IndicatorRecord]) -> Vec<i32> {
    let years: BTreeSet<i32> = series.iter().map(|r| r.year).collect();
    years.into_iter().rev().collect()
}

/// Lines for up to [`MAX_CHART_COUNTRIES`] countries over every year of the
/// series, relation-applied per point. Duplicate or empty selections are dropped.
pub fn chart_series(
    series: &[IndicatorRecord],
    countries: &[&str],
    meta: &IndicatorMeta,
    relation: RelationMode,
    aux: &AuxStores,
) -> ChartSeries {
    let relation = meta.effective_relation(relation);
    let mut years = comparison_years(series);
    years.reverse();

    let mut seen = BTreeSet::new();
    let lines = countries
        .iter()
        .filter(|c| !c.is_empty() && seen.insert(**c))
        .take(MAX_CHART_COUNTRIES)
        .map(|&country| ChartLine {
            country: country.to_string(),
            values: years
                .iter()
                .map(|&y| {
                    series
                        .iter()
                        .find(|r| r.country == country && r.year == y)
                        .and_then(|r| apply_relation(r.numeric(), country, y, relation, meta, aux))
                })
                .collect(),
        })
        .collect();

    ChartSeries { years, lines }
}

/// World-level records (`World`, `Welt`, `Global`) in ascending year order.
pub fn world_series(series: &[IndicatorRecord]) -> Vec<IndicatorRecord> {
    let mut out: Vec<IndicatorRecord> = series
        .iter()
        .filter(|r| WORLD_SERIES_NAMES.contains(&r.country.as_str()))
        .cloned()
        .collect();
    out.sort_by_key(|r| r.year);
    out
}
