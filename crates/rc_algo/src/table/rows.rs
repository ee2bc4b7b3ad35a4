//! Country rows: latest value, prior-year delta, comparison-year delta.
//!
//! A country without any record gets no row. Prior and comparison years are
//! matched exactly; a gap means no delta, never the nearest available year.

use std::collections::BTreeMap;

use rc_core::{IndicatorRecord, RelationMode};

use super::{TableInput, TableRow, Trend};
use crate::transform::{apply_relation, percent_change};

/// Index a series by country, keeping record order within each country.
pub fn by_country(series: &[IndicatorRecord]) -> BTreeMap<&str, Vec<&IndicatorRecord>> {
    let mut map: BTreeMap<&str, Vec<&IndicatorRecord>> = BTreeMap::new();
    for r in series {
        map.entry(r.country.as_str()).or_default().push(r);
    }
    map
}

/// Record with the maximum year (first one seen when a year repeats).
pub fn latest<'a>(records: &[&'a IndicatorRecord]) -> Option<&'a IndicatorRecord> {
    let mut best: Option<&'a IndicatorRecord> = None;
    for &r in records {
        if best.map_or(true, |b| r.year > b.year) {
            best = Some(r);
        }
    }
    best
}

fn in_year<'a>(records: &[&'a IndicatorRecord], year: i32) -> Option<&'a IndicatorRecord> {
    records.iter().copied().find(|r| r.year == year)
}

/// One row per listed country that has at least one record, in list order.
pub fn country_rows(input: &TableInput<'_>, relation: RelationMode) -> Vec<TableRow> {
    let index = by_country(input.series);
    let transform = |r: &IndicatorRecord| {
        apply_relation(r.numeric(), &r.country, r.year, relation, input.meta, input.aux)
    };

    let mut out = Vec::with_capacity(index.len());
    for country in input.countries {
        let Some(records) = index.get(country.as_str()) else { continue };
        let Some(last) = latest(records) else { continue };

        let lv = transform(last);
        let pv = in_year(records, last.year - 1).and_then(|r| transform(r));
        let cv = input
            .comparison_year
            .and_then(|y| in_year(records, y))
            .and_then(|r| transform(r));

        let mut row = TableRow::blank(country.clone(), last.year);
        row.value = lv;
        row.trend = Trend::between(lv, pv);
        row.delta_prior_abs = match (lv, pv) {
            (Some(l), Some(p)) => Some(l - p),
            _ => None,
        };
        row.delta_prior_pct = percent_change(pv, lv);
        row.delta_comparison_pct = percent_change(cv, lv);
        out.push(row);
    }
    out
}
