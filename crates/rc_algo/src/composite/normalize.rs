//! Cross-country min-max normalization of one indicator's latest values.

use std::collections::BTreeMap;

use rc_core::IndicatorRecord;

/// Latest numeric value per country (later record wins on a repeated year).
///
/// World-aggregate rows are kept: they count toward the country minimum and
/// stretch the min/max range. `rank_composite` drops them from the entries.
pub fn latest_per_country(series: &[IndicatorRecord]) -> BTreeMap<&str, f64> {
    let mut best: BTreeMap<&str, (i32, f64)> = BTreeMap::new();
    for r in series {
        let Some(v) = r.numeric() else { continue };
        let slot = best.entry(r.country.as_str()).or_insert((r.year, v));
        if r.year >= slot.0 {
            *slot = (r.year, v);
        }
    }
    best.into_iter().map(|(c, (_, v))| (c, v)).collect()
}

/// Map values onto `[0, 1]`; `invert` flips so that smaller raw values score higher.
///
/// With zero spread every country scores 0 in either direction: an indicator
/// that cannot tell countries apart contributes nothing to anyone.
pub fn min_max<'a>(values: &BTreeMap<&'a str, f64>, invert: bool) -> BTreeMap<&'a str, f64> {
    let (min, max) = values
        .values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return values.keys().map(|&c| (c, 0.0)).collect();
    }
    values
        .iter()
        .map(|(&c, &v)| {
            let norm = ((v - min) / range).clamp(0.0, 1.0);
            (c, if invert { 1.0 - norm } else { norm })
        })
        .collect()
}
