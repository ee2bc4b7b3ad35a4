//! Value transform: relation re-expression, magnitude scaling, and formatting.
//!
//! Rules in this layer:
//! - A missing value stays missing; nothing here substitutes 0.
//! - Relation lookups are exact (same country, same year); a miss yields `None`.
//! - The shared table scale is chosen from the **median** magnitude, so one
//!   huge outlier does not push every other row to `0.00 T`.

#![forbid(unsafe_code)]

use serde::Serialize;

use rc_core::{AuxStores, IndicatorMeta, RelationMode, ScaleMode};

/// Descending magnitude thresholds with their display suffixes.
const MAGNITUDES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Shared divisor/suffix applied to every value of one table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DisplayScale {
    pub divisor: f64,
    pub suffix: &'static str,
}

impl DisplayScale {
    pub const EXACT: DisplayScale = DisplayScale { divisor: 1.0, suffix: "" };

    /// Human legend for the suffix (`"Millions"`, ...).
    pub fn legend(&self) -> &'static str {
        match self.suffix {
            "T" => "Trillions",
            "B" => "Billions",
            "M" => "Millions",
            "K" => "Thousands",
            _ => "Exact values",
        }
    }

    #[inline]
    pub fn format(&self, value: Option<f64>) -> String {
        format_scaled(value, self.divisor, self.suffix)
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        DisplayScale::EXACT
    }
}

/// Pick one display scale for `values` from their median magnitude.
///
/// Missing and non-finite values are ignored; with nothing left the scale is
/// exact (divisor 1, no suffix).
pub fn scale_for<I>(values: I) -> DisplayScale
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut nums: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
    if nums.is_empty() {
        return DisplayScale::EXACT;
    }
    nums.sort_by(|a, b| a.total_cmp(b));
    let median = nums[nums.len() / 2];
    let magnitude = median.abs().max(1.0);
    MAGNITUDES
        .iter()
        .find(|(div, _)| magnitude >= *div)
        .map(|&(divisor, suffix)| DisplayScale { divisor, suffix })
        .unwrap_or(DisplayScale::EXACT)
}

/// Two-decimal rendering; `-0.00` for an exact negative zero is normalized.
#[inline]
pub fn fixed2(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:.2}")
}

/// `"-"` for missing/NaN, else `value/divisor` with two decimals and the suffix.
pub fn format_scaled(value: Option<f64>, divisor: f64, suffix: &str) -> String {
    match value.filter(|v| !v.is_nan()) {
        None => "-".to_string(),
        Some(v) => {
            let body = fixed2(v / divisor);
            if suffix.is_empty() {
                body
            } else {
                format!("{body} {suffix}")
            }
        }
    }
}

/// Per-value formatting: `auto` picks K/M/B/T for this value alone; every
/// other scale mode renders the bare two-decimal number.
pub fn format_value_auto(value: Option<f64>, scale: &ScaleMode) -> String {
    let Some(v) = value.filter(|v| !v.is_nan()) else {
        return "-".to_string();
    };
    match scale {
        ScaleMode::Auto => {
            let abs = v.abs();
            match MAGNITUDES.iter().find(|(div, _)| abs >= *div) {
                Some(&(div, suffix)) => format!("{} {suffix}", fixed2(v / div)),
                None => fixed2(v),
            }
        }
        _ => fixed2(v),
    }
}

/// `(to - from) / from * 100`, or `None` when either side is missing or `from` is zero.
#[inline]
pub fn percent_change(from: Option<f64>, to: Option<f64>) -> Option<f64> {
    match (from, to) {
        (Some(f), Some(t)) if f != 0.0 => Some((t - f) / f * 100.0),
        _ => None,
    }
}

/// `"12.34%"`, or `"-"` when missing.
pub fn format_percent(pct: Option<f64>) -> String {
    match pct.filter(|v| v.is_finite()) {
        Some(p) => format!("{}%", fixed2(p)),
        None => "-".to_string(),
    }
}

/// Re-express `raw` relative to population, GDP or area.
///
/// Missing and zero values pass through unchanged, as does every value of an
/// indicator that is not relation-eligible and every value in `Absolute`
/// mode. Otherwise the same-country, same-year auxiliary value divides it;
/// without one the result is `None`.
pub fn apply_relation(
    raw: Option<f64>,
    country: &str,
    year: i32,
    mode: RelationMode,
    meta: &IndicatorMeta,
    aux: &AuxStores,
) -> Option<f64> {
    let v = match raw {
        Some(v) if v != 0.0 => v,
        other => return other,
    };
    if !meta.relation_eligible {
        return raw;
    }
    match aux.for_mode(mode) {
        None => raw,
        Some(store) => store.lookup(country, year).map(|d| v / d),
    }
}
