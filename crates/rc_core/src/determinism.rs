//! Determinism utilities: total orders over floats, optional values, and names.
//!
//! This module is **I/O-free**. It provides:
//! - A total order for `f64` and for `Option<f64>` with missing values last
//! - Canonical country-name order (byte-wise, locale independent)
//! - A `StableOrd` trait for entities that must sort canonically

use core::cmp::Ordering;

use crate::entities::{CountryGroup, IndicatorMeta};
use crate::ids::IndicatorId;

/* -------------------------------------------------------------------------- */
/*                               Stable Ordering                              */
/* -------------------------------------------------------------------------- */

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for IndicatorId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl StableOrd for IndicatorMeta {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.id.stable_cmp(&other.id)
    }
}

impl StableOrd for CountryGroup {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.id.as_str().cmp(other.id.as_str())
    }
}

/* -------------------------------------------------------------------------- */
/*                              Float comparisons                             */
/* -------------------------------------------------------------------------- */

/// Total order on floats (`-0.0 < 0.0`, NaN sorts last).
#[inline]
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Compare optional values in the requested direction; `None` sorts last
/// in both directions, so missing data never rises to the top.
#[inline]
pub fn cmp_opt_f64(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let o = cmp_f64(x, y);
            if ascending { o } else { o.reverse() }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Canonical country order (byte-wise).
#[inline]
pub fn cmp_country(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Sort entities **in place** into canonical order.
#[inline]
pub fn sort_canonical<T: StableOrd>(xs: &mut [T]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::SortPolicy;

    #[test]
    fn missing_values_sort_last_both_ways() {
        let mut v = vec![None, Some(2.0), Some(1.0)];
        v.sort_by(|a, b| cmp_opt_f64(*a, *b, true));
        assert_eq!(v, vec![Some(1.0), Some(2.0), None]);
        v.sort_by(|a, b| cmp_opt_f64(*a, *b, false));
        assert_eq!(v, vec![Some(2.0), Some(1.0), None]);
    }

    #[test]
    fn metas_sort_by_id() {
        let mut v = vec![
            IndicatorMeta::new("b".parse().unwrap(), "B", SortPolicy::Higher),
            IndicatorMeta::new("a".parse().unwrap(), "A", SortPolicy::Lower),
        ];
        sort_canonical(&mut v);
        assert_eq!(v[0].id.as_str(), "a");
    }

    #[test]
    fn country_order_is_bytewise() {
        assert_eq!(cmp_country("Zambia", "albania"), Ordering::Less);
        assert_eq!(cmp_country("A", "A"), Ordering::Equal);
    }
}
