//! Row ordering: user column sort or sort policy, rank numbering, home pinning.
//!
//! Sorts are stable, so rows that compare equal keep country-list order.
//! Missing values sort last in either direction.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rc_core::determinism::{cmp_country, cmp_opt_f64};
use rc_core::{IndicatorMeta, SortPolicy};

use super::{RankMarker, TableRow};

/// Sortable table columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Rank,
    Country,
    Value,
    Trend,
    DeltaAbs,
    DeltaPct,
    DeltaComparison,
    LatestYear,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Rank,
        SortColumn::Country,
        SortColumn::Value,
        SortColumn::Trend,
        SortColumn::DeltaAbs,
        SortColumn::DeltaPct,
        SortColumn::DeltaComparison,
        SortColumn::LatestYear,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            SortColumn::Rank => "rank",
            SortColumn::Country => "country",
            SortColumn::Value => "value",
            SortColumn::Trend => "trend",
            SortColumn::DeltaAbs => "delta_abs",
            SortColumn::DeltaPct => "delta_pct",
            SortColumn::DeltaComparison => "delta_comparison",
            SortColumn::LatestYear => "latest_year",
        }
    }

    /// Text-like columns start ascending; numeric columns start descending.
    #[inline]
    pub fn defaults_ascending(self) -> bool {
        matches!(self, SortColumn::Country | SortColumn::Rank)
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for SortColumn {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_token() == t)
            .ok_or_else(|| format!("unknown sort column: {s}"))
    }
}

/// A user-chosen column sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub ascending: bool,
}

impl SortState {
    pub fn initial(column: SortColumn) -> Self {
        Self { column, ascending: column.defaults_ascending() }
    }

    /// Header click: the same column flips direction, another column resets.
    pub fn click(current: Option<SortState>, column: SortColumn) -> SortState {
        match current {
            Some(s) if s.column == column => SortState { column, ascending: !s.ascending },
            _ => SortState::initial(column),
        }
    }
}

/* --------------------------------- Sorting --------------------------------- */

fn cmp_column(a: &TableRow, b: &TableRow, column: SortColumn, ascending: bool) -> Ordering {
    let directed = |o: Ordering| if ascending { o } else { o.reverse() };
    match column {
        SortColumn::Country => directed(cmp_country(&a.country, &b.country)),
        SortColumn::Trend => directed(a.trend.cmp(&b.trend)),
        SortColumn::LatestYear => directed(a.latest_year.cmp(&b.latest_year)),
        SortColumn::Value | SortColumn::Rank => cmp_opt_f64(a.value, b.value, ascending),
        SortColumn::DeltaAbs => cmp_opt_f64(a.delta_prior_abs, b.delta_prior_abs, ascending),
        SortColumn::DeltaPct => cmp_opt_f64(a.delta_prior_pct, b.delta_prior_pct, ascending),
        SortColumn::DeltaComparison => {
            cmp_opt_f64(a.delta_comparison_pct, b.delta_comparison_pct, ascending)
        }
    }
}

/// Order by the indicator's own notion of "better first".
pub fn cmp_policy(a: &TableRow, b: &TableRow, meta: &IndicatorMeta) -> Ordering {
    match meta.sort {
        SortPolicy::Lower => cmp_opt_f64(a.value, b.value, true),
        SortPolicy::Target => {
            let t = meta.target();
            cmp_opt_f64(a.value.map(|v| (v - t).abs()), b.value.map(|v| (v - t).abs()), true)
        }
        SortPolicy::Higher | SortPolicy::Neutral => cmp_opt_f64(a.value, b.value, false),
    }
}

/// A rank-column sort ranks by policy; the caller reverses for descending.
pub fn sort_rows(rows: &mut [TableRow], meta: &IndicatorMeta, sort: Option<SortState>) {
    match sort {
        Some(s) if s.column != SortColumn::Rank => {
            rows.sort_by(|a, b| cmp_column(a, b, s.column, s.ascending));
        }
        _ => rows.sort_by(|a, b| cmp_policy(a, b, meta)),
    }
}

/// Sequential ranks in current order; world rows get a marker and do not
/// consume a number, group rows keep their placeholder.
pub fn assign_ranks(rows: &mut [TableRow]) {
    let mut next = 0u32;
    for row in rows.iter_mut() {
        row.rank = if row.is_group {
            RankMarker::Group
        } else if row.is_world {
            RankMarker::World
        } else {
            next += 1;
            RankMarker::Position(next)
        };
    }
}

/// Move the home country's row to the top and highlight it; rank unchanged.
pub fn pin_home(rows: &mut Vec<TableRow>, home: &str) {
    if let Some(i) = rows.iter().position(|r| r.country == home) {
        let mut row = rows.remove(i);
        row.highlighted = true;
        rows.insert(0, row);
    }
}
