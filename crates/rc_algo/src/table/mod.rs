//! Per-indicator table: one ranked row per country with data, plus group rows.
//!
//! Pipeline for one build (pure, rebuilt from scratch every time):
//! 1. `rows::country_rows`    latest / prior-year / comparison-year values and deltas
//! 2. `groups::group_rows`    sum or average over member rows
//! 3. `order::sort_rows`      user column or the indicator's sort policy
//! 4. `order::assign_ranks`   sequential numbers; world rows get a marker
//! 5. `order::pin_home`       optional home-country row moved to the top
//! 6. display strings         shared median-based scale for `auto` indicators

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

use rc_core::{AuxStores, CountryGroup, IndicatorId, IndicatorMeta, IndicatorRecord, RelationMode, ScaleMode};

use crate::transform::{format_percent, format_value_auto, scale_for, DisplayScale};

pub mod groups;
pub mod order;
pub mod rows;

pub use order::{SortColumn, SortState};

/// Rank marker shown for world-aggregate rows.
pub const WORLD_RANK_MARKER: &str = "🌍";
/// Rank placeholder shown for group rows.
pub const GROUP_RANK_MARKER: &str = "–";

/* ---------------------------------- Types ---------------------------------- */

/// Direction of the latest value against the prior year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Trend {
    #[serde(rename = "↓")]
    Down,
    #[serde(rename = "→")]
    Flat,
    #[serde(rename = "↑")]
    Up,
    /// Group rows carry no trend.
    #[serde(rename = "-")]
    NotApplicable,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Down => "↓",
            Trend::Flat => "→",
            Trend::Up => "↑",
            Trend::NotApplicable => "-",
        }
    }

    /// `Flat` unless both values exist and differ.
    pub fn between(latest: Option<f64>, prior: Option<f64>) -> Self {
        match (latest, prior) {
            (Some(l), Some(p)) if l > p => Trend::Up,
            (Some(l), Some(p)) if l < p => Trend::Down,
            _ => Trend::Flat,
        }
    }
}

/// How a group row combined its members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAggregation {
    Sum,
    Average,
}

/// Position in the numeric sequence, or a non-numeric marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankMarker {
    Position(u32),
    World,
    Group,
}

impl RankMarker {
    pub fn position(self) -> Option<u32> {
        match self {
            RankMarker::Position(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for RankMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankMarker::Position(n) => write!(f, "{n}"),
            RankMarker::World => f.write_str(WORLD_RANK_MARKER),
            RankMarker::Group => f.write_str(GROUP_RANK_MARKER),
        }
    }
}

impl Serialize for RankMarker {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            RankMarker::Position(n) => s.serialize_u32(*n),
            RankMarker::World => s.serialize_str(WORLD_RANK_MARKER),
            RankMarker::Group => s.serialize_str(GROUP_RANK_MARKER),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub country: String,
    pub value: Option<f64>,
    pub value_display: String,
    pub delta_prior_abs: Option<f64>,
    pub delta_prior_abs_display: String,
    pub delta_prior_pct: Option<f64>,
    pub delta_prior_pct_display: String,
    pub trend: Trend,
    pub delta_comparison_pct: Option<f64>,
    pub delta_comparison_display: String,
    pub latest_year: i32,
    pub is_group: bool,
    pub is_world: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<GroupAggregation>,
    pub rank: RankMarker,
    pub highlighted: bool,
}

impl TableRow {
    pub(crate) fn blank(country: String, latest_year: i32) -> Self {
        Self {
            is_world: rc_core::is_world_name(&country),
            country,
            value: None,
            value_display: String::new(),
            delta_prior_abs: None,
            delta_prior_abs_display: String::new(),
            delta_prior_pct: None,
            delta_prior_pct_display: String::new(),
            trend: Trend::Flat,
            delta_comparison_pct: None,
            delta_comparison_display: String::new(),
            latest_year,
            is_group: false,
            aggregation: None,
            rank: RankMarker::Position(0),
            highlighted: false,
        }
    }
}

/// Everything one table build reads.
#[derive(Clone, Copy, Debug)]
pub struct TableInput<'a> {
    pub meta: &'a IndicatorMeta,
    /// Full country list; rows are built in this order before sorting.
    pub countries: &'a [String],
    pub series: &'a [IndicatorRecord],
    pub groups: &'a [CountryGroup],
    pub aux: &'a AuxStores,
    /// Requested mode; ineligible indicators are treated as absolute.
    pub relation: RelationMode,
    pub comparison_year: Option<i32>,
    pub sort: Option<SortState>,
    pub home_country: Option<&'a str>,
}

/// Output handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndicatorTable {
    pub indicator: IndicatorId,
    pub title: String,
    pub unit: String,
    pub relation: RelationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_year: Option<i32>,
    /// Present for `auto` indicators only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<DisplayScale>,
    pub rows: Vec<TableRow>,
}

/* ---------------------------------- Build ---------------------------------- */

pub fn build_table(input: &TableInput<'_>) -> IndicatorTable {
    let meta = input.meta;
    let relation = meta.effective_relation(input.relation);

    let mut countries = rows::country_rows(input, relation);
    let mut group_rows = groups::group_rows(&countries, input.groups, meta);

    order::sort_rows(&mut countries, meta, input.sort);
    order::assign_ranks(&mut countries);
    if let Some(s) = input.sort {
        if s.column == SortColumn::Rank && !s.ascending {
            countries.reverse();
        }
    }

    let scale = match meta.scale {
        ScaleMode::Auto => Some(scale_for(countries.iter().map(|r| r.value))),
        _ => None,
    };

    let mut all = countries;
    all.append(&mut group_rows);
    for row in all.iter_mut() {
        render_row(row, scale.as_ref(), &meta.scale);
    }
    if let Some(home) = input.home_country {
        order::pin_home(&mut all, home);
    }

    IndicatorTable {
        indicator: meta.id.clone(),
        title: meta.title.clone(),
        unit: meta.unit.clone(),
        relation,
        comparison_year: input.comparison_year,
        scale,
        rows: all,
    }
}

fn render_row(row: &mut TableRow, shared: Option<&DisplayScale>, mode: &ScaleMode) {
    row.value_display = match shared {
        Some(s) => s.format(row.value),
        None => format_value_auto(row.value, mode),
    };
    if row.is_group {
        row.delta_prior_abs_display = "-".to_string();
        row.delta_prior_pct_display = "-".to_string();
        row.delta_comparison_display = "-".to_string();
        return;
    }
    row.delta_prior_abs_display = format_value_auto(row.delta_prior_abs, mode);
    row.delta_prior_pct_display = format_percent(row.delta_prior_pct);
    row.delta_comparison_display = format_percent(row.delta_comparison_pct);
}

/* ------------------------------ Column tokens ------------------------------ */

impl FromStr for SortState {
    type Err = String;

    /// `column` or `column:asc` / `column:desc`; bare columns take their default direction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, dir) = match s.split_once(':') {
            Some((c, d)) => (c, Some(d)),
            None => (s, None),
        };
        let column: SortColumn = col.parse()?;
        let ascending = match dir.map(|d| d.trim().to_ascii_lowercase()) {
            None => column.defaults_ascending(),
            Some(d) if d == "asc" => true,
            Some(d) if d == "desc" => false,
            Some(d) => return Err(format!("unknown sort direction: {d}")),
        };
        Ok(SortState { column, ascending })
    }
}
