// crates/rc_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Algorithm layer of the ranking engine. Pure functions over in-memory data:
//! no I/O, no clocks, no global state. Every call rebuilds its result from
//! scratch; callers own the output.

// ----------------------------- Value transform ----------------------------------------

pub mod transform;

pub use transform::{
    apply_relation, format_percent, format_scaled, format_value_auto, percent_change, scale_for,
    DisplayScale,
};

// ----------------------------- Per-indicator table ------------------------------------

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "table")]
pub use table::{
    build_table, GroupAggregation, IndicatorTable, RankMarker, SortColumn, SortState, TableInput,
    TableRow, Trend,
};

// ----------------------------- Composite ranking --------------------------------------

#[cfg(feature = "composite")]
pub mod composite;

#[cfg(feature = "composite")]
pub use composite::{
    eligible_weight, rank_composite, CompositeRanking, MissingIndicator, MissingReason,
    RankingEntry, RankingInput, UsedIndicator,
};

// ----------------------------- Chart series -------------------------------------------

#[cfg(feature = "series")]
pub mod series;

#[cfg(feature = "series")]
pub use series::{chart_series, comparison_years, world_series, ChartLine, ChartSeries};
