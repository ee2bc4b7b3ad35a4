//! Group rows: aggregate of the member countries' latest (transformed) values.
//!
//! A group with no member row is omitted. Members with a missing value count
//! as members (they still set the group's latest year) but do not enter the
//! sum or the average; a group whose members are all missing has no value.

use rc_core::{CountryGroup, IndicatorMeta};

use super::{GroupAggregation, RankMarker, TableRow, Trend};

pub fn group_rows(rows: &[TableRow], groups: &[CountryGroup], meta: &IndicatorMeta) -> Vec<TableRow> {
    let aggregation = if meta.aggregates_by_average() {
        GroupAggregation::Average
    } else {
        GroupAggregation::Sum
    };

    groups
        .iter()
        .filter_map(|g| group_row(rows, g, aggregation))
        .collect()
}

fn group_row(rows: &[TableRow], group: &CountryGroup, aggregation: GroupAggregation) -> Option<TableRow> {
    let members: Vec<&TableRow> = rows
        .iter()
        .filter(|r| !r.is_group && group.members.contains(&r.country))
        .collect();
    let latest_year = members.iter().map(|r| r.latest_year).max()?;

    let values: Vec<f64> = members.iter().filter_map(|r| r.value).collect();
    let value = if values.is_empty() {
        None
    } else {
        let sum: f64 = values.iter().sum();
        Some(match aggregation {
            GroupAggregation::Sum => sum,
            GroupAggregation::Average => sum / values.len() as f64,
        })
    };

    let mut row = TableRow::blank(group.label().to_string(), latest_year);
    row.is_world = false;
    row.value = value;
    row.trend = Trend::NotApplicable;
    row.is_group = true;
    row.aggregation = Some(aggregation);
    row.rank = RankMarker::Group;
    Some(row)
}
