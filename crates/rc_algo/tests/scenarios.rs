//! End-to-end scenarios for the table builder and the composite ranking.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use rc_algo::{build_table, rank_composite, RankMarker, RankingInput, TableInput, Trend};
use rc_core::{
    AuxStores, CountryGroup, IndicatorMeta, IndicatorRecord, IndicatorStore, RankingParams,
    RelationMode, Relevance, RelevanceSnapshot, ScaleMode, SortPolicy,
};

fn rec(c: &str, y: i32, v: f64) -> IndicatorRecord {
    IndicatorRecord::new(c, y, Some(v))
}

fn names(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn meta(id: &str, sort: SortPolicy) -> IndicatorMeta {
    IndicatorMeta::new(id.parse().unwrap(), id, sort)
}

fn table_input<'a>(
    meta: &'a IndicatorMeta,
    countries: &'a [String],
    series: &'a [IndicatorRecord],
    groups: &'a [CountryGroup],
    aux: &'a AuxStores,
) -> TableInput<'a> {
    TableInput {
        meta,
        countries,
        series,
        groups,
        aux,
        relation: RelationMode::Absolute,
        comparison_year: None,
        sort: None,
        home_country: None,
    }
}

fn scenario_a_series() -> Vec<IndicatorRecord> {
    vec![rec("FR", 2020, 10.0), rec("FR", 2021, 12.0), rec("DE", 2021, 8.0)]
}

#[test]
fn scenario_a_latest_prior_and_order() {
    let m = meta("a", SortPolicy::Higher);
    let series = scenario_a_series();
    let countries = names(&["DE", "FR"]);
    let aux = AuxStores::default();
    let t = build_table(&table_input(&m, &countries, &series, &[], &aux));

    let order: Vec<&str> = t.rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(order, vec!["FR", "DE"]);

    let fr = &t.rows[0];
    assert_eq!(fr.value, Some(12.0));
    assert_eq!(fr.trend, Trend::Up);
    assert_eq!(fr.delta_prior_abs, Some(2.0));
    assert_eq!(fr.delta_prior_pct_display, "20.00%");
    assert!((fr.delta_prior_pct.unwrap() - 20.0).abs() < 1e-9);
    assert_eq!(fr.rank, RankMarker::Position(1));

    let de = &t.rows[1];
    assert_eq!(de.value, Some(8.0));
    assert_eq!(de.delta_prior_abs, None);
    assert_eq!(de.trend, Trend::Flat);
    assert_eq!(de.delta_comparison_display, "-");
    assert_eq!(de.rank, RankMarker::Position(2));
}

#[test]
fn scenario_b_group_sums_latest_values() {
    let mut m = meta("b", SortPolicy::Higher);
    m.unit = "t".into();
    m.scale = ScaleMode::Auto;
    let series = scenario_a_series();
    let countries = names(&["DE", "FR"]);
    let groups = vec![CountryGroup {
        id: "eu".parse().unwrap(),
        title: "EU".into(),
        members: ["FR", "DE"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
    }];
    let aux = AuxStores::default();
    let t = build_table(&table_input(&m, &countries, &series, &groups, &aux));

    let eu = t.rows.iter().find(|r| r.is_group).expect("group row");
    assert_eq!(eu.country, "EU");
    assert_eq!(eu.value, Some(20.0));
    assert_eq!(eu.latest_year, 2021);
    assert_eq!(eu.rank, RankMarker::Group);
    assert_eq!(eu.trend, Trend::NotApplicable);
    assert_eq!(t.rows.last().map(|r| r.is_group), Some(true));
}

#[test]
fn scenario_c_weighted_composite() {
    let mut x = meta("x", SortPolicy::Higher);
    x.relevance = Relevance::High;
    let mut y = meta("y", SortPolicy::Lower);
    y.relevance = Relevance::VeryHigh;
    let metas = vec![x, y];

    let mut store = IndicatorStore::new();
    store.insert("x".parse().unwrap(), vec![rec("A", 2021, 100.0), rec("B", 2021, 10.0)]);
    store.insert("y".parse().unwrap(), vec![rec("A", 2021, 1.0), rec("B", 2021, 9.0)]);

    let snap = RelevanceSnapshot::build(&metas, &BTreeMap::new());
    let params = RankingParams::default();
    let r = rank_composite(&RankingInput { metas: &metas, store: &store, relevance: &snap, params: &params });

    let order: Vec<&str> = r.entries.iter().map(|e| e.country.as_str()).collect();
    assert_eq!(order, vec!["A", "B"]);
    assert!((r.entries[0].score - 0.85).abs() < 1e-12);
    assert_eq!(r.entries[1].score, 0.0);
    assert!(r.entries.iter().all(|e| e.coverage == 1.0 && e.indicators_used == 2));
    assert_eq!(r.used_count(), 2);
    assert!(r.missing.is_empty());
}

#[test]
fn user_weights_change_the_composite() {
    let metas = vec![meta("x", SortPolicy::Higher), meta("y", SortPolicy::Higher)];
    let mut store = IndicatorStore::new();
    store.insert("x".parse().unwrap(), vec![rec("A", 2021, 1.0), rec("B", 2021, 0.0)]);
    store.insert("y".parse().unwrap(), vec![rec("A", 2021, 0.0), rec("B", 2021, 1.0)]);

    let mut overrides = BTreeMap::new();
    overrides.insert("y".parse().unwrap(), Relevance::VeryHigh);
    let snap = RelevanceSnapshot::build(&metas, &overrides);
    let params = RankingParams::default();
    let r = rank_composite(&RankingInput { metas: &metas, store: &store, relevance: &snap, params: &params });
    assert_eq!(r.entries[0].country, "B");

    overrides.insert("y".parse().unwrap(), Relevance::Irrelevant);
    let snap = RelevanceSnapshot::build(&metas, &overrides);
    let r = rank_composite(&RankingInput { metas: &metas, store: &store, relevance: &snap, params: &params });
    assert_eq!(r.eligible_count, 1);
    assert_eq!(r.entries[0].country, "A");
}

#[test]
fn home_country_pinning_keeps_rank() {
    let m = meta("p", SortPolicy::Higher);
    let series = vec![rec("DE", 2021, 3.0), rec("FR", 2021, 2.0), rec("IT", 2021, 1.0)];
    let countries = names(&["DE", "FR", "IT"]);
    let aux = AuxStores::default();
    let mut input = table_input(&m, &countries, &series, &[], &aux);
    input.home_country = Some("FR");
    let t = build_table(&input);

    let order: Vec<&str> = t.rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(order, vec!["FR", "DE", "IT"]);
    assert_eq!(t.rows[0].rank, RankMarker::Position(2));
    assert!(t.rows[0].highlighted);
}

#[test]
fn world_row_keeps_marker_among_countries() {
    let m = meta("w", SortPolicy::Higher);
    let series = vec![rec("World", 2021, 50.0), rec("FR", 2021, 2.0), rec("DE", 2021, 3.0)];
    let countries = names(&["DE", "FR", "World"]);
    let aux = AuxStores::default();
    let t = build_table(&table_input(&m, &countries, &series, &[], &aux));
    let ranks: Vec<String> = t.rows.iter().map(|r| r.rank.to_string()).collect();
    assert_eq!(ranks, vec!["🌍", "1", "2"]);
}

/* ------------------------------- Properties -------------------------------- */

const POOL: [&str; 8] = ["AT", "BE", "CH", "DE", "ES", "FR", "IT", "NL"];

fn arb_series() -> impl Strategy<Value = Vec<IndicatorRecord>> {
    proptest::collection::vec((0usize..POOL.len(), 2015i32..2023, -1e6f64..1e6), 0..40).prop_map(|pts| {
        pts.into_iter().map(|(c, y, v)| IndicatorRecord::new(POOL[c], y, Some(v))).collect()
    })
}

proptest! {
    #[test]
    fn rows_exist_iff_records_exist(series in arb_series()) {
        let m = meta("p", SortPolicy::Higher);
        let countries = names(&POOL);
        let aux = AuxStores::default();
        let t = build_table(&table_input(&m, &countries, &series, &[], &aux));

        let with_data: BTreeSet<&str> = series.iter().map(|r| r.country.as_str()).collect();
        let with_rows: BTreeSet<&str> = t.rows.iter().map(|r| r.country.as_str()).collect();
        prop_assert_eq!(t.rows.len(), with_rows.len());
        prop_assert_eq!(with_data, with_rows);
    }

    #[test]
    fn target_policy_orders_by_deviation(series in arb_series(), target in -1e6f64..1e6) {
        let mut m = meta("t", SortPolicy::Target);
        m.target_value = Some(target);
        let countries = names(&POOL);
        let aux = AuxStores::default();
        let t = build_table(&table_input(&m, &countries, &series, &[], &aux));

        let devs: Vec<f64> = t.rows.iter().filter_map(|r| r.value).map(|v| (v - target).abs()).collect();
        for pair in devs.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn composite_respects_coverage(series_a in arb_series(), series_b in arb_series()) {
        let metas = vec![meta("a", SortPolicy::Higher), meta("b", SortPolicy::Lower)];
        let mut store = IndicatorStore::new();
        store.insert("a".parse().unwrap(), series_a);
        store.insert("b".parse().unwrap(), series_b);
        let snap = RelevanceSnapshot::build(&metas, &BTreeMap::new());
        let params = RankingParams::default();
        let r = rank_composite(&RankingInput { metas: &metas, store: &store, relevance: &snap, params: &params });
        for e in &r.entries {
            prop_assert!(e.coverage >= 0.6);
            prop_assert!(e.score.is_finite());
            prop_assert!((0.0..=1.0).contains(&e.score));
        }
    }
}
