use rc_core::{AuxStores, CountryInfo, IndicatorId, IndicatorMeta, IndicatorRecord, IndicatorStore, RankingParams, SortPolicy};
use rc_pipeline::{Session, ViewRequest};
use rc_report::{ranking_view, render_ranking_html, render_ranking_json, render_table_html, render_table_json, table_view};

fn session() -> Session {
    let mut gdp = IndicatorMeta::new("gdp".parse().unwrap(), "GDP <nominal>", SortPolicy::Higher);
    gdp.unit = "USD".into();
    let beta = IndicatorMeta::new("beta".parse().unwrap(), "Beta", SortPolicy::Lower);
    let store: IndicatorStore = [(
        "gdp".parse::<IndicatorId>().unwrap(),
        vec![
            IndicatorRecord::new("France", 2021, Some(2.0)),
            IndicatorRecord::new("Germany", 2021, Some(1.0)),
            IndicatorRecord::new("Italy", 2021, Some(3.0)),
        ],
    )]
    .into_iter()
    .collect();
    let countries = ["France", "Germany", "Italy"].iter().map(|c| (c.to_string(), CountryInfo::default())).collect();
    let params = RankingParams { coverage_threshold: 0.0, ..RankingParams::default() };
    Session::new(vec![gdp, beta], store, countries, Vec::new(), AuxStores::default(), params)
}

fn gdp_view() -> ViewRequest {
    ViewRequest { indicator: "gdp".into(), ..ViewRequest::default() }
}

#[test]
fn table_ranks_are_plain_positions() {
    let doc = session().table(&gdp_view()).unwrap();
    let view = table_view(&doc);
    let ranks: Vec<&str> = view.rows.iter().map(|r| r.rank.as_str()).collect();
    assert_eq!(ranks, vec!["1", "2", "3"]);
    assert_eq!(view.rows[0].country, "Italy");
    assert_eq!(view.relation, "absolute");
    assert!(view.relation_note.is_none());
}

#[test]
fn table_html_escapes_content() {
    let doc = session().table(&gdp_view()).unwrap();
    let html = render_table_html(&doc).unwrap();
    assert!(html.contains("GDP &lt;nominal&gt;"));
    assert!(!html.contains("<nominal>"));
    assert!(html.contains("<td>1</td><td>Italy</td>"));
    assert!(html.contains(&doc.id));
}

#[test]
fn ranking_lists_missing_indicators() {
    let doc = session().ranking().unwrap();
    let view = ranking_view(&doc);
    let countries: Vec<&str> = view.rows.iter().map(|r| r.country.as_str()).collect();
    assert_eq!(countries, vec!["Italy", "France", "Germany"]);
    let ranks: Vec<&str> = view.rows.iter().map(|r| r.rank.as_str()).collect();
    assert_eq!(ranks, vec!["🥇 1", "🥈 2", "🥉 3"]);
    assert!(view.rows.iter().all(|r| r.top && r.bottom));
    assert_eq!(view.missing.len(), 1);
    assert_eq!(view.missing[0].title, "Beta");
    assert_eq!(view.missing[0].reason, "no data");

    let html = render_ranking_html(&doc).unwrap();
    assert!(html.contains("<li>Beta: no data</li>"));
    assert!(html.contains("1 of 2 indicators used"));
    assert!(html.contains(r#"<tr class="top10 flop10"><td>🥇 1</td><td>Italy</td>"#));
}

#[test]
fn ranking_bands_split_long_lists() {
    let gdp = IndicatorMeta::new("gdp".parse().unwrap(), "GDP", SortPolicy::Higher);
    let names: Vec<String> = (0..25).map(|i| format!("C{i:02}")).collect();
    let records: Vec<IndicatorRecord> = names.iter().enumerate().map(|(i, c)| IndicatorRecord::new(c, 2021, Some(i as f64))).collect();
    let store: IndicatorStore = [("gdp".parse::<IndicatorId>().unwrap(), records)].into_iter().collect();
    let countries = names.iter().map(|c| (c.clone(), CountryInfo::default())).collect();
    let params = RankingParams { coverage_threshold: 0.0, ..RankingParams::default() };
    let s = Session::new(vec![gdp], store, countries, Vec::new(), AuxStores::default(), params);

    let view = ranking_view(&s.ranking().unwrap());
    assert_eq!(view.rows.len(), 25);
    let top = view.rows.iter().filter(|r| r.top).count();
    let bottom = view.rows.iter().filter(|r| r.bottom).count();
    assert_eq!((top, bottom), (10, 10));
    assert!(view.rows[9].top && !view.rows[10].top);
    assert!(!view.rows[14].bottom && view.rows[15].bottom);
    assert_eq!(view.rows[3].rank, "4");
}

#[test]
fn empty_ranking_says_so() {
    let gdp = IndicatorMeta::new("gdp".parse().unwrap(), "GDP", SortPolicy::Higher);
    let s = Session::new(
        vec![gdp],
        IndicatorStore::default(),
        Default::default(),
        Vec::new(),
        AuxStores::default(),
        RankingParams::default(),
    );
    let html = render_ranking_html(&s.ranking().unwrap()).unwrap();
    assert!(html.contains("No countries meet the data coverage requirement."));
}

#[test]
fn json_is_the_document() {
    let s = session();
    let table = s.table(&gdp_view()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&render_table_json(&table).unwrap()).unwrap();
    assert_eq!(v["id"], serde_json::json!(table.id));
    assert_eq!(v["table"]["rows"][0]["rank"], serde_json::json!(1));

    let ranking = s.ranking().unwrap();
    let v: serde_json::Value = serde_json::from_str(&render_ranking_json(&ranking).unwrap()).unwrap();
    assert_eq!(v["id"], serde_json::json!(ranking.id));
    assert_eq!(v["ranking"]["entries"][0]["country"], serde_json::json!("Italy"));
}
