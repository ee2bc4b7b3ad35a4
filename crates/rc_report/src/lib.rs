//! rc_report — display model + renderers (JSON / HTML) for result documents.
//!
//! Rules in this layer:
//! - No I/O and no recomputation. Callers hand in the documents produced by
//!   `rc_pipeline`; every number shown here was formatted upstream or is
//!   formatted once, here, from the document.
//! - JSON output is the document itself. Display-only decorations (medal
//!   tags, top/bottom bands, reason sentences) live in the display model and
//!   the HTML output only.
//! - Medals and bands belong to the composite ranking; indicator tables show
//!   plain positions and the world/group markers.
//! - Row order is the document's order.

#![forbid(unsafe_code)]

use serde::Serialize;

use rc_algo::{format_value_auto, MissingReason};
use rc_core::ScaleMode;
use rc_pipeline::{RankingDoc, TableDoc};

#[cfg(feature = "render_html")]
mod html;

#[cfg(feature = "render_html")]
pub use html::{render_ranking_html, render_table_html};

// ===== Errors =====

#[derive(Debug)]
pub enum ReportError {
    /// Template registration or rendering failed.
    Template(String),
    /// The document could not be serialized.
    Serialize(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Template(m) => write!(f, "template: {m}"),
            ReportError::Serialize(m) => write!(f, "serialize: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Display helpers =====

/// Medal tag for the podium places; empty otherwise.
pub fn medal(rank: u32) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    }
}

/// Ranks at each end of the composite ranking that get highlighted.
pub const BAND_SIZE: u32 = 10;

/// Composite rank text: medal + position on the podium, bare position otherwise.
pub fn podium_label(n: u32) -> String {
    match medal(n) {
        "" => n.to_string(),
        m => format!("{m} {n}"),
    }
}

/// One sentence per reason, for the missing-indicators list.
pub fn missing_reason_text(reason: &MissingReason) -> String {
    match reason {
        MissingReason::NoData => "no data".to_string(),
        MissingReason::LoadFailed { reason } => format!("could not be loaded ({reason})"),
        MissingReason::TooFewCountries { found: 1 } => "data for 1 country only".to_string(),
        MissingReason::TooFewCountries { found } => format!("data for {found} countries only"),
    }
}

// ===== Model =====

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRowView {
    pub rank: String,
    pub country: String,
    pub value: String,
    pub delta_prior_abs: String,
    pub delta_prior_pct: String,
    pub trend: &'static str,
    pub delta_comparison: String,
    pub latest_year: i32,
    pub is_group: bool,
    pub is_world: bool,
    pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldPointView {
    pub year: i32,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableView {
    pub id: String,
    pub title: String,
    pub cluster: String,
    pub unit: String,
    pub relation: &'static str,
    /// Set when the requested relation could not be applied.
    pub relation_note: Option<String>,
    pub comparison_year: Option<i32>,
    pub legend: Option<String>,
    pub rows: Vec<TableRowView>,
    pub world: Vec<WorldPointView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingRowView {
    pub rank: String,
    /// Among the first `BAND_SIZE` places.
    pub top: bool,
    /// Among the last `BAND_SIZE` places.
    pub bottom: bool,
    pub country: String,
    pub score: String,
    pub coverage: String,
    pub indicators_used: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsedView {
    pub title: String,
    pub relevance: &'static str,
    pub countries: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissingView {
    pub title: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingView {
    pub id: String,
    pub weights_sha256: String,
    pub rows: Vec<RankingRowView>,
    pub eligible_count: usize,
    pub used: Vec<UsedView>,
    pub missing: Vec<MissingView>,
    pub below_coverage: usize,
}

pub fn table_view(doc: &TableDoc) -> TableView {
    let body = &doc.body;
    let table = &body.table;
    let rows = table
        .rows
        .iter()
        .map(|r| TableRowView {
            rank: r.rank.to_string(),
            country: r.country.clone(),
            value: r.value_display.clone(),
            delta_prior_abs: r.delta_prior_abs_display.clone(),
            delta_prior_pct: r.delta_prior_pct_display.clone(),
            trend: r.trend.arrow(),
            delta_comparison: r.delta_comparison_display.clone(),
            latest_year: r.latest_year,
            is_group: r.is_group,
            is_world: r.is_world,
            highlighted: r.highlighted,
        })
        .collect();

    let relation_note = (body.relation_requested != table.relation).then(|| {
        format!("{} is not available for this indicator; absolute values shown", body.relation_requested)
    });

    TableView {
        id: doc.id.clone(),
        title: body.title.clone(),
        cluster: body.cluster.clone(),
        unit: body.unit.clone(),
        relation: table.relation.as_token(),
        relation_note,
        comparison_year: table.comparison_year,
        legend: body.scale_legend.clone(),
        rows,
        world: body
            .world
            .iter()
            .map(|p| WorldPointView { year: p.year, value: format_value_auto(p.numeric(), &ScaleMode::Auto) })
            .collect(),
    }
}

pub fn ranking_view(doc: &RankingDoc) -> RankingView {
    let ranking = &doc.body.ranking;
    let total = ranking.entries.len() as u32;
    RankingView {
        id: doc.id.clone(),
        weights_sha256: doc.body.weights_sha256.clone(),
        rows: ranking
            .entries
            .iter()
            .map(|e| RankingRowView {
                rank: podium_label(e.rank),
                top: e.rank <= BAND_SIZE,
                bottom: e.rank + BAND_SIZE > total,
                country: e.country.clone(),
                score: format!("{:.3}", e.score),
                coverage: format!("{:.0}%", e.coverage * 100.0),
                indicators_used: e.indicators_used,
            })
            .collect(),
        eligible_count: ranking.eligible_count,
        used: ranking
            .used
            .iter()
            .map(|u| UsedView { title: u.title.clone(), relevance: u.relevance.as_token(), countries: u.countries })
            .collect(),
        missing: ranking
            .missing
            .iter()
            .map(|m| MissingView { title: m.title.clone(), reason: missing_reason_text(&m.reason) })
            .collect(),
        below_coverage: ranking.below_coverage,
    }
}

// ===== JSON renderers =====

/// Pretty JSON of the document (field order follows struct layout).
#[cfg(feature = "render_json")]
pub fn render_table_json(doc: &TableDoc) -> Result<String, ReportError> {
    serde_json::to_string_pretty(doc).map_err(|e| ReportError::Serialize(e.to_string()))
}

#[cfg(feature = "render_json")]
pub fn render_ranking_json(doc: &RankingDoc) -> Result<String, ReportError> {
    serde_json::to_string_pretty(doc).map_err(|e| ReportError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn podium_gets_medals() {
        assert_eq!(podium_label(1), "🥇 1");
        assert_eq!(podium_label(3), "🥉 3");
        assert_eq!(podium_label(4), "4");
        assert_eq!(medal(0), "");
    }

    #[test]
    fn reason_sentences() {
        assert_eq!(missing_reason_text(&MissingReason::NoData), "no data");
        assert_eq!(
            missing_reason_text(&MissingReason::TooFewCountries { found: 1 }),
            "data for 1 country only"
        );
        assert_eq!(
            missing_reason_text(&MissingReason::LoadFailed { reason: "bad gzip".into() }),
            "could not be loaded (bad gzip)"
        );
    }
}
