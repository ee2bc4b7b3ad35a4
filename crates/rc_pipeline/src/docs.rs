//! Result documents with content-derived ids.
//!
//! Each document is hashed over its id-less body (canonical JSON), so two
//! runs over identical inputs produce byte-identical output.
//! - `TableDoc.id`   = `TBL:<sha256(body)>`
//! - `RankingDoc.id` = `RNK:<sha256(body)>`; the body also carries the digest
//!   of the relevance snapshot the ranking was computed from.

use serde::Serialize;

use rc_algo::{ChartSeries, CompositeRanking, IndicatorTable};
use rc_core::{IndicatorId, IndicatorRecord, RankingParams, RelationMode, RelevanceSnapshot, SortPolicy};
use rc_io::hasher::{rnk_id, sha256_canonical, tbl_id};

use crate::PipelineResult;

/// Id-less payload of an indicator view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableBody {
    pub indicator: IndicatorId,
    pub title: String,
    pub cluster: String,
    pub unit: String,
    pub sort: SortPolicy,
    /// Relation the caller asked for; `table.relation` is the one applied.
    pub relation_requested: RelationMode,
    pub relation_available: bool,
    /// Comparison-year choices, newest first.
    pub comparison_years: Vec<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_legend: Option<String>,
    pub table: IndicatorTable,
    pub chart: ChartSeries,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub world: Vec<IndicatorRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableDoc {
    pub id: String,
    #[serde(flatten)]
    pub body: TableBody,
}

impl TableDoc {
    pub fn from_body(body: TableBody) -> PipelineResult<Self> {
        Ok(Self { id: tbl_id(&body)?, body })
    }
}

/// Id-less payload of a composite ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingBody {
    pub weights_sha256: String,
    pub relevance: RelevanceSnapshot,
    pub params: RankingParams,
    pub ranking: CompositeRanking,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingDoc {
    pub id: String,
    #[serde(flatten)]
    pub body: RankingBody,
}

impl RankingDoc {
    pub fn build(
        relevance: &RelevanceSnapshot,
        params: &RankingParams,
        ranking: CompositeRanking,
    ) -> PipelineResult<Self> {
        let body = RankingBody {
            weights_sha256: sha256_canonical(relevance)?,
            relevance: relevance.clone(),
            params: params.clone(),
            ranking,
        };
        Ok(Self { id: rnk_id(&body)?, body })
    }
}
