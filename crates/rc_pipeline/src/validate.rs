//! crates/rc_pipeline/src/validate.rs
//! Metadata validation: raw wire entries → typed `IndicatorMeta` plus a report.
//!
//! Rules in this layer:
//! - Identity resolution order: `filename`, `id`, object key, normalized `title`.
//! - Errors (abort loading): no usable identity, invalid id, duplicate id.
//! - Warnings (logged, reported, loading continues):
//!   unknown sort policy (→ neutral), target policy without a target value (→ 0),
//!   relation marker other than `*` / `-` / empty, unknown relevance tier (→ normal),
//!   empty title (→ id).
//! - Issue order is deterministic (entity, then code, then message).

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use rc_core::determinism::sort_canonical;
use rc_core::{IndicatorId, IndicatorMeta, Relevance, ScaleMode, SortPolicy, WorldScope};
use rc_io::RawMeta;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum EntityRef {
    /// Position of the entry in the metadata file.
    Entry(usize),
    Indicator(IndicatorId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// pass = no Error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

/// Validate raw entries; returns the usable metadata (canonical id order) and the report.
///
/// Entries with errors are left out of the returned list.
pub fn validate_meta(raw: &[RawMeta]) -> (Vec<IndicatorMeta>, ValidationReport) {
    let mut issues = Vec::new();
    let mut metas: Vec<IndicatorMeta> = Vec::with_capacity(raw.len());
    let mut seen: BTreeSet<IndicatorId> = BTreeSet::new();

    for (i, entry) in raw.iter().enumerate() {
        let Some(meta) = convert(i, entry, &mut issues) else { continue };
        if !seen.insert(meta.id.clone()) {
            issues.push(issue(
                Severity::Error,
                "Meta.DuplicateId",
                format!("indicator id `{}` is defined more than once", meta.id),
                EntityRef::Indicator(meta.id.clone()),
            ));
            continue;
        }
        metas.push(meta);
    }

    sort_canonical(&mut metas);
    issues.sort_by(|a, b| {
        a.where_
            .cmp(&b.where_)
            .then_with(|| a.code.cmp(b.code))
            .then_with(|| a.message.cmp(&b.message))
    });
    for w in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(code = w.code, "{}", w.message);
    }

    let pass = !issues.iter().any(|i| i.severity == Severity::Error);
    (metas, ValidationReport { pass, issues })
}

fn issue(severity: Severity, code: &'static str, message: String, where_: EntityRef) -> ValidationIssue {
    ValidationIssue { severity, code, message, where_ }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn convert(index: usize, raw: &RawMeta, issues: &mut Vec<ValidationIssue>) -> Option<IndicatorMeta> {
    let title = non_empty(&raw.title);
    let explicit = non_empty(&raw.filename).or_else(|| non_empty(&raw.id)).or_else(|| non_empty(&raw.key));

    let id = match (explicit, title) {
        (Some(s), _) => match s.parse::<IndicatorId>() {
            Ok(id) => id,
            Err(e) => {
                issues.push(issue(
                    Severity::Error,
                    "Meta.InvalidId",
                    format!("indicator id `{s}`: {e}"),
                    EntityRef::Entry(index),
                ));
                return None;
            }
        },
        (None, Some(t)) => IndicatorId::from_title(t),
        (None, None) => {
            issues.push(issue(
                Severity::Error,
                "Meta.NoIdentity",
                "entry has neither filename, id nor title".to_string(),
                EntityRef::Entry(index),
            ));
            return None;
        }
    };
    let at = || EntityRef::Indicator(id.clone());

    let title = match title {
        Some(t) => t.to_string(),
        None => {
            issues.push(issue(Severity::Warning, "Meta.EmptyTitle", format!("`{id}` has no title"), at()));
            id.to_string()
        }
    };

    let sort_token = raw.sort.as_deref().unwrap_or_default();
    let (sort, known) = SortPolicy::from_token(sort_token);
    if !known {
        issues.push(issue(
            Severity::Warning,
            "Meta.UnknownSort",
            format!("`{id}`: unknown sort policy `{sort_token}`, treated as neutral"),
            at(),
        ));
    }
    if sort == SortPolicy::Target && raw.target_value.is_none() {
        issues.push(issue(
            Severity::Warning,
            "Meta.TargetMissing",
            format!("`{id}`: target policy without target_value, target is 0"),
            at(),
        ));
    }

    let marker = raw.relation.as_deref().map(str::trim).unwrap_or_default();
    if !matches!(marker, "*" | "-" | "") {
        issues.push(issue(
            Severity::Warning,
            "Meta.RelationMarker",
            format!("`{id}`: relation marker `{marker}` is neither `*` nor `-`, not relation-eligible"),
            at(),
        ));
    }

    let tier_token = raw.relevance.as_deref().unwrap_or_default();
    let (relevance, known) = Relevance::from_token(tier_token);
    if !known {
        issues.push(issue(
            Severity::Warning,
            "Meta.UnknownRelevance",
            format!("`{id}`: unknown relevance `{tier_token}`, treated as normal"),
            at(),
        ));
    }

    Some(IndicatorMeta {
        title,
        cluster: raw.cluster.as_deref().map(str::trim).unwrap_or_default().to_string(),
        unit: raw.unit.as_deref().map(str::trim).unwrap_or_default().to_string(),
        sort,
        target_value: raw.target_value,
        scale: ScaleMode::from_token(raw.scale.as_deref().unwrap_or_default()),
        relation_eligible: marker == "*",
        relevance,
        world: WorldScope::from_token(raw.world_kpi.as_deref().unwrap_or_default()),
        id,
    })
}
