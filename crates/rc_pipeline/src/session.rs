//! crates/rc_pipeline/src/session.rs
//!
//! The session context: everything loaded once, plus the small amount of
//! user state (relevance overrides, home country). Views are pure functions
//! of this value; changing user state never mutates loaded data.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use rc_algo::{
    build_table, chart_series, comparison_years, rank_composite, world_series, RankingInput, SortState,
    TableInput,
};
use rc_core::{
    AuxStore, AuxStores, CountryGroup, CountryInfo, IndicatorId, IndicatorMeta, IndicatorStore,
    RankingParams, RelationMode, Relevance, RelevanceSnapshot, WorldScope,
};
use rc_io::manifest::ResolvedManifest;
use rc_io::{load_aux, load_countries, load_groups, load_manifest, load_meta, load_store, Preferences};

use crate::docs::{RankingDoc, TableBody, TableDoc};
use crate::validate::{validate_meta, ValidationReport};
use crate::{PipelineError, PipelineResult};

/// What one indicator view should show.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewRequest {
    /// Indicator id (a title is accepted and normalized).
    pub indicator: String,
    pub relation: RelationMode,
    pub comparison_year: Option<i32>,
    pub sort: Option<SortState>,
    /// Countries for the chart (at most three are drawn).
    pub chart_countries: Vec<String>,
}

/// Entry of the indicator picker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct IndicatorOption {
    pub id: IndicatorId,
    pub title: String,
    pub cluster: String,
    pub relation_eligible: bool,
    pub has_data: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    metas: Vec<IndicatorMeta>,
    report: ValidationReport,
    store: IndicatorStore,
    countries: BTreeMap<String, CountryInfo>,
    country_names: Vec<String>,
    groups: Vec<CountryGroup>,
    aux: AuxStores,
    params: RankingParams,
    relevance: RelevanceSnapshot,
    home_country: Option<String>,
    preferences_path: Option<PathBuf>,
}

impl Session {
    /// Session over already-loaded data with default user state.
    pub fn new(
        metas: Vec<IndicatorMeta>,
        store: IndicatorStore,
        countries: BTreeMap<String, CountryInfo>,
        groups: Vec<CountryGroup>,
        aux: AuxStores,
        params: RankingParams,
    ) -> Self {
        let relevance = RelevanceSnapshot::build(&metas, &BTreeMap::new());
        let country_names = countries.keys().cloned().collect();
        Self {
            metas,
            report: ValidationReport { pass: true, issues: Vec::new() },
            store,
            countries,
            country_names,
            groups,
            aux,
            params,
            relevance,
            home_country: None,
            preferences_path: None,
        }
    }

    /// Load everything a manifest names. Preferences are applied when the
    /// manifest points at an existing preferences file.
    pub fn load(manifest_path: &Path) -> PipelineResult<Self> {
        let manifest = load_manifest(manifest_path)?;
        Self::from_manifest(&manifest)
    }

    pub fn from_manifest(m: &ResolvedManifest) -> PipelineResult<Self> {
        m.ranking.validate_domains()?;

        let raw = load_meta(&m.meta)?;
        let (metas, report) = validate_meta(&raw);
        if !report.pass {
            let msg = report.errors().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ");
            return Err(PipelineError::Validate(msg));
        }

        let countries = load_countries(&m.countries)?;
        let groups = match &m.groups {
            Some(p) => load_groups(p)?,
            None => Vec::new(),
        };
        let aux_from = |p: &Option<PathBuf>| -> PipelineResult<AuxStore> {
            Ok(match p {
                Some(p) => load_aux(p)?,
                None => AuxStore::default(),
            })
        };
        let aux = AuxStores { population: aux_from(&m.population)?, gdp: aux_from(&m.gdp)?, area: aux_from(&m.area)? };

        let ids: Vec<IndicatorId> = metas.iter().map(|meta| meta.id.clone()).collect();
        let store = load_store(&m.store, &ids)?.store;

        info!(
            indicators = metas.len(),
            with_series = store.len(),
            countries = countries.len(),
            groups = groups.len(),
            warnings = report.issues.len(),
            "session loaded"
        );

        let mut session = Self::new(metas, store, countries, groups, aux, m.ranking.clone());
        session.report = report;
        session.preferences_path = m.preferences.clone();
        if let Some(p) = &m.preferences {
            session.apply_preferences(&Preferences::load(p)?);
        }
        Ok(session)
    }

    /* ------------------------------- accessors ------------------------------- */

    pub fn metas(&self) -> &[IndicatorMeta] {
        &self.metas
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn store(&self) -> &IndicatorStore {
        &self.store
    }

    pub fn countries(&self) -> &BTreeMap<String, CountryInfo> {
        &self.countries
    }

    pub fn groups(&self) -> &[CountryGroup] {
        &self.groups
    }

    pub fn params(&self) -> &RankingParams {
        &self.params
    }

    pub fn relevance(&self) -> &RelevanceSnapshot {
        &self.relevance
    }

    pub fn home_country(&self) -> Option<&str> {
        self.home_country.as_deref()
    }

    pub fn preferences_path(&self) -> Option<&Path> {
        self.preferences_path.as_deref()
    }

    /// Look an indicator up by id, then by title, then by the id its title normalizes to.
    pub fn meta(&self, key: &str) -> PipelineResult<&IndicatorMeta> {
        let key = key.trim();
        self.metas
            .iter()
            .find(|m| m.id.as_str() == key)
            .or_else(|| self.metas.iter().find(|m| m.title.eq_ignore_ascii_case(key)))
            .or_else(|| {
                let normalized = IndicatorId::from_title(key);
                self.metas.iter().find(|m| m.id == normalized)
            })
            .ok_or_else(|| PipelineError::UnknownIndicator(key.to_string()))
    }

    fn check_country(&self, name: &str) -> PipelineResult<()> {
        if self.countries.contains_key(name) {
            Ok(())
        } else {
            Err(PipelineError::UnknownCountry(name.to_string()))
        }
    }

    /* ------------------------------- user state ------------------------------ */

    /// Merge persisted preferences. Overrides for unknown indicators and an
    /// unknown home country are dropped with a warning.
    pub fn apply_preferences(&mut self, prefs: &Preferences) {
        for id in prefs.weights.keys().filter(|id| !self.metas.iter().any(|m| &m.id == *id)) {
            warn!(indicator = %id, "relevance override for unknown indicator ignored");
        }
        self.relevance = RelevanceSnapshot::build(&self.metas, &prefs.weights);
        self.home_country = match prefs.home_country.as_deref() {
            Some(h) if self.countries.contains_key(h) => Some(h.to_string()),
            Some(h) => {
                warn!(country = %h, "stored home country is not in the country list");
                None
            }
            None => None,
        };
    }

    /// Current user state in persistable form (only non-default tiers).
    pub fn preferences(&self) -> Preferences {
        Preferences { weights: self.relevance.overrides(&self.metas), home_country: self.home_country.clone() }
    }

    pub fn save_preferences(&self, path: &Path) -> PipelineResult<()> {
        self.preferences().save(path)?;
        Ok(())
    }

    pub fn set_relevance(&mut self, indicator: &str, tier: Relevance) -> PipelineResult<()> {
        let id = self.meta(indicator)?.id.clone();
        debug!(indicator = %id, tier = %tier, "relevance changed");
        self.relevance.set(id, tier);
        Ok(())
    }

    /// Back to metadata defaults.
    pub fn reset_relevance(&mut self) {
        self.relevance = RelevanceSnapshot::build(&self.metas, &BTreeMap::new());
    }

    pub fn set_home_country(&mut self, country: Option<&str>) -> PipelineResult<()> {
        if let Some(c) = country {
            self.check_country(c)?;
        }
        self.home_country = country.map(str::to_string);
        Ok(())
    }

    /* --------------------------------- views --------------------------------- */

    /// Indicators offered for selection: world-only indicators are left out;
    /// ordered by cluster (empty cluster reads as "Other"), then title.
    pub fn indicator_options(&self) -> Vec<IndicatorOption> {
        let mut out: Vec<IndicatorOption> = self
            .metas
            .iter()
            .filter(|m| m.world != WorldScope::WorldOnly)
            .map(|m| IndicatorOption {
                id: m.id.clone(),
                title: m.title.clone(),
                cluster: if m.cluster.is_empty() { "Other".to_string() } else { m.cluster.clone() },
                relation_eligible: m.relation_eligible,
                has_data: !self.store.records(&m.id).is_empty(),
            })
            .collect();
        out.sort_by(|a, b| a.cluster.cmp(&b.cluster).then_with(|| a.title.cmp(&b.title)));
        out
    }

    /// Build the full indicator view.
    pub fn table(&self, req: &ViewRequest) -> PipelineResult<TableDoc> {
        let meta = self.meta(&req.indicator)?;
        for c in &req.chart_countries {
            self.check_country(c)?;
        }
        let series = self.store.records(&meta.id);
        let years = comparison_years(series);
        if let Some(y) = req.comparison_year.filter(|y| !years.contains(y)) {
            debug!(indicator = %meta.id, year = y, "comparison year has no records");
        }

        let table = build_table(&TableInput {
            meta,
            countries: &self.country_names,
            series,
            groups: &self.groups,
            aux: &self.aux,
            relation: req.relation,
            comparison_year: req.comparison_year,
            sort: req.sort,
            home_country: self.home_country.as_deref(),
        });

        let mut seen = BTreeSet::new();
        let chart_countries: Vec<&str> = req
            .chart_countries
            .iter()
            .map(String::as_str)
            .filter(|c| seen.insert(*c))
            .collect();
        let chart = chart_series(series, &chart_countries, meta, req.relation, &self.aux);
        let world = if meta.world.has_world_series() { world_series(series) } else { Vec::new() };

        let scale_legend = table
            .scale
            .filter(|s| !s.suffix.is_empty())
            .map(|s| format!("Values in {} ({})", s.suffix, s.legend()));

        debug!(indicator = %meta.id, rows = table.rows.len(), relation = %table.relation, "table built");
        TableDoc::from_body(TableBody {
            indicator: meta.id.clone(),
            title: meta.title.clone(),
            cluster: meta.cluster.clone(),
            unit: meta.unit.clone(),
            sort: meta.sort,
            relation_requested: req.relation,
            relation_available: meta.relation_eligible,
            comparison_years: years,
            scale_legend,
            table,
            chart,
            world,
        })
    }

    /// Composite ranking over the current relevance snapshot.
    pub fn ranking(&self) -> PipelineResult<RankingDoc> {
        let ranking = rank_composite(&RankingInput {
            metas: &self.metas,
            store: &self.store,
            relevance: &self.relevance,
            params: &self.params,
        });
        info!(
            countries = ranking.entries.len(),
            used = ranking.used_count(),
            eligible = ranking.eligible_count,
            missing = ranking.missing.len(),
            "composite ranking computed"
        );
        RankingDoc::build(&self.relevance, &self.params, ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{IndicatorRecord, SortPolicy};

    fn session() -> Session {
        let mut a = IndicatorMeta::new("a".parse().unwrap(), "Alpha", SortPolicy::Higher);
        a.cluster = "Economy".into();
        let mut w = IndicatorMeta::new("w".parse().unwrap(), "World only", SortPolicy::Higher);
        w.world = WorldScope::WorldOnly;
        let b = IndicatorMeta::new("b".parse().unwrap(), "Beta", SortPolicy::Lower);
        let store: IndicatorStore = [(
            "a".parse::<IndicatorId>().unwrap(),
            vec![IndicatorRecord::new("France", 2021, Some(2.0)), IndicatorRecord::new("Germany", 2021, Some(1.0))],
        )]
        .into_iter()
        .collect();
        let countries = ["France", "Germany"].iter().map(|c| (c.to_string(), CountryInfo::default())).collect();
        Session::new(vec![a, b, w], store, countries, Vec::new(), AuxStores::default(), RankingParams::default())
    }

    #[test]
    fn lookup_by_id_or_title() {
        let s = session();
        assert_eq!(s.meta("a").unwrap().title, "Alpha");
        assert_eq!(s.meta("Beta").unwrap().id.as_str(), "b");
        assert!(matches!(s.meta("zzz"), Err(PipelineError::UnknownIndicator(_))));
    }

    #[test]
    fn options_skip_world_only_and_flag_data() {
        let opts = session().indicator_options();
        let ids: Vec<&str> = opts.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(opts[0].has_data);
        assert!(!opts[1].has_data);
        assert_eq!(opts[1].cluster, "Other");
    }

    #[test]
    fn user_state_round_trips_through_preferences() {
        let mut s = session();
        s.set_relevance("a", Relevance::VeryHigh).unwrap();
        s.set_home_country(Some("France")).unwrap();
        assert!(matches!(s.set_home_country(Some("Atlantis")), Err(PipelineError::UnknownCountry(_))));
        let p = s.preferences();
        assert_eq!(p.weights.len(), 1);
        assert_eq!(p.home_country.as_deref(), Some("France"));

        let mut fresh = session();
        fresh.apply_preferences(&p);
        assert_eq!(fresh.relevance(), s.relevance());
        fresh.reset_relevance();
        assert!(fresh.preferences().weights.is_empty());
    }

    #[test]
    fn unknown_chart_country_is_rejected() {
        let s = session();
        let req = ViewRequest { indicator: "a".into(), chart_countries: vec!["Mars".into()], ..ViewRequest::default() };
        assert!(matches!(s.table(&req), Err(PipelineError::UnknownCountry(_))));
    }
}
