//! crates/rc_io/src/manifest.rs
//!
//! Data manifest: one JSON file naming every input of a session.
//!
//! Rules:
//! - All paths are offline (no URL schemes) and resolve relative to the manifest's directory.
//! - `meta` and `countries` are required; `groups`, `population`, `gdp`, `area` are optional
//!   (absent stores load as empty).
//! - Exactly one of `kpi_index` (split-part index) or `kpi_dir` (one `<id>.json` per indicator).
//! - `preferences` may name a file that does not exist yet (first run).
//! - `ranking` carries composite parameters; omitted fields take their defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use rc_core::RankingParams;

use crate::{looks_like_url_strict, IoError, IoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataManifest {
    pub meta: String,
    pub countries: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    #[serde(default)]
    pub ranking: RankingParams,
}

/// Where indicator series come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    /// Index file whose `parts` list store part files.
    Index(PathBuf),
    /// Directory holding `<id>.json` per indicator.
    Dir(PathBuf),
}

/// Manifest with every path joined under its base directory and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedManifest {
    pub meta: PathBuf,
    pub countries: PathBuf,
    pub groups: Option<PathBuf>,
    pub population: Option<PathBuf>,
    pub gdp: Option<PathBuf>,
    pub area: Option<PathBuf>,
    pub store: StoreSource,
    pub preferences: Option<PathBuf>,
    pub ranking: RankingParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    Empty(&'static str),
    UrlPath(&'static str, String),
    StoreSource,
    NotAFile(&'static str, String),
    NotADir(&'static str, String),
    Access(&'static str, String),
    Params(String),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ManifestError::*;
        match self {
            Empty(k) => write!(f, "field must not be empty: {k}"),
            UrlPath(k, v) => write!(f, "path must be offline (no scheme) for {k}: {v}"),
            StoreSource => write!(f, "exactly one of kpi_index or kpi_dir is required"),
            NotAFile(k, v) => write!(f, "path is not a file for {k}: {v}"),
            NotADir(k, v) => write!(f, "path is not a directory for {k}: {v}"),
            Access(k, v) => write!(f, "cannot access {k}: {v}"),
            Params(msg) => write!(f, "ranking parameters: {msg}"),
        }
    }
}

impl std::error::Error for ManifestError {}

/* ------------------------------- validation -------------------------------- */

/// Shape and offline policy. No filesystem access.
pub fn validate_manifest(man: &DataManifest) -> Result<(), ManifestError> {
    check_path("meta", &man.meta)?;
    check_path("countries", &man.countries)?;
    let optional = [
        ("groups", &man.groups),
        ("population", &man.population),
        ("gdp", &man.gdp),
        ("area", &man.area),
        ("kpi_index", &man.kpi_index),
        ("kpi_dir", &man.kpi_dir),
        ("preferences", &man.preferences),
    ];
    for (label, value) in optional {
        if let Some(s) = value {
            check_path(label, s)?;
        }
    }
    if man.kpi_index.is_some() == man.kpi_dir.is_some() {
        return Err(ManifestError::StoreSource);
    }
    man.ranking.validate_domains().map_err(|e| ManifestError::Params(e.to_string()))
}

fn check_path(label: &'static str, value: &str) -> Result<(), ManifestError> {
    if value.trim().is_empty() {
        return Err(ManifestError::Empty(label));
    }
    if looks_like_url_strict(value) {
        return Err(ManifestError::UrlPath(label, value.to_string()));
    }
    Ok(())
}

/* ------------------------------- resolution -------------------------------- */

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Join every path under `base_dir` and check existence.
pub fn resolve_paths(base_dir: &Path, man: &DataManifest) -> Result<ResolvedManifest, ManifestError> {
    let file = |label: &'static str, rel: &str| -> Result<PathBuf, ManifestError> {
        let p = join_under(base_dir, rel);
        must_be_file(label, &p)?;
        Ok(p)
    };
    let opt_file = |label: &'static str, rel: &Option<String>| -> Result<Option<PathBuf>, ManifestError> {
        rel.as_deref().map(|r| file(label, r)).transpose()
    };

    let store = match (&man.kpi_index, &man.kpi_dir) {
        (Some(idx), None) => StoreSource::Index(file("kpi_index", idx)?),
        (None, Some(dir)) => {
            let p = join_under(base_dir, dir);
            let md = fs::metadata(&p).map_err(|e| ManifestError::Access("kpi_dir", format!("{} ({e})", p.display())))?;
            if !md.is_dir() {
                return Err(ManifestError::NotADir("kpi_dir", p.display().to_string()));
            }
            StoreSource::Dir(p)
        }
        _ => return Err(ManifestError::StoreSource),
    };

    Ok(ResolvedManifest {
        meta: file("meta", &man.meta)?,
        countries: file("countries", &man.countries)?,
        groups: opt_file("groups", &man.groups)?,
        population: opt_file("population", &man.population)?,
        gdp: opt_file("gdp", &man.gdp)?,
        area: opt_file("area", &man.area)?,
        store,
        preferences: man.preferences.as_deref().map(|r| join_under(base_dir, r)),
        ranking: man.ranking.clone(),
    })
}

fn must_be_file(label: &'static str, p: &Path) -> Result<(), ManifestError> {
    let md = fs::metadata(p).map_err(|e| ManifestError::Access(label, format!("{} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(ManifestError::NotAFile(label, p.display().to_string()));
    }
    Ok(())
}

/// Read → parse → validate → resolve a manifest file.
pub fn load_manifest(path: &Path) -> IoResult<ResolvedManifest> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?;
    let man: DataManifest = serde_json::from_str(&text)
        .map_err(|e| IoError::Manifest(format!("{}: {e}", path.display())))?;
    validate_manifest(&man)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolved = resolve_paths(base, &man)?;
    debug!(manifest = %path.display(), store = ?resolved.store, "manifest resolved");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DataManifest {
        DataManifest {
            meta: "meta.json".into(),
            countries: "countries.json".into(),
            groups: None,
            population: None,
            gdp: None,
            area: None,
            kpi_index: None,
            kpi_dir: Some("kpis".into()),
            preferences: None,
            ranking: RankingParams::default(),
        }
    }

    #[test]
    fn requires_exactly_one_store_source() {
        let mut m = base();
        assert!(validate_manifest(&m).is_ok());
        m.kpi_index = Some("index.json".into());
        assert_eq!(validate_manifest(&m), Err(ManifestError::StoreSource));
        m.kpi_index = None;
        m.kpi_dir = None;
        assert_eq!(validate_manifest(&m), Err(ManifestError::StoreSource));
    }

    #[test]
    fn rejects_urls_and_empty_paths() {
        let mut m = base();
        m.gdp = Some("https://example.org/gdp.json".into());
        assert!(matches!(validate_manifest(&m), Err(ManifestError::UrlPath("gdp", _))));
        let mut m = base();
        m.meta = "  ".into();
        assert_eq!(validate_manifest(&m), Err(ManifestError::Empty("meta")));
    }

    #[test]
    fn rejects_out_of_domain_params() {
        let mut m = base();
        m.ranking.coverage_threshold = 1.5;
        assert!(matches!(validate_manifest(&m), Err(ManifestError::Params(_))));
    }

    #[test]
    fn unknown_fields_are_refused() {
        let r: Result<DataManifest, _> =
            serde_json::from_str(r#"{"meta":"m","countries":"c","kpi_dir":"d","extra":1}"#);
        assert!(r.is_err());
    }

    #[test]
    fn resolves_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meta.json"), "[]").unwrap();
        fs::write(dir.path().join("countries.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("kpis")).unwrap();
        let r = resolve_paths(dir.path(), &base()).unwrap();
        assert_eq!(r.meta, dir.path().join("meta.json"));
        assert_eq!(r.store, StoreSource::Dir(dir.path().join("kpis")));
        assert!(r.groups.is_none());

        let mut m = base();
        m.kpi_dir = Some("meta.json".into());
        assert!(matches!(resolve_paths(dir.path(), &m), Err(ManifestError::NotADir("kpi_dir", _))));
    }
}
