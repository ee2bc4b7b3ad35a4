//! crates/rc_io/src/loader.rs
//!
//! Wire loaders for the static inputs of a session:
//! indicator metadata (raw, validated later by the pipeline), countries,
//! country groups, and the population / GDP / area series.
//!
//! Rules in this layer:
//! - Metadata may be an array of entries or an object keyed by id.
//! - Countries may be an object `name → info` or a plain array of names.
//! - Groups are an object `id → { title, members }`.
//! - Auxiliary series are record arrays; zero and missing values are not indexed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use rc_core::{AuxStore, CountryGroup, CountryInfo, GroupId};

use crate::records::{lenient_f64, lenient_opt_f64, lenient_text, parse_records};
use crate::{IoError, IoResult};

/// Read and parse one JSON file, tagging errors with its path.
pub fn read_json(path: &Path) -> IoResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}

/* --------------------------------- Metadata --------------------------------- */

/// One metadata entry exactly as found on the wire. Every field is optional
/// and textual fields accept strings, booleans or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMeta {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Relation-eligibility marker (`*` eligible, `-` or empty not).
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64", skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub relevance: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub world_kpi: Option<String>,
    /// Object key when the file is keyed by id.
    #[serde(skip)]
    pub key: Option<String>,
}

/// Load raw metadata entries in file order (keyed files: key order).
pub fn load_meta(path: &Path) -> IoResult<Vec<RawMeta>> {
    let v = read_json(path)?;
    let metas = parse_meta_value(v)?;
    debug!(path = %path.display(), count = metas.len(), "metadata loaded");
    Ok(metas)
}

pub fn parse_meta_value(v: Value) -> IoResult<Vec<RawMeta>> {
    let entry = |pointer: String, v: Value| -> IoResult<RawMeta> {
        serde_json::from_value(v).map_err(|e| IoError::Json { pointer, msg: e.to_string() })
    };
    match v {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| entry(format!("/{i}"), item))
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, item)| {
                let mut m = entry(format!("/{k}"), item)?;
                m.key = Some(k);
                Ok(m)
            })
            .collect(),
        _ => Err(IoError::Json { pointer: "/".into(), msg: "metadata must be an array or an object".into() }),
    }
}

/* --------------------------------- Countries -------------------------------- */

/// Country list with optional map/detail info.
pub fn load_countries(path: &Path) -> IoResult<BTreeMap<String, CountryInfo>> {
    let countries = parse_countries_value(read_json(path)?)?;
    debug!(path = %path.display(), count = countries.len(), "countries loaded");
    Ok(countries)
}

pub fn parse_countries_value(v: Value) -> IoResult<BTreeMap<String, CountryInfo>> {
    match v {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|n| n.as_str().map(|s| s.trim().to_string()))
            .filter(|n| !n.is_empty())
            .map(|n| (n, CountryInfo::default()))
            .collect()),
        Value::Object(map) => Ok(map
            .into_iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, info)| {
                let info = country_info(&info);
                (name, info)
            })
            .collect()),
        _ => Err(IoError::Json { pointer: "/".into(), msg: "countries must be an array or an object".into() }),
    }
}

fn country_info(v: &Value) -> CountryInfo {
    let text = |k: &str| v.get(k).and_then(Value::as_str).map(str::to_string);
    CountryInfo {
        lat: v.get("lat").and_then(lenient_f64),
        lon: v.get("lon").and_then(lenient_f64),
        capital: text("capital"),
        government: text("government"),
    }
}

/* ---------------------------------- Groups ---------------------------------- */

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    members: Vec<String>,
}

/// Country groups, ordered by id.
pub fn load_groups(path: &Path) -> IoResult<Vec<CountryGroup>> {
    let groups = parse_groups_value(read_json(path)?)?;
    debug!(path = %path.display(), count = groups.len(), "groups loaded");
    Ok(groups)
}

pub fn parse_groups_value(v: Value) -> IoResult<Vec<CountryGroup>> {
    let Value::Object(map) = v else {
        return Err(IoError::Json { pointer: "/".into(), msg: "groups must be an object".into() });
    };
    let mut out = Vec::with_capacity(map.len());
    for (key, raw) in map {
        let raw: RawGroup = serde_json::from_value(raw)
            .map_err(|e| IoError::Json { pointer: format!("/{key}"), msg: e.to_string() })?;
        let id: GroupId = key.parse()?;
        if raw.members.is_empty() {
            warn!(group = %id, "group has no members");
        }
        out.push(CountryGroup {
            title: raw.title.unwrap_or_default(),
            members: raw.members.into_iter().map(|m| m.trim().to_string()).collect(),
            id,
        });
    }
    out.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(out)
}

/* ----------------------------- Auxiliary series ----------------------------- */

/// Population / GDP / area series as an exact (country, year) lookup.
pub fn load_aux(path: &Path) -> IoResult<AuxStore> {
    let v = read_json(path)?;
    let (records, dropped) = parse_records(&v, "/")?;
    if dropped > 0 {
        warn!(path = %path.display(), dropped, "auxiliary records without country/year skipped");
    }
    let store = AuxStore::from_records(records);
    debug!(path = %path.display(), points = store.len(), "auxiliary series loaded");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_array_and_keyed_object() {
        let arr = parse_meta_value(json!([
            {"filename": "co2", "title": "CO₂", "sort": "lower", "relation": "*", "target_value": "2.5"},
            {"title": "GDP", "relation": true, "target_value": null}
        ]))
        .unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0].filename.as_deref(), Some("co2"));
        assert_eq!(arr[0].target_value, Some(2.5));
        assert_eq!(arr[1].relation.as_deref(), Some("*"));
        assert_eq!(arr[1].target_value, None);
        assert!(arr[1].key.is_none());

        let keyed = parse_meta_value(json!({"b": {"title": "B"}, "a": {"title": "A"}})).unwrap();
        let keys: Vec<_> = keyed.iter().map(|m| m.key.as_deref().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn meta_entry_error_points_at_entry() {
        let err = parse_meta_value(json!([{"title": "ok"}, 5])).unwrap_err();
        assert!(matches!(err, IoError::Json { ref pointer, .. } if pointer == "/1"));
        assert!(parse_meta_value(json!("nope")).is_err());
    }

    #[test]
    fn countries_from_map_or_list() {
        let m = parse_countries_value(json!({
            "France": {"lat": 46.2, "lon": "2.2", "capital": "Paris"},
            "Chad": {}
        }))
        .unwrap();
        assert_eq!(m["France"].lon, Some(2.2));
        assert_eq!(m["France"].capital.as_deref(), Some("Paris"));
        assert_eq!(m["Chad"], CountryInfo::default());

        let l = parse_countries_value(json!(["Germany", " ", "Italy"])).unwrap();
        assert_eq!(l.keys().cloned().collect::<Vec<_>>(), vec!["Germany", "Italy"]);
    }

    #[test]
    fn groups_sorted_by_id() {
        let g = parse_groups_value(json!({
            "g7": {"title": "G7", "members": ["France", "Germany"]},
            "eu": {"members": ["France"]}
        }))
        .unwrap();
        assert_eq!(g[0].id.as_str(), "eu");
        assert_eq!(g[0].label(), "eu");
        assert_eq!(g[1].members.len(), 2);
        assert!(parse_groups_value(json!({"a/b": {"members": []}})).is_err());
    }

    #[test]
    fn aux_indexes_nonzero_values() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("population.json");
        fs::write(
            &p,
            r#"[{"country":"FR","year":2021,"value":67000000},
                {"country":"DE","year":2021,"value":0},
                {"country":"IT","year":2021,"value":null}]"#,
        )
        .unwrap();
        let s = load_aux(&p).unwrap();
        assert_eq!(s.lookup("FR", 2021), Some(67_000_000.0));
        assert_eq!(s.lookup("DE", 2021), None);
        assert_eq!(s.len(), 1);
    }
}
