//! crates/rc_io/src/kpi_store.rs
//!
//! Indicator store loading.
//!
//! Two layouts:
//! - Directory: `<dir>/<id>.json`, one record array per indicator. A missing
//!   file leaves the id absent; an unreadable or malformed one records a failure.
//! - Index: `{ "parts": ["a.json.gz", "b.json", ...] }` relative to the index file.
//!   Each part is an object `id → [records]`, gzip-compressed when it starts with
//!   the gzip magic bytes. Parts merge in listed order (later ids replace earlier
//!   ones). A failing part is logged and recorded; remaining parts still load.
//!   An index without `parts` is read as a single consolidated part.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use rc_core::{IndicatorId, IndicatorLoad, IndicatorStore};

use crate::loader::read_json;
use crate::manifest::StoreSource;
use crate::records::parse_records;
use crate::{IoError, IoResult};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Store plus the parts that could not be read (path, reason).
#[derive(Debug, Default)]
pub struct StoreLoad {
    pub store: IndicatorStore,
    pub part_failures: Vec<(PathBuf, String)>,
}

/// Load series for `ids` from `source`.
///
/// In index mode every id found in the parts is loaded; ids in `ids` that no
/// part provided are marked failed when at least one part failed, absent otherwise.
pub fn load_store(source: &StoreSource, ids: &[IndicatorId]) -> IoResult<StoreLoad> {
    let loaded = match source {
        StoreSource::Dir(dir) => load_dir(dir, ids),
        StoreSource::Index(index) => load_index(index, ids)?,
    };
    info!(
        indicators = loaded.store.len(),
        failed = loaded.store.failures().len(),
        part_failures = loaded.part_failures.len(),
        "indicator store loaded"
    );
    Ok(loaded)
}

/* -------------------------------- directory -------------------------------- */

fn load_dir(dir: &Path, ids: &[IndicatorId]) -> StoreLoad {
    let mut store = IndicatorStore::new();
    for id in ids {
        let path = dir.join(format!("{id}.json"));
        if !path.is_file() {
            debug!(indicator = %id, "no data file");
            continue;
        }
        let load = load_indicator_file(&path);
        if let IndicatorLoad::Failed(reason) = &load {
            warn!(indicator = %id, %reason, "indicator failed to load");
        }
        store.absorb(id.clone(), load);
    }
    StoreLoad { store, part_failures: Vec::new() }
}

/// Explicit outcome for one per-indicator file.
pub fn load_indicator_file(path: &Path) -> IndicatorLoad {
    let v = match read_json(path) {
        Ok(v) => v,
        Err(e) => return IndicatorLoad::Failed(e.to_string()),
    };
    series_load(&v, "/")
}

fn series_load(v: &Value, pointer: &str) -> IndicatorLoad {
    match parse_records(v, pointer) {
        Ok((records, dropped)) => {
            if dropped > 0 {
                debug!(pointer, dropped, "records without country/year skipped");
            }
            if records.is_empty() {
                IndicatorLoad::Empty
            } else {
                IndicatorLoad::Loaded(records)
            }
        }
        Err(e) => IndicatorLoad::Failed(e.to_string()),
    }
}

/* ---------------------------------- index ---------------------------------- */

fn load_index(index: &Path, ids: &[IndicatorId]) -> IoResult<StoreLoad> {
    let v = read_json(index)?;
    let base = index.parent().unwrap_or_else(|| Path::new("."));

    let mut out = StoreLoad::default();
    match v.get("parts") {
        Some(Value::Array(parts)) => {
            for (i, part) in parts.iter().enumerate() {
                let Some(rel) = part.as_str() else {
                    return Err(IoError::Json { pointer: format!("/parts/{i}"), msg: "part must be a path string".into() });
                };
                let path = base.join(rel);
                match read_part(&path) {
                    Ok(part) => merge_part(&mut out.store, &part, &path),
                    Err(e) => {
                        warn!(part = %path.display(), error = %e, "store part failed");
                        out.part_failures.push((path, e.to_string()));
                    }
                }
            }
        }
        Some(_) => {
            return Err(IoError::Json { pointer: "/parts".into(), msg: "parts must be an array".into() });
        }
        None => merge_part(&mut out.store, &v, index),
    }

    if let Some((path, reason)) = out.part_failures.first() {
        let reason = format!("store part {} failed: {reason}", path.display());
        for id in ids {
            if matches!(out.store.lookup(id), rc_core::SeriesLookup::Absent) {
                out.store.record_failure(id.clone(), reason.clone());
            }
        }
    }
    Ok(out)
}

/// Read one part, transparently decompressing gzip.
pub fn read_part(path: &Path) -> IoResult<Value> {
    let bytes = fs::read(path).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?;
    let text = if bytes.starts_with(&GZIP_MAGIC) {
        gunzip(&bytes).map_err(|e| IoError::Gzip(format!("{}: {e}", path.display())))?
    } else {
        String::from_utf8(bytes).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?
    };
    serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })
}

#[cfg(feature = "gzip")]
fn gunzip(bytes: &[u8]) -> std::io::Result<String> {
    use std::io::Read;
    let mut text = String::new();
    flate2::read::GzDecoder::new(bytes).read_to_string(&mut text)?;
    Ok(text)
}

#[cfg(not(feature = "gzip"))]
fn gunzip(_bytes: &[u8]) -> std::io::Result<String> {
    Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "gzip feature disabled for rc_io"))
}

fn merge_part(store: &mut IndicatorStore, part: &Value, path: &Path) {
    let Some(map) = part.as_object() else {
        warn!(part = %path.display(), "store part is not an object; skipped");
        return;
    };
    for (key, series) in map {
        let id: IndicatorId = match key.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(part = %path.display(), key = %key, error = %e, "invalid indicator id in store part");
                continue;
            }
        };
        let load = series_load(series, &format!("/{key}"));
        if let IndicatorLoad::Failed(reason) = &load {
            warn!(indicator = %id, %reason, "indicator series malformed");
        }
        store.absorb(id, load);
    }
}
