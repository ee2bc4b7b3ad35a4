//! crates/rc_io/src/lib.rs
//! I/O layer of the ranking engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Data manifest resolution (offline paths only, relative to the manifest file).
//! - Lenient wire loaders for metadata, countries, groups and auxiliary series.
//! - Indicator store loading from a per-file directory or a split (optionally gzip) index.
//! - Canonical JSON bytes, atomic writes, SHA-256 digests, persisted preferences.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for rc_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// A source file could not be read.
    #[error("read error: {0}")]
    Read(String),

    /// An output file could not be written.
    #[error("write error: {0}")]
    Write(String),

    /// JSON serialization/deserialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// A gzip part could not be decoded.
    #[error("gzip error: {0}")]
    Gzip(String),

    /// Manifest shape / resolution errors.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Path policy errors (URLs, missing files, directories where files are expected).
    #[error("path error: {0}")]
    Path(String),

    #[error("hash error: {0}")]
    Hash(String),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Read(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; report at root.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<manifest::ManifestError> for IoError {
    fn from(e: manifest::ManifestError) -> Self {
        IoError::Manifest(e.to_string())
    }
}

impl From<rc_core::CoreError> for IoError {
    fn from(e: rc_core::CoreError) -> Self {
        IoError::Invalid(e.to_string())
    }
}

pub mod canonical_json;
#[cfg(feature = "hash")]
pub mod hasher;
pub mod kpi_store;
pub mod loader;
pub mod manifest;
pub mod prefs;
pub mod records;

pub use kpi_store::{load_store, StoreLoad};
pub use loader::{load_aux, load_countries, load_groups, load_meta, RawMeta};
pub use manifest::{load_manifest, DataManifest, ResolvedManifest, StoreSource};
pub use prefs::Preferences;

/// Strict URL check used by path policies: anything with a scheme is rejected.
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    let t = s.trim();
    t.contains("://") || t.starts_with("http:") || t.starts_with("https:") || t.starts_with("file:")
}

pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    #[cfg(feature = "hash")]
    pub use crate::hasher::{rnk_id, sha256_canonical, sha256_hex, tbl_id};
    pub use crate::{looks_like_url_strict, IoError, IoResult};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(looks_like_url_strict("https://example.org/a.json"));
        assert!(looks_like_url_strict(" file:///tmp/x"));
        assert!(!looks_like_url_strict("data/meta.json"));
        assert!(!looks_like_url_strict("C:\\data\\meta.json"));
    }
}
