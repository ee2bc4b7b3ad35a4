//! Persisted user preferences: relevance overrides and the home country.
//!
//! The file is read leniently: unknown tier strings fall back to `normal`,
//! `none` means `irrelevant`, and entries with unusable ids are skipped.
//! An absent file yields defaults. Saving writes canonical JSON atomically.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use rc_core::{IndicatorId, Relevance};

use crate::canonical_json::write_canonical_file;
use crate::loader::read_json;
use crate::{IoError, IoResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub weights: BTreeMap<IndicatorId, Relevance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_country: Option<String>,
}

impl Preferences {
    /// Load from `path`; a missing file is not an error.
    pub fn load(path: &Path) -> IoResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no preferences file; using defaults");
            return Ok(Self::default());
        }
        Self::from_value(&read_json(path)?)
    }

    pub fn from_value(v: &Value) -> IoResult<Self> {
        let obj = v.as_object().ok_or_else(|| IoError::Json {
            pointer: "/".into(),
            msg: "preferences must be an object".into(),
        })?;

        let mut weights = BTreeMap::new();
        if let Some(map) = obj.get("weights").and_then(Value::as_object) {
            for (key, tier) in map {
                let Ok(id) = key.parse::<IndicatorId>() else {
                    warn!(key = %key, "preference for invalid indicator id skipped");
                    continue;
                };
                let token = tier.as_str().unwrap_or_default();
                let (tier, known) = Relevance::from_token(token);
                if !known {
                    warn!(indicator = %id, tier = %token, "unknown relevance tier; using normal");
                }
                weights.insert(id, tier);
            }
        }

        let home_country = obj
            .get("home_country")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self { weights, home_country })
    }

    pub fn save(&self, path: &Path) -> IoResult<()> {
        write_canonical_file(path, self)?;
        debug!(path = %path.display(), overrides = self.weights.len(), "preferences saved");
        Ok(())
    }
}
