//! rc_core — Core types, metadata domains, ranking parameters, and ordering helpers.
//!
//! This crate is **I/O-free**. It defines the stable data model used across
//! the workspace (`rc_io`, `rc_algo`, `rc_pipeline`, `rc_report`, `rc_cli`).
//!
//! - Identifiers: `IndicatorId`, `GroupId`, indicator-name normalization
//! - Records: `IndicatorRecord`, the `IndicatorStore`, auxiliary lookups (`AuxStore`)
//! - Metadata domains: `SortPolicy`, `ScaleMode`, `RelationMode`, `Relevance`, `WorldScope`
//! - Ranking parameters (coverage threshold, tier weights) with domain checks
//! - Relevance snapshot (metadata defaults + user overrides)
//! - Deterministic ordering helpers for optional floats and country names

#![forbid(unsafe_code)]

pub mod determinism;
pub mod entities;
pub mod ids;
pub mod params;
pub mod store;
pub mod variables;
pub mod weights;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        EmptyId,
        InvalidId,
        IdTooLong,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::EmptyId => write!(f, "empty id"),
                CoreError::InvalidId => write!(f, "invalid id"),
                CoreError::IdTooLong => write!(f, "id too long"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub use errors::CoreError;
pub use entities::{AuxStore, AuxStores, CountryGroup, CountryInfo, IndicatorMeta, IndicatorRecord};
pub use ids::{normalize_indicator_name, GroupId, IndicatorId};
pub use params::{RankingParams, TierWeights};
pub use store::{IndicatorLoad, IndicatorStore, SeriesLookup};
pub use variables::{RelationMode, Relevance, ScaleMode, SortPolicy, WorldScope};
pub use weights::RelevanceSnapshot;

/// Country names that denote the world aggregate in per-country series.
pub const WORLD_NAMES: [&str; 2] = ["World", "Welt"];

/// Country names accepted when extracting a world-level series.
pub const WORLD_SERIES_NAMES: [&str; 3] = ["World", "Welt", "Global"];

/// True when `country` is a world aggregate row, never a competing country.
#[inline]
pub fn is_world_name(country: &str) -> bool {
    WORLD_NAMES.contains(&country)
}

pub mod prelude {
    pub use crate::determinism::*;
    pub use crate::entities::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::params::*;
    pub use crate::store::*;
    pub use crate::variables::*;
    pub use crate::weights::*;
    pub use crate::{is_world_name, WORLD_NAMES, WORLD_SERIES_NAMES};
}
