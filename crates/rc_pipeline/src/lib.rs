//! rc_pipeline — session orchestration (load → validate → table / composite ranking → documents).
//!
//! All session state lives in one explicit [`Session`] value: metadata, the
//! indicator store, countries, groups, auxiliary stores, ranking parameters,
//! the relevance snapshot and the home country. Every view is recomputed from
//! that state on request. JSON, hashing and file access are delegated to
//! `rc_io`; the math lives in `rc_algo`.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod docs;
pub mod session;
pub mod validate;

pub use docs::{RankingBody, RankingDoc, TableBody, TableDoc};
pub use session::{IndicatorOption, Session, ViewRequest};
pub use validate::{validate_meta, EntityRef, Severity, ValidationIssue, ValidationReport};

/// Single error surface for session orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] rc_io::IoError),

    #[error("metadata validation failed: {0}")]
    Validate(String),

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("unknown country: {0}")]
    UnknownCountry(String),

    #[error("core: {0}")]
    Core(#[from] rc_core::CoreError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
