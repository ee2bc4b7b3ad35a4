//! params.rs — Composite ranking parameters with safe defaults.
//!
//! Defaults reproduce the published ranking: 60% coverage cutoff, at least
//! two countries per indicator, tier weights 1.0 / 0.7 / 0.4 / 0.2 / 0.0.

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::variables::Relevance;

/// Multiplier per relevance tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub very_high: f64,
    pub high: f64,
    pub normal: f64,
    pub low: f64,
    pub irrelevant: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self { very_high: 1.0, high: 0.7, normal: 0.4, low: 0.2, irrelevant: 0.0 }
    }
}

impl TierWeights {
    #[inline]
    pub fn weight(&self, tier: Relevance) -> f64 {
        match tier {
            Relevance::VeryHigh => self.very_high,
            Relevance::High => self.high,
            Relevance::Normal => self.normal,
            Relevance::Low => self.low,
            Relevance::Irrelevant => self.irrelevant,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        for tier in Relevance::ALL {
            let w = self.weight(tier);
            if !w.is_finite() || w < 0.0 {
                return Err(CoreError::DomainOutOfRange("tier_weights"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    /// Minimum share of eligible indicators a country needs data for.
    pub coverage_threshold: f64,
    /// Indicators with fewer numeric countries are skipped.
    pub min_countries: usize,
    pub tier_weights: TierWeights,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.6,
            min_countries: 2,
            tier_weights: TierWeights::default(),
        }
    }
}

impl RankingParams {
    pub fn validate_domains(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.coverage_threshold) {
            return Err(CoreError::DomainOutOfRange("coverage_threshold"));
        }
        if self.min_countries == 0 {
            return Err(CoreError::DomainOutOfRange("min_countries"));
        }
        self.tier_weights.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_canonical() {
        let p = RankingParams::default();
        assert_eq!(p.coverage_threshold, 0.6);
        assert_eq!(p.min_countries, 2);
        assert_eq!(p.tier_weights.weight(Relevance::High), 0.7);
        assert_eq!(p.tier_weights.weight(Relevance::VeryHigh), 1.0);
        assert_eq!(p.tier_weights.weight(Relevance::Irrelevant), 0.0);
        assert!(p.validate_domains().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: RankingParams = serde_json::from_str(r#"{"coverage_threshold":0.5}"#).unwrap();
        assert_eq!(p.coverage_threshold, 0.5);
        assert_eq!(p.tier_weights, TierWeights::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let p = RankingParams { coverage_threshold: 1.5, ..Default::default() };
        assert_eq!(p.validate_domains(), Err(CoreError::DomainOutOfRange("coverage_threshold")));
        let mut p = RankingParams::default();
        p.tier_weights.low = -0.1;
        assert_eq!(p.validate_domains(), Err(CoreError::DomainOutOfRange("tier_weights")));
        let p = RankingParams { min_countries: 0, ..Default::default() };
        assert!(p.validate_domains().is_err());
    }
}
