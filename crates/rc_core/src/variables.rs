//! variables.rs — Indicator metadata domains with explicit wire tokens.
//!
//! Metadata files are hand-maintained, so every domain also has a lenient
//! `from_token` that maps unknown spellings onto a documented fallback. The
//! strict serde form is what the workspace writes back out.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Define a serde'd enum with explicit wire tokens.
macro_rules! serde_enum {
    ($(#[$m:meta])* $name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Canonical wire token.
            pub fn as_token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }
    };
}

serde_enum!(
    /// Which direction of an indicator counts as "better".
    SortPolicy => {
        Higher  = "higher",
        Lower   = "lower",
        Target  = "target",
        Neutral = "neutral",
    }
);

impl SortPolicy {
    /// Unknown or missing policies fall back to `Neutral`.
    pub fn from_token(s: &str) -> (Self, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "higher" => (SortPolicy::Higher, true),
            "lower" => (SortPolicy::Lower, true),
            "target" => (SortPolicy::Target, true),
            "neutral" | "" => (SortPolicy::Neutral, true),
            _ => (SortPolicy::Neutral, false),
        }
    }

    /// Ordering is meaningful for the composite ranking.
    #[inline]
    pub fn is_rankable(self) -> bool {
        !matches!(self, SortPolicy::Neutral)
    }
}

serde_enum!(
    /// User-facing importance tier of an indicator in the composite ranking.
    Relevance => {
        VeryHigh   = "very_high",
        High       = "high",
        Normal     = "normal",
        Low        = "low",
        Irrelevant = "irrelevant",
    }
);

impl Default for Relevance {
    fn default() -> Self {
        Relevance::Normal
    }
}

impl Relevance {
    pub const ALL: [Relevance; 5] = [
        Relevance::VeryHigh,
        Relevance::High,
        Relevance::Normal,
        Relevance::Low,
        Relevance::Irrelevant,
    ];

    /// `none` is an alias of `irrelevant`; unknown tiers read as `normal`.
    pub fn from_token(s: &str) -> (Self, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "very_high" => (Relevance::VeryHigh, true),
            "high" => (Relevance::High, true),
            "normal" | "" => (Relevance::Normal, true),
            "low" => (Relevance::Low, true),
            "irrelevant" | "none" => (Relevance::Irrelevant, true),
            _ => (Relevance::Normal, false),
        }
    }
}

serde_enum!(
    /// Re-expression of an absolute value relative to an auxiliary store.
    RelationMode => {
        Absolute  = "absolute",
        PerCapita = "percapita",
        PerGdp    = "pergdp",
        PerKm2    = "perkm2",
    }
);

impl Default for RelationMode {
    fn default() -> Self {
        RelationMode::Absolute
    }
}

impl RelationMode {
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" | "" => Some(RelationMode::Absolute),
            "percapita" => Some(RelationMode::PerCapita),
            "pergdp" => Some(RelationMode::PerGdp),
            "perkm2" => Some(RelationMode::PerKm2),
            _ => None,
        }
    }
}

serde_enum!(
    /// Whether an indicator carries per-country rows, world rows, or both.
    WorldScope => {
        Countries = "n",
        Both      = "y",
        WorldOnly = "e",
    }
);

impl Default for WorldScope {
    fn default() -> Self {
        WorldScope::Countries
    }
}

impl WorldScope {
    /// Missing or unrecognized flags mean a plain per-country indicator.
    pub fn from_token(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => WorldScope::Both,
            "e" => WorldScope::WorldOnly,
            _ => WorldScope::Countries,
        }
    }

    #[inline]
    pub fn has_world_series(self) -> bool {
        !matches!(self, WorldScope::Countries)
    }
}

/* ------------------------------- Scale mode -------------------------------- */

/// Display scale of an indicator's values.
///
/// `Auto` picks a shared K/M/B/T divisor per table. Every other mode renders
/// the bare two-decimal number; `Unit` keeps the explicit unit string as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScaleMode {
    Auto,
    None,
    Percent,
    Index,
    Ratio,
    Unit(String),
}

impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::Auto
    }
}

impl ScaleMode {
    pub fn from_token(s: &str) -> Self {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "" | "auto" => ScaleMode::Auto,
            "none" => ScaleMode::None,
            "%" | "percent" => ScaleMode::Percent,
            "index" => ScaleMode::Index,
            "ratio" => ScaleMode::Ratio,
            _ => ScaleMode::Unit(t.to_string()),
        }
    }

    pub fn as_token(&self) -> &str {
        match self {
            ScaleMode::Auto => "auto",
            ScaleMode::None => "none",
            ScaleMode::Percent => "%",
            ScaleMode::Index => "index",
            ScaleMode::Ratio => "ratio",
            ScaleMode::Unit(u) => u.as_str(),
        }
    }

    /// Group rows average instead of summing for these scales.
    #[inline]
    pub fn is_ratio_like(&self) -> bool {
        matches!(self, ScaleMode::Index | ScaleMode::Ratio | ScaleMode::None)
    }
}

impl From<String> for ScaleMode {
    fn from(s: String) -> Self {
        ScaleMode::from_token(&s)
    }
}

impl From<ScaleMode> for String {
    fn from(m: ScaleMode) -> String {
        m.as_token().to_string()
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
