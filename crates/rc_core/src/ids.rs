//! crates/rc_core/src/ids.rs
//! Indicator and group identifiers, plus title → identifier normalization.
//! Identifiers double as data file stems (`<id>.json`), so they must be
//! path-safe: no separators, no NUL, not `.`/`..`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const MAX_ID_LEN: usize = 256;

/// Fallback identifier when a title normalizes to nothing.
pub const UNKNOWN_INDICATOR: &str = "unknown_kpi";

#[inline]
fn check_id(s: &str) -> Result<(), CoreError> {
    if s.is_empty() {
        return Err(CoreError::EmptyId);
    }
    if s.len() > MAX_ID_LEN {
        return Err(CoreError::IdTooLong);
    }
    if s == "." || s == ".." || s.chars().any(|c| matches!(c, '/' | '\\' | '\0') || c.is_control()) {
        return Err(CoreError::InvalidId);
    }
    Ok(())
}

macro_rules! simple_string_newtype {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                check_id(s)?;
                Ok($name(s.to_owned()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                check_id(&value)?;
                Ok($name(value))
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }
    }
}

simple_string_newtype!(
    /// Indicator (KPI) identifier; also the stem of its per-indicator data file.
    IndicatorId
);
simple_string_newtype!(
    /// Country-group identifier (e.g. `eu`, `g7`).
    GroupId
);

impl IndicatorId {
    /// Identifier derived from a human title via [`normalize_indicator_name`].
    pub fn from_title(title: &str) -> Self {
        IndicatorId(normalize_indicator_name(title))
    }
}

/* -------------------------------------------------------------------------- */
/*                          Title → identifier mapping                         */
/* -------------------------------------------------------------------------- */

/// Map an indicator title onto the identifier used for its data file.
///
/// Lowercases, folds subscript digits, rewrites `% of gdp` / `percent of gdp`
/// to `of gdp`, turns decimal points between digits and `1,000` into `_`,
/// drops parentheses and commas, and squeezes everything outside
/// `[a-z0-9._]` into single underscores.
pub fn normalize_indicator_name(title: &str) -> String {
    let lowered: String = title.trim().to_lowercase().chars().map(fold_subscript).collect();
    let collapsed = collapse_percent_of_gdp(&lowered);

    let chars: Vec<char> = collapsed.chars().collect();
    let mut staged = String::with_capacity(collapsed.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_digits = c == '.'
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        staged.push(if between_digits { '_' } else { c });
    }
    let staged = staged.replace("1,000", "1_000");

    let mut out = String::with_capacity(staged.len());
    for c in staged.chars() {
        let mapped = match c {
            '(' | ')' | ',' => continue,
            'a'..='z' | '0'..='9' | '.' | '_' => c,
            _ => '_',
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        UNKNOWN_INDICATOR.to_string()
    } else {
        trimmed.to_string()
    }
}

#[inline]
fn fold_subscript(c: char) -> char {
    match c {
        '₀'..='₉' => char::from_digit(c as u32 - '₀' as u32, 10).unwrap_or(c),
        _ => c,
    }
}

/// First `\s*(%|percent)\s*of\s*gdp` occurrence becomes ` of gdp`.
fn collapse_percent_of_gdp(s: &str) -> String {
    for (idx, _) in s.char_indices() {
        let rest = &s[idx..];
        let after = match rest.strip_prefix('%').or_else(|| rest.strip_prefix("percent")) {
            Some(r) => r,
            None => continue,
        };
        let Some(after_of) = after.trim_start().strip_prefix("of") else { continue };
        let Some(tail) = after_of.trim_start().strip_prefix("gdp") else { continue };
        let head = s[..idx].trim_end();
        return format!("{head} of gdp{tail}");
    }
    s.to_string()
}
