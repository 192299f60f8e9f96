//! Limit-rule resolution: which price band and IPO grace window apply to an instrument.
//!
//! Rules are keyed by category name. Special-treatment instruments always use the
//! `ST` category; everything else uses its board's category, falling back to `MAIN`
//! when the merged rule set has no entry for that board.
//!
//! A [`LimitRuleResolver`] is built once per run (defaults plus an optional TOML
//! override file) and is read-only afterwards, so it can be shared across threads.

use crate::domain::InstrumentProfile;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAIN_CATEGORY: &str = "MAIN";
pub const ST_CATEGORY: &str = "ST";

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read limit rules from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed limit rules in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("limit rule category {category:?} is new and must define {field}")]
    IncompleteCategory {
        category: String,
        field: &'static str,
    },

    #[error("limit rule category {category:?} has invalid {field}: {value}")]
    InvalidValue {
        category: String,
        field: &'static str,
        value: f64,
    },
}

/// Price band and IPO grace window for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitRule {
    pub limit_up: f64,
    pub limit_down: f64,
    /// Calendar days after listing during which no price limit applies.
    pub ipo_unlimited_days: u32,
}

impl LimitRule {
    pub const fn new(limit_up: f64, limit_down: f64, ipo_unlimited_days: u32) -> Self {
        Self {
            limit_up,
            limit_down,
            ipo_unlimited_days,
        }
    }
}

/// One category as it appears in an override file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialRule {
    limit_up: Option<f64>,
    limit_down: Option<f64>,
    ipo_unlimited_days: Option<u32>,
}

/// Merged rule table keyed by upper-case category name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitRuleSet {
    rules: BTreeMap<String, LimitRule>,
}

/// Rule applied to the `MAIN` category unless an override file replaces it.
pub const DEFAULT_MAIN_RULE: LimitRule = LimitRule::new(0.10, 0.10, 1);

impl Default for LimitRuleSet {
    fn default() -> Self {
        let rules = [
            (MAIN_CATEGORY, DEFAULT_MAIN_RULE),
            (ST_CATEGORY, LimitRule::new(0.05, 0.05, 1)),
            ("STAR", LimitRule::new(0.20, 0.20, 5)),
            ("CHINEXT", LimitRule::new(0.20, 0.20, 5)),
        ]
        .into_iter()
        .map(|(key, rule)| (key.to_string(), rule))
        .collect();
        Self { rules }
    }
}

impl LimitRuleSet {
    /// Defaults merged with the categories in `text`.
    ///
    /// Each field of an existing category is overridden independently. A category
    /// that is not among the defaults must define all three fields.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, RuleError> {
        let overrides: BTreeMap<String, PartialRule> =
            toml::from_str(text).map_err(|source| RuleError::Parse {
                origin: origin.to_string(),
                source,
            })?;

        let mut set = Self::default();
        for (raw_key, partial) in overrides {
            let key = raw_key.trim().to_ascii_uppercase();
            let merged = match set.rules.get(&key) {
                Some(base) => LimitRule {
                    limit_up: partial.limit_up.unwrap_or(base.limit_up),
                    limit_down: partial.limit_down.unwrap_or(base.limit_down),
                    ipo_unlimited_days: partial
                        .ipo_unlimited_days
                        .unwrap_or(base.ipo_unlimited_days),
                },
                None => LimitRule {
                    limit_up: required(&key, "limit_up", partial.limit_up)?,
                    limit_down: required(&key, "limit_down", partial.limit_down)?,
                    ipo_unlimited_days: required(
                        &key,
                        "ipo_unlimited_days",
                        partial.ipo_unlimited_days,
                    )?,
                },
            };
            validate_fraction(&key, "limit_up", merged.limit_up)?;
            validate_fraction(&key, "limit_down", merged.limit_down)?;
            set.rules.insert(key, merged);
        }
        Ok(set)
    }

    pub fn get(&self, category: &str) -> Option<&LimitRule> {
        self.rules.get(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Category key used for an instrument.
    pub fn category_for(&self, profile: &InstrumentProfile) -> &str {
        let key = if profile.is_special_treatment {
            ST_CATEGORY
        } else {
            profile.board.as_str()
        };
        if self.rules.contains_key(key) {
            key
        } else {
            MAIN_CATEGORY
        }
    }
}

fn required<T>(category: &str, field: &'static str, value: Option<T>) -> Result<T, RuleError> {
    value.ok_or_else(|| RuleError::IncompleteCategory {
        category: category.to_string(),
        field,
    })
}

fn validate_fraction(category: &str, field: &'static str, value: f64) -> Result<(), RuleError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RuleError::InvalidValue {
            category: category.to_string(),
            field,
            value,
        })
    }
}

/// Resolves limit parameters for instruments. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct LimitRuleResolver {
    rules: LimitRuleSet,
    source: Option<PathBuf>,
}

impl LimitRuleResolver {
    pub fn new(rules: LimitRuleSet) -> Self {
        Self {
            rules,
            source: None,
        }
    }

    /// Load defaults, merging the override file at `path` if one is given and exists.
    ///
    /// A path that does not exist is not an error: the built-in defaults are used.
    /// A file that exists but cannot be read or parsed is.
    pub fn from_path(path: Option<&Path>) -> Result<Self, RuleError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            warn!(path = %path.display(), "limit rule override not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = LimitRuleSet::from_toml_str(&text, &path.display().to_string())?;
        debug!(
            path = %path.display(),
            categories = rules.rules.len(),
            "loaded limit rule overrides"
        );
        Ok(Self {
            rules,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn rules(&self) -> &LimitRuleSet {
        &self.rules
    }

    /// Override file actually merged, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn resolve(&self, profile: &InstrumentProfile) -> LimitRule {
        let key = self.rules.category_for(profile);
        match self.rules.get(key) {
            Some(rule) => *rule,
            // MAIN can only be absent if someone built a set by hand without it.
            None => DEFAULT_MAIN_RULE,
        }
    }

    /// Whether price limits are in force for `profile` on `trade_date`.
    ///
    /// Instruments without a listing date are always limited. Otherwise the elapsed
    /// calendar days since listing must reach the category's grace window.
    pub fn is_price_limit_applicable(
        &self,
        profile: &InstrumentProfile,
        trade_date: NaiveDate,
    ) -> bool {
        let Some(listing_date) = profile.listing_date else {
            return true;
        };
        let age_days = (trade_date - listing_date).num_days();
        age_days >= i64::from(self.resolve(profile).ipo_unlimited_days)
    }
}

/// `previous_close * (1 + fraction)` rounded half-up to two decimals.
///
/// Both inputs go through their shortest decimal representation before the multiply
/// so that e.g. `10.0 * 1.1` yields exactly `11.00`. Returns `None` for non-finite
/// input or values outside the decimal range.
pub fn compute_limit_price(previous_close: f64, fraction: f64) -> Option<f64> {
    if !previous_close.is_finite() || !fraction.is_finite() {
        return None;
    }
    let base = Decimal::from_str(&previous_close.to_string()).ok()?;
    let up = Decimal::from_str(&fraction.to_string()).ok()?;
    let raw = base.checked_mul(Decimal::ONE + up)?;
    raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}
