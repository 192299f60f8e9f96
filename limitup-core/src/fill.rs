//! Fill models: which limit-up days can actually be bought, and at what price.
//!
//! Both models price the entry at the session close. They differ only in
//! tradability: IDEAL assumes any limit-up day can be filled, CONSERVATIVE
//! refuses days that were locked at the cap all session (sealed or one-word).

use crate::domain::AnnotatedBar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillModel {
    Ideal,
    Conservative,
}

impl FillModel {
    /// Comparison order used by the runner: optimistic baseline first.
    pub const ALL: [FillModel; 2] = [FillModel::Ideal, FillModel::Conservative];

    pub fn as_str(self) -> &'static str {
        match self {
            FillModel::Ideal => "IDEAL",
            FillModel::Conservative => "CONSERVATIVE",
        }
    }

    /// Whether a buy order at the close of `row` would have been filled.
    pub fn can_buy(self, row: &AnnotatedBar) -> bool {
        if !row.label_limit_up {
            return false;
        }
        match self {
            FillModel::Ideal => true,
            FillModel::Conservative => !(row.label_sealed || row.label_one_word),
        }
    }

    /// Base (pre-cost) entry price for a fill on `row`.
    pub fn entry_price(self, row: &AnnotatedBar) -> f64 {
        row.bar.close
    }
}

impl fmt::Display for FillModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fill model: {0:?} (expected IDEAL or CONSERVATIVE)")]
pub struct ParseFillModelError(pub String);

impl FromStr for FillModel {
    type Err = ParseFillModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IDEAL" => Ok(FillModel::Ideal),
            "CONSERVATIVE" => Ok(FillModel::Conservative),
            _ => Err(ParseFillModelError(s.to_string())),
        }
    }
}
