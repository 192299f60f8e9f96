//! Instrument reference data and board classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Market segment. Determines the default price-limit band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Board {
    Main,
    Star,
    Chinext,
    Bse,
    Unknown,
}

impl Board {
    pub const ALL: [Board; 5] = [
        Board::Main,
        Board::Star,
        Board::Chinext,
        Board::Bse,
        Board::Unknown,
    ];

    /// Rule-category key for this board.
    pub fn as_str(self) -> &'static str {
        match self {
            Board::Main => "MAIN",
            Board::Star => "STAR",
            Board::Chinext => "CHINEXT",
            Board::Bse => "BSE",
            Board::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized board: {0:?}")]
pub struct ParseBoardError(pub String);

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Case-insensitive, whitespace-tolerant. Unrecognized names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        Board::ALL
            .into_iter()
            .find(|board| board.as_str() == key)
            .ok_or_else(|| ParseBoardError(s.to_string()))
    }
}

/// Instrument metadata as delivered by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub instrument_id: String,
    pub name: Option<String>,
    pub board: Board,
    pub is_special_treatment: bool,
    pub listing_date: Option<NaiveDate>,
}

/// The subset of instrument data the labeling stages need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentProfile {
    pub board: Board,
    pub is_special_treatment: bool,
    pub listing_date: Option<NaiveDate>,
}

impl Default for InstrumentProfile {
    /// Profile used for instruments missing from the reference table.
    fn default() -> Self {
        Self {
            board: Board::Unknown,
            is_special_treatment: false,
            listing_date: None,
        }
    }
}

impl From<&Instrument> for InstrumentProfile {
    fn from(instrument: &Instrument) -> Self {
        Self {
            board: instrument.board,
            is_special_treatment: instrument.is_special_treatment,
            listing_date: instrument.listing_date,
        }
    }
}

/// Instrument lookup keyed by trimmed instrument id. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct InstrumentTable {
    by_id: HashMap<String, Instrument>,
}

impl InstrumentTable {
    pub fn new(instruments: impl IntoIterator<Item = Instrument>) -> Self {
        let mut by_id = HashMap::new();
        for instrument in instruments {
            let key = instrument.instrument_id.trim().to_string();
            if key.is_empty() {
                continue;
            }
            by_id.insert(key, instrument);
        }
        Self { by_id }
    }

    pub fn get(&self, instrument_id: &str) -> Option<&Instrument> {
        self.by_id.get(instrument_id.trim())
    }

    /// Profile for an instrument, degrading to `InstrumentProfile::default()` on a miss.
    pub fn profile(&self, instrument_id: &str) -> InstrumentProfile {
        self.get(instrument_id)
            .map(InstrumentProfile::from)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<Instrument> for InstrumentTable {
    fn from_iter<I: IntoIterator<Item = Instrument>>(iter: I) -> Self {
        Self::new(iter)
    }
}
