//! Column contract for the two input tables.
//!
//! Source files use a variety of column spellings. Names are trimmed and
//! lower-cased, then mapped through a fixed alias table onto the canonical names
//! below. All required columns must be present after aliasing.

use std::collections::HashMap;
use thiserror::Error;

pub const DAILY_REQUIRED: &[&str] = &[
    "instrument_id",
    "trade_date",
    "open",
    "high",
    "low",
    "close",
    "previous_close",
    "volume",
    "turnover_amount",
];

pub const INSTRUMENT_REQUIRED: &[&str] = &["instrument_id", "board", "is_special_treatment"];
pub const INSTRUMENT_OPTIONAL: &[&str] = &["name", "listing_date"];

const DAILY_ALIASES: &[(&str, &str)] = &[
    ("ts_code", "instrument_id"),
    ("symbol", "instrument_id"),
    ("code", "instrument_id"),
    ("date", "trade_date"),
    ("pre_close", "previous_close"),
    ("prev_close", "previous_close"),
    ("preclose", "previous_close"),
    ("vol", "volume"),
    ("amount", "turnover_amount"),
    ("turnover", "turnover_amount"),
    ("amt", "turnover_amount"),
];

const INSTRUMENT_ALIASES: &[(&str, &str)] = &[
    ("ts_code", "instrument_id"),
    ("symbol", "instrument_id"),
    ("code", "instrument_id"),
    ("is_st", "is_special_treatment"),
    ("st", "is_special_treatment"),
    ("isst", "is_special_treatment"),
    ("list_date", "listing_date"),
    ("ipo_date", "listing_date"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{table} table is missing required columns: {columns:?}")]
    MissingColumns {
        table: TableKind,
        columns: Vec<String>,
    },

    #[error("column {column:?} has values that are not a valid {expected}: {samples:?}")]
    InvalidValues {
        column: String,
        expected: &'static str,
        /// At most three offending values.
        samples: Vec<String>,
    },
}

/// Which input table a column set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Daily,
    Instruments,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Daily => f.write_str("daily"),
            TableKind::Instruments => f.write_str("instruments"),
        }
    }
}

impl TableKind {
    pub fn required(self) -> &'static [&'static str] {
        match self {
            TableKind::Daily => DAILY_REQUIRED,
            TableKind::Instruments => INSTRUMENT_REQUIRED,
        }
    }

    pub fn optional(self) -> &'static [&'static str] {
        match self {
            TableKind::Daily => &[],
            TableKind::Instruments => INSTRUMENT_OPTIONAL,
        }
    }

    fn aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            TableKind::Daily => DAILY_ALIASES,
            TableKind::Instruments => INSTRUMENT_ALIASES,
        }
    }

    /// Canonical name for a raw source column name.
    pub fn canonical_name(self, raw: &str) -> String {
        let normalized = raw.trim().to_ascii_lowercase();
        self.aliases()
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(normalized)
    }

    /// Map each canonical column to the source column that provides it.
    ///
    /// When several source columns alias to the same canonical name the first one
    /// wins. Fails listing every required column that has no source.
    pub fn resolve_columns<'a>(
        self,
        source_columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<&'static str, String>, SchemaError> {
        let mut by_canonical: HashMap<String, String> = HashMap::new();
        for raw in source_columns {
            by_canonical
                .entry(self.canonical_name(raw))
                .or_insert_with(|| raw.to_string());
        }

        let missing: Vec<String> = self
            .required()
            .iter()
            .filter(|name| !by_canonical.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: self,
                columns: missing,
            });
        }

        Ok(self
            .required()
            .iter()
            .chain(self.optional())
            .filter_map(|name| by_canonical.get(*name).map(|raw| (*name, raw.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_canonical_names() {
        assert_eq!(TableKind::Daily.canonical_name(" TS_CODE "), "instrument_id");
        assert_eq!(TableKind::Daily.canonical_name("pre_close"), "previous_close");
        assert_eq!(TableKind::Daily.canonical_name("Vol"), "volume");
        assert_eq!(TableKind::Instruments.canonical_name("is_st"), "is_special_treatment");
        assert_eq!(TableKind::Instruments.canonical_name("list_date"), "listing_date");
        assert_eq!(TableKind::Daily.canonical_name("extra"), "extra");
    }

    #[test]
    fn missing_columns_are_all_listed() {
        let err = TableKind::Daily
            .resolve_columns(["ts_code", "trade_date", "open", "close"])
            .unwrap_err();
        match err {
            SchemaError::MissingColumns { table, columns } => {
                assert_eq!(table, TableKind::Daily);
                assert_eq!(
                    columns,
                    vec!["high", "low", "previous_close", "volume", "turnover_amount"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn optional_columns_resolved_when_present() {
        let map = TableKind::Instruments
            .resolve_columns(["code", "Board", "ST", "ipo_date"])
            .unwrap();
        assert_eq!(map["instrument_id"], "code");
        assert_eq!(map["board"], "Board");
        assert_eq!(map["is_special_treatment"], "ST");
        assert_eq!(map["listing_date"], "ipo_date");
        assert!(!map.contains_key("name"));
    }

    #[test]
    fn first_alias_wins() {
        let map = TableKind::Daily
            .resolve_columns([
                "code", "date", "open", "high", "low", "close", "pre_close", "vol", "volume",
                "amount",
            ])
            .unwrap();
        assert_eq!(map["volume"], "vol");
    }
}
