use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::record::ReadingRecord;

/// Numeric key of a housing lot. Created implicitly the first time a record
/// is saved for an unseen key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotKey(String);

impl LotKey {
    /// Accepts digit-only keys; leading zeros are dropped so that "012" and
    /// "12" name the same lot.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidLotKey(input.to_string()));
        }
        let normalized = trimmed.trim_start_matches('0');
        let key = if normalized.is_empty() { "0" } else { normalized };
        Ok(LotKey(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for LotKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Digit strings without leading zeros order numerically by
        // (length, lexical).
        (self.0.len(), &self.0).cmp(&(other.0.len(), &other.0))
    }
}

impl PartialOrd for LotKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LotKey {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        LotKey::parse(&s)
    }
}

impl From<LotKey> for String {
    fn from(key: LotKey) -> Self {
        key.0
    }
}

/// The aggregate root: every lot mapped to its reading records. A BTreeMap
/// keeps lots in numeric order, which is the presentation order everywhere.
pub type Ledger = BTreeMap<LotKey, Vec<ReadingRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_digits_only() {
        assert_eq!(LotKey::parse("42").unwrap().as_str(), "42");
        assert_eq!(LotKey::parse(" 7 ").unwrap().as_str(), "7");
        assert_eq!(LotKey::parse("007").unwrap().as_str(), "7");
        assert_eq!(LotKey::parse("000").unwrap().as_str(), "0");
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        for bad in ["", "  ", "12a", "a12", "1.5", "-3", "lote"] {
            assert_eq!(
                LotKey::parse(bad),
                Err(ValidationError::InvalidLotKey(bad.to_string()))
            );
        }
    }

    #[test]
    fn test_orders_numerically() {
        let mut keys = vec![
            LotKey::parse("10").unwrap(),
            LotKey::parse("9").unwrap(),
            LotKey::parse("100").unwrap(),
            LotKey::parse("2").unwrap(),
        ];
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(ordered, vec!["2", "9", "10", "100"]);
    }
}
