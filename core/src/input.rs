use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::error::ValidationError;
use crate::model::period::Period;
use crate::model::record::ReadingDraft;

/// Field names accepted by the data-entry commands. Any unambiguous prefix
/// works (`cur:110`, `t:5.5`).
pub const ENTRY_KEYS: &[&str] = &["period", "month", "year", "previous", "current", "tariff"];

#[derive(Debug, PartialEq)]
pub struct ParsedEntry {
    pub lot: String,
    pub fields: HashMap<String, String>,
}

/// Split entry arguments into the bare lot key and `field:value` pairs.
pub fn parse_entry_args(args: &[String]) -> ParsedEntry {
    let mut lot_parts = Vec::new();
    let mut fields = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() {
                fields.insert(key.to_string(), value.to_string());
                continue;
            }
        }
        lot_parts.push(arg.as_str());
    }

    ParsedEntry {
        lot: lot_parts.join(" "),
        fields,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown field: '{}'", key)),
        _ => Err(anyhow!("Ambiguous field: '{}' matches {:?}", key, matches)),
    }
}

/// Normalize every field key through `expand_key`. Unknown or ambiguous
/// keys are hard errors here; a typo should not silently drop a reading.
pub fn normalize_fields(fields: HashMap<String, String>) -> Result<HashMap<String, String>> {
    let mut normalized = HashMap::new();
    for (key, value) in fields {
        normalized.insert(expand_key(&key, ENTRY_KEYS)?, value);
    }
    Ok(normalized)
}

/// Build a draft from normalized fields. Blank or non-numeric values stay
/// `None` and surface as `IncompleteInput` at validation; a period that is
/// present but nonsense (month 13) is rejected right away.
pub fn draft_from_fields(
    fields: &HashMap<String, String>,
) -> Result<ReadingDraft, ValidationError> {
    let period = match fields.get("period") {
        Some(raw) => Some(raw.parse::<Period>()?),
        None => match (fields.get("year"), fields.get("month")) {
            (Some(year_raw), Some(month_raw)) => {
                match (year_raw.trim().parse(), month_raw.trim().parse()) {
                    (Ok(year), Ok(month)) => Some(Period::new(year, month)?),
                    _ => None,
                }
            }
            _ => None,
        },
    };

    Ok(ReadingDraft {
        period,
        previous_reading: parse_number(fields.get("previous")),
        current_reading: parse_number(fields.get("current")),
        tariff: parse_number(fields.get("tariff")),
    })
}

fn parse_number(raw: Option<&String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_entry_args() {
        let parsed = parse_entry_args(&args(&["12", "previous:100", "current:110", "tariff:5.5"]));
        assert_eq!(parsed.lot, "12");
        assert_eq!(parsed.fields.get("previous"), Some(&"100".to_string()));
        assert_eq!(parsed.fields.get("current"), Some(&"110".to_string()));
        assert_eq!(parsed.fields.get("tariff"), Some(&"5.5".to_string()));
    }

    #[test]
    fn test_expand_entry_keys() {
        assert_eq!(expand_key("cur", ENTRY_KEYS).unwrap(), "current");
        assert_eq!(expand_key("t", ENTRY_KEYS).unwrap(), "tariff");
        assert_eq!(expand_key("pre", ENTRY_KEYS).unwrap(), "previous");
        assert_eq!(expand_key("per", ENTRY_KEYS).unwrap(), "period");

        // "p" matches period and previous.
        assert!(expand_key("p", ENTRY_KEYS).is_err());
        assert!(expand_key("x", ENTRY_KEYS).is_err());
    }

    #[test]
    fn test_draft_from_period_field() {
        let fields = normalize_fields(
            parse_entry_args(&args(&["7", "per:2025-03", "pre:100", "cur:110", "t:5"])).fields,
        )
        .unwrap();
        let draft = draft_from_fields(&fields).unwrap();
        assert_eq!(draft.period.unwrap().to_string(), "2025-03");
        assert_eq!(draft.previous_reading, Some(100.0));
        assert_eq!(draft.current_reading, Some(110.0));
        assert_eq!(draft.tariff, Some(5.0));
    }

    #[test]
    fn test_draft_from_month_and_year() {
        let mut fields = HashMap::new();
        fields.insert("month".to_string(), "3".to_string());
        fields.insert("year".to_string(), "2025".to_string());
        let draft = draft_from_fields(&fields).unwrap();
        assert_eq!(draft.period.unwrap().to_string(), "2025-03");
    }

    #[test]
    fn test_non_numeric_values_stay_missing() {
        let mut fields = HashMap::new();
        fields.insert("current".to_string(), "abc".to_string());
        fields.insert("month".to_string(), "marco".to_string());
        fields.insert("year".to_string(), "2025".to_string());
        let draft = draft_from_fields(&fields).unwrap();
        assert_eq!(draft.current_reading, None);
        assert_eq!(draft.period, None);
    }

    #[test]
    fn test_nonsense_period_rejected_early() {
        let mut fields = HashMap::new();
        fields.insert("month".to_string(), "13".to_string());
        fields.insert("year".to_string(), "2025".to_string());
        assert!(matches!(
            draft_from_fields(&fields),
            Err(ValidationError::InvalidPeriod(_))
        ));

        let mut fields = HashMap::new();
        fields.insert("period".to_string(), "2025/03".to_string());
        assert!(matches!(
            draft_from_fields(&fields),
            Err(ValidationError::InvalidPeriod(_))
        ));
    }
}
