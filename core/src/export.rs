use anyhow::Result;
use csv::WriterBuilder;

use crate::model::lot::LotKey;
use crate::model::record::ReadingRecord;

const HEADERS: [&str; 7] = [
    "Period",
    "Previous reading (m3)",
    "Current reading (m3)",
    "Consumption (m3)",
    "Consumption (L)",
    "Tariff (R$/m3)",
    "Total cost (R$)",
];

/// Spreadsheet-friendly report for one lot: a quoted title line, a blank
/// line, then a semicolon-delimited table, records in stored order.
pub fn csv_report(lot: &LotKey, records: &[ReadingRecord]) -> Result<String> {
    let mut out = format!("\"Water consumption report - Lot {}\"\n\n", lot);

    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(vec![]);
    writer.write_record(HEADERS)?;
    for r in records {
        writer.write_record(&[
            r.period.display_reversed(),
            format_reading(r.previous_reading),
            format_reading(r.current_reading),
            format!("{:.2}", r.consumption),
            format!("{:.0}", r.consumption_liters()),
            format!("{:.2}", r.tariff),
            format!("{:.2}", r.cost),
        ])?;
    }

    out.push_str(&String::from_utf8(writer.into_inner()?)?);
    Ok(out)
}

/// Default file name for a lot's report.
pub fn report_file_name(lot: &LotKey) -> String {
    format!("historico_lote_{}.csv", lot)
}

// Meter readings are entered as plain numbers; keep them that way instead of
// forcing decimals onto integral values.
fn format_reading(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::ReadingDraft;
    use crate::service::ledger_service::validate_and_build;

    fn record(period: &str, previous: f64, current: f64, tariff: f64) -> ReadingRecord {
        let draft = ReadingDraft {
            period: Some(period.parse().unwrap()),
            previous_reading: Some(previous),
            current_reading: Some(current),
            tariff: Some(tariff),
        };
        validate_and_build(&draft, &[], None).unwrap()
    }

    #[test]
    fn test_report_layout() {
        let lot = LotKey::parse("12").unwrap();
        let records = vec![
            record("2025-03", 100.0, 110.5, 5.0),
            record("2025-04", 110.5, 120.5, 5.5),
        ];

        let report = csv_report(&lot, &records).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "\"Water consumption report - Lot 12\"");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "Period;Previous reading (m3);Current reading (m3);Consumption (m3);Consumption (L);Tariff (R$/m3);Total cost (R$)"
        );
        assert_eq!(lines[3], "03/2025;100;110.5;10.50;10500;5.00;52.50");
        assert_eq!(lines[4], "04/2025;110.5;120.5;10.00;10000;5.50;55.00");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_report_with_no_records_is_title_and_header_only() {
        let lot = LotKey::parse("7").unwrap();
        let report = csv_report(&lot, &[]).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("Period;"));
    }

    #[test]
    fn test_report_file_name() {
        let lot = LotKey::parse("42").unwrap();
        assert_eq!(report_file_name(&lot), "historico_lote_42.csv");
    }
}
