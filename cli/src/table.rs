use hidrotrack_core::{DashboardData, EntrySuggestion, LotKey, LotReading, ReadingRecord};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

// Helper struct for Table Row
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Previous (m³)")]
    previous: String,
    #[tabled(rename = "Current (m³)")]
    current: String,
    #[tabled(rename = "Consumption")]
    consumption: String,
    #[tabled(rename = "Tariff (R$)")]
    tariff: String,
    #[tabled(rename = "Cost (R$)")]
    cost: String,
    #[tabled(rename = "ID")]
    id: String,
}

#[derive(Tabled)]
struct RankingRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Lot")]
    lot: String,
    #[tabled(rename = "Consumption (m³)")]
    consumption: String,
    #[tabled(rename = "Liters")]
    liters: String,
    #[tabled(rename = "Cost (R$)")]
    cost: String,
}

pub fn show_history(lot: &LotKey, records: &[ReadingRecord], suggestion: &EntrySuggestion) {
    println!("\n\x1b[1;36mLot {}\x1b[0m", lot);

    if records.is_empty() {
        println!("This lot has no records yet.");
    } else {
        let rows: Vec<HistoryRow> = records.iter().map(history_row).collect();
        let mut table = Table::new(rows);
        table
            .with(Style::modern())
            .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
        println!("{}", table);
    }

    let previous = suggestion
        .previous_reading
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string());
    let tariff = suggestion
        .tariff
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "Next entry: period {}, previous reading {}, tariff {}",
        suggestion.period.display_reversed(),
        previous,
        tariff
    );
}

pub fn show_dashboard(data: &DashboardData) {
    let month = data
        .latest_period
        .map(|p| p.display_reversed())
        .unwrap_or_else(|| "-".to_string());

    println!("\n\x1b[1;36mFleet overview\x1b[0m");
    println!("Registered lots:   {}", data.total_lots);
    println!("Verified in {}: {}", month, data.verified_count);
    println!("Total consumption: {:.2} m³", data.total_consumption);
    println!("Average per lot:   {:.2} m³", data.average_consumption);

    if data.ranking.is_empty() {
        println!("\nNo readings recorded yet.");
        return;
    }

    println!("\n\x1b[1;36mRanking — {}\x1b[0m", month);
    print_ranking(&data.ranking);

    if data.high_anomalies.is_empty() && data.low_anomalies.is_empty() {
        println!("\nNo consumption anomalies detected.");
        return;
    }
    if !data.high_anomalies.is_empty() {
        println!("\n\x1b[1;31mHigh consumption (> 1.5x average)\x1b[0m");
        print_ranking(&data.high_anomalies);
    }
    if !data.low_anomalies.is_empty() {
        println!("\n\x1b[1;33mLow consumption (< 0.5x average)\x1b[0m");
        print_ranking(&data.low_anomalies);
    }
}

fn print_ranking(entries: &[LotReading]) {
    let rows: Vec<RankingRow> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| RankingRow {
            position: i + 1,
            lot: entry.lot.to_string(),
            consumption: format!("{:.2}", entry.record.consumption),
            liters: format!("{:.0}", entry.record.consumption_liters()),
            cost: format!("{:.2}", entry.record.cost),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

fn history_row(r: &ReadingRecord) -> HistoryRow {
    let id_str = r.id.to_string();
    let short_id = if id_str.len() > 8 { &id_str[..8] } else { &id_str };
    HistoryRow {
        period: r.period.display_reversed(),
        previous: format!("{:.2}", r.previous_reading),
        current: format!("{:.2}", r.current_reading),
        consumption: format!("{:.2} m³ ({:.0} L)", r.consumption, r.consumption_liters()),
        tariff: format!("{:.2}", r.tariff),
        cost: format!("{:.2}", r.cost),
        id: short_id.to_string(),
    }
}
