use anyhow::Result;

use crate::model::lot::Ledger;
use crate::repository::LotRepository;
use crate::service::dto::{DashboardData, LotReading};

const HIGH_ANOMALY_FACTOR: f64 = 1.5;
const LOW_ANOMALY_FACTOR: f64 = 0.5;

pub struct DashboardUseCase<'a, R: LotRepository> {
    repo: &'a R,
}

impl<'a, R: LotRepository> DashboardUseCase<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    pub fn summary(&self) -> Result<DashboardData> {
        let ledger = self.repo.load_all()?;
        Ok(compute_dashboard(&ledger))
    }
}

/// Fleet-wide aggregates over the latest recorded month, computed fresh from
/// a ledger snapshot. Holds no state of its own; callers re-run it whenever
/// the snapshot changes.
pub fn compute_dashboard(ledger: &Ledger) -> DashboardData {
    let mut data = DashboardData::default();
    data.total_lots = ledger.len();
    data.all_lots = ledger.keys().cloned().collect();

    // The reference month is the latest period seen anywhere in the fleet.
    let Some(latest) = ledger.values().flatten().map(|r| r.period).max() else {
        return data;
    };
    data.latest_period = Some(latest);

    // Lots without a record for that month are simply not verified yet.
    // Ledger iteration is numeric lot order, so the snapshot (and every tie
    // in the ranking) is deterministic.
    let snapshot: Vec<LotReading> = ledger
        .iter()
        .filter_map(|(lot, records)| {
            records.iter().find(|r| r.period == latest).map(|record| LotReading {
                lot: lot.clone(),
                record: record.clone(),
            })
        })
        .collect();

    data.verified_count = snapshot.len();
    data.verified_lots = snapshot.iter().map(|e| e.lot.clone()).collect();
    data.total_consumption = snapshot.iter().map(|e| e.record.consumption).sum();
    data.average_consumption = if data.verified_count > 0 {
        data.total_consumption / data.verified_count as f64
    } else {
        0.0
    };

    let mut ranking = snapshot;
    // Stable sort: equal consumption keeps numeric lot order.
    ranking.sort_by(|a, b| {
        b.record
            .consumption
            .partial_cmp(&a.record.consumption)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let high_threshold = data.average_consumption * HIGH_ANOMALY_FACTOR;
    let low_threshold = data.average_consumption * LOW_ANOMALY_FACTOR;
    data.high_anomalies = ranking
        .iter()
        .filter(|e| e.record.consumption > high_threshold)
        .cloned()
        .collect();
    // Zero consumption is an empty or absent household, not an anomaly.
    data.low_anomalies = ranking
        .iter()
        .filter(|e| e.record.consumption > 0.0 && e.record.consumption < low_threshold)
        .cloned()
        .collect();
    data.ranking = ranking;

    data
}
