pub mod ledger;
pub mod metrics;
pub mod proration;
pub mod saga;
pub mod schedule;
pub mod status;

/// Round day-credit and hour amounts to 2 decimals, the precision every
/// ledger and metric field is stored with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
