//! Series cleaning passes and their orchestration
//!
//! A freshly flattened table carries every reading the extractor produced,
//! OCR noise included. [`clean_series`] runs the standard pass order over
//! it: find the vehicles, fold engine flags into counts, drop the clock
//! helper columns, sort by flight time, normalize and reconcile fuel, and
//! finally null out physically impossible jumps.

use std::collections::BTreeSet;

use super::engines::{aggregate_engines, EngineCatalog};
use super::fuel::{normalize_fuel_columns, reconcile_fuel};
use super::table::TelemetryTable;

/// Column prefixes that look like vehicles but are bookkeeping
const NON_VEHICLE_PREFIXES: [&str; 4] = ["real_time", "time", "frame_number", "fuel"];

/// Thresholds steering the cleaning passes
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningConfig {
    /// Speed change between neighboring readings treated as an OCR misread, km/h
    pub speed_jump_kmh: f64,
    /// Altitude change between neighboring readings treated as an OCR misread, km
    pub altitude_jump_km: f64,
    /// Tank fullness gap beyond which the two readouts are reconciled, percent points
    pub fuel_disagreement_pct: f64,
    /// Flight time before which the higher tank reading wins, seconds
    pub fuel_policy_split_s: f64,
    /// Engine-group layouts used when folding activity flags
    pub engine_catalog: EngineCatalog,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        CleaningConfig {
            speed_jump_kmh: 50.0,
            altitude_jump_km: 1.0,
            fuel_disagreement_pct: 30.0,
            fuel_policy_split_s: 200.0,
            engine_catalog: EngineCatalog::default(),
        }
    }
}

/// Find the vehicles a table carries data for.
///
/// A vehicle is any dotted column prefix followed by a telemetry channel
/// (`speed`, `altitude`, `fuel.*` or `engines.*`), excluding the
/// bookkeeping prefixes. The result is sorted.
pub fn detect_vehicles(table: &TelemetryTable) -> Vec<String> {
    let mut vehicles = BTreeSet::new();
    for name in table.column_names() {
        let Some((prefix, channel)) = name.split_once('.') else {
            continue;
        };
        if NON_VEHICLE_PREFIXES.contains(&prefix) {
            continue;
        }
        let is_channel = channel == "speed"
            || channel == "altitude"
            || channel.starts_with("fuel.")
            || channel.starts_with("engines.");
        if is_channel {
            vehicles.insert(prefix.to_string());
        }
    }
    vehicles.into_iter().collect()
}

/// Null out readings that jump implausibly far from the last accepted one.
///
/// The comparison baseline is the last value that survived, not the raw
/// neighbor. A misread spike is nulled on its own; the good reading after
/// it stays because it sits close to the value before the spike.
pub fn reject_outliers(table: &mut TelemetryTable, vehicles: &[String], config: &CleaningConfig) {
    for vehicle in vehicles {
        let channels = [
            (format!("{vehicle}.speed"), config.speed_jump_kmh),
            (format!("{vehicle}.altitude"), config.altitude_jump_km),
        ];
        for (name, threshold) in channels {
            let Some(values) = table.float_mut(&name) else {
                continue;
            };
            let mut rejected = 0usize;
            let mut last_accepted: Option<f64> = None;
            for slot in values.iter_mut() {
                let Some(value) = *slot else {
                    continue;
                };
                match last_accepted {
                    Some(baseline) if (value - baseline).abs() > threshold => {
                        *slot = None;
                        rejected += 1;
                    }
                    _ => last_accepted = Some(value),
                }
            }
            if rejected > 0 {
                tracing::debug!("rejected {rejected} outliers in {name}");
            }
        }
    }
}

/// Drop the mission-clock helper columns a flattened table carries
fn drop_clock_columns(table: &mut TelemetryTable) {
    let clock_columns: Vec<String> = table
        .column_names()
        .iter()
        .filter(|name| *name == "time" || name.starts_with("time."))
        .cloned()
        .collect();
    for name in clock_columns {
        table.drop_column(&name);
    }
}

/// Run the full pass order over a flattened table.
///
/// Returns the vehicles detected before any columns were reshaped.
pub fn clean_series(table: &mut TelemetryTable, config: &CleaningConfig) -> Vec<String> {
    let vehicles = detect_vehicles(table);
    tracing::info!("cleaning series for vehicles: {vehicles:?}");

    aggregate_engines(table, &vehicles, &config.engine_catalog);
    drop_clock_columns(table);
    table.sort_by_time();
    normalize_fuel_columns(table, &vehicles);
    reconcile_fuel(table, &vehicles, config);
    reject_outliers(table, &vehicles, config);

    vehicles
}
