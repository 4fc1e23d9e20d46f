//! Derived motion channels
//!
//! Acceleration is computed over a frame span rather than neighboring rows:
//! broadcast speed readouts only move every few frames, so a row-to-row
//! difference would mostly read zero with spikes where the digit rolls over.

use super::table::{TelemetryTable, REAL_TIME_COLUMN};

/// Standard gravity used to express acceleration in g, m/s²
pub const G_FORCE_CONVERSION: f64 = 9.81;

/// Frame span acceleration is computed across
pub const DEFAULT_FRAME_DISTANCE: usize = 30;

/// Acceleration magnitude beyond which a sample is discarded, m/s²
pub const DEFAULT_MAX_ACCELERATION: f64 = 100.0;

const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Compute acceleration in m/s² for a speed column.
///
/// Each row pairs with the row `frame_distance` ahead; the result holds
/// `None` where either speed is missing, the time delta is not positive, or
/// the magnitude exceeds `max_acceleration`. The tail rows with no partner
/// stay `None`. Returns `None` when the speed or time column is absent.
pub fn compute_acceleration(
    table: &TelemetryTable,
    speed_column: &str,
    frame_distance: usize,
    max_acceleration: f64,
) -> Option<Vec<Option<f64>>> {
    let speeds = table.float(speed_column)?;
    let times = table.float(REAL_TIME_COLUMN)?;

    let rows = speeds.len();
    let mut acceleration = vec![None; rows];
    for i in 0..rows.saturating_sub(frame_distance) {
        let j = i + frame_distance;
        let (Some(v0), Some(v1), Some(t0), Some(t1)) = (speeds[i], speeds[j], times[i], times[j])
        else {
            continue;
        };
        let dt = t1 - t0;
        if dt <= 0.0 {
            continue;
        }
        let value = (v1 - v0) * KMH_TO_MS / dt;
        if value.abs() <= max_acceleration {
            acceleration[i] = Some(value);
        }
    }
    Some(acceleration)
}

/// Express an acceleration series in multiples of standard gravity
pub fn compute_g_force(acceleration: &[Option<f64>]) -> Vec<Option<f64>> {
    acceleration
        .iter()
        .map(|value| value.map(|a| a / G_FORCE_CONVERSION))
        .collect()
}

/// Add `<vehicle>_acceleration` and `<vehicle>_g_force` columns for every
/// vehicle whose speed column exists
pub fn add_motion_channels(
    table: &mut TelemetryTable,
    vehicles: &[String],
    frame_distance: usize,
    max_acceleration: f64,
) {
    for vehicle in vehicles {
        let speed_column = format!("{vehicle}.speed");
        let Some(acceleration) =
            compute_acceleration(table, &speed_column, frame_distance, max_acceleration)
        else {
            tracing::debug!("no speed column for {vehicle}, skipping motion channels");
            continue;
        };
        let g_force = compute_g_force(&acceleration);
        table.insert_float(format!("{vehicle}_acceleration"), acceleration);
        table.insert_float(format!("{vehicle}_g_force"), g_force);
    }
}
