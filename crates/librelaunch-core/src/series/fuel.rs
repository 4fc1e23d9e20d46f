//! Fuel column normalization and tank reconciliation

use crate::telemetry::DEFAULT_TANKS;

use super::cleaning::CleaningConfig;
use super::table::{TelemetryTable, REAL_TIME_COLUMN};

/// Bring fuel readings under the canonical `<vehicle>.fuel.<tank>.fullness`
/// name, per tank.
///
/// Source pipelines have emitted a few layouts over time; the first matching
/// alternate is copied, and a tank with no column at all is zero-filled so
/// downstream passes can rely on the full set existing.
pub fn normalize_fuel_columns(table: &mut TelemetryTable, vehicles: &[String]) {
    let rows = table.len();
    for vehicle in vehicles {
        for tank in DEFAULT_TANKS {
            let canonical = format!("{vehicle}.fuel.{tank}.fullness");
            if table.has_column(&canonical) {
                continue;
            }

            let alternates = [
                format!("{vehicle}_fuel_{tank}_fullness"),
                format!("{vehicle}.{tank}_fullness"),
                format!("{vehicle}_{tank}_fullness"),
            ];
            let copied = alternates.iter().find_map(|name| {
                table.float(name).map(|values| values.to_vec())
            });

            match copied {
                Some(values) => table.insert_float(canonical, values),
                None => {
                    tracing::debug!("no fuel column for {vehicle} {tank}, zero-filling");
                    table.insert_float(canonical, vec![Some(0.0); rows]);
                }
            }
        }
    }
}

/// Reconcile disagreeing tank readouts against the flight clock.
///
/// Both tanks drain together, so a gap wider than the configured tolerance
/// means one OCR read is wrong. Early in flight the tanks are near full and
/// dropouts read low, so the higher value wins; late in flight they are near
/// empty and misreads spike high, so the lower value wins. Both columns are
/// overwritten with the chosen value.
pub fn reconcile_fuel(table: &mut TelemetryTable, vehicles: &[String], config: &CleaningConfig) {
    let times = match table.float(REAL_TIME_COLUMN) {
        Some(values) => values.to_vec(),
        None => {
            tracing::warn!("no {REAL_TIME_COLUMN} column, skipping fuel reconciliation");
            return;
        }
    };

    for vehicle in vehicles {
        let lox_name = format!("{vehicle}.fuel.lox.fullness");
        let ch4_name = format!("{vehicle}.fuel.ch4.fullness");
        let (Some(lox), Some(ch4)) = (table.float(&lox_name), table.float(&ch4_name)) else {
            tracing::warn!("missing fuel columns for {vehicle}, skipping reconciliation");
            continue;
        };

        let mut lox = lox.to_vec();
        let mut ch4 = ch4.to_vec();
        for row in 0..times.len() {
            let (Some(l), Some(c), Some(t)) = (lox[row], ch4[row], times[row]) else {
                continue;
            };
            if (l - c).abs() <= config.fuel_disagreement_pct {
                continue;
            }
            let chosen = if t < config.fuel_policy_split_s {
                l.max(c)
            } else {
                l.min(c)
            };
            lox[row] = Some(chosen);
            ch4[row] = Some(chosen);
        }

        table.insert_float(lox_name, lox);
        table.insert_float(ch4_name, ch4);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn timed_table(times: Vec<Option<f64>>) -> TelemetryTable {
        let mut table = TelemetryTable::new();
        table.insert_float(REAL_TIME_COLUMN, times);
        table
    }

    #[test]
    fn test_canonical_columns_left_alone() {
        let mut table = timed_table(vec![Some(0.0)]);
        table.insert_float("starship.fuel.lox.fullness", vec![Some(88.0)]);
        table.insert_float("starship.fuel.ch4.fullness", vec![Some(87.0)]);

        normalize_fuel_columns(&mut table, &["starship".to_string()]);

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(88.0)]
        );
    }

    #[test]
    fn test_alternate_name_copied_not_renamed() {
        let mut table = timed_table(vec![Some(0.0), Some(1.0)]);
        table.insert_float("starship_fuel_lox_fullness", vec![Some(90.0), Some(89.0)]);

        normalize_fuel_columns(&mut table, &["starship".to_string()]);

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(90.0), Some(89.0)]
        );
        // the source column survives
        assert!(table.has_column("starship_fuel_lox_fullness"));
        // ch4 had no source anywhere and is zero-filled
        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(0.0), Some(0.0)]
        );
    }

    #[test]
    fn test_each_tank_normalized_independently() {
        let mut table = timed_table(vec![Some(0.0)]);
        table.insert_float("starship.fuel.lox.fullness", vec![Some(70.0)]);
        table.insert_float("starship_ch4_fullness", vec![Some(68.0)]);

        normalize_fuel_columns(&mut table, &["starship".to_string()]);

        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(68.0)]
        );
    }

    #[test]
    fn test_early_disagreement_takes_higher_value() {
        let mut table = timed_table(vec![Some(50.0)]);
        table.insert_float("starship.fuel.lox.fullness", vec![Some(80.0)]);
        table.insert_float("starship.fuel.ch4.fullness", vec![Some(40.0)]);

        reconcile_fuel(
            &mut table,
            &["starship".to_string()],
            &CleaningConfig::default(),
        );

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(80.0)]
        );
        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(80.0)]
        );
    }

    #[test]
    fn test_late_disagreement_takes_lower_value() {
        let mut table = timed_table(vec![Some(250.0)]);
        table.insert_float("starship.fuel.lox.fullness", vec![Some(80.0)]);
        table.insert_float("starship.fuel.ch4.fullness", vec![Some(40.0)]);

        reconcile_fuel(
            &mut table,
            &["starship".to_string()],
            &CleaningConfig::default(),
        );

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(40.0)]
        );
        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(40.0)]
        );
    }

    #[test]
    fn test_agreement_within_tolerance_untouched() {
        let mut table = timed_table(vec![Some(50.0), Some(250.0)]);
        table.insert_float(
            "starship.fuel.lox.fullness",
            vec![Some(80.0), Some(20.0)],
        );
        table.insert_float(
            "starship.fuel.ch4.fullness",
            vec![Some(60.0), Some(10.0)],
        );

        reconcile_fuel(
            &mut table,
            &["starship".to_string()],
            &CleaningConfig::default(),
        );

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(80.0), Some(20.0)]
        );
        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(60.0), Some(10.0)]
        );
    }

    #[test]
    fn test_missing_columns_skip_only_that_vehicle() {
        let mut table = timed_table(vec![Some(50.0)]);
        table.insert_float("superheavy.fuel.lox.fullness", vec![Some(90.0)]);
        // superheavy has no ch4 column; starship has both
        table.insert_float("starship.fuel.lox.fullness", vec![Some(80.0)]);
        table.insert_float("starship.fuel.ch4.fullness", vec![Some(40.0)]);

        reconcile_fuel(
            &mut table,
            &["superheavy".to_string(), "starship".to_string()],
            &CleaningConfig::default(),
        );

        assert_eq!(
            table.float("superheavy.fuel.lox.fullness").unwrap(),
            &[Some(90.0)]
        );
        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[Some(80.0)]
        );
    }

    #[test]
    fn test_gaps_in_either_reading_left_alone() {
        let mut table = timed_table(vec![Some(50.0), Some(60.0)]);
        table.insert_float("starship.fuel.lox.fullness", vec![None, Some(80.0)]);
        table.insert_float("starship.fuel.ch4.fullness", vec![Some(40.0), None]);

        reconcile_fuel(
            &mut table,
            &["starship".to_string()],
            &CleaningConfig::default(),
        );

        assert_eq!(
            table.float("starship.fuel.lox.fullness").unwrap(),
            &[None, Some(80.0)]
        );
        assert_eq!(
            table.float("starship.fuel.ch4.fullness").unwrap(),
            &[Some(40.0), None]
        );
    }
}
