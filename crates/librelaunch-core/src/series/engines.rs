//! Engine activity aggregation
//!
//! Raw engine telemetry arrives as per-group boolean lists, one flag per
//! flame position. Analysis wants counts, so each group is folded into a
//! `<vehicle>_<group>_active` column plus a constant `<vehicle>_<group>_total`,
//! all groups sum into `<vehicle>_all_active` / `<vehicle>_all_total`, and
//! the raw list columns are dropped.

use std::collections::BTreeMap;

use super::table::TelemetryTable;

/// Known engine-group layouts per vehicle type.
///
/// Unknown vehicles fall back to whatever groups their columns show, with
/// group totals taken from the longest activation list observed.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCatalog {
    layouts: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Default for EngineCatalog {
    fn default() -> Self {
        let mut catalog = EngineCatalog::empty();
        catalog.insert(
            "superheavy",
            [("central_stack", 3), ("inner_ring", 10), ("outer_ring", 20)],
        );
        catalog.insert("starship", [("rearth", 3), ("rvac", 3)]);
        catalog.insert("new_glenn", [("booster", 7)]);
        catalog
    }
}

impl EngineCatalog {
    /// A catalog with no known layouts
    pub fn empty() -> Self {
        EngineCatalog {
            layouts: BTreeMap::new(),
        }
    }

    /// Register a vehicle's engine groups and their engine counts
    pub fn insert<'a, I>(&mut self, vehicle: &str, groups: I)
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        self.layouts.insert(
            vehicle.to_string(),
            groups
                .into_iter()
                .map(|(name, total)| (name.to_string(), total))
                .collect(),
        );
    }

    /// The declared groups for a vehicle, if known
    pub fn layout(&self, vehicle: &str) -> Option<&BTreeMap<String, u32>> {
        self.layouts.get(vehicle)
    }
}

/// Fold per-group activation lists into active-count columns.
///
/// Cataloged vehicles get all their declared group columns even when no
/// source data exists (zero-filled); unknown vehicles get columns only for
/// the groups actually observed. Raw list columns are dropped afterwards.
pub fn aggregate_engines(table: &mut TelemetryTable, vehicles: &[String], catalog: &EngineCatalog) {
    for vehicle in vehicles {
        let layout = match catalog.layout(vehicle) {
            Some(layout) => layout.clone(),
            None => observed_layout(table, vehicle),
        };
        if layout.is_empty() {
            continue;
        }

        let rows = table.len();
        let mut group_counts: Vec<Vec<Option<f64>>> = Vec::new();

        for (group, total) in &layout {
            let source = format!("{vehicle}.engines.{group}");
            let counts: Vec<Option<f64>> = match table.flags(&source) {
                Some(flags) => flags
                    .iter()
                    .map(|row| {
                        let active = row
                            .as_ref()
                            .map_or(0, |flags| flags.iter().filter(|&&on| on).count());
                        Some(active as f64)
                    })
                    .collect(),
                None => vec![Some(0.0); rows],
            };

            table.insert_float(format!("{vehicle}_{group}_active"), counts.clone());
            table.insert_float(
                format!("{vehicle}_{group}_total"),
                vec![Some(f64::from(*total)); rows],
            );
            group_counts.push(counts);
        }

        let all_active: Vec<Option<f64>> = (0..rows)
            .map(|row| {
                Some(
                    group_counts
                        .iter()
                        .map(|counts| counts[row].unwrap_or(0.0))
                        .sum(),
                )
            })
            .collect();
        let all_total: u32 = layout.values().sum();

        table.insert_float(format!("{vehicle}_all_active"), all_active);
        table.insert_float(
            format!("{vehicle}_all_total"),
            vec![Some(f64::from(all_total)); rows],
        );

        for group in layout.keys() {
            table.drop_column(&format!("{vehicle}.engines.{group}"));
        }
    }
}

/// Derive a layout from the engine columns a vehicle actually has
fn observed_layout(table: &TelemetryTable, vehicle: &str) -> BTreeMap<String, u32> {
    let prefix = format!("{vehicle}.engines.");
    let mut layout = BTreeMap::new();
    for name in table.column_names() {
        let Some(group) = name.strip_prefix(&prefix) else {
            continue;
        };
        let total = table
            .flags(name)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.as_ref().map(Vec::len))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        layout.insert(group.to_string(), total as u32);
    }
    layout
}
