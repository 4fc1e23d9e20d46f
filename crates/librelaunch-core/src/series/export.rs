//! Reading and writing extracted telemetry
//!
//! Raw frame samples round-trip through JSON so an extraction run can be
//! cleaned and re-cleaned later without touching the video again. Cleaned
//! tables export to CSV for plotting tools.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::telemetry::FrameSample;

use super::table::{Column, TelemetryTable};
use super::SeriesError;

/// Write a table as CSV.
///
/// Empty cells stand for missing readings. Flag columns, when a table is
/// exported before engine aggregation, render as semicolon-joined booleans
/// so the cell itself stays comma-free.
pub fn write_csv<W: Write>(table: &TelemetryTable, writer: &mut W) -> io::Result<()> {
    let mut first = true;
    for name in table.column_names() {
        if first {
            write!(writer, "{name}")?;
            first = false;
        } else {
            write!(writer, ",{name}")?;
        }
    }
    writeln!(writer)?;

    for row in 0..table.len() {
        let mut first = true;
        for name in table.column_names() {
            if first {
                first = false;
            } else {
                write!(writer, ",")?;
            }
            match table.column(name) {
                Some(Column::Float(values)) => {
                    if let Some(value) = values[row] {
                        write!(writer, "{value}")?;
                    }
                }
                Some(Column::Flags(values)) => {
                    if let Some(flags) = &values[row] {
                        let joined: Vec<String> =
                            flags.iter().map(|flag| flag.to_string()).collect();
                        write!(writer, "{}", joined.join(";"))?;
                    }
                }
                None => {}
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write a table as CSV to a file
pub fn save_csv<P: AsRef<Path>>(table: &TelemetryTable, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize raw frame samples as pretty-printed JSON
pub fn write_samples_json<W: Write>(samples: &[FrameSample], writer: W) -> Result<(), SeriesError> {
    serde_json::to_writer_pretty(writer, samples)?;
    Ok(())
}

/// Keys every persisted sample row must carry, whatever vehicles it holds.
const UNIVERSAL_KEYS: [&str; 4] = ["frame_number", "vehicles", "time", "real_time_seconds"];

/// Read frame samples back from JSON.
///
/// Every entry is checked for the universal record keys before the typed
/// decode, so a series written by some other tool fails with the index of
/// the first bad entry instead of a serde field error.
pub fn read_samples_json<R: Read>(reader: R) -> Result<Vec<FrameSample>, SeriesError> {
    let entries: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    for (index, entry) in entries.iter().enumerate() {
        for key in UNIVERSAL_KEYS {
            if entry.get(key).is_none() {
                return Err(SeriesError::Shape { entry: index, key });
            }
        }
    }

    let mut samples = Vec::with_capacity(entries.len());
    for entry in entries {
        samples.push(serde_json::from_value(entry)?);
    }
    Ok(samples)
}
