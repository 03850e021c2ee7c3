use std::io::Write;
use std::path::Path;

use crate::error::{Context, Result};

use super::History;

/// Write the history as `profile,date,count` rows, profiles and dates in ascending order.
pub fn write_csv<W: Write>(history: &History, writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["profile", "date", "count"])?;

    let mut rows = 0;
    for (profile, days) in history {
        for (date, count) in days {
            let date = date.format("%Y-%m-%d").to_string();
            let count = count.to_string();
            writer.write_record([profile.as_str(), date.as_str(), count.as_str()])?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Persist the history to a CSV file at `path`, returning the number of data rows written.
pub fn export_csv<P: AsRef<Path>>(history: &History, path: P) -> Result<usize> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file {}", path.display()))?;
    write_csv(history, file)
}
