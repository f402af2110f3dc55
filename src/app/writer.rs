use crate::app::models::FeatureClassRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Writes the inventory CSV, replacing any file already at `target`.
pub fn write_inventory(
    target: &Path,
    records: &[FeatureClassRecord],
    extended: bool,
) -> Result<()> {
    if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            log::info!("{:?} did not exist. Creating directory...", dir);
            fs::create_dir_all(dir).context(format!("Failed to create {:?}", dir))?;
        }
    }

    let mut writer = csv::Writer::from_path(target)
        .context(format!("Failed to create {:?}", target))?;

    if extended {
        writer.write_record(FeatureClassRecord::EXTENDED_HEADER)?;
    } else {
        writer.write_record(FeatureClassRecord::HEADER)?;
    }
    for record in records {
        writer
            .write_record(record.fields(extended))
            .context(format!("Failed to write row for {}", record.path))?;
    }
    writer
        .flush()
        .context(format!("Failed to flush {:?}", target))?;

    log::info!("Wrote {} records to {:?}", records.len(), target);
    Ok(())
}
