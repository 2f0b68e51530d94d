use crate::errors::AppError;
use crate::model::{AffiliationRecord, ChannelRecord, RegistrationRecord, Tables};
use csv::Writer;
use log::info;
use std::io::Write;
use std::path::Path;

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

pub fn write_channels<W: Write>(wtr: &mut Writer<W>, rows: &[ChannelRecord]) -> Result<(), AppError> {
    wtr.write_record([
        "site","channel_number","logical_channel","source_id","target_id",
        "call_type","status","allocated_time","group_num","group_label",
    ])?;

    for r in rows {
        wtr.write_record(&[
            r.site.to_string(),
            r.channel_number.to_string(),
            r.logical_channel.to_string(),
            r.source_id.clone(),
            r.target_id.to_string(),
            r.call_type.clone(),
            r.status.clone(),
            r.allocated_time.to_string(),
            opt(&r.group_num),
            opt(&r.group_label),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `capture_timestamp` and `capture_hour` only get a column when at least
/// one row carries them.
pub fn write_registrations<W: Write>(wtr: &mut Writer<W>, rows: &[RegistrationRecord]) -> Result<(), AppError> {
    let with_ts = rows.iter().any(|r| r.capture_timestamp.is_some());
    let with_hour = rows.iter().any(|r| r.capture_hour.is_some());

    let mut header = vec!["source_id", "username", "site", "group_num", "group_label", "active"];
    if with_ts { header.push("capture_timestamp"); }
    if with_hour { header.push("capture_hour"); }
    wtr.write_record(&header)?;

    for r in rows {
        let mut row = vec![
            r.source_id.clone(),
            r.username.clone(),
            r.site.to_string(),
            opt(&r.group_num),
            opt(&r.group_label),
            r.active.clone(),
        ];
        if with_ts { row.push(opt(&r.capture_timestamp)); }
        if with_hour { row.push(opt(&r.capture_hour)); }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_affiliations<W: Write>(wtr: &mut Writer<W>, rows: &[AffiliationRecord]) -> Result<(), AppError> {
    wtr.write_record(["group_num", "site", "affiliation_count", "group_label"])?;
    for r in rows {
        wtr.write_record(&[
            r.group_num.to_string(),
            r.site.to_string(),
            r.affiliation_count.to_string(),
            opt(&r.group_label),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn open(out_dir: &Path, name: &str) -> Result<Writer<std::fs::File>, AppError> {
    let path = out_dir.join(name);
    Writer::from_path(&path).map_err(|e| AppError::IO(format!("open out csv '{}': {}", path.display(), e)))
}

/// Write `channels.csv`, `registrations.csv` and `affiliations.csv`.
pub fn write_tables(out_dir: &Path, tables: &Tables) -> Result<(), AppError> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| AppError::IO(format!("create '{}': {}", out_dir.display(), e)))?;

    write_channels(&mut open(out_dir, "channels.csv")?, &tables.channels)?;
    write_registrations(&mut open(out_dir, "registrations.csv")?, &tables.registrations)?;
    write_affiliations(&mut open(out_dir, "affiliations.csv")?, &tables.affiliations)?;

    info!(
        "CSV wrote {} channel, {} registration, {} affiliation rows to {}",
        tables.channels.len(),
        tables.registrations.len(),
        tables.affiliations.len(),
        out_dir.display()
    );
    Ok(())
}
