use crate::extract::extract_text;
use crate::line_parser::LineClassifier;
use crate::lookup::Lookups;
use crate::model::{FileTables, RawRegistration, RegistrationRecord, Site, Tables};
use log::{debug, info, warn};
use std::path::Path;

/// Hour-of-capture encoded in a file name such as `13.txt`: digits, a dot,
/// then the extension.
pub fn capture_hour(file_name: &str) -> Option<u32> {
    let base = Path::new(file_name).file_name()?.to_str()?;
    let (stem, ext) = base.split_once('.')?;
    let digits_only = !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit());
    if !digits_only || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let hour = stem.parse::<u32>().ok()?;
    if hour > 23 {
        warn!("{}: capture hour {} is outside 0..=23", file_name, hour);
    }
    Some(hour)
}

/// Decode raw file bytes as UTF-8, dropping invalid sequences rather than
/// substituting U+FFFD, so a stray byte inside a number does not split it.
pub fn decode_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        debug!("dropped {} invalid UTF-8 bytes", dropped);
    }
    out
}

/// Extract one named file and stamp its capture hour onto its registrations.
pub fn extract_file(classifier: &LineClassifier, file_name: &str, text: &str) -> FileTables {
    let hour = capture_hour(file_name);
    if hour.is_none() {
        debug!("{}: no capture hour in file name", file_name);
    }
    let mut tables = extract_text(classifier, text);
    for reg in &mut tables.registrations {
        reg.capture_hour = hour;
    }
    tables
}

/// Split a registration's talkgroup list into one row per group.
/// Entries that are not numbers become rows without a group.
pub fn explode_registration(raw: RawRegistration) -> impl Iterator<Item = RegistrationRecord> {
    let RawRegistration { source_id, username, site_id, tg_list, active, timestamp, capture_hour } =
        raw;
    let groups: Vec<Option<i64>> =
        tg_list.split(',').map(|g| g.trim().parse::<i64>().ok()).collect();
    groups.into_iter().map(move |group_num| RegistrationRecord {
        source_id: source_id.clone(),
        username: username.clone(),
        site: Site::Id(site_id),
        group_num,
        group_label: None,
        active: active.clone(),
        capture_timestamp: timestamp,
        capture_hour,
    })
}

/// Concatenate per-file tables in the order given, exploding registrations.
pub fn concat(files: Vec<FileTables>) -> Tables {
    let mut out = Tables::default();
    for ft in files {
        out.channels.extend(ft.channels);
        out.registrations.extend(ft.registrations.into_iter().flat_map(explode_registration));
        out.affiliations.extend(ft.affiliations);
    }
    out
}

/// Apply site names and group labels. Running it twice changes nothing.
pub fn normalize(tables: &mut Tables, lookups: &Lookups) {
    for ch in &mut tables.channels {
        ch.site = lookups.site(&ch.site);
        ch.group_num = ch.target_id.as_numeric();
        ch.group_label = Some(lookups.group_label(&ch.target_id));
    }
    for reg in &mut tables.registrations {
        reg.site = lookups.site(&reg.site);
        reg.group_label = reg.group_num.map(|g| lookups.group_label_num(g));
    }
    for aff in &mut tables.affiliations {
        aff.site = lookups.site(&aff.site);
        aff.group_label = Some(lookups.group_label_num(aff.group_num));
    }
}

/// Merge already-extracted files and normalise the result.
pub fn merge(files: Vec<FileTables>, lookups: &Lookups) -> Tables {
    let n_files = files.len();
    let mut tables = concat(files);
    normalize(&mut tables, lookups);
    info!(
        "merged {} files: {} channels, {} registrations, {} affiliations",
        n_files,
        tables.channels.len(),
        tables.registrations.len(),
        tables.affiliations.len()
    );
    tables
}
