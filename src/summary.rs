use crate::errors::AppError;
use crate::model::Tables;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike};
use chrono_tz::Tz;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUSY: &str = "Busy";
const GROUP_VOICE_CALL: &str = "group-voice-call";

/// Aggregates the dashboard charts are drawn from.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub channel_status: BTreeMap<String, usize>,
    pub affiliations_by_group: BTreeMap<String, u64>,
    pub registrations_by_active: BTreeMap<String, usize>,
    pub busy_channels_by_site: BTreeMap<String, usize>,
    pub busy_voice_time_by_group: BTreeMap<String, u64>,
    pub sites: Vec<String>,
    pub active_registrations_by_hour: BTreeMap<String, usize>,
    pub registrations_by_capture_hour: BTreeMap<u32, usize>,
}

const HOUR_FMT: &str = "%Y-%m-%d %H:00";

/// Start of the wall-clock hour holding a unix timestamp, in `tz` or UTC.
fn hour_start(ts: i64, tz: Option<Tz>) -> Option<NaiveDateTime> {
    let utc = DateTime::from_timestamp(ts, 0)?;
    let local = match tz {
        Some(tz) => utc.with_timezone(&tz).naive_local(),
        None => utc.naive_utc(),
    };
    local.with_minute(0)?.with_second(0)
}

/// Hourly series from the first to the last bucket, quiet hours as zero.
fn hourly_series(counts: &BTreeMap<NaiveDateTime, usize>) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().next_back()) else {
        return out;
    };
    let mut hour = first;
    while hour <= last {
        out.insert(hour.format(HOUR_FMT).to_string(), counts.get(&hour).copied().unwrap_or(0));
        hour += TimeDelta::hours(1);
    }
    out
}

pub fn summarize(tables: &Tables, tz: Option<Tz>) -> Summary {
    let mut s = Summary::default();

    for ch in &tables.channels {
        *s.channel_status.entry(ch.status.clone()).or_default() += 1;

        let site = ch.site.to_string();
        if !s.sites.contains(&site) {
            s.sites.push(site.clone());
        }
        if ch.status == BUSY {
            *s.busy_channels_by_site.entry(site).or_default() += 1;
            if ch.call_type == GROUP_VOICE_CALL {
                let group = ch.group_label.clone().unwrap_or_else(|| ch.target_id.to_string());
                *s.busy_voice_time_by_group.entry(group).or_default() += ch.allocated_time;
            }
        }
    }

    for aff in &tables.affiliations {
        let group = aff.group_label.clone().unwrap_or_else(|| aff.group_num.to_string());
        *s.affiliations_by_group.entry(group).or_default() += u64::from(aff.affiliation_count);
    }

    let mut active_by_hour: BTreeMap<NaiveDateTime, usize> = BTreeMap::new();
    for reg in &tables.registrations {
        *s.registrations_by_active.entry(reg.active.clone()).or_default() += 1;
        if let Some(hour) = reg.capture_hour {
            *s.registrations_by_capture_hour.entry(hour).or_default() += 1;
        }
        if reg.active != "true" {
            continue;
        }
        if let Some(hour) = reg.capture_timestamp.and_then(|ts| hour_start(ts, tz)) {
            *active_by_hour.entry(hour).or_default() += 1;
        }
    }
    s.active_registrations_by_hour = hourly_series(&active_by_hour);

    s
}

/// Log the summary; empty tables get an informational note instead.
pub fn log_summary(tables: &Tables, s: &Summary) {
    if tables.channels.is_empty() {
        info!("no channel data in the input files");
    } else {
        info!("channel status: {:?}", s.channel_status);
        info!("busy channels per site: {:?}", s.busy_channels_by_site);
        info!("busy group-voice time per group: {:?}", s.busy_voice_time_by_group);
        info!("sites seen: {}", s.sites.join(", "));
    }
    if tables.affiliations.is_empty() {
        info!("no talkgroup affiliation data in the input files");
    } else {
        info!("affiliations per group: {:?}", s.affiliations_by_group);
    }
    if tables.registrations.is_empty() {
        info!("no dynamic registration data in the input files");
    } else {
        info!("registrations by active flag: {:?}", s.registrations_by_active);
        if s.active_registrations_by_hour.is_empty() {
            info!("no timestamps on active registrations; no hourly activity");
        }
    }
}

pub fn write_summary(out_dir: &Path, s: &Summary) -> Result<(), AppError> {
    let path = out_dir.join("summary.json");
    let f = std::fs::File::create(&path)
        .map_err(|e| AppError::IO(format!("open '{}': {}", path.display(), e)))?;
    serde_json::to_writer_pretty(f, s)?;
    info!("summary written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AffiliationRecord, ChannelRecord, RegistrationRecord, Site, TargetId};

    fn channel(site: &str, target: i64, status: &str, call_type: &str, time: u64) -> ChannelRecord {
        ChannelRecord {
            site: Site::Name(site.into()),
            channel_number: 1,
            logical_channel: 1,
            source_id: "1".into(),
            target_id: TargetId::Numeric(target),
            call_type: call_type.into(),
            status: status.into(),
            allocated_time: time,
            group_num: Some(target),
            group_label: Some(format!("G{}", target)),
        }
    }

    fn registration(active: &str, ts: Option<i64>, hour: Option<u32>) -> RegistrationRecord {
        RegistrationRecord {
            source_id: "1".into(),
            username: String::new(),
            site: Site::Id(1),
            group_num: Some(601),
            group_label: Some("Maintenance".into()),
            active: active.into(),
            capture_timestamp: ts,
            capture_hour: hour,
        }
    }

    #[test]
    fn empty_tables_give_empty_summary() {
        assert_eq!(summarize(&Tables::default(), None), Summary::default());
    }

    #[test]
    fn channel_aggregates() {
        let tables = Tables {
            channels: vec![
                channel("Central", 101, "Busy", "group-voice-call", 10),
                channel("Central", 101, "Busy", "group-voice-call", 5),
                channel("Harbor", 102, "Busy", "private", 7),
                channel("Harbor", 0, "Idle", "none", 0),
            ],
            ..Default::default()
        };
        let s = summarize(&tables, None);
        assert_eq!(s.channel_status.get("Busy"), Some(&3));
        assert_eq!(s.channel_status.get("Idle"), Some(&1));
        assert_eq!(s.busy_channels_by_site.get("Central"), Some(&2));
        assert_eq!(s.busy_channels_by_site.get("Harbor"), Some(&1));
        assert_eq!(s.busy_voice_time_by_group.get("G101"), Some(&15));
        assert_eq!(s.busy_voice_time_by_group.get("G102"), None);
        assert_eq!(s.sites, vec!["Central".to_string(), "Harbor".to_string()]);
    }

    #[test]
    fn affiliation_totals_per_group() {
        let aff = |g: i64, n: u32| AffiliationRecord {
            group_num: g,
            site: Site::Id(1),
            affiliation_count: n,
            group_label: None,
        };
        let tables = Tables { affiliations: vec![aff(101, 190), aff(101, 19), aff(102, 1)], ..Default::default() };
        let s = summarize(&tables, None);
        assert_eq!(s.affiliations_by_group.get("101"), Some(&209));
        assert_eq!(s.affiliations_by_group.get("102"), Some(&1));
    }

    #[test]
    fn registration_buckets_use_literal_active_flag() {
        // 2025-01-30 12:09:28 UTC
        let ts = 1738238968;
        let tables = Tables {
            registrations: vec![
                registration("true", Some(ts), Some(13)),
                registration("true", Some(ts + 60), Some(13)),
                registration("TRUE", Some(ts), None),
                registration("false", Some(ts), Some(14)),
                registration("true", None, None),
            ],
            ..Default::default()
        };
        let s = summarize(&tables, None);
        assert_eq!(s.registrations_by_active.get("true"), Some(&3));
        assert_eq!(s.registrations_by_active.get("TRUE"), Some(&1));
        assert_eq!(s.registrations_by_active.get("false"), Some(&1));
        assert_eq!(s.active_registrations_by_hour.get("2025-01-30 12:00"), Some(&2));
        assert_eq!(s.active_registrations_by_hour.len(), 1);
        assert_eq!(s.registrations_by_capture_hour.get(&13), Some(&2));
        assert_eq!(s.registrations_by_capture_hour.get(&14), Some(&1));
    }

    #[test]
    fn quiet_hours_between_activity_are_zero() {
        let ts = 1738238968; // 2025-01-30 12:09:28 UTC
        let tables = Tables {
            registrations: vec![
                registration("true", Some(ts + 3 * 3600), None),
                registration("true", Some(ts), None),
                registration("true", Some(ts + 3 * 3600 + 5), None),
                registration("false", Some(ts + 5 * 3600), None),
            ],
            ..Default::default()
        };
        let s = summarize(&tables, None);
        let series: Vec<_> = s
            .active_registrations_by_hour
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(
            series,
            vec![
                ("2025-01-30 12:00", 1),
                ("2025-01-30 13:00", 0),
                ("2025-01-30 14:00", 0),
                ("2025-01-30 15:00", 2),
            ]
        );
    }

    #[test]
    fn hour_bucket_honours_timezone() {
        let ts = 1738238968;
        let bucket = |tz| hour_start(ts, tz).map(|h| h.format(HOUR_FMT).to_string());
        assert_eq!(bucket(None).as_deref(), Some("2025-01-30 12:00"));
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        assert_eq!(bucket(Some(tz)).as_deref(), Some("2025-01-30 21:00"));
    }
}
