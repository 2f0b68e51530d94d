use crate::errors::AppError;
use crate::model::{RawRegistration, TargetId};
use regex::Regex;

// Examples of the lines each pattern is built for:
//   Site ID: 2
//   Channel 9 Logical: 9 SourceID: 50027 TargetID: 101 CallType:group-voice-call Status: Busy Allocated Time: 12
//   source:32001 username: siteID:1 TGList:602  active:true timestamp:1738238968
//   TG:101 has 3 dyn affiliated sites: 1:190 2:19 29:1
const SITE_PAT: &str = r"(?i)Site ID:\s+(\d+)";
const CHANNEL_PAT: &str = concat!(
    r"(?i)Channel\s+(\d+)\s+Logical:\s+(\d+)\s+SourceID:\s+(\S+)\s+TargetID:\s+(\S+)",
    r"\s+CallType:(\S+)\s+Status:\s+(\S+)\s+Allocated Time:\s+(\d+)"
);
const REGISTRATION_PAT: &str = concat!(
    r"(?i)source:(\S+)\s+username:\s*(\S*)\s+siteID:(\S+)\s+TGList:(\S*)\s+active:(\S+)",
    r"(?:\s+timestamp:(\d+))?"
);
const AFFILIATION_PAT: &str = r"(?i)TG:(\d+)\s+has\s+(\d+)\s+dyn\s+affiliated\s+sites:\s+(.*)";

/// Channel status fields; the site comes from the surrounding section.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelFields {
    pub channel_number: u32,
    pub logical_channel: u32,
    pub source_id: String,
    pub target_id: TargetId,
    pub call_type: String,
    pub status: String,
    pub allocated_time: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AffiliationFields {
    pub group_num: i64,
    /// Declared site count. Informational, not checked against `sites`.
    pub declared_sites: u32,
    /// (site id, affiliated units) pairs in line order.
    pub sites: Vec<(i64, u32)>,
}

/// Per-line result: each matcher contributes at most one field set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineFields {
    pub site: Option<i64>,
    pub channel: Option<ChannelFields>,
    pub registration: Option<RawRegistration>,
    pub affiliation: Option<AffiliationFields>,
}

impl LineFields {
    pub fn is_empty(&self) -> bool {
        self.site.is_none()
            && self.channel.is_none()
            && self.registration.is_none()
            && self.affiliation.is_none()
    }
}

#[inline]
fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}

/// Compiled line matchers. Matching is a search, not a whole-line match,
/// so noise around the interesting part of a line is ignored.
pub struct LineClassifier {
    site: Regex,
    channel: Regex,
    registration: Regex,
    affiliation: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            site: Regex::new(SITE_PAT)?,
            channel: Regex::new(CHANNEL_PAT)?,
            registration: Regex::new(REGISTRATION_PAT)?,
            affiliation: Regex::new(AFFILIATION_PAT)?,
        })
    }

    pub fn classify(&self, line: &str) -> LineFields {
        let s = strip_bom(line);
        LineFields {
            site: self.site_decl(s),
            channel: self.channel_status(s),
            registration: self.registration(s),
            affiliation: self.affiliation(s),
        }
    }

    pub fn site_decl(&self, line: &str) -> Option<i64> {
        let caps = self.site.captures(line)?;
        caps[1].parse().ok()
    }

    pub fn channel_status(&self, line: &str) -> Option<ChannelFields> {
        let caps = self.channel.captures(line)?;
        Some(ChannelFields {
            channel_number: caps[1].parse().ok()?,
            logical_channel: caps[2].parse().ok()?,
            source_id: caps[3].to_string(),
            target_id: TargetId::from_token(&caps[4]),
            call_type: caps[5].to_string(),
            status: caps[6].to_string(),
            allocated_time: caps[7].parse().ok()?,
        })
    }

    pub fn registration(&self, line: &str) -> Option<RawRegistration> {
        let caps = self.registration.captures(line)?;
        Some(RawRegistration {
            source_id: caps[1].to_string(),
            username: caps[2].to_string(),
            site_id: caps[3].parse().ok()?,
            tg_list: caps[4].to_string(),
            active: caps[5].to_string(),
            timestamp: caps.get(6).and_then(|m| m.as_str().parse().ok()),
            capture_hour: None,
        })
    }

    pub fn affiliation(&self, line: &str) -> Option<AffiliationFields> {
        let caps = self.affiliation.captures(line)?;
        let group_num = caps[1].parse().ok()?;
        let declared_sites = caps[2].parse().ok()?;

        let mut sites = Vec::new();
        for pair in caps[3].split_whitespace() {
            let Some((site, count)) = pair.split_once(':') else {
                log::trace!("affiliation TG:{}: no separator in {:?}", group_num, pair);
                continue;
            };
            match (site.parse::<i64>(), count.parse::<u32>()) {
                (Ok(site), Ok(count)) => sites.push((site, count)),
                _ => log::trace!("affiliation TG:{}: bad pair {:?}", group_num, pair),
            }
        }

        Some(AffiliationFields { group_num, declared_sites, sites })
    }
}
