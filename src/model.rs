use std::fmt;

/// A target id as it appears on a channel line. Numeric ids are talkgroups;
/// anything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetId {
    Numeric(i64),
    Raw(String),
}

impl TargetId {
    pub fn from_token(tok: &str) -> Self {
        if !tok.is_empty() && tok.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = tok.parse::<i64>() {
                return TargetId::Numeric(n);
            }
        }
        TargetId::Raw(tok.to_string())
    }

    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            TargetId::Numeric(n) => Some(*n),
            TargetId::Raw(_) => None,
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::Numeric(n) => write!(f, "{}", n),
            TargetId::Raw(s) => f.write_str(s),
        }
    }
}

/// Site column value: the raw id until a name is mapped onto it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Site {
    Id(i64),
    Name(String),
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Site::Id(n) => write!(f, "{}", n),
            Site::Name(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelRecord {
    pub site: Site,
    pub channel_number: u32,
    pub logical_channel: u32,
    pub source_id: String,
    pub target_id: TargetId,
    pub call_type: String,
    pub status: String,
    pub allocated_time: u64,
    pub group_num: Option<i64>,
    pub group_label: Option<String>,
}

/// A registration line as extracted from one file: the talkgroup list is
/// still the raw comma-joined token.
#[derive(Clone, Debug, PartialEq)]
pub struct RawRegistration {
    pub source_id: String,
    pub username: String,
    pub site_id: i64,
    pub tg_list: String,
    pub active: String,
    pub timestamp: Option<i64>,
    pub capture_hour: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationRecord {
    pub source_id: String,
    pub username: String,
    pub site: Site,
    pub group_num: Option<i64>,
    pub group_label: Option<String>,
    pub active: String, // literal "true"/"false", not validated
    pub capture_timestamp: Option<i64>,
    pub capture_hour: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AffiliationRecord {
    pub group_num: i64,
    pub site: Site,
    pub affiliation_count: u32,
    pub group_label: Option<String>,
}

/// Everything extracted from a single diagnostic file.
#[derive(Clone, Debug, Default)]
pub struct FileTables {
    pub channels: Vec<ChannelRecord>,
    pub registrations: Vec<RawRegistration>,
    pub affiliations: Vec<AffiliationRecord>,
}

/// The three merged output tables.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    pub channels: Vec<ChannelRecord>,
    pub registrations: Vec<RegistrationRecord>,
    pub affiliations: Vec<AffiliationRecord>,
}
