use crate::errors::LookupError;
use crate::model::{Site, TargetId};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// Label for talkgroups in the 400..500 range that have no entry of their own.
pub const UNMAPPED_4XX_LABEL: &str = "Unmapped 4xx";
const BAND_4XX: std::ops::Range<i64> = 400..500;

const DEFAULT_SITES: &str = include_str!("data/sites.csv");
const DEFAULT_TALKGROUPS: &str = include_str!("data/talkgroups.csv");

/// Site names and talkgroup labels, validated when loaded.
#[derive(Clone, Debug, Default)]
pub struct Lookups {
    sites: HashMap<i64, String>,
    groups: HashMap<i64, String>,
}

impl Lookups {
    /// Load both tables. `None` selects the table bundled with the binary.
    pub fn load(sites: Option<&Path>, talkgroups: Option<&Path>) -> Result<Self, LookupError> {
        let sites = match sites {
            Some(p) => parse_table(&p.display().to_string(), &read_table(p)?)?,
            None => parse_table("sites.csv (bundled)", DEFAULT_SITES)?,
        };
        let groups = match talkgroups {
            Some(p) => parse_table(&p.display().to_string(), &read_table(p)?)?,
            None => parse_table("talkgroups.csv (bundled)", DEFAULT_TALKGROUPS)?,
        };
        debug!("lookups: {} sites, {} talkgroups", sites.len(), groups.len());
        Ok(Self { sites, groups })
    }

    #[cfg(test)]
    pub fn from_maps(sites: HashMap<i64, String>, groups: HashMap<i64, String>) -> Self {
        Self { sites, groups }
    }

    /// Map a raw site id to its name. Names and unmapped ids pass through.
    pub fn site(&self, site: &Site) -> Site {
        match site {
            Site::Id(id) => match self.sites.get(id) {
                Some(name) => Site::Name(name.clone()),
                None => site.clone(),
            },
            Site::Name(_) => site.clone(),
        }
    }

    pub fn group_label_num(&self, id: i64) -> String {
        if let Some(label) = self.groups.get(&id) {
            return label.clone();
        }
        if BAND_4XX.contains(&id) {
            return UNMAPPED_4XX_LABEL.to_string();
        }
        id.to_string()
    }

    pub fn group_label(&self, target: &TargetId) -> String {
        match target {
            TargetId::Numeric(id) => self.group_label_num(*id),
            TargetId::Raw(raw) => raw.clone(),
        }
    }
}

fn read_table(path: &Path) -> Result<String, LookupError> {
    std::fs::read_to_string(path).map_err(|e| LookupError::Read {
        table: path.display().to_string(),
        source: csv::Error::from(e),
    })
}

/// Parse an `id,label` table, rejecting anything that is not exactly one
/// integer id and one non-empty label per row, or that repeats an id.
pub fn parse_table(table: &str, contents: &str) -> Result<HashMap<i64, String>, LookupError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let read_err = |source| LookupError::Read { table: table.to_string(), source };
    let malformed = |line: u64, reason: String| LookupError::Malformed {
        table: table.to_string(),
        line,
        reason,
    };

    let headers = rdr.headers().map_err(read_err)?.clone();
    if headers.len() != 2 || &headers[0] != "id" || &headers[1] != "label" {
        return Err(malformed(1, format!("expected header 'id,label', found {:?}", headers)));
    }

    let mut map = HashMap::new();
    let mut first_seen: HashMap<i64, u64> = HashMap::new();
    for rec in rdr.records() {
        let rec = rec.map_err(read_err)?;
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        if rec.len() != 2 {
            return Err(malformed(line, format!("expected 2 fields, found {}", rec.len())));
        }
        let id: i64 = rec[0]
            .parse()
            .map_err(|_| malformed(line, format!("id {:?} is not an integer", &rec[0])))?;
        let label = &rec[1];
        if label.is_empty() {
            return Err(malformed(line, format!("empty label for id {}", id)));
        }
        if let Some(&first_line) = first_seen.get(&id) {
            return Err(LookupError::Duplicate { table: table.to_string(), id, first_line, line });
        }
        first_seen.insert(id, line);
        map.insert(id, label.to_string());
    }

    if map.is_empty() {
        return Err(LookupError::Empty { table: table.to_string() });
    }
    Ok(map)
}
