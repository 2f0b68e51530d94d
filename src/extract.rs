use crate::line_parser::{LineClassifier, LineFields};
use crate::model::{AffiliationRecord, ChannelRecord, FileTables, Site};
use log::{debug, trace};

/// Carry-over state for one file: the most recent site declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SiteContext {
    current: Option<i64>,
}

impl SiteContext {
    pub fn update(self, declared: Option<i64>) -> Self {
        match declared {
            Some(site) => SiteContext { current: Some(site) },
            None => self,
        }
    }

    pub fn current(&self) -> Option<i64> {
        self.current
    }
}

/// Fold one line's matches into the per-file tables.
fn absorb(tables: &mut FileTables, ctx: SiteContext, fields: LineFields, line_no: usize) {
    if let Some(ch) = fields.channel {
        match ctx.current() {
            Some(site) => tables.channels.push(ChannelRecord {
                site: Site::Id(site),
                channel_number: ch.channel_number,
                logical_channel: ch.logical_channel,
                source_id: ch.source_id,
                target_id: ch.target_id,
                call_type: ch.call_type,
                status: ch.status,
                allocated_time: ch.allocated_time,
                group_num: None,
                group_label: None,
            }),
            None => trace!("line {}: channel before any site declaration; dropped", line_no),
        }
    }

    if let Some(reg) = fields.registration {
        tables.registrations.push(reg);
    }

    if let Some(aff) = fields.affiliation {
        if aff.declared_sites as usize != aff.sites.len() {
            trace!(
                "line {}: TG:{} declares {} sites, lists {}",
                line_no, aff.group_num, aff.declared_sites, aff.sites.len()
            );
        }
        for (site, count) in aff.sites {
            tables.affiliations.push(AffiliationRecord {
                group_num: aff.group_num,
                site: Site::Id(site),
                affiliation_count: count,
                group_label: None,
            });
        }
    }
}

/// Extract the three record families from one file's text.
/// Never fails: lines that match nothing are skipped.
pub fn extract_text(classifier: &LineClassifier, text: &str) -> FileTables {
    let (tables, _) = text.lines().enumerate().fold(
        (FileTables::default(), SiteContext::default()),
        |(mut tables, ctx), (idx, line)| {
            let fields = classifier.classify(line);
            if fields.is_empty() {
                return (tables, ctx);
            }
            // A site declaration takes effect before a channel on the same line.
            let ctx = ctx.update(fields.site);
            absorb(&mut tables, ctx, fields, idx + 1);
            (tables, ctx)
        },
    );

    debug!(
        "extracted {} channels, {} registrations, {} affiliations",
        tables.channels.len(),
        tables.registrations.len(),
        tables.affiliations.len()
    );
    tables
}
