use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::EngineConfig;
use crate::normalize::normalize_subject;
use crate::record::RawRecord;

/// Coarse identity of a fixture: normalized subjects plus kickoff day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub subject_a: String,
    pub subject_b: String,
    pub day: Option<NaiveDate>,
}

impl IdentityKey {
    pub fn of(record: &RawRecord) -> Self {
        Self {
            subject_a: normalize_subject(record.subject_a()),
            subject_b: normalize_subject(record.subject_b()),
            day: record.day(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(day) => write!(f, "{}_{}_{}", self.subject_a, self.subject_b, day),
            None => write!(f, "{}_{}_undated", self.subject_a, self.subject_b),
        }
    }
}

/// Records from distinct sources believed to describe one fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup {
    pub key: IdentityKey,
    /// One record per source tag.
    pub records: BTreeMap<String, RawRecord>,
    /// Earlier records displaced by a later one from the same source.
    pub superseded: Vec<RawRecord>,
}

impl CandidateGroup {
    pub fn new(key: IdentityKey) -> Self {
        Self {
            key,
            records: BTreeMap::new(),
            superseded: Vec::new(),
        }
    }

    /// Build a group directly, keyed by the first record. Later records from
    /// the same source replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
        let mut iter = records.into_iter().peekable();
        let key = iter
            .peek()
            .map(IdentityKey::of)
            .unwrap_or(IdentityKey {
                subject_a: String::new(),
                subject_b: String::new(),
                day: None,
            });
        let mut group = Self::new(key);
        for rec in iter {
            group.insert(rec);
        }
        group
    }

    pub fn insert(&mut self, record: RawRecord) {
        if let Some(prev) = self.records.insert(record.source_tag.clone(), record) {
            debug!(
                group = %self.key,
                source = %prev.source_tag,
                "duplicate source report, keeping the later one"
            );
            self.superseded.push(prev);
        }
    }

    pub fn sources_count(&self) -> usize {
        self.records.len()
    }

    pub fn source_tags(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Every input record that landed in this group, displaced ones included.
    pub fn record_count(&self) -> usize {
        self.records.len() + self.superseded.len()
    }

    fn absorb(&mut self, other: CandidateGroup) {
        self.superseded.extend(other.superseded);
        for rec in other.records.into_values() {
            self.insert(rec);
        }
    }
}

/// Partition a batch into candidate groups.
///
/// Records are first bucketed by exact [`IdentityKey`]. Dated buckets for the
/// same subject pair are then chained whenever a bucket's day lies within
/// `max_date_difference_days` of the previous bucket's day, so a source that
/// reports the next calendar day still lands with the others. The earliest
/// day names the merged group. Undated buckets never chain.
pub fn group_records(records: Vec<RawRecord>, cfg: &EngineConfig) -> Vec<CandidateGroup> {
    let mut buckets: HashMap<IdentityKey, CandidateGroup> = HashMap::new();
    for rec in records {
        let key = IdentityKey::of(&rec);
        buckets
            .entry(key.clone())
            .or_insert_with(|| CandidateGroup::new(key))
            .insert(rec);
    }

    let mut ordered: Vec<CandidateGroup> = buckets.into_values().collect();
    ordered.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out: Vec<CandidateGroup> = Vec::with_capacity(ordered.len());
    // Day of the most recently absorbed bucket for the group at the tail of `out`.
    let mut tail_day: Option<NaiveDate> = None;
    for bucket in ordered {
        let chain = match (out.last(), tail_day, bucket.key.day) {
            (Some(last), Some(prev), Some(day)) => {
                last.key.subject_a == bucket.key.subject_a
                    && last.key.subject_b == bucket.key.subject_b
                    && (day - prev).num_days() <= cfg.max_date_difference_days
            }
            _ => false,
        };
        tail_day = bucket.key.day;
        match out.last_mut() {
            Some(last) if chain => last.absorb(bucket),
            _ => out.push(bucket),
        }
    }

    debug!(groups = out.len(), "grouped batch");
    out
}
