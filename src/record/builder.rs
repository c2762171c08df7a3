//! Record model builder: parsed rows -> typed records
//!
//! Building is all-or-nothing per protocol. The first parse failure, duplicate
//! sample or dangling model reference aborts the whole build.

use std::path::Path;

use rustc_hash::FxHashSet;

use super::{
    EnrollmentRecord, Group, ProbeRecord, Record, Sample, ScoreRecord, TNormRecord, ZNormRecord,
};
use crate::list::{self, ListRole, Row};
use crate::protocol::{GroupLists, ProtocolId, ResolvedProtocol, ScoringMode};
use crate::{Error, Result};

/// Every record of one protocol, in list-file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    protocol: ProtocolId,
    mode: ScoringMode,
    records: Vec<Record>,
}

impl RecordSet {
    /// Assemble a record set from already-built records.
    #[must_use]
    pub const fn new(protocol: ProtocolId, mode: ScoringMode, records: Vec<Record>) -> Self {
        Self {
            protocol,
            mode,
            records,
        }
    }

    /// Protocol the records belong to.
    #[must_use]
    pub const fn protocol(&self) -> &ProtocolId {
        &self.protocol
    }

    /// Scoring mode the probe-side records follow.
    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Built records.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Take ownership of the records.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no list contributed a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rejects a second occurrence of the same key within one partition.
#[derive(Default)]
struct UniqueKeys {
    seen: FxHashSet<String>,
}

impl UniqueKeys {
    /// `path` is the list the row came from, reported on a duplicate.
    fn insert(&mut self, key: String, path: &Path, row: &Row) -> Result<()> {
        if self.seen.insert(key.clone()) {
            Ok(())
        } else {
            Err(Error::DuplicateSample {
                path: path.to_path_buf(),
                line: row.line(),
                sample: key,
            })
        }
    }
}

/// Build every record of a resolved protocol.
///
/// - World lists (all optional) become enrollment records of the world group
///   whose model id is the client id. They share one (world, enroll)
///   partition, so a path may appear in only one of them.
/// - For each dev/eval directory present, the model list and the committed
///   scoring list are mandatory; T-norm and Z-norm lists are optional.
///
/// # Errors
///
/// Any [`list::parse`] error, [`Error::DuplicateSample`], or
/// [`Error::UnknownModel`] when a score row targets a model missing from its
/// group's model list.
pub fn build_records(resolved: &ResolvedProtocol) -> Result<RecordSet> {
    let paths = resolved.paths();
    let protocol = paths.protocol().clone();
    let mode = resolved.mode();
    let mut records = Vec::new();

    let mut world = UniqueKeys::default();
    for role in ListRole::WORLD_ROLES {
        let Some(path) = paths.list_file(Group::World, role) else {
            continue;
        };
        for row in list::parse(path, role.columns(), false)? {
            world.insert(row.field(0).to_owned(), path, &row)?;
            let sample = Sample::new(row.field(0), row.field(1));
            records.push(Record::Enrollment(EnrollmentRecord::new(
                protocol.clone(),
                Group::World,
                role,
                sample,
                row.field(1),
            )));
        }
    }

    for group in Group::SCORED {
        if !paths.has_group_dir(group) {
            tracing::debug!(%protocol, %group, "group directory absent");
            continue;
        }
        build_group(&protocol, paths.group_lists(group), group, mode, &mut records)?;
    }

    Ok(RecordSet::new(protocol, mode, records))
}

fn build_group(
    protocol: &ProtocolId,
    lists: &GroupLists,
    group: Group,
    mode: ScoringMode,
    records: &mut Vec<Record>,
) -> Result<()> {
    // Models (mandatory)
    let models_path = lists.models();
    let mut unique = UniqueKeys::default();
    let mut model_ids: FxHashSet<String> = FxHashSet::default();
    for row in list::parse(models_path, ListRole::Models.columns(), true)? {
        unique.insert(row.field(0).to_owned(), models_path, &row)?;
        model_ids.insert(row.field(1).to_owned());
        records.push(Record::Enrollment(EnrollmentRecord::new(
            protocol.clone(),
            group,
            ListRole::Models,
            Sample::new(row.field(0), row.field(2)),
            row.field(1),
        )));
    }

    // Probes or scores, per committed mode (mandatory)
    match mode {
        ScoringMode::Dense => {
            let path = lists.probes();
            let mut unique = UniqueKeys::default();
            for row in list::parse(path, ListRole::Probes.columns(), true)? {
                unique.insert(row.field(0).to_owned(), path, &row)?;
                records.push(Record::Probe(ProbeRecord::new(
                    protocol.clone(),
                    group,
                    Sample::new(row.field(0), row.field(1)),
                )));
            }
        }
        ScoringMode::Sparse => {
            let path = lists.scores();
            let mut unique = UniqueKeys::default();
            for row in list::parse(path, ListRole::Scores.columns(), true)? {
                // One probe file may be listed once per model it is scored against
                unique.insert(format!("{} {}", row.field(0), row.field(1)), path, &row)?;
                if !model_ids.contains(row.field(1)) {
                    return Err(Error::UnknownModel {
                        protocol: protocol.clone(),
                        model_id: row.field(1).to_owned(),
                    });
                }
                records.push(Record::Score(ScoreRecord::new(
                    protocol.clone(),
                    group,
                    Sample::new(row.field(0), row.field(3)),
                    row.field(1),
                    row.field(2),
                )));
            }
        }
    }

    // T-norm / Z-norm (optional)
    let path = lists.tnorm();
    let mut unique = UniqueKeys::default();
    for row in list::parse(path, ListRole::TNorm.columns(), false)? {
        unique.insert(row.field(0).to_owned(), path, &row)?;
        records.push(Record::TNorm(TNormRecord::new(
            protocol.clone(),
            group,
            Sample::new(row.field(0), row.field(2)),
            row.field(1),
        )));
    }

    let path = lists.znorm();
    let mut unique = UniqueKeys::default();
    for row in list::parse(path, ListRole::ZNorm.columns(), false)? {
        unique.insert(row.field(0).to_owned(), path, &row)?;
        records.push(Record::ZNorm(ZNormRecord::new(
            protocol.clone(),
            group,
            Sample::new(row.field(0), row.field(1)),
        )));
    }

    Ok(())
}
