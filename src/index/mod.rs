//! Per-protocol lookup index
//!
//! An index is an immutable snapshot built once from a [`RecordSet`]. The
//! engine publishes it behind an `Arc`; a reload builds a fresh index and
//! swaps the pointer, so readers holding the old snapshot are never disturbed.
//!
//! ## Layout
//!
//! Records are stored sorted by path, client id, model id and claimed id.
//! Every lookup is a list of positions into that vector in ascending order,
//! so any filtered walk over a lookup yields records in the same stable order.

use rustc_hash::FxHashMap;

use crate::protocol::{ProtocolId, ScoringMode};
use crate::record::{Group, Purpose, Record, RecordSet};
use crate::{Error, Result};

/// A model and the records enrolling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    client_id: String,
    records: Vec<usize>,
}

impl ModelEntry {
    /// Client owning the model.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Positions of the enrollment records in [`ProtocolIndex::records`].
    #[must_use]
    pub fn records(&self) -> &[usize] {
        &self.records
    }
}

/// Read-only lookups over one protocol's records.
#[derive(Debug, Clone)]
pub struct ProtocolIndex {
    protocol: ProtocolId,
    mode: ScoringMode,
    records: Vec<Record>,
    by_client: FxHashMap<String, Vec<usize>>,
    by_model: FxHashMap<String, ModelEntry>,
    by_tmodel: FxHashMap<String, ModelEntry>,
    by_partition: FxHashMap<(Group, Purpose), Vec<usize>>,
    group_models: FxHashMap<Group, Vec<String>>,
}

impl ProtocolIndex {
    /// Build the index for one protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentModel`] when enrollment rows of one model
    /// (dev/eval model lists, or T-norm lists) disagree on its client id.
    pub fn build(set: RecordSet) -> Result<Self> {
        let protocol = set.protocol().clone();
        let mode = set.mode();
        let mut records = set.into_records();
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut by_client: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        let mut by_model: FxHashMap<String, ModelEntry> = FxHashMap::default();
        let mut by_tmodel: FxHashMap<String, ModelEntry> = FxHashMap::default();
        let mut by_partition: FxHashMap<(Group, Purpose), Vec<usize>> = FxHashMap::default();

        for (pos, record) in records.iter().enumerate() {
            by_client
                .entry(record.client_id().to_owned())
                .or_default()
                .push(pos);
            by_partition
                .entry((record.group(), record.purpose()))
                .or_default()
                .push(pos);

            let models = match record {
                Record::Enrollment(r) if record.group() != Group::World => {
                    Some((&mut by_model, r.model_id()))
                }
                Record::TNorm(r) => Some((&mut by_tmodel, r.model_id())),
                _ => None,
            };
            if let Some((models, model_id)) = models {
                register_model(models, model_id, record.client_id(), pos)?;
            }
        }

        let mut group_models: FxHashMap<Group, Vec<String>> = FxHashMap::default();
        for (model_id, entry) in &by_model {
            for group in Group::SCORED {
                if entry.records.iter().any(|&pos| records[pos].group() == group) {
                    group_models.entry(group).or_default().push(model_id.clone());
                }
            }
        }
        for models in group_models.values_mut() {
            models.sort();
        }

        Ok(Self {
            protocol,
            mode,
            records,
            by_client,
            by_model,
            by_tmodel,
            by_partition,
            group_models,
        })
    }

    /// Protocol this index covers.
    #[must_use]
    pub const fn protocol(&self) -> &ProtocolId {
        &self.protocol
    }

    /// Scoring mode of the protocol.
    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// All records in stable order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the protocol holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one (group, purpose) partition.
    pub fn partition(&self, group: Group, purpose: Purpose) -> impl Iterator<Item = &Record> + '_ {
        self.positions(self.by_partition.get(&(group, purpose)).map(Vec::as_slice))
    }

    /// Records of any purpose whose sample belongs to one of `client_ids`,
    /// in index order.
    #[must_use]
    pub fn client_records(&self, client_ids: &[String]) -> Vec<&Record> {
        let mut positions: Vec<usize> = client_ids
            .iter()
            .filter_map(|client_id| self.by_client.get(client_id))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|pos| &self.records[pos]).collect()
    }

    /// Dev/eval model by id.
    #[must_use]
    pub fn model(&self, model_id: &str) -> Option<&ModelEntry> {
        self.by_model.get(model_id)
    }

    /// T-norm model by id.
    #[must_use]
    pub fn tmodel(&self, model_id: &str) -> Option<&ModelEntry> {
        self.by_tmodel.get(model_id)
    }

    /// T-norm models, unordered.
    pub fn tmodels(&self) -> impl Iterator<Item = (&str, &ModelEntry)> + '_ {
        self.by_tmodel.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Model ids enrolled in a dev/eval group, sorted.
    #[must_use]
    pub fn group_models(&self, group: Group) -> &[String] {
        self.group_models.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Enrollment records of a model.
    pub fn model_records<'a>(
        &'a self,
        entry: &'a ModelEntry,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        entry.records.iter().map(move |&pos| &self.records[pos])
    }

    fn positions<'a>(
        &'a self,
        positions: Option<&'a [usize]>,
    ) -> impl Iterator<Item = &'a Record> + 'a {
        positions
            .into_iter()
            .flatten()
            .map(|&pos| &self.records[pos])
    }
}

fn register_model(
    models: &mut FxHashMap<String, ModelEntry>,
    model_id: &str,
    client_id: &str,
    pos: usize,
) -> Result<()> {
    let entry = models
        .entry(model_id.to_owned())
        .or_insert_with(|| ModelEntry {
            client_id: client_id.to_owned(),
            records: Vec::new(),
        });
    if entry.client_id != client_id {
        return Err(Error::InconsistentModel {
            model_id: model_id.to_owned(),
            first: entry.client_id.clone(),
            second: client_id.to_owned(),
        });
    }
    entry.records.push(pos);
    Ok(())
}
