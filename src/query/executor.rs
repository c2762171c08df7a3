//! Query execution over a protocol index
//!
//! Toyota Way Principles:
//! - Jidoka: a filter the scoring mode cannot honour is rejected, never ignored
//! - Heijunka: every result comes back in one stable order, whatever the filter

use std::collections::{BTreeMap, BTreeSet};

use super::{Filter, Model, ProbePair};
use crate::index::ProtocolIndex;
use crate::protocol::ScoringMode;
use crate::record::{Group, Purpose, Record, Sample};
use crate::{Error, Result};

/// Executes filters against one protocol index.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    index: &'a ProtocolIndex,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor over `index`.
    #[must_use]
    pub const fn new(index: &'a ProtocolIndex) -> Self {
        Self { index }
    }

    /// Records matching the filter, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `filter.classes` is set on a dense
    /// protocol; dense probes carry no claimed identity.
    pub fn objects(&self, filter: &Filter) -> Result<Vec<Record>> {
        self.check_classes(filter)?;
        Ok(self
            .candidates(filter)
            .into_iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    /// Distinct true client ids of the matching records, sorted.
    ///
    /// # Errors
    ///
    /// Same as [`Self::objects`].
    pub fn clients(&self, filter: &Filter) -> Result<Vec<String>> {
        self.check_classes(filter)?;
        let clients: BTreeSet<&str> = self
            .candidates(filter)
            .into_iter()
            .filter(|record| filter.matches(record))
            .map(Record::client_id)
            .collect();
        Ok(clients.into_iter().map(str::to_owned).collect())
    }

    /// Models of the requested groups (dev and eval by default), sorted by id.
    ///
    /// Asking for [`Group::World`] explicitly yields one model per training
    /// client, whose id is the client id.
    #[must_use]
    pub fn models(&self, filter: &Filter) -> Vec<Model> {
        let groups: Vec<Group> = if filter.groups.is_empty() {
            Group::SCORED.to_vec()
        } else {
            filter.groups.clone()
        };

        let mut models: BTreeMap<&str, &str> = BTreeMap::new();
        for group in groups {
            if group == Group::World {
                for record in self.index.partition(Group::World, Purpose::Enroll) {
                    let client_id = record.client_id();
                    if filter.accepts_model(client_id) && filter.accepts_client(client_id) {
                        models.insert(client_id, client_id);
                    }
                }
                continue;
            }
            for model_id in self.index.group_models(group) {
                let Some(entry) = self.index.model(model_id) else {
                    continue;
                };
                if filter.accepts_model(model_id) && filter.accepts_client(entry.client_id()) {
                    models.insert(model_id, entry.client_id());
                }
            }
        }

        models
            .into_iter()
            .map(|(model_id, client_id)| Model::new(model_id, client_id))
            .collect()
    }

    /// T-norm models whose records fall in the requested groups, sorted by id.
    #[must_use]
    pub fn tmodels(&self, filter: &Filter) -> Vec<Model> {
        let mut models: Vec<Model> = self
            .index
            .tmodels()
            .filter(|(model_id, entry)| {
                filter.accepts_model(model_id)
                    && filter.accepts_client(entry.client_id())
                    && self
                        .index
                        .model_records(entry)
                        .any(|record| filter.accepts_group(record.group()))
            })
            .map(|(model_id, entry)| Model::new(model_id, entry.client_id()))
            .collect();
        models.sort();
        models
    }

    /// The (probe, model) comparisons to score.
    ///
    /// Dense protocols pair every probe of a group with every model of the
    /// same group, the claimed client being the model owner. Sparse protocols
    /// return the score list rows as they are. Pairs are sorted by probe path,
    /// true client and model.
    #[must_use]
    pub fn probe_pairs(&self, filter: &Filter) -> Vec<ProbePair> {
        let mut pairs = Vec::new();
        for group in Group::SCORED {
            if !filter.accepts_group(group) {
                continue;
            }
            match self.index.mode() {
                ScoringMode::Dense => self.dense_pairs(group, filter, &mut pairs),
                ScoringMode::Sparse => self.sparse_pairs(group, filter, &mut pairs),
            }
        }
        pairs.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        pairs
    }

    fn dense_pairs(&self, group: Group, filter: &Filter, pairs: &mut Vec<ProbePair>) {
        let models: Vec<(&str, &str)> = self
            .index
            .group_models(group)
            .iter()
            .filter(|model_id| filter.accepts_model(model_id))
            .filter_map(|model_id| {
                self.index
                    .model(model_id)
                    .map(|entry| (model_id.as_str(), entry.client_id()))
            })
            .collect();

        for probe in self.index.partition(group, Purpose::Probe) {
            if !filter.accepts_client(probe.client_id()) {
                continue;
            }
            for &(model_id, owner) in &models {
                let pair = ProbePair::new(group, probe.sample().clone(), model_id, owner);
                if filter.accepts_class(pair.class()) {
                    pairs.push(pair);
                }
            }
        }
    }

    fn sparse_pairs(&self, group: Group, filter: &Filter, pairs: &mut Vec<ProbePair>) {
        for record in self.index.partition(group, Purpose::Score) {
            let Record::Score(score) = record else {
                continue;
            };
            if filter.accepts_client(record.client_id())
                && filter.accepts_model(score.model_id())
                && filter.accepts_class(score.class())
            {
                pairs.push(ProbePair::new(
                    group,
                    record.sample().clone(),
                    score.model_id(),
                    score.claimed_client_id(),
                ));
            }
        }
    }

    /// Distinct samples of the matching records, sorted by path.
    ///
    /// # Errors
    ///
    /// Same as [`Self::objects`].
    pub fn samples(&self, filter: &Filter) -> Result<Vec<Sample>> {
        self.check_classes(filter)?;
        let mut samples: BTreeMap<&str, &Sample> = BTreeMap::new();
        for record in self.candidates(filter).into_iter().filter(|r| filter.matches(r)) {
            samples.entry(record.path()).or_insert_with(|| record.sample());
        }
        Ok(samples.into_values().cloned().collect())
    }

    /// Client owning `model_id`, searching dev, eval, then world records of
    /// the groups accepted by `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`] when no accepted group holds the model.
    pub fn client_id_from_model_id(&self, model_id: &str, filter: &Filter) -> Result<String> {
        if let Some(entry) = self.index.model(model_id) {
            let in_group = self
                .index
                .model_records(entry)
                .any(|record| filter.accepts_group(record.group()));
            if in_group {
                return Ok(entry.client_id().to_owned());
            }
        }
        if filter.accepts_group(Group::World) {
            let world = self
                .index
                .partition(Group::World, Purpose::Enroll)
                .find(|record| record.model_id() == Some(model_id));
            if let Some(record) = world {
                return Ok(record.client_id().to_owned());
            }
        }
        Err(self.unknown_model(model_id))
    }

    /// Client owning the T-norm model `model_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`] when no accepted group holds the model.
    pub fn client_id_from_tmodel_id(&self, model_id: &str, filter: &Filter) -> Result<String> {
        self.index
            .tmodel(model_id)
            .filter(|entry| {
                self.index
                    .model_records(entry)
                    .any(|record| filter.accepts_group(record.group()))
            })
            .map(|entry| entry.client_id().to_owned())
            .ok_or_else(|| self.unknown_model(model_id))
    }

    fn unknown_model(&self, model_id: &str) -> Error {
        Error::UnknownModel {
            protocol: self.index.protocol().clone(),
            model_id: model_id.to_owned(),
        }
    }

    /// Records a filter can match, narrowed by client id when it names any.
    fn candidates(&self, filter: &Filter) -> Vec<&'a Record> {
        if filter.client_ids.is_empty() {
            self.index.records().iter().collect()
        } else {
            self.index.client_records(&filter.client_ids)
        }
    }

    fn check_classes(&self, filter: &Filter) -> Result<()> {
        if !filter.classes.is_empty() && self.index.mode() == ScoringMode::Dense {
            return Err(Error::InvalidInput(format!(
                "protocol {} uses dense probe lists; filter by class through probe_pairs",
                self.index.protocol()
            )));
        }
        Ok(())
    }
}
