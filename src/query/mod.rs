//! Query filters and result types
//!
//! Every query takes one [`Filter`]. Empty fields are wildcards; fields
//! combine with AND, values within one field with OR.
//!
//! ```rust
//! use filelist_db::{Filter, Group, Purpose};
//!
//! let filter = Filter::new()
//!     .protocol("P1")
//!     .groups([Group::Dev, Group::Eval])
//!     .purpose(Purpose::Enroll)
//!     .model_id("m1");
//! assert_eq!(filter.groups.len(), 2);
//! ```

mod executor;

pub use executor::QueryExecutor;

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolId;
use crate::record::{Group, ProbeClass, Purpose, Record, Sample};

/// Query criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Protocol to query; `None` uses the configured default protocol
    pub protocol: Option<ProtocolId>,
    /// Groups to include
    pub groups: Vec<Group>,
    /// Purposes to include
    pub purposes: Vec<Purpose>,
    /// True client ids to include
    pub client_ids: Vec<String>,
    /// Model ids to include (records without a model pass)
    pub model_ids: Vec<String>,
    /// Genuine / impostor classes to include (score records and probe pairs)
    pub classes: Vec<ProbeClass>,
}

impl Filter {
    /// Wildcard filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one protocol.
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<ProtocolId>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Add one group.
    #[must_use]
    pub fn group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Add several groups.
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Add one purpose.
    #[must_use]
    pub fn purpose(mut self, purpose: Purpose) -> Self {
        self.purposes.push(purpose);
        self
    }

    /// Add several purposes.
    #[must_use]
    pub fn purposes(mut self, purposes: impl IntoIterator<Item = Purpose>) -> Self {
        self.purposes.extend(purposes);
        self
    }

    /// Add one client id.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_ids.push(client_id.into());
        self
    }

    /// Add several client ids.
    #[must_use]
    pub fn client_ids<S: Into<String>>(mut self, client_ids: impl IntoIterator<Item = S>) -> Self {
        self.client_ids.extend(client_ids.into_iter().map(Into::into));
        self
    }

    /// Add one model id.
    #[must_use]
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_ids.push(model_id.into());
        self
    }

    /// Add several model ids.
    #[must_use]
    pub fn model_ids<S: Into<String>>(mut self, model_ids: impl IntoIterator<Item = S>) -> Self {
        self.model_ids.extend(model_ids.into_iter().map(Into::into));
        self
    }

    /// Add one probe class.
    #[must_use]
    pub fn class(mut self, class: ProbeClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Add several probe classes.
    #[must_use]
    pub fn classes(mut self, classes: impl IntoIterator<Item = ProbeClass>) -> Self {
        self.classes.extend(classes);
        self
    }

    pub(crate) fn accepts_group(&self, group: Group) -> bool {
        self.groups.is_empty() || self.groups.contains(&group)
    }

    pub(crate) fn accepts_purpose(&self, purpose: Purpose) -> bool {
        self.purposes.is_empty() || self.purposes.contains(&purpose)
    }

    pub(crate) fn accepts_client(&self, client_id: &str) -> bool {
        self.client_ids.is_empty() || self.client_ids.iter().any(|c| c == client_id)
    }

    pub(crate) fn accepts_model(&self, model_id: &str) -> bool {
        self.model_ids.is_empty() || self.model_ids.iter().any(|m| m == model_id)
    }

    pub(crate) fn accepts_class(&self, class: ProbeClass) -> bool {
        self.classes.is_empty() || self.classes.contains(&class)
    }

    /// True when a record satisfies every criterion.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.accepts_group(record.group())
            && self.accepts_purpose(record.purpose())
            && self.accepts_client(record.client_id())
            && record.model_id().map_or(true, |m| self.accepts_model(m))
            && match record {
                Record::Score(score) => self.accepts_class(score.class()),
                _ => true,
            }
    }
}

/// A model id and the client owning it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Model {
    model_id: String,
    client_id: String,
}

impl Model {
    /// Create a model entry.
    #[must_use]
    pub fn new(model_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Model id.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Owning client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

/// One (probe sample, model) comparison to score, identical in both scoring modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbePair {
    group: Group,
    sample: Sample,
    model_id: String,
    claimed_client_id: String,
}

impl ProbePair {
    /// Create a probe pair.
    #[must_use]
    pub fn new(
        group: Group,
        sample: Sample,
        model_id: impl Into<String>,
        claimed_client_id: impl Into<String>,
    ) -> Self {
        Self {
            group,
            sample,
            model_id: model_id.into(),
            claimed_client_id: claimed_client_id.into(),
        }
    }

    /// Group of the probe and model.
    #[must_use]
    pub const fn group(&self) -> Group {
        self.group
    }

    /// Probe sample.
    #[must_use]
    pub const fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Probe path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.sample.path()
    }

    /// Model scored against.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Identity claimed by targeting the model.
    #[must_use]
    pub fn claimed_client_id(&self) -> &str {
        &self.claimed_client_id
    }

    /// True identity of the probe.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.sample.client_id()
    }

    /// Genuine or impostor access.
    #[must_use]
    pub fn class(&self) -> ProbeClass {
        ProbeClass::of(self.client_id(), &self.claimed_client_id)
    }

    /// `(probe path, model id, claimed client id, true client id)`.
    #[must_use]
    pub fn as_tuple(&self) -> (&str, &str, &str, &str) {
        (
            self.path(),
            &self.model_id,
            &self.claimed_client_id,
            self.client_id(),
        )
    }

    fn sort_key(&self) -> (&str, &str, &str, &str, Group) {
        (
            self.path(),
            self.client_id(),
            &self.model_id,
            &self.claimed_client_id,
            self.group,
        )
    }
}
