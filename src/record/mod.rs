//! Typed protocol records
//!
//! ## Schema Overview
//!
//! ```text
//! Sample (path, client_id)
//!   ├── EnrollmentRecord  + model_id              world / dev / eval, enroll
//!   ├── ProbeRecord                               dev / eval, probe  (dense)
//!   ├── ScoreRecord       + model_id + claimed    dev / eval, score  (sparse)
//!   ├── TNormRecord       + model_id              dev / eval, tnorm
//!   └── ZNormRecord                               dev / eval, znorm
//! ```
//!
//! Records are immutable once built and always carry the protocol they belong to.

mod builder;

pub use builder::{build_records, RecordSet};

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::list::ListRole;
use crate::protocol::ProtocolId;
use crate::Error;

/// Protocol partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Training data
    World,
    /// Development set
    Dev,
    /// Evaluation set
    Eval,
}

impl Group {
    /// All groups.
    pub const ALL: [Self; 3] = [Self::World, Self::Dev, Self::Eval];

    /// Groups holding models and probes.
    pub const SCORED: [Self; 2] = [Self::Dev, Self::Eval];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Dev => "dev",
            Self::Eval => "eval",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "world" => Ok(Self::World),
            "dev" => Ok(Self::Dev),
            "eval" => Ok(Self::Eval),
            other => Err(Error::InvalidInput(format!(
                "invalid group '{other}', expected one of world, dev, eval"
            ))),
        }
    }
}

/// Role a sample plays within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Builds a model (or trains, in the world group)
    Enroll,
    /// Dense probe, scored against every model of its group
    Probe,
    /// Explicit (probe, model) scoring pair
    Score,
    /// T-norm cohort model sample
    TNorm,
    /// Z-norm cohort sample
    ZNorm,
}

impl Purpose {
    /// All purposes.
    pub const ALL: [Self; 5] = [Self::Enroll, Self::Probe, Self::Score, Self::TNorm, Self::ZNorm];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enroll => "enroll",
            Self::Probe => "probe",
            Self::Score => "score",
            Self::TNorm => "tnorm",
            Self::ZNorm => "znorm",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "invalid purpose '{s}', expected one of enroll, probe, score, tnorm, znorm"
                ))
            })
    }
}

/// Whether a scoring pair is a genuine or an impostor access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeClass {
    /// True client equals the claimed client
    Client,
    /// True client differs from the claimed client
    Impostor,
}

impl ProbeClass {
    /// Classify a (true client, claimed client) pair.
    #[must_use]
    pub fn of(client_id: &str, claimed_client_id: &str) -> Self {
        if client_id == claimed_client_id {
            Self::Client
        } else {
            Self::Impostor
        }
    }
}

/// A data file (relative, extension-less) and the client it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sample {
    path: String,
    client_id: String,
}

impl Sample {
    /// Create a sample.
    #[must_use]
    pub fn new(path: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            client_id: client_id.into(),
        }
    }

    /// Path relative to the raw data root, without extension.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Owning client.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Join the sample path onto `directory` and append `extension`.
    ///
    /// ```rust
    /// use filelist_db::Sample;
    /// use std::path::Path;
    ///
    /// let sample = Sample::new("data/s001", "c1");
    /// let full = sample.make_path(Some(Path::new("/raw")), Some(".wav"));
    /// assert_eq!(full, Path::new("/raw/data/s001.wav"));
    /// ```
    #[must_use]
    pub fn make_path(&self, directory: Option<&Path>, extension: Option<&str>) -> PathBuf {
        let file = format!("{}{}", self.path, extension.unwrap_or_default());
        directory.map_or_else(|| PathBuf::from(&file), |dir| dir.join(&file))
    }
}

/// One file used to build one model (or one training file, model id = client id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    protocol: ProtocolId,
    group: Group,
    role: ListRole,
    sample: Sample,
    model_id: String,
}

impl EnrollmentRecord {
    /// Create an enrollment record.
    #[must_use]
    pub fn new(
        protocol: ProtocolId,
        group: Group,
        role: ListRole,
        sample: Sample,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            group,
            role,
            sample,
            model_id: model_id.into(),
        }
    }

    /// Model this sample enrolls.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Dense probe: scored against every model in its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    protocol: ProtocolId,
    group: Group,
    sample: Sample,
}

impl ProbeRecord {
    /// Create a probe record.
    #[must_use]
    pub const fn new(protocol: ProtocolId, group: Group, sample: Sample) -> Self {
        Self {
            protocol,
            group,
            sample,
        }
    }
}

/// Sparse scoring pair: one probe sample against one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    protocol: ProtocolId,
    group: Group,
    sample: Sample,
    model_id: String,
    claimed_client_id: String,
}

impl ScoreRecord {
    /// Create a score record.
    #[must_use]
    pub fn new(
        protocol: ProtocolId,
        group: Group,
        sample: Sample,
        model_id: impl Into<String>,
        claimed_client_id: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            group,
            sample,
            model_id: model_id.into(),
            claimed_client_id: claimed_client_id.into(),
        }
    }

    /// Model the probe is scored against.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Identity the probe claims.
    #[must_use]
    pub fn claimed_client_id(&self) -> &str {
        &self.claimed_client_id
    }

    /// Genuine or impostor access.
    #[must_use]
    pub fn class(&self) -> ProbeClass {
        ProbeClass::of(self.sample.client_id(), &self.claimed_client_id)
    }
}

/// Sample enrolling a T-norm cohort model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TNormRecord {
    protocol: ProtocolId,
    group: Group,
    sample: Sample,
    model_id: String,
}

impl TNormRecord {
    /// Create a T-norm record.
    #[must_use]
    pub fn new(protocol: ProtocolId, group: Group, sample: Sample, model_id: impl Into<String>) -> Self {
        Self {
            protocol,
            group,
            sample,
            model_id: model_id.into(),
        }
    }

    /// T-norm model id.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Z-norm cohort sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZNormRecord {
    protocol: ProtocolId,
    group: Group,
    sample: Sample,
}

impl ZNormRecord {
    /// Create a Z-norm record.
    #[must_use]
    pub const fn new(protocol: ProtocolId, group: Group, sample: Sample) -> Self {
        Self {
            protocol,
            group,
            sample,
        }
    }
}

/// Any record a protocol can hold, one variant per list role family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// World, optional world or model list row
    Enrollment(EnrollmentRecord),
    /// Dense probe list row
    Probe(ProbeRecord),
    /// Sparse score list row
    Score(ScoreRecord),
    /// T-norm list row
    TNorm(TNormRecord),
    /// Z-norm list row
    ZNorm(ZNormRecord),
}

impl Record {
    /// Protocol the record belongs to.
    #[must_use]
    pub const fn protocol(&self) -> &ProtocolId {
        match self {
            Self::Enrollment(r) => &r.protocol,
            Self::Probe(r) => &r.protocol,
            Self::Score(r) => &r.protocol,
            Self::TNorm(r) => &r.protocol,
            Self::ZNorm(r) => &r.protocol,
        }
    }

    /// Group the record belongs to.
    #[must_use]
    pub const fn group(&self) -> Group {
        match self {
            Self::Enrollment(r) => r.group,
            Self::Probe(r) => r.group,
            Self::Score(r) => r.group,
            Self::TNorm(r) => r.group,
            Self::ZNorm(r) => r.group,
        }
    }

    /// Purpose of the record.
    #[must_use]
    pub const fn purpose(&self) -> Purpose {
        match self {
            Self::Enrollment(_) => Purpose::Enroll,
            Self::Probe(_) => Purpose::Probe,
            Self::Score(_) => Purpose::Score,
            Self::TNorm(_) => Purpose::TNorm,
            Self::ZNorm(_) => Purpose::ZNorm,
        }
    }

    /// List file role the record was read from.
    #[must_use]
    pub const fn role(&self) -> ListRole {
        match self {
            Self::Enrollment(r) => r.role,
            Self::Probe(_) => ListRole::Probes,
            Self::Score(_) => ListRole::Scores,
            Self::TNorm(_) => ListRole::TNorm,
            Self::ZNorm(_) => ListRole::ZNorm,
        }
    }

    /// Underlying sample.
    #[must_use]
    pub const fn sample(&self) -> &Sample {
        match self {
            Self::Enrollment(r) => &r.sample,
            Self::Probe(r) => &r.sample,
            Self::Score(r) => &r.sample,
            Self::TNorm(r) => &r.sample,
            Self::ZNorm(r) => &r.sample,
        }
    }

    /// Sample path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.sample().path()
    }

    /// True client id of the sample.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.sample().client_id()
    }

    /// Model id, for the record kinds bound to a model.
    #[must_use]
    pub fn model_id(&self) -> Option<&str> {
        match self {
            Self::Enrollment(r) => Some(&r.model_id),
            Self::Score(r) => Some(&r.model_id),
            Self::TNorm(r) => Some(&r.model_id),
            Self::Probe(_) | Self::ZNorm(_) => None,
        }
    }

    /// Claimed client id, sparse score records only.
    #[must_use]
    pub fn claimed_client_id(&self) -> Option<&str> {
        match self {
            Self::Score(r) => Some(&r.claimed_client_id),
            _ => None,
        }
    }

    /// Ordering key: path, client id, model id, claimed id, then group and purpose.
    #[must_use]
    pub fn sort_key(&self) -> (&str, &str, Option<&str>, Option<&str>, Group, Purpose, ListRole) {
        (
            self.path(),
            self.client_id(),
            self.model_id(),
            self.claimed_client_id(),
            self.group(),
            self.purpose(),
            self.role(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(client: &str, claimed: &str) -> Record {
        Record::Score(ScoreRecord::new(
            ProtocolId::unnamed(),
            Group::Dev,
            Sample::new("s1", client),
            "m1",
            claimed,
        ))
    }

    #[test]
    fn test_group_and_purpose_parse() {
        assert_eq!("dev".parse::<Group>().unwrap(), Group::Dev);
        assert_eq!("znorm".parse::<Purpose>().unwrap(), Purpose::ZNorm);
        assert!(matches!(
            "optional".parse::<Group>(),
            Err(Error::InvalidInput(_))
        ));
        assert!("enrol".parse::<Purpose>().is_err());
    }

    #[test]
    fn test_score_class() {
        let Record::Score(genuine) = score("c1", "c1") else {
            unreachable!()
        };
        let Record::Score(impostor) = score("c2", "c1") else {
            unreachable!()
        };
        assert_eq!(genuine.class(), ProbeClass::Client);
        assert_eq!(impostor.class(), ProbeClass::Impostor);
    }

    #[test]
    fn test_record_accessors() {
        let record = score("c2", "c1");
        assert_eq!(record.purpose(), Purpose::Score);
        assert_eq!(record.role(), ListRole::Scores);
        assert_eq!(record.model_id(), Some("m1"));
        assert_eq!(record.claimed_client_id(), Some("c1"));
        assert_eq!(record.client_id(), "c2");

        let probe = Record::Probe(ProbeRecord::new(
            ProtocolId::named("P1"),
            Group::Eval,
            Sample::new("s2", "c3"),
        ));
        assert_eq!(probe.model_id(), None);
        assert_eq!(probe.protocol().name(), Some("P1"));
        assert_eq!(probe.group(), Group::Eval);
    }

    #[test]
    fn test_make_path_without_directory() {
        let sample = Sample::new("data/s001", "c1");
        assert_eq!(sample.make_path(None, None), Path::new("data/s001"));
        assert_eq!(sample.make_path(None, Some(".png")), Path::new("data/s001.png"));
    }

    #[test]
    fn test_record_serializes_with_kind_tag() {
        let json = serde_json::to_value(score("c1", "c1")).unwrap();
        assert_eq!(json["kind"], "score");
        assert_eq!(json["group"], "dev");
        assert_eq!(json["model_id"], "m1");
    }
}
