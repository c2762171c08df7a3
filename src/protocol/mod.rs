//! Protocol identity, list file layout and scoring mode resolution
//!
//! Poka-Yoke: the first protocol resolved under a base directory commits the
//! scoring mode (dense probe list or sparse score list). Every protocol
//! resolved afterwards must follow it; there is no silent fallback.

mod paths;
mod resolver;

pub use paths::{GroupLists, ProtocolPaths};
pub use resolver::{ResolvedProtocol, Resolver};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::list::ListRole;

/// Protocol identifier. The unnamed protocol lives directly in the base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolId(Option<String>);

impl ProtocolId {
    /// The implicit protocol of a single-protocol base directory.
    #[must_use]
    pub const fn unnamed() -> Self {
        Self(None)
    }

    /// A protocol living in `base/<name>`. An empty name is the unnamed protocol.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self(None)
        } else {
            Self(Some(name))
        }
    }

    /// Subdirectory name, `None` for the unnamed protocol.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True for the implicit protocol.
    #[must_use]
    pub const fn is_unnamed(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, "'{name}'"),
            None => f.write_str("<unnamed>"),
        }
    }
}

impl From<&str> for ProtocolId {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for ProtocolId {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<Option<&str>> for ProtocolId {
    fn from(name: Option<&str>) -> Self {
        name.map_or_else(Self::unnamed, Self::named)
    }
}

/// How probes are paired with models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// `for_probes.lst`: every probe against every model of its group
    Dense,
    /// `for_scores.lst`: only the listed (probe, model) pairs
    Sparse,
}

impl ScoringMode {
    /// Mode selected by the `use_dense_probe_list` flag.
    #[must_use]
    pub const fn from_dense_flag(dense: bool) -> Self {
        if dense {
            Self::Dense
        } else {
            Self::Sparse
        }
    }

    /// List role this mode reads probes from.
    #[must_use]
    pub const fn list_role(self) -> ListRole {
        match self {
            Self::Dense => ListRole::Probes,
            Self::Sparse => ListRole::Scores,
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense => f.write_str("dense probe"),
            Self::Sparse => f.write_str("sparse score"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_id_naming() {
        assert!(ProtocolId::named("").is_unnamed());
        assert_eq!(ProtocolId::from("P1").name(), Some("P1"));
        assert_eq!(ProtocolId::from(None::<&str>), ProtocolId::unnamed());
        assert_eq!(ProtocolId::unnamed().to_string(), "<unnamed>");
        assert_eq!(ProtocolId::named("P1").to_string(), "'P1'");
    }

    #[test]
    fn test_scoring_mode_roles() {
        assert_eq!(ScoringMode::from_dense_flag(true), ScoringMode::Dense);
        assert_eq!(ScoringMode::Dense.list_role(), ListRole::Probes);
        assert_eq!(ScoringMode::Sparse.list_role(), ListRole::Scores);
    }
}
