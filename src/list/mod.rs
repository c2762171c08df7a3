//! List files and their parser
//!
//! A protocol is a handful of whitespace-delimited text files, one record per
//! line, no header. Each file role has a fixed column layout:
//!
//! ```text
//! world / optional world 1/2   path client_id
//! models                       path model_id client_id
//! probes (dense)               path client_id
//! scores (sparse)              path model_id claimed_client_id client_id
//! tnorm                        path model_id client_id
//! znorm                        path client_id
//! ```

mod parser;

pub use parser::{parse, parse_reader, Row};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a list file plays in a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListRole {
    /// Training list
    World,
    /// First optional training list
    OptionalWorld1,
    /// Second optional training list
    OptionalWorld2,
    /// Model enrollment list (dev/eval)
    Models,
    /// Dense probe list (dev/eval)
    Probes,
    /// Sparse score list (dev/eval)
    Scores,
    /// T-norm model list (dev/eval)
    TNorm,
    /// Z-norm sample list (dev/eval)
    ZNorm,
}

impl ListRole {
    /// All roles, world lists first.
    pub const ALL: [Self; 8] = [
        Self::World,
        Self::OptionalWorld1,
        Self::OptionalWorld2,
        Self::Models,
        Self::Probes,
        Self::Scores,
        Self::TNorm,
        Self::ZNorm,
    ];

    /// Roles living in the dev/eval group directories.
    pub const GROUP_ROLES: [Self; 5] =
        [Self::Models, Self::Probes, Self::Scores, Self::TNorm, Self::ZNorm];

    /// Training list roles.
    pub const WORLD_ROLES: [Self; 3] = [Self::World, Self::OptionalWorld1, Self::OptionalWorld2];

    /// Number of whitespace-separated columns per row.
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::World | Self::OptionalWorld1 | Self::OptionalWorld2 | Self::Probes | Self::ZNorm => 2,
            Self::Models | Self::TNorm => 3,
            Self::Scores => 4,
        }
    }

    /// Filename used when the configuration does not override it.
    #[must_use]
    pub const fn default_filename(self) -> &'static str {
        match self {
            Self::World => "train_world.lst",
            Self::OptionalWorld1 => "train_optional_world_1.lst",
            Self::OptionalWorld2 => "train_optional_world_2.lst",
            Self::Models => "for_models.lst",
            Self::Probes => "for_probes.lst",
            Self::Scores => "for_scores.lst",
            Self::TNorm => "for_tnorm.lst",
            Self::ZNorm => "for_znorm.lst",
        }
    }

    /// True for the three training lists.
    #[must_use]
    pub const fn is_world(self) -> bool {
        matches!(self, Self::World | Self::OptionalWorld1 | Self::OptionalWorld2)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::OptionalWorld1 => "optional_world_1",
            Self::OptionalWorld2 => "optional_world_2",
            Self::Models => "for_models",
            Self::Probes => "for_probes",
            Self::Scores => "for_scores",
            Self::TNorm => "for_tnorm",
            Self::ZNorm => "for_znorm",
        }
    }
}

impl fmt::Display for ListRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout() {
        assert_eq!(ListRole::World.columns(), 2);
        assert_eq!(ListRole::Models.columns(), 3);
        assert_eq!(ListRole::Probes.columns(), 2);
        assert_eq!(ListRole::Scores.columns(), 4);
        assert_eq!(ListRole::TNorm.columns(), 3);
        assert_eq!(ListRole::ZNorm.columns(), 2);
    }

    #[test]
    fn test_world_roles_partition_all() {
        let world = ListRole::ALL.iter().filter(|r| r.is_world()).count();
        assert_eq!(world, ListRole::WORLD_ROLES.len());
        assert_eq!(world + ListRole::GROUP_ROLES.len(), ListRole::ALL.len());
    }

    #[test]
    fn test_display_uses_list_names() {
        assert_eq!(ListRole::OptionalWorld1.to_string(), "optional_world_1");
        assert_eq!(ListRole::Scores.to_string(), "for_scores");
    }
}
