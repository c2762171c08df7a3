//! Concrete list file locations for one protocol

use std::path::{Path, PathBuf};

use super::ProtocolId;
use crate::config::ListConfig;
use crate::list::ListRole;
use crate::record::Group;

/// List files of one dev/eval group directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLists {
    dir: PathBuf,
    models: PathBuf,
    probes: PathBuf,
    scores: PathBuf,
    tnorm: PathBuf,
    znorm: PathBuf,
}

impl GroupLists {
    fn new(dir: PathBuf, config: &ListConfig) -> Self {
        let file = |role| config.group_filename(role).map(|name| dir.join(name));
        Self {
            models: file(ListRole::Models).unwrap_or_default(),
            probes: file(ListRole::Probes).unwrap_or_default(),
            scores: file(ListRole::Scores).unwrap_or_default(),
            tnorm: file(ListRole::TNorm).unwrap_or_default(),
            znorm: file(ListRole::ZNorm).unwrap_or_default(),
            dir,
        }
    }

    /// Group directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Model list.
    #[must_use]
    pub fn models(&self) -> &Path {
        &self.models
    }

    /// Dense probe list.
    #[must_use]
    pub fn probes(&self) -> &Path {
        &self.probes
    }

    /// Sparse score list.
    #[must_use]
    pub fn scores(&self) -> &Path {
        &self.scores
    }

    /// T-norm list.
    #[must_use]
    pub fn tnorm(&self) -> &Path {
        &self.tnorm
    }

    /// Z-norm list.
    #[must_use]
    pub fn znorm(&self) -> &Path {
        &self.znorm
    }

    /// Path for a group role; `None` for world roles.
    #[must_use]
    pub fn path(&self, role: ListRole) -> Option<&Path> {
        match role {
            ListRole::Models => Some(&self.models),
            ListRole::Probes => Some(&self.probes),
            ListRole::Scores => Some(&self.scores),
            ListRole::TNorm => Some(&self.tnorm),
            ListRole::ZNorm => Some(&self.znorm),
            ListRole::World | ListRole::OptionalWorld1 | ListRole::OptionalWorld2 => None,
        }
    }
}

/// Every list file location of one protocol.
///
/// Computing paths touches no file; existence checks are explicit methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolPaths {
    protocol: ProtocolId,
    root: PathBuf,
    world: PathBuf,
    optional_world_1: PathBuf,
    optional_world_2: PathBuf,
    dev: GroupLists,
    eval: GroupLists,
}

impl ProtocolPaths {
    /// Lay out the protocol rooted at `base` (unnamed) or `base/<name>`.
    #[must_use]
    pub fn new(config: &ListConfig, protocol: &ProtocolId) -> Self {
        let root = protocol.name().map_or_else(
            || config.base_directory.clone(),
            |name| config.base_directory.join(name),
        );
        let world = |role| config.world_path(role).map(|path| root.join(path));
        Self {
            protocol: protocol.clone(),
            world: world(ListRole::World).unwrap_or_default(),
            optional_world_1: world(ListRole::OptionalWorld1).unwrap_or_default(),
            optional_world_2: world(ListRole::OptionalWorld2).unwrap_or_default(),
            dev: GroupLists::new(root.join(&config.dev_subdir), config),
            eval: GroupLists::new(root.join(&config.eval_subdir), config),
            root,
        }
    }

    /// Protocol these paths belong to.
    #[must_use]
    pub const fn protocol(&self) -> &ProtocolId {
        &self.protocol
    }

    /// Protocol root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists of the dev or eval group. The world group has no directory and
    /// maps to the dev lists; use [`Self::list_file`] for world lists.
    #[must_use]
    pub const fn group_lists(&self, group: Group) -> &GroupLists {
        match group {
            Group::Eval => &self.eval,
            Group::Dev | Group::World => &self.dev,
        }
    }

    /// True when the dev/eval directory exists.
    #[must_use]
    pub fn has_group_dir(&self, group: Group) -> bool {
        match group {
            Group::World => false,
            Group::Dev | Group::Eval => self.group_lists(group).dir().is_dir(),
        }
    }

    /// Location of a list file. World roles pair with [`Group::World`] and
    /// group roles with dev/eval; any other combination is `None`.
    #[must_use]
    pub fn list_file(&self, group: Group, role: ListRole) -> Option<&Path> {
        match (group, role) {
            (Group::World, ListRole::World) => Some(&self.world),
            (Group::World, ListRole::OptionalWorld1) => Some(&self.optional_world_1),
            (Group::World, ListRole::OptionalWorld2) => Some(&self.optional_world_2),
            (Group::World, _) => None,
            (group, role) => self.group_lists(group).path(role),
        }
    }

    /// Every (group, role) whose list file exists, world lists first.
    #[must_use]
    pub fn existing_lists(&self) -> Vec<(Group, ListRole)> {
        let world = ListRole::WORLD_ROLES.into_iter().map(|role| (Group::World, role));
        let scored = Group::SCORED
            .into_iter()
            .flat_map(|group| ListRole::GROUP_ROLES.into_iter().map(move |role| (group, role)));

        world
            .chain(scored)
            .filter(|&(group, role)| self.list_file(group, role).is_some_and(Path::is_file))
            .collect()
    }

    /// True when at least one list file exists.
    #[must_use]
    pub fn has_any_list(&self) -> bool {
        !self.existing_lists().is_empty()
    }

    /// Groups present on disk: dev/eval by directory, world by any world list.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        let mut groups = Vec::new();
        let has_world = ListRole::WORLD_ROLES
            .into_iter()
            .any(|role| self.list_file(Group::World, role).is_some_and(Path::is_file));
        if has_world {
            groups.push(Group::World);
        }
        groups.extend(Group::SCORED.into_iter().filter(|&g| self.has_group_dir(g)));
        groups
    }

    /// Group whose lists decide the scoring mode: dev, or eval when the dev
    /// directory is absent.
    #[must_use]
    pub fn mode_group(&self) -> Group {
        if !self.has_group_dir(Group::Dev) && self.has_group_dir(Group::Eval) {
            Group::Eval
        } else {
            Group::Dev
        }
    }
}
