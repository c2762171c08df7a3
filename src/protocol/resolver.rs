//! Protocol directory resolver with committed scoring mode

use std::sync::{Arc, OnceLock};

use super::{GroupLists, ProtocolId, ProtocolPaths, ScoringMode};
use crate::config::ListConfig;
use crate::record::Group;
use crate::{Error, Result};

/// A protocol whose paths are laid out and whose scoring mode is settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProtocol {
    paths: ProtocolPaths,
    mode: ScoringMode,
}

impl ResolvedProtocol {
    /// List file locations.
    #[must_use]
    pub const fn paths(&self) -> &ProtocolPaths {
        &self.paths
    }

    /// Committed scoring mode.
    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        self.mode
    }
}

/// Resolves protocols of one base directory.
///
/// The scoring mode is decided on the first successful resolution (explicit
/// `use_dense_probe_list` override, else file presence) and never changes for
/// the lifetime of the resolver.
#[derive(Debug)]
pub struct Resolver {
    config: Arc<ListConfig>,
    committed: OnceLock<ScoringMode>,
}

impl Resolver {
    /// Create a resolver; no file is touched until the first [`Self::resolve`].
    #[must_use]
    pub fn new(config: Arc<ListConfig>) -> Self {
        Self {
            config,
            committed: OnceLock::new(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Mode committed so far, if any protocol has been resolved.
    #[must_use]
    pub fn committed_mode(&self) -> Option<ScoringMode> {
        self.committed.get().copied()
    }

    /// Lay out a protocol's paths without validating anything.
    #[must_use]
    pub fn paths(&self, protocol: &ProtocolId) -> ProtocolPaths {
        ProtocolPaths::new(&self.config, protocol)
    }

    /// Resolve a protocol and check it against the committed scoring mode.
    ///
    /// The mode is detected on the dev lists (eval when dev is absent); every
    /// dev/eval directory present must then carry the list of that mode. The
    /// mode is committed only once a protocol resolves successfully.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownProtocol`] if the protocol has no list file at all
    /// - [`Error::NoScoringList`] if a group directory has neither probe nor
    ///   score list
    /// - [`Error::AmbiguousScoringMode`] if both exist on first resolution and
    ///   no override is configured
    /// - [`Error::ProtocolModeMismatch`] if a group directory has only the other
    ///   mode's list
    pub fn resolve(&self, protocol: &ProtocolId) -> Result<ResolvedProtocol> {
        let paths = self.paths(protocol);
        if !paths.has_any_list() {
            return Err(Error::UnknownProtocol(protocol.clone()));
        }

        let mode = match self.committed_mode() {
            Some(mode) => mode,
            None => {
                let lists = paths.group_lists(paths.mode_group());
                self.detect(protocol, lists)?
            }
        };
        check_groups(protocol, &paths, mode)?;

        let mode = match self.committed.set(mode) {
            Ok(()) => {
                tracing::debug!(%protocol, %mode, "scoring mode committed");
                mode
            }
            Err(mode) => {
                // Another protocol committed concurrently
                let committed = self.committed_mode().unwrap_or(mode);
                if committed != mode {
                    check_groups(protocol, &paths, committed)?;
                }
                committed
            }
        };

        Ok(ResolvedProtocol { paths, mode })
    }

    fn detect(&self, protocol: &ProtocolId, lists: &GroupLists) -> Result<ScoringMode> {
        if let Some(dense) = self.config.use_dense_probe_list {
            return Ok(ScoringMode::from_dense_flag(dense));
        }
        match (lists.probes().is_file(), lists.scores().is_file()) {
            (true, false) => Ok(ScoringMode::Dense),
            (false, true) => Ok(ScoringMode::Sparse),
            (true, true) => Err(Error::AmbiguousScoringMode {
                protocol: protocol.clone(),
                probes: lists.probes().to_path_buf(),
                scores: lists.scores().to_path_buf(),
            }),
            (false, false) => Err(no_scoring_list(protocol, lists)),
        }
    }
}

/// Every dev/eval directory present (the mode group when none is) must carry
/// the list of `mode`.
fn check_groups(protocol: &ProtocolId, paths: &ProtocolPaths, mode: ScoringMode) -> Result<()> {
    let mut groups: Vec<Group> = paths
        .groups()
        .into_iter()
        .filter(|&group| group != Group::World)
        .collect();
    if groups.is_empty() {
        groups.push(paths.mode_group());
    }

    for group in groups {
        let lists = paths.group_lists(group);
        let has_probes = lists.probes().is_file();
        let has_scores = lists.scores().is_file();
        let present = match mode {
            ScoringMode::Dense => has_probes,
            ScoringMode::Sparse => has_scores,
        };
        if present {
            continue;
        }
        if has_probes || has_scores {
            tracing::warn!(%protocol, %group, committed = %mode, "scoring list mismatch");
            return Err(Error::ProtocolModeMismatch {
                protocol: protocol.clone(),
                committed: mode,
            });
        }
        return Err(no_scoring_list(protocol, lists));
    }
    Ok(())
}

fn no_scoring_list(protocol: &ProtocolId, lists: &GroupLists) -> Error {
    Error::NoScoringList {
        protocol: protocol.clone(),
        probes: lists.probes().to_path_buf(),
        scores: lists.scores().to_path_buf(),
    }
}
