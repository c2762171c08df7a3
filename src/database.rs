//! Database handle: protocol cache and query surface
//!
//! A [`Database`] owns one base directory. Protocol indices are built lazily
//! on first query and published into a `DashMap` as `Arc` snapshots; queries
//! never lock beyond the map lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::ListConfig;
use crate::index::ProtocolIndex;
use crate::list::ListRole;
use crate::protocol::{ProtocolId, Resolver, ScoringMode};
use crate::query::{Filter, Model, ProbePair, QueryExecutor};
use crate::record::{build_records, Group, Purpose, Record, Sample};
use crate::sink::RecordSink;
use crate::{Error, Result};

/// Database instance over one base directory.
#[derive(Debug)]
pub struct Database {
    config: Arc<ListConfig>,
    resolver: Resolver,
    indices: DashMap<ProtocolId, Arc<ProtocolIndex>>,
}

impl Database {
    /// Create a new database builder rooted at `base_directory`.
    #[must_use]
    pub fn builder(base_directory: impl Into<PathBuf>) -> DatabaseBuilder {
        DatabaseBuilder::new(base_directory)
    }

    /// Open a database from a complete configuration.
    ///
    /// No list file is read until the first query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectory`] if `base_directory` is not a directory.
    pub fn open(config: ListConfig) -> Result<Self> {
        if !config.base_directory.is_dir() {
            return Err(Error::InvalidDirectory(config.base_directory));
        }
        let config = Arc::new(config);
        Ok(Self {
            resolver: Resolver::new(Arc::clone(&config)),
            config,
            indices: DashMap::new(),
        })
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Scoring mode committed by the first resolved protocol, if any.
    #[must_use]
    pub fn scoring_mode(&self) -> Option<ScoringMode> {
        self.resolver.committed_mode()
    }

    /// Published index of a protocol, building it on first use.
    ///
    /// # Errors
    ///
    /// Any resolution or parse error of the protocol; nothing is published then.
    pub fn index(&self, protocol: &ProtocolId) -> Result<Arc<ProtocolIndex>> {
        if let Some(index) = self.indices.get(protocol) {
            return Ok(Arc::clone(index.value()));
        }
        let index = Arc::new(self.build_index(protocol)?);
        let published = self.indices.entry(protocol.clone()).or_insert(index);
        Ok(Arc::clone(published.value()))
    }

    /// Re-read a protocol from disk and swap the published index.
    ///
    /// Readers holding the previous snapshot keep it. On error the previous
    /// index stays published. Concurrent reloads of one protocol must be
    /// serialized by the caller.
    ///
    /// # Errors
    ///
    /// Any resolution or parse error of the protocol.
    pub fn reload(&self, protocol: &ProtocolId) -> Result<Arc<ProtocolIndex>> {
        let index = Arc::new(self.build_index(protocol)?);
        if self.indices.insert(protocol.clone(), Arc::clone(&index)).is_some() {
            tracing::warn!(%protocol, "published index replaced by reload");
        }
        Ok(index)
    }

    /// True when the protocol has been built and published.
    #[must_use]
    pub fn is_loaded(&self, protocol: &ProtocolId) -> bool {
        self.indices.contains_key(protocol)
    }

    fn build_index(&self, protocol: &ProtocolId) -> Result<ProtocolIndex> {
        let resolved = self.resolver.resolve(protocol)?;
        let index = ProtocolIndex::build(build_records(&resolved)?)?;
        tracing::info!(
            %protocol,
            mode = %index.mode(),
            records = index.len(),
            "protocol index published"
        );
        Ok(index)
    }

    /// Protocols present under the base directory, sorted.
    ///
    /// The unnamed protocol is listed when list files sit directly in the
    /// base directory; named protocols are subdirectories holding a list file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the base directory cannot be listed.
    pub fn protocols(&self) -> Result<Vec<ProtocolId>> {
        let mut protocols = Vec::new();
        if self.resolver.paths(&ProtocolId::unnamed()).has_any_list() {
            protocols.push(ProtocolId::unnamed());
        }
        for entry in std::fs::read_dir(&self.config.base_directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(ProtocolId::named) else {
                continue;
            };
            if self.resolver.paths(&name).has_any_list() {
                protocols.push(name);
            }
        }
        protocols.sort();
        Ok(protocols)
    }

    /// Build and publish every discovered protocol.
    ///
    /// The first protocol is built alone so the committed scoring mode does
    /// not depend on thread scheduling; the rest run on the rayon pool when
    /// the `rayon` feature is enabled. Returns the number of protocols built.
    ///
    /// # Errors
    ///
    /// The first error met; protocols built before it stay published.
    pub fn preload(&self) -> Result<usize> {
        let protocols = self.protocols()?;
        let Some((first, rest)) = protocols.split_first() else {
            return Ok(0);
        };
        self.index(first)?;

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            rest.par_iter()
                .try_for_each(|protocol| self.index(protocol).map(drop))?;
        }
        #[cfg(not(feature = "rayon"))]
        {
            for protocol in rest {
                self.index(protocol)?;
            }
        }

        Ok(protocols.len())
    }

    fn protocol_of(&self, filter: &Filter) -> ProtocolId {
        filter
            .protocol
            .clone()
            .unwrap_or_else(|| ProtocolId::from(self.config.protocol.as_deref()))
    }

    fn with_executor<T>(
        &self,
        filter: &Filter,
        query: impl FnOnce(QueryExecutor<'_>) -> Result<T>,
    ) -> Result<T> {
        let index = self.index(&self.protocol_of(filter))?;
        query(QueryExecutor::new(&index))
    }

    /// Records matching the filter.
    ///
    /// # Errors
    ///
    /// Protocol build errors, or [`Error::InvalidInput`] for a class filter
    /// on a dense protocol.
    pub fn objects(&self, filter: &Filter) -> Result<Vec<Record>> {
        self.with_executor(filter, |exec| exec.objects(filter))
    }

    /// Distinct client ids of the matching records.
    ///
    /// # Errors
    ///
    /// Same as [`Self::objects`].
    pub fn clients(&self, filter: &Filter) -> Result<Vec<String>> {
        self.with_executor(filter, |exec| exec.clients(filter))
    }

    /// Distinct models with their owners; dev and eval unless groups are given.
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn models(&self, filter: &Filter) -> Result<Vec<Model>> {
        self.with_executor(filter, |exec| Ok(exec.models(filter)))
    }

    /// Model ids of [`Self::models`].
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn model_ids(&self, filter: &Filter) -> Result<Vec<String>> {
        Ok(self
            .models(filter)?
            .into_iter()
            .map(|model| model.model_id().to_owned())
            .collect())
    }

    /// Distinct T-norm models with their owners.
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn tmodels(&self, filter: &Filter) -> Result<Vec<Model>> {
        self.with_executor(filter, |exec| Ok(exec.tmodels(filter)))
    }

    /// T-norm records; the filter's purposes are ignored.
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn tobjects(&self, filter: &Filter) -> Result<Vec<Record>> {
        let mut filter = filter.clone();
        filter.purposes = vec![Purpose::TNorm];
        self.objects(&filter)
    }

    /// Z-norm records; the filter's purposes are ignored.
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn zobjects(&self, filter: &Filter) -> Result<Vec<Record>> {
        let mut filter = filter.clone();
        filter.purposes = vec![Purpose::ZNorm];
        self.objects(&filter)
    }

    /// The (probe, model) comparisons to score.
    ///
    /// # Errors
    ///
    /// Protocol build errors.
    pub fn probe_pairs(&self, filter: &Filter) -> Result<Vec<ProbePair>> {
        self.with_executor(filter, |exec| Ok(exec.probe_pairs(filter)))
    }

    /// Distinct samples of the matching records, one per path.
    ///
    /// # Errors
    ///
    /// Same as [`Self::objects`].
    pub fn samples(&self, filter: &Filter) -> Result<Vec<Sample>> {
        self.with_executor(filter, |exec| exec.samples(filter))
    }

    /// Client owning a model.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownModel`] if no group accepted by the filter holds it.
    pub fn client_id_from_model_id(&self, model_id: &str, filter: &Filter) -> Result<String> {
        self.with_executor(filter, |exec| exec.client_id_from_model_id(model_id, filter))
    }

    /// Client owning a T-norm model.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownModel`] if no group accepted by the filter holds it.
    pub fn client_id_from_tmodel_id(&self, model_id: &str, filter: &Filter) -> Result<String> {
        self.with_executor(filter, |exec| exec.client_id_from_tmodel_id(model_id, filter))
    }

    /// True when the T-norm and Z-norm list files exist for every dev/eval
    /// group accepted by the filter (both groups when it names none).
    ///
    /// Only file presence is checked; the protocol is not built.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProtocol`] if the protocol has no list file, or
    /// [`Error::InvalidInput`] if the filter accepts neither dev nor eval.
    pub fn implements_zt(&self, filter: &Filter) -> Result<bool> {
        let protocol = self.protocol_of(filter);
        let paths = self.resolver.paths(&protocol);
        if !paths.has_any_list() {
            return Err(Error::UnknownProtocol(protocol));
        }
        let groups: Vec<Group> = Group::SCORED
            .into_iter()
            .filter(|&group| filter.accepts_group(group))
            .collect();
        if groups.is_empty() {
            return Err(Error::InvalidInput(
                "score normalization lists exist only for dev and eval".to_string(),
            ));
        }
        Ok(groups.into_iter().all(|group| {
            [ListRole::TNorm, ListRole::ZNorm]
                .into_iter()
                .all(|role| paths.list_file(group, role).is_some_and(Path::is_file))
        }))
    }

    /// Groups present on disk for a protocol.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProtocol`] if the protocol has no list file.
    pub fn groups(&self, protocol: &ProtocolId) -> Result<Vec<Group>> {
        let paths = self.resolver.paths(protocol);
        if !paths.has_any_list() {
            return Err(Error::UnknownProtocol(protocol.clone()));
        }
        Ok(paths.groups())
    }

    /// List files present on disk for a protocol, as (group, role) pairs.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProtocol`] if the protocol has no list file.
    pub fn lists(&self, protocol: &ProtocolId) -> Result<Vec<(Group, ListRole)>> {
        let lists = self.resolver.paths(protocol).existing_lists();
        if lists.is_empty() {
            return Err(Error::UnknownProtocol(protocol.clone()));
        }
        Ok(lists)
    }

    /// Location of a sample's raw data file under `original_directory`.
    ///
    /// With `check_existence`, each configured extension is tried in order
    /// and the first existing file wins. Without it, the single configured
    /// extension (or none) is appended unchecked. Several extensions are
    /// always checked, whatever `check_existence` says.
    ///
    /// # Errors
    ///
    /// [`Error::OriginalFileNotFound`] if existence is checked and no
    /// candidate exists.
    pub fn original_file_name(&self, sample: &Sample, check_existence: bool) -> Result<PathBuf> {
        let directory = self.config.original_directory.as_deref();
        let extensions = &self.config.original_extensions;

        if !check_existence && extensions.len() <= 1 {
            let extension = extensions.first().map(String::as_str);
            return Ok(sample.make_path(directory, extension));
        }

        let candidates: Vec<PathBuf> = if extensions.is_empty() {
            vec![sample.make_path(directory, None)]
        } else {
            extensions
                .iter()
                .map(|ext| sample.make_path(directory, Some(ext)))
                .collect()
        };
        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| Error::OriginalFileNotFound {
                path: sample
                    .make_path(directory, None)
                    .display()
                    .to_string(),
                extensions: extensions.clone(),
            })
    }

    /// Stream the matching records of one protocol into a sink.
    ///
    /// Returns the number of records emitted.
    ///
    /// # Errors
    ///
    /// Query errors, or the first error raised by the sink.
    pub fn export<S: RecordSink + ?Sized>(&self, filter: &Filter, sink: &mut S) -> Result<usize> {
        let protocol = self.protocol_of(filter);
        let records = self.objects(filter)?;
        for record in &records {
            sink.emit(record)?;
        }
        sink.end_protocol(&protocol)?;
        tracing::debug!(%protocol, records = records.len(), "protocol exported");
        Ok(records.len())
    }
}

/// Database builder
#[derive(Debug, Clone)]
pub struct DatabaseBuilder {
    config: ListConfig,
}

impl DatabaseBuilder {
    /// Builder with every option at its default.
    #[must_use]
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            config: ListConfig::new(base_directory),
        }
    }

    /// Start from an existing configuration.
    #[must_use]
    pub const fn from_config(config: ListConfig) -> Self {
        Self { config }
    }

    /// Protocol used when a filter names none.
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.config.protocol = Some(protocol.into());
        self
    }

    /// Force dense (`true`) or sparse (`false`) scoring lists.
    #[must_use]
    pub const fn use_dense_probe_list(mut self, dense: bool) -> Self {
        self.config.use_dense_probe_list = Some(dense);
        self
    }

    /// Development subdirectory.
    #[must_use]
    pub fn dev_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.config.dev_subdir = subdir.into();
        self
    }

    /// Evaluation subdirectory.
    #[must_use]
    pub fn eval_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.config.eval_subdir = subdir.into();
        self
    }

    /// Override a list file name.
    ///
    /// World roles take a path relative to the protocol root, other roles a
    /// file name inside the group directory.
    #[must_use]
    pub fn list_filename(mut self, role: ListRole, filename: impl AsRef<Path>) -> Self {
        let filename = filename.as_ref();
        let name = || filename.to_string_lossy().into_owned();
        match role {
            ListRole::World => self.config.world_filename = filename.to_path_buf(),
            ListRole::OptionalWorld1 => self.config.optional_world_1_filename = filename.to_path_buf(),
            ListRole::OptionalWorld2 => self.config.optional_world_2_filename = filename.to_path_buf(),
            ListRole::Models => self.config.models_filename = name(),
            ListRole::Probes => self.config.probes_filename = name(),
            ListRole::Scores => self.config.scores_filename = name(),
            ListRole::TNorm => self.config.tnorm_filename = name(),
            ListRole::ZNorm => self.config.znorm_filename = name(),
        }
        self
    }

    /// Root and extensions used by [`Database::original_file_name`].
    #[must_use]
    pub fn original_files<S: Into<String>>(
        mut self,
        directory: impl Into<PathBuf>,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.config.original_directory = Some(directory.into());
        self.config.original_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Build the database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectory`] if the base directory does not exist.
    pub fn build(self) -> Result<Database> {
        Database::open(self.config)
    }
}
