// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dbnav_cache::{Loader, ObjectCache};
use dbnav_core::{EngineVersion, Error, Identity, Monitor, ObjectKind, Record};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::{
	CatalogConfig, CatalogSource, Context, DataType, GenericObject, Query, Result, Schema, Table, Tablespace,
	load::RecordLoader, statistics::StatisticsState,
};

/// Connection-scoped root of the catalog graph.
pub struct DataSource {
	source: Arc<dyn CatalogSource>,
	config: Arc<CatalogConfig>,
	ctx: RwLock<Arc<Context>>,
	active_schema: RwLock<Option<String>>,
	pub(crate) schemas: ObjectCache<Schema>,
	pub(crate) data_types: ObjectCache<DataType>,
	pub(crate) tablespaces: ObjectCache<Tablespace>,
	pub(crate) bufferpools: ObjectCache<GenericObject>,
	pub(crate) storage_groups: ObjectCache<GenericObject>,
	pub(crate) roles: ObjectCache<GenericObject>,
	pub(crate) variables: ObjectCache<GenericObject>,
	pub(crate) remote_servers: ObjectCache<GenericObject>,
	pub(crate) wrappers: ObjectCache<GenericObject>,
	pub(crate) statistics: StatisticsState,
}

impl DataSource {
	/// Opens the catalog over `source`: reads the engine version, the session's current
	/// schema and the system data types. Only the version read can fail the connect, and only
	/// through cancellation; the other steps fall back with a warning.
	#[instrument(name = "catalog::datasource::connect", level = "debug", skip_all)]
	pub fn connect(source: Arc<dyn CatalogSource>, config: CatalogConfig, monitor: &Monitor) -> Result<Self> {
		config.validate()?;
		let config = Arc::new(config);
		let case = config.name_case;
		let (ctx, active_schema) = bootstrap(&source, &config, monitor)?;

		let datasource = Self {
			source,
			config,
			ctx: RwLock::new(ctx),
			active_schema: RwLock::new(active_schema),
			schemas: ObjectCache::new("schemas", case),
			data_types: ObjectCache::new("data types", case),
			tablespaces: ObjectCache::new("tablespaces", case),
			bufferpools: ObjectCache::new("bufferpools", case),
			storage_groups: ObjectCache::new("storage groups", case),
			roles: ObjectCache::new("roles", case),
			variables: ObjectCache::new("variables", case),
			remote_servers: ObjectCache::new("remote servers", case),
			wrappers: ObjectCache::new("wrappers", case),
			statistics: StatisticsState::default(),
		};
		datasource.probe_data_types(monitor)?;
		info!(version = %datasource.version(), "catalog connected");
		Ok(datasource)
	}

	pub fn version(&self) -> EngineVersion {
		self.ctx.read().gate().version()
	}

	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	pub fn context(&self) -> Arc<Context> {
		self.ctx.read().clone()
	}

	/// Re-runs the bootstrap, installs the fresh context and only then drops the root caches,
	/// so a population started under the old context is discarded or cleared. A failed
	/// bootstrap leaves the catalog as it was.
	pub(crate) fn reconnect(&self, monitor: &Monitor) -> Result<()> {
		let (ctx, active_schema) = bootstrap(&self.source, &self.config, monitor)?;
		*self.ctx.write() = ctx;
		*self.active_schema.write() = active_schema;
		self.clear_roots();
		self.statistics.reset();
		self.probe_data_types(monitor)
	}

	// schemas

	/// Schemas visible under the configuration; system schemas are hidden unless
	/// `show_system_schemas` is set.
	pub fn schemas(&self, monitor: &Monitor) -> Result<Vec<Arc<Schema>>> {
		let ctx = self.context();
		let schemas = self.schemas.get_all(monitor, &schema_loader(&ctx))?;
		if self.config.show_system_schemas {
			return Ok(schemas);
		}
		Ok(schemas.into_iter().filter(|s| !s.is_system()).collect())
	}

	pub fn schema(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Schema>>> {
		let ctx = self.context();
		self.schemas.get(monitor, &Identity::new(name), &schema_loader(&ctx))
	}

	pub fn require_schema(&self, monitor: &Monitor, name: &str) -> Result<Arc<Schema>> {
		self.schema(monitor, name)?.ok_or_else(|| Error::not_found(ObjectKind::Schema, name))
	}

	pub fn require_table(&self, monitor: &Monitor, schema: &str, table: &str) -> Result<Arc<Table>> {
		self.require_schema(monitor, schema)?
			.table(monitor, table)?
			.ok_or_else(|| Error::not_found(ObjectKind::Table, format!("{schema}.{table}")))
	}

	pub(crate) fn cached_schema(&self, name: &str) -> Option<Arc<Schema>> {
		self.schemas.cached(&Identity::new(name))
	}

	pub(crate) fn cached_schemas(&self) -> Vec<Arc<Schema>> {
		self.schemas.cached_all()
	}

	pub fn active_schema_name(&self) -> Option<String> {
		self.active_schema.read().clone()
	}

	/// The session's schema, if it is already cached. Never loads.
	pub fn active_schema(&self) -> Option<Arc<Schema>> {
		let name = self.active_schema.read().clone()?;
		self.cached_schema(&name)
	}

	pub fn select_schema(&self, monitor: &Monitor, name: &str) -> Result<Arc<Schema>> {
		let schema = self.require_schema(monitor, name)?;
		*self.active_schema.write() = Some(schema.info().base.name.clone());
		debug!(schema = %name, "active schema changed");
		Ok(schema)
	}

	// top-level objects

	/// Built-in data types.
	pub fn data_types(&self, monitor: &Monitor) -> Result<Vec<Arc<DataType>>> {
		let ctx = self.context();
		self.data_types.get_all(monitor, &data_type_loader(&ctx))
	}

	pub fn data_type(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<DataType>>> {
		let ctx = self.context();
		self.data_types.get(monitor, &Identity::new(name), &data_type_loader(&ctx))
	}

	pub fn tablespaces(&self, monitor: &Monitor) -> Result<Vec<Arc<Tablespace>>> {
		let ctx = self.context();
		self.tablespaces.get_all(monitor, &tablespace_loader(&ctx))
	}

	pub fn tablespace(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Tablespace>>> {
		let ctx = self.context();
		self.tablespaces.get(monitor, &Identity::new(name), &tablespace_loader(&ctx))
	}

	pub fn tablespace_by_id(&self, monitor: &Monitor, id: i64) -> Result<Option<Arc<Tablespace>>> {
		Ok(self.tablespaces(monitor)?.into_iter().find(|t| t.base.id == Some(id)))
	}

	pub fn bufferpools(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::Bufferpool)
	}

	pub fn bufferpool_by_id(&self, monitor: &Monitor, id: i64) -> Result<Option<Arc<GenericObject>>> {
		Ok(self.bufferpools(monitor)?.into_iter().find(|b| b.base.id == Some(id)))
	}

	/// Empty below 10.1.
	pub fn storage_groups(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::StorageGroup)
	}

	/// Empty below 9.5.
	pub fn roles(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::Role)
	}

	/// Empty below 9.7.
	pub fn variables(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::Variable)
	}

	pub fn remote_servers(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::RemoteServer)
	}

	pub fn wrappers(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.generic_all(monitor, ObjectKind::Wrapper)
	}

	/// One top-level object held in a generic cache, by kind.
	pub fn top_level(&self, monitor: &Monitor, kind: ObjectKind, name: &str) -> Result<Option<Arc<GenericObject>>> {
		let Some(cache) = self.generic_cache(kind) else {
			return Ok(None);
		};
		let ctx = self.context();
		cache.get(monitor, &Identity::new(name), &generic_loader(&ctx, kind))
	}

	fn generic_all(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<Arc<GenericObject>>> {
		let Some(cache) = self.generic_cache(kind) else {
			return Ok(Vec::new());
		};
		let ctx = self.context();
		cache.get_all(monitor, &generic_loader(&ctx, kind))
	}

	fn generic_cache(&self, kind: ObjectKind) -> Option<&ObjectCache<GenericObject>> {
		match kind {
			ObjectKind::Bufferpool => Some(&self.bufferpools),
			ObjectKind::StorageGroup => Some(&self.storage_groups),
			ObjectKind::Role => Some(&self.roles),
			ObjectKind::Variable => Some(&self.variables),
			ObjectKind::RemoteServer => Some(&self.remote_servers),
			ObjectKind::Wrapper => Some(&self.wrappers),
			_ => None,
		}
	}

	/// Drops every top-level cache. Schemas are cleared through their own caches first so
	/// holders of a schema see empty caches rather than stale ones.
	fn clear_roots(&self) {
		for schema in self.schemas.cached_all() {
			schema.clear();
		}
		self.schemas.clear();
		self.data_types.clear();
		self.tablespaces.clear();
		self.bufferpools.clear();
		self.storage_groups.clear();
		self.roles.clear();
		self.variables.clear();
		self.remote_servers.clear();
		self.wrappers.clear();
	}

	/// Loads the system data types. A failure other than cancellation installs an empty
	/// list so type lookups answer `None` instead of retrying on every column.
	fn probe_data_types(&self, monitor: &Monitor) -> Result<()> {
		match self.data_types(monitor) {
			Ok(_) => Ok(()),
			Err(Error::Cancelled) => Err(Error::Cancelled),
			Err(err) => {
				warn!(error = %err, "system data types unavailable, continuing without them");
				self.data_types.set_all(Vec::new());
				Ok(())
			}
		}
	}
}

impl std::fmt::Debug for DataSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DataSource")
			.field("version", &self.version())
			.field("active_schema", &self.active_schema_name())
			.finish_non_exhaustive()
	}
}

fn bootstrap(
	source: &Arc<dyn CatalogSource>,
	config: &Arc<CatalogConfig>,
	monitor: &Monitor,
) -> Result<(Arc<Context>, Option<String>)> {
	monitor.subtask("Read server version");
	let version = match source.server_version(monitor) {
		Ok(version) => version,
		Err(Error::Cancelled) => return Err(Error::Cancelled),
		Err(err) => {
			warn!(error = %err, fallback = %config.fallback_version, "server version unreadable, using fallback");
			config.fallback_version
		}
	};

	monitor.subtask("Read current schema");
	let active_schema = match source.current_schema(monitor) {
		Ok(schema) => schema.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
		Err(Error::Cancelled) => return Err(Error::Cancelled),
		Err(err) => {
			warn!(error = %err, "current schema unreadable");
			None
		}
	};

	Ok((Arc::new(Context::new(source.clone(), version, config.clone())), active_schema))
}

fn schema_loader(ctx: &Arc<Context>) -> impl Loader<Schema> + '_ {
	RecordLoader::new(
		ctx,
		Query::Schemas {
			name: None,
		},
		move |record: &Record| Schema::from_record(ctx, record),
	)
	.filtered(&ctx.config().schema_filter)
}

fn data_type_loader(ctx: &Arc<Context>) -> impl Loader<DataType> + '_ {
	let gate = *ctx.gate();
	RecordLoader::new(
		ctx,
		Query::DataTypes {
			schema: None,
			exclude_module_types: gate.supports(EngineVersion::V9_7),
		},
		move |record: &Record| DataType::from_record(&gate, record),
	)
}

fn tablespace_loader(ctx: &Arc<Context>) -> impl Loader<Tablespace> + '_ {
	let gate = *ctx.gate();
	RecordLoader::new(ctx, Query::Tablespaces, move |record: &Record| Tablespace::from_record(&gate, record))
}

fn generic_loader(ctx: &Arc<Context>, kind: ObjectKind) -> impl Loader<GenericObject> + '_ {
	let (query, since) = match kind {
		ObjectKind::StorageGroup => (Query::StorageGroups, Some(EngineVersion::V10_1)),
		ObjectKind::Role => (Query::Roles, Some(EngineVersion::V9_5)),
		ObjectKind::Variable => (Query::Variables, Some(EngineVersion::V9_7)),
		ObjectKind::RemoteServer => (Query::RemoteServers, None),
		ObjectKind::Wrapper => (Query::Wrappers, None),
		_ => (Query::Bufferpools, None),
	};
	let loader = RecordLoader::new(ctx, query, move |record: &Record| GenericObject::from_record(kind, record));
	match since {
		Some(version) => loader.since(version),
		None => loader,
	}
}
