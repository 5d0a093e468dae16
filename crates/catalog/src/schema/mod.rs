// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use chrono::NaiveDateTime;
use dbnav_cache::{ChildLoader, CompositeCache, Entity, Loader, ObjectCache};
use dbnav_core::{EngineVersion, Identity, Monitor, ObjectKind, Record};
use parking_lot::RwLock;
use tracing::instrument;

use crate::{
	Alias, Constraint, Context, DataType, GenericObject, Index, ObjectBase, ObjectStatistics, OwnerType, Query,
	Result, Routine, Sequence, Table, Tier, Trigger, VersionGate,
	load::{ChildRecordLoader, RecordLoader},
	statistics::StatisticsState,
};

mod structure;

pub use structure::StructureScope;

/// Schemas that hold engine objects rather than user data, besides the `SYS*` family.
const SYSTEM_SCHEMAS: &[&str] = &["DB2QP", "SQLJ", "NULLID"];

pub(crate) fn is_system_schema(name: &str) -> bool {
	name.starts_with("SYS") || SYSTEM_SCHEMAS.contains(&name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
	pub base: ObjectBase,
	pub owner: Option<String>,
	pub create_time: Option<NaiveDateTime>,
	pub owner_type: Option<OwnerType>,
	pub audit_policy_id: Option<i64>,
	pub audit_policy: Option<String>,
	pub data_capture: Option<bool>,
}

const TIERS: &[Tier<SchemaInfo>] = &[
	Tier {
		since: EngineVersion::V9_5,
		apply: |s, r| s.owner_type = OwnerType::from_code(&r.str("OWNERTYPE")),
	},
	Tier {
		since: EngineVersion::V10_1,
		apply: |s, r| {
			s.audit_policy_id = r.int_opt("AUDITPOLICYID");
			s.audit_policy = r.trimmed_opt("AUDITPOLICYNAME");
			s.data_capture = Some(r.flag("DATACAPTURE", "Y"));
		},
	},
];

impl SchemaInfo {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "SCHEMANAME", None);
		if base.name.is_empty() {
			return None;
		}
		let mut info = SchemaInfo {
			base,
			owner: record.trimmed_opt("OWNER"),
			create_time: record.timestamp("CREATE_TIME"),
			owner_type: None,
			audit_policy_id: None,
			audit_policy: None,
			data_capture: None,
		};
		gate.apply(&mut info, record, TIERS);
		Some(info)
	}
}

/// Schema container. Owns the per-schema caches; table-addressed children (indexes, keys,
/// triggers) are loaded for the whole schema at once and filed per table.
pub struct Schema {
	info: SchemaInfo,
	ctx: Arc<Context>,
	tables: ObjectCache<Table>,
	routines: ObjectCache<Routine>,
	sequences: ObjectCache<Sequence>,
	aliases: ObjectCache<Alias>,
	packages: ObjectCache<GenericObject>,
	modules: ObjectCache<GenericObject>,
	xml_schemas: ObjectCache<GenericObject>,
	data_types: ObjectCache<DataType>,
	indexes: CompositeCache<Index>,
	triggers: CompositeCache<Trigger>,
	unique_keys: CompositeCache<Constraint>,
	foreign_keys: CompositeCache<Constraint>,
	references: CompositeCache<Constraint>,
	checks: CompositeCache<Constraint>,
	pub(crate) statistics: StatisticsState,
	size: RwLock<Option<ObjectStatistics>>,
}

impl Schema {
	pub(crate) fn new(ctx: Arc<Context>, info: SchemaInfo) -> Self {
		let case = ctx.case();
		let name = info.base.name.clone();
		let label = |what: &str| format!("{what} of {name}");
		Self {
			tables: ObjectCache::new(label("tables"), case),
			routines: ObjectCache::new(label("routines"), case),
			sequences: ObjectCache::new(label("sequences"), case),
			aliases: ObjectCache::new(label("aliases"), case),
			packages: ObjectCache::new(label("packages"), case),
			modules: ObjectCache::new(label("modules"), case),
			xml_schemas: ObjectCache::new(label("xml schemas"), case),
			data_types: ObjectCache::new(label("data types"), case),
			indexes: CompositeCache::new(label("indexes"), case),
			triggers: CompositeCache::new(label("triggers"), case),
			unique_keys: CompositeCache::new(label("unique keys"), case),
			foreign_keys: CompositeCache::new(label("foreign keys"), case),
			references: CompositeCache::new(label("references"), case),
			checks: CompositeCache::new(label("check constraints"), case),
			statistics: StatisticsState::default(),
			size: RwLock::new(None),
			info,
			ctx,
		}
	}

	pub(crate) fn from_record(ctx: &Arc<Context>, record: &Record) -> Option<Self> {
		let info = SchemaInfo::from_record(ctx.gate(), record)?;
		Some(Schema::new(ctx.clone(), info))
	}

	pub fn info(&self) -> &SchemaInfo {
		&self.info
	}

	pub fn is_system(&self) -> bool {
		is_system_schema(&self.info.base.name)
	}

	pub(crate) fn context(&self) -> &Arc<Context> {
		&self.ctx
	}

	// tables

	/// Every table-like object of the schema, in catalog order.
	#[instrument(name = "catalog::schema::all_tables", level = "trace", skip_all, fields(schema = %self.info.base.name))]
	pub fn all_tables(&self, monitor: &Monitor) -> Result<Vec<Arc<Table>>> {
		self.tables.get_all(monitor, &self.table_loader())
	}

	pub fn table(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Table>>> {
		self.tables.get(monitor, &Identity::new(name), &self.table_loader())
	}

	pub fn tables(&self, monitor: &Monitor) -> Result<Vec<Arc<Table>>> {
		self.tables_of_kind(monitor, ObjectKind::Table)
	}

	pub fn views(&self, monitor: &Monitor) -> Result<Vec<Arc<Table>>> {
		self.tables_of_kind(monitor, ObjectKind::View)
	}

	pub fn materialized_query_tables(&self, monitor: &Monitor) -> Result<Vec<Arc<Table>>> {
		self.tables_of_kind(monitor, ObjectKind::MaterializedQueryTable)
	}

	pub fn nicknames(&self, monitor: &Monitor) -> Result<Vec<Arc<Table>>> {
		self.tables_of_kind(monitor, ObjectKind::Nickname)
	}

	pub(crate) fn tables_of_kind(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<Arc<Table>>> {
		Ok(self.all_tables(monitor)?.into_iter().filter(|t| t.kind() == kind).collect())
	}

	pub(crate) fn cached_table(&self, name: &str) -> Option<Arc<Table>> {
		self.tables.cached(&Identity::new(name))
	}

	pub(crate) fn cached_tables(&self) -> Vec<Arc<Table>> {
		self.tables.cached_all()
	}

	pub(crate) fn refresh_table_entry(&self, name: &str) -> bool {
		self.tables.refresh_entry(&Identity::new(name))
	}

	// routines

	pub fn routines(&self, monitor: &Monitor) -> Result<Vec<Arc<Routine>>> {
		self.routines.get_all(monitor, &self.routine_loader())
	}

	pub fn procedures(&self, monitor: &Monitor) -> Result<Vec<Arc<Routine>>> {
		self.routines_of_kind(monitor, ObjectKind::Procedure)
	}

	pub fn functions(&self, monitor: &Monitor) -> Result<Vec<Arc<Routine>>> {
		self.routines_of_kind(monitor, ObjectKind::Function)
	}

	pub fn methods(&self, monitor: &Monitor) -> Result<Vec<Arc<Routine>>> {
		self.routines_of_kind(monitor, ObjectKind::Method)
	}

	pub(crate) fn routines_of_kind(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<Arc<Routine>>> {
		Ok(self.routines(monitor)?.into_iter().filter(|r| r.kind == kind).collect())
	}

	/// Looks a routine up by specific name first, then by routine name.
	pub fn routine(&self, monitor: &Monitor, name: &str, kind: ObjectKind) -> Result<Option<Arc<Routine>>> {
		let loader = self.routine_loader();
		if let Some(found) = self.routines.get(monitor, &Identity::with_kind(name, kind), &loader)? {
			return Ok(Some(found));
		}
		let wanted = Identity::new(name).key(self.ctx.case());
		Ok(self.routines.get_all(monitor, &loader)?.into_iter().find(|r| {
			r.kind == kind && Identity::new(r.routine_name.as_str()).key(self.ctx.case()) == wanted
		}))
	}

	// other schema objects

	pub fn sequences(&self, monitor: &Monitor) -> Result<Vec<Arc<Sequence>>> {
		self.sequences.get_all(monitor, &self.sequence_loader())
	}

	pub fn sequence(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Sequence>>> {
		self.sequences.get(monitor, &Identity::new(name), &self.sequence_loader())
	}

	pub fn aliases(&self, monitor: &Monitor) -> Result<Vec<Arc<Alias>>> {
		self.aliases.get_all(monitor, &self.alias_loader())
	}

	pub fn alias(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Alias>>> {
		self.aliases.get(monitor, &Identity::new(name), &self.alias_loader())
	}

	pub fn packages(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.packages.get_all(monitor, &self.package_loader())
	}

	pub fn package(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<GenericObject>>> {
		self.packages.get(monitor, &Identity::new(name), &self.package_loader())
	}

	/// Empty below 9.7, which has no modules.
	pub fn modules(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.modules.get_all(monitor, &self.module_loader())
	}

	pub fn module(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<GenericObject>>> {
		self.modules.get(monitor, &Identity::new(name), &self.module_loader())
	}

	pub fn xml_schemas(&self, monitor: &Monitor) -> Result<Vec<Arc<GenericObject>>> {
		self.xml_schemas.get_all(monitor, &self.xml_schema_loader())
	}

	pub fn xml_schema(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<GenericObject>>> {
		self.xml_schemas.get(monitor, &Identity::new(name), &self.xml_schema_loader())
	}

	/// User-defined types of this schema.
	pub fn data_types(&self, monitor: &Monitor) -> Result<Vec<Arc<DataType>>> {
		self.data_types.get_all(monitor, &self.data_type_loader())
	}

	pub fn data_type(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<DataType>>> {
		self.data_types.get(monitor, &Identity::new(name), &self.data_type_loader())
	}

	// table-addressed children

	pub fn indexes(&self, monitor: &Monitor) -> Result<Vec<Arc<Index>>> {
		self.indexes.all(monitor, &self.index_loader())
	}

	pub fn index(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Index>>> {
		Ok(self.indexes.find(monitor, &Identity::new(name), &self.index_loader())?.map(|(_, i)| i))
	}

	pub fn table_indexes(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Index>>> {
		self.indexes.children(monitor, table, &self.index_loader())
	}

	pub fn table_index(&self, monitor: &Monitor, table: &str, name: &str) -> Result<Option<Arc<Index>>> {
		self.indexes.get(monitor, table, &Identity::new(name), &self.index_loader())
	}

	pub fn triggers(&self, monitor: &Monitor) -> Result<Vec<Arc<Trigger>>> {
		self.triggers.all(monitor, &self.trigger_loader())
	}

	pub fn trigger(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Trigger>>> {
		Ok(self.triggers.find(monitor, &Identity::new(name), &self.trigger_loader())?.map(|(_, t)| t))
	}

	pub fn table_triggers(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Trigger>>> {
		self.triggers.children(monitor, table, &self.trigger_loader())
	}

	pub fn table_trigger(&self, monitor: &Monitor, table: &str, name: &str) -> Result<Option<Arc<Trigger>>> {
		self.triggers.get(monitor, table, &Identity::new(name), &self.trigger_loader())
	}

	/// Primary and unique keys.
	pub fn unique_keys(&self, monitor: &Monitor) -> Result<Vec<Arc<Constraint>>> {
		self.unique_keys.all(monitor, &self.unique_key_loader())
	}

	pub fn unique_key(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Constraint>>> {
		Ok(self.unique_keys.find(monitor, &Identity::new(name), &self.unique_key_loader())?.map(|(_, c)| c))
	}

	pub fn table_unique_keys(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Constraint>>> {
		self.unique_keys.children(monitor, table, &self.unique_key_loader())
	}

	pub fn table_unique_key(&self, monitor: &Monitor, table: &str, name: &str) -> Result<Option<Arc<Constraint>>> {
		self.unique_keys.get(monitor, table, &Identity::new(name), &self.unique_key_loader())
	}

	pub fn foreign_keys(&self, monitor: &Monitor) -> Result<Vec<Arc<Constraint>>> {
		self.foreign_keys.all(monitor, &self.foreign_key_loader())
	}

	pub fn foreign_key(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Constraint>>> {
		Ok(self.foreign_keys.find(monitor, &Identity::new(name), &self.foreign_key_loader())?.map(|(_, c)| c))
	}

	pub fn table_foreign_keys(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Constraint>>> {
		self.foreign_keys.children(monitor, table, &self.foreign_key_loader())
	}

	pub fn table_foreign_key(&self, monitor: &Monitor, table: &str, name: &str) -> Result<Option<Arc<Constraint>>> {
		self.foreign_keys.get(monitor, table, &Identity::new(name), &self.foreign_key_loader())
	}

	/// Foreign keys, of any table, that point at `table`.
	pub fn table_references(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Constraint>>> {
		self.references.children(monitor, table, &self.reference_loader())
	}

	pub fn checks(&self, monitor: &Monitor) -> Result<Vec<Arc<Constraint>>> {
		self.checks.all(monitor, &self.check_loader())
	}

	pub fn check(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Constraint>>> {
		Ok(self.checks.find(monitor, &Identity::new(name), &self.check_loader())?.map(|(_, c)| c))
	}

	pub fn table_checks(&self, monitor: &Monitor, table: &str) -> Result<Vec<Arc<Constraint>>> {
		self.checks.children(monitor, table, &self.check_loader())
	}

	pub fn table_check(&self, monitor: &Monitor, table: &str, name: &str) -> Result<Option<Arc<Constraint>>> {
		self.checks.get(monitor, table, &Identity::new(name), &self.check_loader())
	}

	// statistics

	pub fn size(&self) -> Option<ObjectStatistics> {
		*self.size.read()
	}

	pub(crate) fn set_size(&self, size: ObjectStatistics) {
		*self.size.write() = Some(size);
	}

	pub fn statistics_collected(&self) -> bool {
		self.statistics.is_collected()
	}

	// invalidation

	/// Drops the schema-level children filed under one table.
	pub(crate) fn clear_table_children(&self, table: &str) {
		self.indexes.clear_parent(table);
		self.triggers.clear_parent(table);
		self.unique_keys.clear_parent(table);
		self.foreign_keys.clear_parent(table);
		self.references.clear_parent(table);
		self.checks.clear_parent(table);
	}

	/// Drops every cache the schema owns, including the caches of its cached tables.
	pub(crate) fn clear(&self) {
		for table in self.tables.cached_all() {
			table.clear();
		}
		self.tables.clear();
		self.routines.clear();
		self.sequences.clear();
		self.aliases.clear();
		self.packages.clear();
		self.modules.clear();
		self.xml_schemas.clear();
		self.data_types.clear();
		self.indexes.clear();
		self.triggers.clear();
		self.unique_keys.clear();
		self.foreign_keys.clear();
		self.references.clear();
		self.checks.clear();
		self.statistics.reset();
		*self.size.write() = None;
	}

	// loaders

	fn schema_name(&self) -> String {
		self.info.base.name.clone()
	}

	fn table_loader(&self) -> impl Loader<Table> + '_ {
		let ctx = &self.ctx;
		RecordLoader::new(
			ctx,
			Query::Tables {
				schema: self.schema_name(),
				name: None,
			},
			move |record: &Record| Table::from_record(ctx, record),
		)
		.filtered(&ctx.config().table_filter)
	}

	fn routine_loader(&self) -> impl Loader<Routine> + '_ {
		let gate = *self.ctx.gate();
		RecordLoader::new(
			&self.ctx,
			Query::Routines {
				schema: self.schema_name(),
				name: None,
			},
			move |record: &Record| Routine::from_record(&gate, record),
		)
	}

	fn sequence_loader(&self) -> impl Loader<Sequence> + '_ {
		RecordLoader::new(
			&self.ctx,
			Query::Sequences {
				schema: self.schema_name(),
			},
			Sequence::from_record,
		)
	}

	fn alias_loader(&self) -> impl Loader<Alias> + '_ {
		RecordLoader::new(
			&self.ctx,
			Query::Aliases {
				schema: self.schema_name(),
			},
			Alias::from_record,
		)
	}

	fn package_loader(&self) -> impl Loader<GenericObject> + '_ {
		RecordLoader::new(
			&self.ctx,
			Query::Packages {
				schema: self.schema_name(),
			},
			|record: &Record| GenericObject::from_record(ObjectKind::Package, record),
		)
	}

	fn module_loader(&self) -> impl Loader<GenericObject> + '_ {
		RecordLoader::new(
			&self.ctx,
			Query::Modules {
				schema: self.schema_name(),
			},
			|record: &Record| GenericObject::from_record(ObjectKind::Module, record),
		)
		.since(EngineVersion::V9_7)
	}

	fn xml_schema_loader(&self) -> impl Loader<GenericObject> + '_ {
		RecordLoader::new(
			&self.ctx,
			Query::XmlSchemas {
				schema: self.schema_name(),
			},
			|record: &Record| GenericObject::from_record(ObjectKind::XmlSchema, record),
		)
	}

	fn data_type_loader(&self) -> impl Loader<DataType> + '_ {
		let gate = *self.ctx.gate();
		RecordLoader::new(
			&self.ctx,
			Query::DataTypes {
				schema: Some(self.schema_name()),
				exclude_module_types: gate.supports(EngineVersion::V9_7),
			},
			move |record: &Record| DataType::from_record(&gate, record),
		)
	}

	fn table_names(&self, monitor: &Monitor) -> Result<Vec<String>> {
		Ok(self.all_tables(monitor)?.iter().map(|t| t.name().to_string()).collect())
	}

	/// Loader of children filed per table. Rows of tables excluded by `table_filter` never
	/// reach the cache.
	fn child_loader<'a, E, B>(
		&'a self,
		query: fn(String, Option<String>) -> Query,
		parent_field: &'static str,
		build: B,
	) -> impl ChildLoader<E> + 'a
	where
		E: Entity + 'a,
		B: Fn(&Record) -> Option<E> + 'static,
	{
		let schema = self.schema_name();
		ChildRecordLoader::new(
			&self.ctx,
			move |monitor: &Monitor| self.table_names(monitor),
			move |table: Option<&str>| query(schema.clone(), table.map(str::to_string)),
			parent_field,
			build,
		)
		.parents_filtered(&self.ctx.config().table_filter)
	}

	fn index_loader(&self) -> impl ChildLoader<Index> + '_ {
		let gate = *self.ctx.gate();
		self.child_loader(
			|schema, table| Query::Indexes {
				schema,
				table,
			},
			"TABNAME",
			move |record: &Record| Index::from_record(&gate, record),
		)
	}

	fn trigger_loader(&self) -> impl ChildLoader<Trigger> + '_ {
		self.child_loader(
			|schema, table| Query::Triggers {
				schema,
				table,
			},
			"TABNAME",
			Trigger::from_record,
		)
	}

	fn unique_key_loader(&self) -> impl ChildLoader<Constraint> + '_ {
		self.child_loader(
			|schema, table| Query::UniqueKeys {
				schema,
				table,
			},
			"TABNAME",
			Constraint::from_record,
		)
	}

	fn foreign_key_loader(&self) -> impl ChildLoader<Constraint> + '_ {
		self.child_loader(
			|schema, table| Query::ForeignKeys {
				schema,
				table,
			},
			"TABNAME",
			Constraint::foreign_key,
		)
	}

	fn reference_loader(&self) -> impl ChildLoader<Constraint> + '_ {
		self.child_loader(
			|schema, table| Query::References {
				schema,
				table,
			},
			"REFTABNAME",
			Constraint::foreign_key,
		)
	}

	fn check_loader(&self) -> impl ChildLoader<Constraint> + '_ {
		self.child_loader(
			|schema, table| Query::Checks {
				schema,
				table,
			},
			"TABNAME",
			Constraint::from_record,
		)
	}
}

impl Entity for Schema {
	fn name(&self) -> &str {
		&self.info.base.name
	}
}

impl std::fmt::Debug for Schema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Schema").field("info", &self.info).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::schema_row;

	#[test]
	fn test_system_schemas() {
		assert!(is_system_schema("SYSIBM"));
		assert!(is_system_schema("SYSCAT"));
		assert!(is_system_schema("NULLID"));
		assert!(is_system_schema("SQLJ"));
		assert!(!is_system_schema("APP"));
		assert!(!is_system_schema("ASYS"));
	}

	#[test]
	fn test_info_tiers() {
		let record = schema_row("APP")
			.with("OWNERTYPE", "U")
			.with("AUDITPOLICYID", 3)
			.with("AUDITPOLICYNAME", "AUDIT_ALL")
			.with("DATACAPTURE", "N");

		let v95 = SchemaInfo::from_record(&VersionGate::new(EngineVersion::V9_5), &record).unwrap();
		assert_eq!(v95.owner_type, Some(OwnerType::User));
		assert_eq!(v95.audit_policy, None);

		let v101 = SchemaInfo::from_record(&VersionGate::new(EngineVersion::V10_1), &record).unwrap();
		assert_eq!(v101.owner_type, Some(OwnerType::User));
		assert_eq!(v101.audit_policy_id, Some(3));
		assert_eq!(v101.data_capture, Some(false));
	}
}
