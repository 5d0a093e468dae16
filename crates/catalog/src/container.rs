// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dbnav_cache::Entity;
use dbnav_core::{Error, Monitor, ObjectKind};

use crate::{
	Alias, Column, Constraint, DataSource, DataType, Dependency, GenericObject, Index, Result, Routine, Schema,
	Sequence, Table, Tablespace, Trigger,
};

/// Any object of the graph, as handed out by kind-driven navigation.
#[derive(Debug, Clone)]
pub enum CatalogObject {
	Schema(Arc<Schema>),
	Table(Arc<Table>),
	Column(Arc<Column>),
	Index(Arc<Index>),
	Constraint(Arc<Constraint>),
	Trigger(Arc<Trigger>),
	Routine(Arc<Routine>),
	Sequence(Arc<Sequence>),
	Alias(Arc<Alias>),
	DataType(Arc<DataType>),
	Tablespace(Arc<Tablespace>),
	Dependency(Arc<Dependency>),
	Generic(Arc<GenericObject>),
}

impl CatalogObject {
	pub fn name(&self) -> &str {
		match self {
			CatalogObject::Schema(o) => o.name(),
			CatalogObject::Table(o) => o.name(),
			CatalogObject::Column(o) => o.name(),
			CatalogObject::Index(o) => o.name(),
			CatalogObject::Constraint(o) => o.name(),
			CatalogObject::Trigger(o) => o.name(),
			CatalogObject::Routine(o) => o.name(),
			CatalogObject::Sequence(o) => o.name(),
			CatalogObject::Alias(o) => o.name(),
			CatalogObject::DataType(o) => o.name(),
			CatalogObject::Tablespace(o) => o.name(),
			CatalogObject::Dependency(o) => o.name(),
			CatalogObject::Generic(o) => o.name(),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		match self {
			CatalogObject::Schema(_) => ObjectKind::Schema,
			CatalogObject::Table(t) => t.kind(),
			CatalogObject::Column(_) => ObjectKind::Column,
			CatalogObject::Index(_) => ObjectKind::Index,
			CatalogObject::Constraint(c) => c.kind,
			CatalogObject::Trigger(_) => ObjectKind::Trigger,
			CatalogObject::Routine(r) => r.kind,
			CatalogObject::Sequence(_) => ObjectKind::Sequence,
			CatalogObject::Alias(_) => ObjectKind::Alias,
			CatalogObject::DataType(_) => ObjectKind::DataType,
			CatalogObject::Tablespace(_) => ObjectKind::Tablespace,
			// a dependency is a reference entry, its kind is the referenced one when known
			CatalogObject::Dependency(d) => d.target_kind.unwrap_or(ObjectKind::Table),
			CatalogObject::Generic(g) => g.kind,
		}
	}

	pub fn into_schema(self) -> Option<Arc<Schema>> {
		match self {
			CatalogObject::Schema(s) => Some(s),
			_ => None,
		}
	}

	pub fn into_table(self) -> Option<Arc<Table>> {
		match self {
			CatalogObject::Table(t) => Some(t),
			_ => None,
		}
	}

	pub fn into_column(self) -> Option<Arc<Column>> {
		match self {
			CatalogObject::Column(c) => Some(c),
			_ => None,
		}
	}

	pub fn into_index(self) -> Option<Arc<Index>> {
		match self {
			CatalogObject::Index(i) => Some(i),
			_ => None,
		}
	}

	pub fn into_constraint(self) -> Option<Arc<Constraint>> {
		match self {
			CatalogObject::Constraint(c) => Some(c),
			_ => None,
		}
	}

	pub fn into_routine(self) -> Option<Arc<Routine>> {
		match self {
			CatalogObject::Routine(r) => Some(r),
			_ => None,
		}
	}

	pub fn into_sequence(self) -> Option<Arc<Sequence>> {
		match self {
			CatalogObject::Sequence(s) => Some(s),
			_ => None,
		}
	}

	pub fn into_alias(self) -> Option<Arc<Alias>> {
		match self {
			CatalogObject::Alias(a) => Some(a),
			_ => None,
		}
	}

	pub fn into_data_type(self) -> Option<Arc<DataType>> {
		match self {
			CatalogObject::DataType(t) => Some(t),
			_ => None,
		}
	}

	pub fn into_tablespace(self) -> Option<Arc<Tablespace>> {
		match self {
			CatalogObject::Tablespace(t) => Some(t),
			_ => None,
		}
	}

	pub fn into_generic(self) -> Option<Arc<GenericObject>> {
		match self {
			CatalogObject::Generic(g) => Some(g),
			_ => None,
		}
	}
}

/// Kind-driven navigation over a container's caches.
pub trait Container {
	/// Every child of `kind`. Asking for a kind the container can never own is an
	/// [`Error::Structural`].
	fn children(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<CatalogObject>>;

	fn child(&self, monitor: &Monitor, kind: ObjectKind, name: &str) -> Result<Option<CatalogObject>>;
}

fn wrap<T>(items: Vec<Arc<T>>, f: fn(Arc<T>) -> CatalogObject) -> Vec<CatalogObject> {
	items.into_iter().map(f).collect()
}

fn structural(container: String, kind: ObjectKind) -> Error {
	Error::Structural {
		container,
		kind,
	}
}

impl Container for DataSource {
	fn children(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<CatalogObject>> {
		Ok(match kind {
			ObjectKind::Schema => wrap(self.schemas(monitor)?, CatalogObject::Schema),
			ObjectKind::DataType => wrap(self.data_types(monitor)?, CatalogObject::DataType),
			ObjectKind::Tablespace => wrap(self.tablespaces(monitor)?, CatalogObject::Tablespace),
			ObjectKind::Bufferpool => wrap(self.bufferpools(monitor)?, CatalogObject::Generic),
			ObjectKind::StorageGroup => wrap(self.storage_groups(monitor)?, CatalogObject::Generic),
			ObjectKind::Role => wrap(self.roles(monitor)?, CatalogObject::Generic),
			ObjectKind::Variable => wrap(self.variables(monitor)?, CatalogObject::Generic),
			ObjectKind::RemoteServer => wrap(self.remote_servers(monitor)?, CatalogObject::Generic),
			ObjectKind::Wrapper => wrap(self.wrappers(monitor)?, CatalogObject::Generic),
			_ => return Err(structural("DATASOURCE".to_string(), kind)),
		})
	}

	fn child(&self, monitor: &Monitor, kind: ObjectKind, name: &str) -> Result<Option<CatalogObject>> {
		Ok(match kind {
			ObjectKind::Schema => self.schema(monitor, name)?.map(CatalogObject::Schema),
			ObjectKind::DataType => self.data_type(monitor, name)?.map(CatalogObject::DataType),
			ObjectKind::Tablespace => self.tablespace(monitor, name)?.map(CatalogObject::Tablespace),
			ObjectKind::Bufferpool
			| ObjectKind::StorageGroup
			| ObjectKind::Role
			| ObjectKind::Variable
			| ObjectKind::RemoteServer
			| ObjectKind::Wrapper => self.top_level(monitor, kind, name)?.map(CatalogObject::Generic),
			_ => return Err(structural("DATASOURCE".to_string(), kind)),
		})
	}
}

impl Container for Schema {
	fn children(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<CatalogObject>> {
		Ok(match kind {
			kind if kind.is_table_like() => wrap(self.tables_of_kind(monitor, kind)?, CatalogObject::Table),
			kind if kind.is_routine() => wrap(self.routines_of_kind(monitor, kind)?, CatalogObject::Routine),
			ObjectKind::Sequence => wrap(self.sequences(monitor)?, CatalogObject::Sequence),
			ObjectKind::Alias => wrap(self.aliases(monitor)?, CatalogObject::Alias),
			ObjectKind::Package => wrap(self.packages(monitor)?, CatalogObject::Generic),
			ObjectKind::Module => wrap(self.modules(monitor)?, CatalogObject::Generic),
			ObjectKind::XmlSchema => wrap(self.xml_schemas(monitor)?, CatalogObject::Generic),
			ObjectKind::DataType => wrap(self.data_types(monitor)?, CatalogObject::DataType),
			ObjectKind::Index => wrap(self.indexes(monitor)?, CatalogObject::Index),
			ObjectKind::Trigger => wrap(self.triggers(monitor)?, CatalogObject::Trigger),
			ObjectKind::PrimaryKey | ObjectKind::UniqueKey => {
				wrap(self.unique_keys_of_kind(monitor, kind)?, CatalogObject::Constraint)
			}
			ObjectKind::ForeignKey => wrap(self.foreign_keys(monitor)?, CatalogObject::Constraint),
			ObjectKind::CheckConstraint => wrap(self.checks(monitor)?, CatalogObject::Constraint),
			_ => return Err(structural(format!("SCHEMA {}", self.name()), kind)),
		})
	}

	fn child(&self, monitor: &Monitor, kind: ObjectKind, name: &str) -> Result<Option<CatalogObject>> {
		Ok(match kind {
			kind if kind.is_table_like() => {
				self.table(monitor, name)?.filter(|t| t.kind() == kind).map(CatalogObject::Table)
			}
			kind if kind.is_routine() => self.routine(monitor, name, kind)?.map(CatalogObject::Routine),
			ObjectKind::Sequence => self.sequence(monitor, name)?.map(CatalogObject::Sequence),
			ObjectKind::Alias => self.alias(monitor, name)?.map(CatalogObject::Alias),
			ObjectKind::Package => self.package(monitor, name)?.map(CatalogObject::Generic),
			ObjectKind::Module => self.module(monitor, name)?.map(CatalogObject::Generic),
			ObjectKind::XmlSchema => self.xml_schema(monitor, name)?.map(CatalogObject::Generic),
			ObjectKind::DataType => self.data_type(monitor, name)?.map(CatalogObject::DataType),
			ObjectKind::Index => self.index(monitor, name)?.map(CatalogObject::Index),
			ObjectKind::Trigger => self.trigger(monitor, name)?.map(CatalogObject::Trigger),
			ObjectKind::PrimaryKey | ObjectKind::UniqueKey => {
				self.unique_key(monitor, name)?.filter(|c| c.kind == kind).map(CatalogObject::Constraint)
			}
			ObjectKind::ForeignKey => self.foreign_key(monitor, name)?.map(CatalogObject::Constraint),
			ObjectKind::CheckConstraint => self.check(monitor, name)?.map(CatalogObject::Constraint),
			_ => return Err(structural(format!("SCHEMA {}", self.name()), kind)),
		})
	}
}

impl Schema {
	fn unique_keys_of_kind(&self, monitor: &Monitor, kind: ObjectKind) -> Result<Vec<Arc<Constraint>>> {
		Ok(self.unique_keys(monitor)?.into_iter().filter(|c| c.kind == kind).collect())
	}

	/// Children of one table: columns and dependencies from the table's own caches, the
	/// rest from the schema's per-table composite caches. An unknown table has no children.
	pub fn table_children(&self, monitor: &Monitor, table: &str, kind: ObjectKind) -> Result<Vec<CatalogObject>> {
		Ok(match kind {
			ObjectKind::Column => match self.table(monitor, table)? {
				Some(t) => wrap(t.columns(monitor)?, CatalogObject::Column),
				None => Vec::new(),
			},
			ObjectKind::Index => wrap(self.table_indexes(monitor, table)?, CatalogObject::Index),
			ObjectKind::Trigger => wrap(self.table_triggers(monitor, table)?, CatalogObject::Trigger),
			ObjectKind::PrimaryKey | ObjectKind::UniqueKey => wrap(
				self.table_unique_keys(monitor, table)?.into_iter().filter(|c| c.kind == kind).collect(),
				CatalogObject::Constraint,
			),
			ObjectKind::ForeignKey => wrap(self.table_foreign_keys(monitor, table)?, CatalogObject::Constraint),
			ObjectKind::CheckConstraint => wrap(self.table_checks(monitor, table)?, CatalogObject::Constraint),
			kind if kind.is_table_like() => {
				match self.table(monitor, table)? {
					Some(t) => wrap(t.dependencies(monitor)?, CatalogObject::Dependency)
						.into_iter()
						.filter(|d| d.kind() == kind)
						.collect(),
					None => Vec::new(),
				}
			}
			_ => return Err(structural(format!("TABLE {}.{}", self.name(), table), kind)),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		Query,
		test_utils::{MemorySource, fixture},
	};

	#[test]
	fn test_structural_errors() {
		let (_, ds) = fixture(MemorySource::new());
		let monitor = Monitor::new();
		let err = ds.children(&monitor, ObjectKind::Column).unwrap_err();
		assert!(matches!(
			err,
			Error::Structural {
				kind: ObjectKind::Column,
				..
			}
		));
		assert!(!err.is_transient());
	}

	#[test]
	fn test_schema_children_by_kind() {
		let (source, ds) = fixture(MemorySource::with_app_schema());
		let monitor = Monitor::new();
		let schema = ds.require_schema(&monitor, "APP").unwrap();

		let tables = schema.children(&monitor, ObjectKind::Table).unwrap();
		let views = schema.children(&monitor, ObjectKind::View).unwrap();
		assert!(tables.iter().all(|t| t.kind() == ObjectKind::Table));
		assert_eq!(views.len(), 1);
		assert_eq!(views[0].name(), "ORDER_TOTALS");
		// both listings come from one table population
		assert_eq!(
			source.fetch_count(&Query::Tables {
				schema: "APP".to_string(),
				name: None,
			}),
			1
		);

		let err = schema.children(&monitor, ObjectKind::Schema).unwrap_err();
		assert!(matches!(err, Error::Structural { .. }));
	}

	#[test]
	fn test_table_children() {
		let (_, ds) = fixture(MemorySource::with_app_schema());
		let monitor = Monitor::new();
		let schema = ds.require_schema(&monitor, "APP").unwrap();

		let columns = schema.table_children(&monitor, "ORDERS", ObjectKind::Column).unwrap();
		assert_eq!(columns.iter().map(|c| c.name()).collect::<Vec<_>>(), vec!["ID", "CUSTOMER_ID", "TOTAL"]);

		let pks = schema.table_children(&monitor, "ORDERS", ObjectKind::PrimaryKey).unwrap();
		assert_eq!(pks.len(), 1);
		assert!(schema.table_children(&monitor, "MISSING", ObjectKind::Column).unwrap().is_empty());
		assert!(schema.table_children(&monitor, "ORDERS", ObjectKind::Schema).is_err());
	}
}
