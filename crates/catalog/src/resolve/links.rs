// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dbnav_core::{Monitor, ObjectKind};
use tracing::debug;

use crate::{
	CatalogObject, Column, Constraint, DataSource, DataType, Dependency, GenericObject, Index, IndexColumn, ObjectRef,
	Routine, Table, Tablespace,
};

impl Column {
	pub fn data_type(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<DataType>> {
		let target = ObjectRef::new(self.type_schema.as_str(), self.type_name.as_str(), Some(ObjectKind::DataType));
		ds.resolve(monitor, &target).and_then(CatalogObject::into_data_type)
	}
}

impl Index {
	pub fn table(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<Table>> {
		ds.resolve(monitor, &ObjectRef::new(self.table_schema.as_str(), self.table.as_str(), None))
			.and_then(CatalogObject::into_table)
	}

	/// Index columns paired with the table columns they name; `None` where the column is gone.
	pub fn resolved_columns(&self, monitor: &Monitor, ds: &DataSource) -> Vec<(IndexColumn, Option<Arc<Column>>)> {
		self.columns
			.iter()
			.map(|column| {
				let target = ObjectRef::new(self.table_schema.as_str(), column.name.as_str(), Some(ObjectKind::Column))
					.with_parent(self.table.as_str());
				(column.clone(), ds.resolve(monitor, &target).and_then(CatalogObject::into_column))
			})
			.collect()
	}
}

impl Constraint {
	/// Table a foreign key points at. `None` for other constraints.
	pub fn referenced_table(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<Table>> {
		let target = self.referenced.as_ref()?;
		ds.resolve(monitor, target).and_then(CatalogObject::into_table)
	}

	pub fn referenced_key(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<Constraint>> {
		let target = self.referenced_key.as_ref()?;
		ds.resolve(monitor, target).and_then(CatalogObject::into_constraint)
	}
}

impl Dependency {
	pub fn target(&self, monitor: &Monitor, ds: &DataSource) -> Option<CatalogObject> {
		ds.resolve(monitor, &self.target_ref())
	}
}

impl Table {
	pub fn tablespace(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<Tablespace>> {
		let name = self.info().tablespace.as_deref()?;
		ds.resolve(monitor, &ObjectRef::top_level(name, ObjectKind::Tablespace)).and_then(CatalogObject::into_tablespace)
	}

	/// Server a nickname reads from. `None` for local tables.
	pub fn remote_server(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<GenericObject>> {
		let name = self.info().remote_server.as_deref()?;
		ds.resolve(monitor, &ObjectRef::top_level(name, ObjectKind::RemoteServer)).and_then(CatalogObject::into_generic)
	}
}

impl Tablespace {
	/// Bufferpools are referenced by id, not by name.
	pub fn bufferpool(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<GenericObject>> {
		let id = self.bufferpool_id?;
		match ds.bufferpool_by_id(monitor, id) {
			Ok(Some(bufferpool)) => Some(bufferpool),
			Ok(None) => {
				debug!(tablespace = %self.base.name, id, "dangling bufferpool id");
				None
			}
			Err(err) => {
				debug!(tablespace = %self.base.name, id, error = %err, "bufferpool could not be resolved");
				None
			}
		}
	}
}

impl DataType {
	/// Type a distinct type is sourced from.
	pub fn source_type(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<DataType>> {
		let schema = self.source_schema.as_deref()?;
		let name = self.source_name.as_deref()?;
		ds.resolve(monitor, &ObjectRef::new(schema, name, Some(ObjectKind::DataType)))
			.and_then(CatalogObject::into_data_type)
	}
}

impl Routine {
	/// Module the routine is declared in.
	pub fn module(&self, monitor: &Monitor, ds: &DataSource) -> Option<Arc<GenericObject>> {
		let name = self.module.as_deref()?;
		ds.resolve(monitor, &ObjectRef::new(self.schema.as_str(), name, Some(ObjectKind::Module)))
			.and_then(CatalogObject::into_generic)
	}
}
