// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashSet,
	fmt::{Display, Formatter},
};

use dbnav_core::{Monitor, ObjectKind};
use tracing::{debug, instrument};

use crate::{
	Alias, CatalogObject, Container, DataSource, Result, Schema, data_type::SYSTEM_TYPE_SCHEMA,
};

mod links;

/// Name-based pointer to another object of the graph, recorded when an entity is built and
/// resolved only when asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
	pub schema: String,
	pub name: String,
	/// `None` when the referencing row does not say what the target is.
	pub kind: Option<ObjectKind>,
	/// Owning table, for objects addressed per table (columns, keys, indexes).
	pub parent: Option<String>,
}

impl ObjectRef {
	pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: Option<ObjectKind>) -> Self {
		Self {
			schema: schema.into(),
			name: name.into(),
			kind,
			parent: None,
		}
	}

	/// A reference to a top-level object, which has no schema.
	pub fn top_level(name: impl Into<String>, kind: ObjectKind) -> Self {
		Self::new(String::new(), name, Some(kind))
	}

	pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}
}

impl Display for ObjectRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(kind) = self.kind {
			write!(f, "{kind} ")?;
		}
		if !self.schema.is_empty() {
			write!(f, "{}.", self.schema)?;
		}
		if let Some(parent) = &self.parent {
			write!(f, "{parent}.")?;
		}
		f.write_str(&self.name)
	}
}

impl DataSource {
	/// Resolves a reference, loading whatever caches the lookup needs. Anything that keeps
	/// the target from being found, including fetch errors, yields `None`.
	#[instrument(name = "catalog::resolve", level = "trace", skip_all, fields(target = %target))]
	pub fn resolve(&self, monitor: &Monitor, target: &ObjectRef) -> Option<CatalogObject> {
		match self.try_resolve(monitor, target) {
			Ok(Some(found)) => Some(found),
			Ok(None) => {
				debug!(target = %target, "dangling reference");
				None
			}
			Err(err) => {
				debug!(target = %target, error = %err, "reference could not be resolved");
				None
			}
		}
	}

	fn try_resolve(&self, monitor: &Monitor, target: &ObjectRef) -> Result<Option<CatalogObject>> {
		match target.kind {
			Some(ObjectKind::Schema) => return Ok(self.schema(monitor, &target.name)?.map(CatalogObject::Schema)),
			Some(ObjectKind::DataType) if target.schema == SYSTEM_TYPE_SCHEMA => {
				return Ok(self.data_type(monitor, &target.name)?.map(CatalogObject::DataType));
			}
			Some(kind) if kind.is_top_level() => return self.child(monitor, kind, &target.name),
			_ => {}
		}

		let Some(schema) = self.schema(monitor, &target.schema)? else {
			return Ok(None);
		};
		match (target.kind, target.parent.as_deref()) {
			(None, _) => resolve_untyped(&schema, monitor, &target.name),
			(Some(ObjectKind::Column), Some(table)) => match schema.table(monitor, table)? {
				Some(table) => Ok(table.column(monitor, &target.name)?.map(CatalogObject::Column)),
				None => Ok(None),
			},
			(Some(ObjectKind::Column), None) => Ok(None),
			(Some(kind), Some(table)) if kind.is_constraint() || kind == ObjectKind::Index || kind == ObjectKind::Trigger => {
				resolve_in_table(&schema, monitor, kind, table, &target.name)
			}
			// primary and unique keys share one cache; a key reference does not know which it is
			(Some(ObjectKind::PrimaryKey | ObjectKind::UniqueKey), None) => {
				Ok(schema.unique_key(monitor, &target.name)?.map(CatalogObject::Constraint))
			}
			(Some(kind), _) => schema.child(monitor, kind, &target.name),
		}
	}

	/// Follows an alias chain to the first object that is not an alias. A chain that loops
	/// or is longer than `max_alias_depth` yields `None`.
	#[instrument(name = "catalog::resolve::alias", level = "trace", skip_all, fields(alias = %alias.qualified_name()))]
	pub fn resolve_alias(&self, monitor: &Monitor, alias: &Alias) -> Option<CatalogObject> {
		let case = self.config().name_case;
		let mut visited = HashSet::new();
		visited.insert(case.fold(&alias.qualified_name()));
		let mut target = alias.target.clone();

		for _ in 0..self.config().max_alias_depth {
			match self.resolve(monitor, &target)? {
				CatalogObject::Alias(next) => {
					if !visited.insert(case.fold(&next.qualified_name())) {
						debug!(alias = %alias.qualified_name(), at = %next.qualified_name(), "alias loop");
						return None;
					}
					target = next.target.clone();
				}
				found => return Some(found),
			}
		}
		debug!(alias = %alias.qualified_name(), depth = self.config().max_alias_depth, "alias chain too deep");
		None
	}
}

/// A reference without a kind is tried as a table, then a sequence, then an alias.
fn resolve_untyped(schema: &Schema, monitor: &Monitor, name: &str) -> Result<Option<CatalogObject>> {
	if let Some(table) = schema.table(monitor, name)? {
		return Ok(Some(CatalogObject::Table(table)));
	}
	if let Some(sequence) = schema.sequence(monitor, name)? {
		return Ok(Some(CatalogObject::Sequence(sequence)));
	}
	Ok(schema.alias(monitor, name)?.map(CatalogObject::Alias))
}

fn resolve_in_table(
	schema: &Schema,
	monitor: &Monitor,
	kind: ObjectKind,
	table: &str,
	name: &str,
) -> Result<Option<CatalogObject>> {
	Ok(match kind {
		ObjectKind::Index => schema.table_index(monitor, table, name)?.map(CatalogObject::Index),
		ObjectKind::Trigger => schema.table_trigger(monitor, table, name)?.map(CatalogObject::Trigger),
		ObjectKind::PrimaryKey | ObjectKind::UniqueKey => {
			schema.table_unique_key(monitor, table, name)?.map(CatalogObject::Constraint)
		}
		ObjectKind::ForeignKey => schema.table_foreign_key(monitor, table, name)?.map(CatalogObject::Constraint),
		ObjectKind::CheckConstraint => schema.table_check(monitor, table, name)?.map(CatalogObject::Constraint),
		_ => None,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		let column = ObjectRef::new("APP", "ID", Some(ObjectKind::Column)).with_parent("ORDERS");
		assert_eq!(column.to_string(), "COLUMN APP.ORDERS.ID");
		assert_eq!(ObjectRef::new("APP", "ORDERS", None).to_string(), "APP.ORDERS");
		assert_eq!(ObjectRef::top_level("USERSPACE1", ObjectKind::Tablespace).to_string(), "TABLESPACE USERSPACE1");
	}
}
