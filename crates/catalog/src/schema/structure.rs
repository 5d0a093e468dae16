// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use dbnav_cache::{Entity, Population};
use dbnav_core::{IdentityKey, Monitor};
use tracing::{instrument, warn};

use crate::{Column, Query, Result, Schema};

/// Which parts of a schema [`Schema::cache_structure`] loads ahead of navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructureScope {
	/// Tables, check constraints, sequences, XML schemas and modules.
	pub entities: bool,
	/// Columns of every table, fetched with one query.
	pub attributes: bool,
	/// Unique keys, foreign keys, references and indexes.
	pub associations: bool,
}

impl StructureScope {
	pub fn all() -> Self {
		Self {
			entities: true,
			attributes: true,
			associations: true,
		}
	}
}

impl Schema {
	/// Bulk-loads the requested parts of the schema so later navigation answers from cache.
	#[instrument(name = "catalog::schema::cache_structure", level = "debug", skip_all, fields(schema = %self.name()))]
	pub fn cache_structure(&self, monitor: &Monitor, scope: StructureScope) -> Result<()> {
		if scope.entities {
			monitor.subtask("Cache tables");
			self.all_tables(monitor)?;
			monitor.subtask("Cache check constraints");
			self.checks.load_children(monitor, &self.check_loader())?;
			monitor.subtask("Cache sequences");
			self.sequences(monitor)?;
			monitor.subtask("Cache XML schemas");
			self.xml_schemas(monitor)?;
			monitor.subtask("Cache modules");
			self.modules(monitor)?;
		}
		if scope.attributes {
			monitor.subtask("Cache table columns");
			self.cache_columns(monitor)?;
		}
		if scope.associations {
			monitor.subtask("Cache unique keys");
			self.unique_keys.load_children(monitor, &self.unique_key_loader())?;
			monitor.subtask("Cache foreign keys");
			self.foreign_keys.load_children(monitor, &self.foreign_key_loader())?;
			monitor.subtask("Cache references");
			self.references.load_children(monitor, &self.reference_loader())?;
			monitor.subtask("Cache indexes");
			self.indexes.load_children(monitor, &self.index_loader())?;
		}
		Ok(())
	}

	/// Fetches the columns of the whole schema and files them under their tables. Tables whose
	/// columns are already cached keep their instances.
	fn cache_columns(&self, monitor: &Monitor) -> Result<()> {
		let tables = self.all_tables(monitor)?;
		let ctx = self.context();
		let records = ctx.fetch(
			monitor,
			&Query::Columns {
				schema: self.name().to_string(),
				table: None,
			},
		)?;

		let case = ctx.case();
		let filter = &ctx.config().table_filter;
		let mut by_table: HashMap<IdentityKey, Vec<Column>> = HashMap::new();
		for record in &records {
			monitor.check()?;
			let Some(column) = Column::from_record(ctx.gate(), record) else {
				warn!(schema = %self.name(), "skipping malformed column row");
				continue;
			};
			if !filter.matches(&column.table) {
				continue;
			}
			by_table.entry(IdentityKey::new(&column.table, None, case)).or_default().push(column);
		}

		for table in tables {
			let columns = by_table.remove(&IdentityKey::new(table.name(), None, case)).unwrap_or_default();
			if table.column_population() != Population::Populated {
				table.install_columns(columns);
			}
		}
		for (table, columns) in by_table {
			warn!(schema = %self.name(), table = %table, count = columns.len(), "columns of an unknown table dropped");
		}
		Ok(())
	}
}
