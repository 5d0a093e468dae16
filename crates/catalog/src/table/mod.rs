// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use chrono::NaiveDateTime;
use dbnav_cache::{Entity, ObjectCache, Population};
use dbnav_core::{EngineVersion, Identity, Monitor, ObjectKind, Record};
use parking_lot::RwLock;
use tracing::instrument;

use crate::{
	Column, Context, Dependency, ObjectBase, ObjectStatistics, Query, Result, Tier, VersionGate, load::RecordLoader,
};

/// Attributes of a table-like object: table, view, materialized query table or nickname.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
	pub base: ObjectBase,
	pub schema: String,
	pub kind: ObjectKind,
	pub owner: Option<String>,
	pub status: Option<String>,
	pub tablespace: Option<String>,
	pub index_tablespace: Option<String>,
	pub long_tablespace: Option<String>,
	/// Row count from the last statistics run; `None` when never collected.
	pub cardinality: Option<i64>,
	pub create_time: Option<NaiveDateTime>,
	pub alter_time: Option<NaiveDateTime>,
	pub stats_time: Option<NaiveDateTime>,
	pub view_text: Option<String>,
	pub remote_server: Option<String>,
	pub remote_schema: Option<String>,
	pub remote_table: Option<String>,
	pub compression: Option<String>,
	pub last_used: Option<NaiveDateTime>,
	pub temporal_type: Option<String>,
	pub organization: Option<String>,
}

const TIERS: &[Tier<TableInfo>] = &[
	Tier {
		since: EngineVersion::V9_5,
		apply: |t, r| t.compression = r.trimmed_opt("COMPRESSION"),
	},
	Tier {
		since: EngineVersion::V9_7,
		apply: |t, r| t.last_used = r.timestamp("LASTUSED"),
	},
	Tier {
		since: EngineVersion::V10_1,
		apply: |t, r| t.temporal_type = r.trimmed_opt("TEMPORALTYPE"),
	},
	Tier {
		since: EngineVersion::V10_5,
		apply: |t, r| t.organization = r.trimmed_opt("TABLEORG"),
	},
];

impl TableInfo {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let kind = match record.trimmed("TYPE").as_str() {
			"T" | "G" | "H" | "U" => ObjectKind::Table,
			"V" | "W" => ObjectKind::View,
			"S" => ObjectKind::MaterializedQueryTable,
			"N" => ObjectKind::Nickname,
			_ => return None,
		};
		let base = ObjectBase::from_record(record, "TABNAME", Some("TABLEID"));
		if base.name.is_empty() {
			return None;
		}
		let mut info = TableInfo {
			base,
			schema: record.trimmed("TABSCHEMA"),
			kind,
			owner: record.trimmed_opt("OWNER"),
			status: record.trimmed_opt("STATUS"),
			tablespace: record.trimmed_opt("TBSPACE"),
			index_tablespace: record.trimmed_opt("INDEX_TBSPACE"),
			long_tablespace: record.trimmed_opt("LONG_TBSPACE"),
			cardinality: record.int_opt("CARD").filter(|card| *card >= 0),
			create_time: record.timestamp("CREATE_TIME"),
			alter_time: record.timestamp("ALTER_TIME"),
			stats_time: record.timestamp("STATS_TIME"),
			view_text: record.string_opt("TEXT"),
			remote_server: record.trimmed_opt("SERVERNAME"),
			remote_schema: record.trimmed_opt("REMOTE_SCHEMA"),
			remote_table: record.trimmed_opt("REMOTE_TABLE"),
			compression: None,
			last_used: None,
			temporal_type: None,
			organization: None,
		};
		gate.apply(&mut info, record, TIERS);
		Some(info)
	}
}

/// Table-like container owning its columns and view dependencies.
pub struct Table {
	info: TableInfo,
	ctx: Arc<Context>,
	columns: ObjectCache<Column>,
	dependencies: ObjectCache<Dependency>,
	statistics: RwLock<Option<ObjectStatistics>>,
}

impl Table {
	pub(crate) fn new(ctx: Arc<Context>, info: TableInfo) -> Self {
		let case = ctx.case();
		let label = format!("{}.{}", info.schema, info.base.name);
		Self {
			columns: ObjectCache::new(format!("columns of {label}"), case),
			dependencies: ObjectCache::new(format!("dependencies of {label}"), case),
			statistics: RwLock::new(None),
			info,
			ctx,
		}
	}

	pub(crate) fn from_record(ctx: &Arc<Context>, record: &Record) -> Option<Self> {
		let info = TableInfo::from_record(ctx.gate(), record)?;
		Some(Table::new(ctx.clone(), info))
	}

	pub fn info(&self) -> &TableInfo {
		&self.info
	}

	pub fn schema_name(&self) -> &str {
		&self.info.schema
	}

	pub fn kind(&self) -> ObjectKind {
		self.info.kind
	}

	pub fn is_view(&self) -> bool {
		matches!(self.info.kind, ObjectKind::View | ObjectKind::MaterializedQueryTable)
	}

	#[instrument(name = "catalog::table::columns", level = "trace", skip_all, fields(table = %self.info.base.name))]
	pub fn columns(&self, monitor: &Monitor) -> Result<Vec<Arc<Column>>> {
		self.columns.get_all(monitor, &self.column_loader())
	}

	pub fn column(&self, monitor: &Monitor, name: &str) -> Result<Option<Arc<Column>>> {
		self.columns.get(monitor, &Identity::new(name), &self.column_loader())
	}

	/// Objects a view or materialized query table is built on. Empty for base tables.
	#[instrument(name = "catalog::table::dependencies", level = "trace", skip_all, fields(table = %self.info.base.name))]
	pub fn dependencies(&self, monitor: &Monitor) -> Result<Vec<Arc<Dependency>>> {
		if !self.is_view() {
			return Ok(Vec::new());
		}
		let loader = RecordLoader::new(
			&self.ctx,
			Query::Dependencies {
				schema: self.info.schema.clone(),
				table: self.info.base.name.clone(),
			},
			Dependency::from_record,
		);
		self.dependencies.get_all(monitor, &loader)
	}

	pub fn statistics(&self) -> Option<ObjectStatistics> {
		*self.statistics.read()
	}

	pub(crate) fn set_statistics(&self, statistics: ObjectStatistics) {
		*self.statistics.write() = Some(statistics);
	}

	pub fn column_population(&self) -> Population {
		self.columns.population()
	}

	pub(crate) fn cached_columns(&self) -> Vec<Arc<Column>> {
		self.columns.cached_all()
	}

	pub(crate) fn install_columns(&self, columns: Vec<Column>) {
		self.columns.set_all(columns);
	}

	/// Drops everything this table caches, including its statistics.
	pub(crate) fn clear(&self) {
		self.columns.clear();
		self.dependencies.clear();
		*self.statistics.write() = None;
	}

	fn column_loader(&self) -> impl dbnav_cache::Loader<Column> + '_ {
		let gate = *self.ctx.gate();
		RecordLoader::new(
			&self.ctx,
			Query::Columns {
				schema: self.info.schema.clone(),
				table: Some(self.info.base.name.clone()),
			},
			move |record: &Record| Column::from_record(&gate, record),
		)
	}
}

impl Entity for Table {
	fn name(&self) -> &str {
		&self.info.base.name
	}
}

impl std::fmt::Debug for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Table").field("info", &self.info).finish_non_exhaustive()
	}
}
