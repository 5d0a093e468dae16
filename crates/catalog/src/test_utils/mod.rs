// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scripted catalog source and record builders for tests.

use std::{collections::HashMap, sync::Arc};

use crossbeam_channel::{Receiver, Sender, unbounded};
use dbnav_core::{EngineVersion, Error, Monitor, Record};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use crate::{CatalogConfig, CatalogSource, DataSource, Query, Result};

/// Installs a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_test_writer()
		.try_init();
}

/// Handle on a paused fetch: `started` fires once the fetch is in flight, sending on
/// `release` lets it finish.
pub struct Pause {
	pub started: Receiver<()>,
	pub release: Sender<()>,
}

#[derive(Default)]
struct State {
	responses: HashMap<Query, Vec<Record>>,
	failures: HashMap<Query, usize>,
	pauses: HashMap<Query, (Sender<()>, Receiver<()>)>,
	version_pause: Option<(Sender<()>, Receiver<()>)>,
	fetches: HashMap<Query, usize>,
	version: Option<EngineVersion>,
	current_schema: Option<String>,
}

impl State {
	fn lookup(&self, query: &Query) -> Vec<Record> {
		if let Some(records) = self.responses.get(query) {
			return records.clone();
		}
		// a narrowed query is answered from the scripted bulk response
		if let Some((broad, field, value)) = broaden(query) {
			if let Some(records) = self.responses.get(&broad) {
				return records.iter().filter(|r| r.trimmed(field) == value).cloned().collect();
			}
		}
		Vec::new()
	}
}

fn broaden(query: &Query) -> Option<(Query, &'static str, String)> {
	let table_scoped = |schema: &String, table: &Option<String>, make: fn(String, Option<String>) -> Query| {
		table.as_ref().map(|t| (make(schema.clone(), None), "TABNAME", t.clone()))
	};
	match query {
		Query::Schemas {
			name: Some(name),
		} => Some((
			Query::Schemas {
				name: None,
			},
			"SCHEMANAME",
			name.clone(),
		)),
		Query::Tables {
			schema,
			name: Some(name),
		} => Some((
			Query::Tables {
				schema: schema.clone(),
				name: None,
			},
			"TABNAME",
			name.clone(),
		)),
		Query::Routines {
			schema,
			name: Some(name),
		} => Some((
			Query::Routines {
				schema: schema.clone(),
				name: None,
			},
			"SPECIFICNAME",
			name.clone(),
		)),
		Query::Columns {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::Columns {
			schema,
			table,
		}),
		Query::Indexes {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::Indexes {
			schema,
			table,
		}),
		Query::UniqueKeys {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::UniqueKeys {
			schema,
			table,
		}),
		Query::ForeignKeys {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::ForeignKeys {
			schema,
			table,
		}),
		Query::Checks {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::Checks {
			schema,
			table,
		}),
		Query::Triggers {
			schema,
			table,
		} => table_scoped(schema, table, |schema, table| Query::Triggers {
			schema,
			table,
		}),
		Query::References {
			schema,
			table: Some(table),
		} => Some((
			Query::References {
				schema: schema.clone(),
				table: None,
			},
			"REFTABNAME",
			table.clone(),
		)),
		_ => None,
	}
}

/// In-memory [`CatalogSource`] answering scripted responses. Unscripted queries return no
/// rows.
pub struct MemorySource {
	state: Mutex<State>,
}

impl Default for MemorySource {
	fn default() -> Self {
		Self::new()
	}
}

impl MemorySource {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(State {
				version: Some(EngineVersion::V10_5),
				..State::default()
			}),
		}
	}

	pub fn with(self, query: Query, records: Vec<Record>) -> Self {
		self.respond(query, records);
		self
	}

	pub fn respond(&self, query: Query, records: Vec<Record>) {
		self.state.lock().responses.insert(query, records);
	}

	/// The next `times` fetches of `query` fail.
	pub fn fail_next(&self, query: Query, times: usize) {
		self.state.lock().failures.insert(query, times);
	}

	/// Holds the next fetch of `query` until released.
	pub fn pause(&self, query: Query) -> Pause {
		let (started_tx, started_rx) = unbounded();
		let (release_tx, release_rx) = unbounded();
		self.state.lock().pauses.insert(query, (started_tx, release_rx));
		Pause {
			started: started_rx,
			release: release_tx,
		}
	}

	/// Holds the next server version read until released.
	pub fn pause_version(&self) -> Pause {
		let (started_tx, started_rx) = unbounded();
		let (release_tx, release_rx) = unbounded();
		self.state.lock().version_pause = Some((started_tx, release_rx));
		Pause {
			started: started_rx,
			release: release_tx,
		}
	}

	pub fn fetch_count(&self, query: &Query) -> usize {
		self.state.lock().fetches.get(query).copied().unwrap_or(0)
	}

	pub fn total_fetches(&self) -> usize {
		self.state.lock().fetches.values().sum()
	}

	/// `None` makes the version read fail.
	pub fn set_version(&self, version: Option<EngineVersion>) {
		self.state.lock().version = version;
	}

	pub fn set_current_schema(&self, schema: Option<&str>) {
		self.state.lock().current_schema = schema.map(str::to_string);
	}

	/// A small schema `APP` with two tables, a view and the usual children, plus the
	/// top-level objects they point at.
	pub fn with_app_schema() -> Self {
		let source = MemorySource::new();
		source.set_current_schema(Some("APP"));
		let app = || "APP".to_string();

		source
			.with(
				Query::Schemas {
					name: None,
				},
				vec![schema_row("SYSIBM"), schema_row("APP"), schema_row("SALES")],
			)
			.with(
				Query::DataTypes {
					schema: None,
					exclude_module_types: true,
				},
				vec![
					data_type_row("SYSIBM", "INTEGER", "S", None),
					data_type_row("SYSIBM", "DECIMAL", "S", None),
					data_type_row("SYSIBM", "VARCHAR", "S", None),
				],
			)
			.with(
				Query::DataTypes {
					schema: Some(app()),
					exclude_module_types: true,
				},
				vec![data_type_row("APP", "MONEY", "T", Some(("SYSIBM", "DECIMAL")))],
			)
			.with(Query::Tablespaces, vec![tablespace_row("USERSPACE1", 2, 1)])
			.with(Query::Bufferpools, vec![bufferpool_row("IBMDEFAULTBP", 1)])
			.with(
				Query::Tables {
					schema: app(),
					name: None,
				},
				vec![
					table_row("APP", "CUSTOMERS", "T"),
					table_row("APP", "ORDERS", "T"),
					table_row("APP", "ORDER_TOTALS", "V"),
				],
			)
			.with(
				Query::Columns {
					schema: app(),
					table: None,
				},
				vec![
					column_row("APP", "CUSTOMERS", "ID", 0, "INTEGER"),
					column_row("APP", "CUSTOMERS", "NAME", 1, "VARCHAR"),
					column_row("APP", "ORDERS", "ID", 0, "INTEGER"),
					column_row("APP", "ORDERS", "CUSTOMER_ID", 1, "INTEGER"),
					column_row("APP", "ORDERS", "TOTAL", 2, "MONEY").with("TYPESCHEMA", "APP"),
					column_row("APP", "ORDER_TOTALS", "CUSTOMER_ID", 0, "INTEGER"),
					column_row("APP", "ORDER_TOTALS", "TOTAL", 1, "MONEY").with("TYPESCHEMA", "APP"),
				],
			)
			.with(
				Query::UniqueKeys {
					schema: app(),
					table: None,
				},
				vec![
					unique_key_row("APP", "CUSTOMERS", "PK_CUSTOMERS", "P", "ID"),
					unique_key_row("APP", "ORDERS", "PK_ORDERS", "P", "ID"),
				],
			)
			.with(
				Query::ForeignKeys {
					schema: app(),
					table: None,
				},
				vec![foreign_key_row("APP", "ORDERS", "FK_CUSTOMER", "APP", "CUSTOMERS", "PK_CUSTOMERS", "CUSTOMER_ID")],
			)
			.with(
				Query::References {
					schema: app(),
					table: None,
				},
				vec![foreign_key_row("APP", "ORDERS", "FK_CUSTOMER", "APP", "CUSTOMERS", "PK_CUSTOMERS", "CUSTOMER_ID")],
			)
			.with(
				Query::Indexes {
					schema: app(),
					table: None,
				},
				vec![
					index_row("APP", "CUSTOMERS", "PK_CUSTOMERS", "+ID", "P"),
					index_row("APP", "ORDERS", "PK_ORDERS", "+ID", "P"),
					index_row("APP", "ORDERS", "IX_ORDERS_CUSTOMER", "+CUSTOMER_ID-ID", "D"),
				],
			)
			.with(
				Query::Checks {
					schema: app(),
					table: None,
				},
				vec![check_row("APP", "ORDERS", "CK_TOTAL", "TOTAL >= 0")],
			)
			.with(
				Query::Triggers {
					schema: app(),
					table: None,
				},
				vec![trigger_row("APP", "ORDERS", "TRG_AUDIT")],
			)
			.with(
				Query::Dependencies {
					schema: app(),
					table: "ORDER_TOTALS".to_string(),
				},
				vec![dependency_row("APP", "ORDER_TOTALS", "APP", "ORDERS", "T")],
			)
			.with(
				Query::Routines {
					schema: app(),
					name: None,
				},
				vec![routine_row("APP", "SQL1", "CALC", "P"), routine_row("APP", "SQL2", "CALC", "F")],
			)
			.with(
				Query::Sequences {
					schema: app(),
				},
				vec![sequence_row("APP", "ORDER_SEQ")],
			)
			.with(
				Query::Aliases {
					schema: app(),
				},
				vec![
					alias_row("APP", "ORD", "APP", "ORDERS", "T"),
					alias_row("APP", "ORD2", "APP", "ORD", "T"),
					alias_row("APP", "LOOP_A", "APP", "LOOP_B", "T"),
					alias_row("APP", "LOOP_B", "APP", "LOOP_A", "T"),
					alias_row("APP", "GONE", "APP", "DROPPED", "T"),
				],
			)
	}
}

impl CatalogSource for MemorySource {
	fn fetch(&self, monitor: &Monitor, query: &Query) -> Result<Vec<Record>> {
		let pause = {
			let mut state = self.state.lock();
			*state.fetches.entry(query.clone()).or_default() += 1;
			state.pauses.remove(query)
		};
		if let Some((started, release)) = pause {
			let _ = started.send(());
			let _ = release.recv();
		}
		monitor.check()?;

		let mut state = self.state.lock();
		if let Some(remaining) = state.failures.get_mut(query) {
			if *remaining > 0 {
				*remaining -= 1;
				return Err(Error::fetch(query.to_string(), "injected failure"));
			}
		}
		Ok(state.lookup(query))
	}

	fn server_version(&self, monitor: &Monitor) -> Result<EngineVersion> {
		let pause = self.state.lock().version_pause.take();
		if let Some((started, release)) = pause {
			let _ = started.send(());
			let _ = release.recv();
		}
		monitor.check()?;
		self.state.lock().version.ok_or_else(|| Error::fetch("server version", "version unavailable"))
	}

	fn current_schema(&self, _monitor: &Monitor) -> Result<Option<String>> {
		Ok(self.state.lock().current_schema.clone())
	}
}

/// Connects a datasource with the default configuration over `source`.
pub fn fixture(source: MemorySource) -> (Arc<MemorySource>, DataSource) {
	fixture_with(source, CatalogConfig::default())
}

pub fn fixture_with(source: MemorySource, config: CatalogConfig) -> (Arc<MemorySource>, DataSource) {
	init_logging();
	let source = Arc::new(source);
	let ds = DataSource::connect(source.clone(), config, &Monitor::new()).expect("connect");
	(source, ds)
}

pub fn schema_row(name: &str) -> Record {
	Record::new().with("SCHEMANAME", name).with("OWNER", "DB2INST1").with("CREATE_TIME", "2024-01-02 10:00:00")
}

pub fn table_row(schema: &str, name: &str, kind: &str) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", name)
		.with("TYPE", kind)
		.with("OWNER", "DB2INST1")
		.with("TBSPACE", "USERSPACE1")
		.with("STATUS", "N")
}

pub fn column_row(schema: &str, table: &str, name: &str, colno: i64, type_name: &str) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("COLNAME", name)
		.with("COLNO", colno)
		.with("TYPESCHEMA", "SYSIBM")
		.with("TYPENAME", type_name)
		.with("LENGTH", 4)
		.with("SCALE", 0)
		.with("NULLS", "Y")
}

pub fn index_row(schema: &str, table: &str, name: &str, colnames: &str, uniquerule: &str) -> Record {
	Record::new()
		.with("INDSCHEMA", schema)
		.with("INDNAME", name)
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("COLNAMES", colnames)
		.with("UNIQUERULE", uniquerule)
		.with("INDEXTYPE", "REG")
}

pub fn unique_key_row(schema: &str, table: &str, name: &str, kind: &str, columns: &str) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("CONSTNAME", name)
		.with("TYPE", kind)
		.with("ENFORCED", "Y")
		.with("COLNAMES", columns)
}

pub fn foreign_key_row(
	schema: &str,
	table: &str,
	name: &str,
	ref_schema: &str,
	ref_table: &str,
	ref_key: &str,
	columns: &str,
) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("CONSTNAME", name)
		.with("REFTABSCHEMA", ref_schema)
		.with("REFTABNAME", ref_table)
		.with("REFKEYNAME", ref_key)
		.with("FK_COLNAMES", columns)
		.with("DELETERULE", "R")
		.with("UPDATERULE", "A")
}

pub fn check_row(schema: &str, table: &str, name: &str, text: &str) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("CONSTNAME", name)
		.with("TYPE", "K")
		.with("ENFORCED", "Y")
		.with("TEXT", text)
}

pub fn trigger_row(schema: &str, table: &str, name: &str) -> Record {
	Record::new()
		.with("TRIGSCHEMA", schema)
		.with("TRIGNAME", name)
		.with("TABSCHEMA", schema)
		.with("TABNAME", table)
		.with("TRIGTIME", "A")
		.with("TRIGEVENT", "I")
		.with("GRANULARITY", "R")
		.with("VALID", "Y")
}

pub fn routine_row(schema: &str, specific_name: &str, name: &str, kind: &str) -> Record {
	Record::new()
		.with("ROUTINESCHEMA", schema)
		.with("SPECIFICNAME", specific_name)
		.with("ROUTINENAME", name)
		.with("ROUTINETYPE", kind)
		.with("LANGUAGE", "SQL")
		.with("ORIGIN", "Q")
}

pub fn sequence_row(schema: &str, name: &str) -> Record {
	Record::new()
		.with("SEQSCHEMA", schema)
		.with("SEQNAME", name)
		.with("START", 1)
		.with("INCREMENT", 1)
		.with("MINVALUE", 1)
		.with("MAXVALUE", i64::MAX)
		.with("CACHE", 20)
}

pub fn alias_row(schema: &str, name: &str, base_schema: &str, base_name: &str, kind: &str) -> Record {
	Record::new()
		.with("ALIASSCHEMA", schema)
		.with("ALIASNAME", name)
		.with("BASE_SCHEMA", base_schema)
		.with("BASE_NAME", base_name)
		.with("TYPE", kind)
}

pub fn dependency_row(schema: &str, view: &str, base_schema: &str, base_name: &str, base_type: &str) -> Record {
	Record::new()
		.with("TABSCHEMA", schema)
		.with("TABNAME", view)
		.with("BSCHEMA", base_schema)
		.with("BNAME", base_name)
		.with("BTYPE", base_type)
}

pub fn data_type_row(schema: &str, name: &str, meta_type: &str, source: Option<(&str, &str)>) -> Record {
	let record = Record::new().with("TYPESCHEMA", schema).with("TYPENAME", name).with("METATYPE", meta_type);
	match source {
		Some((source_schema, source_name)) => {
			record.with("SOURCESCHEMA", source_schema).with("SOURCENAME", source_name)
		}
		None => record,
	}
}

pub fn tablespace_row(name: &str, id: i64, bufferpool_id: i64) -> Record {
	Record::new()
		.with("TBSPACE", name)
		.with("TBSPACEID", id)
		.with("TBSPACETYPE", "D")
		.with("DATATYPE", "L")
		.with("PAGESIZE", 4096)
		.with("EXTENTSIZE", 32)
		.with("PREFETCHSIZE", 32)
		.with("BUFFERPOOLID", bufferpool_id)
}

pub fn bufferpool_row(name: &str, id: i64) -> Record {
	Record::new().with("BPNAME", name).with("BUFFERPOOLID", id).with("PAGESIZE", 4096)
}

/// Size row of a table (`name_field` = `TABNAME`) or schema (`SCHEMANAME`).
pub fn size_row(name_field: &str, name: &str, total: i64) -> Record {
	Record::new()
		.with(name_field, name)
		.with("TOTAL_SIZE", total)
		.with("DATA_SIZE", total)
		.with("INDEX_SIZE", 0)
		.with("LOB_SIZE", 0)
}
