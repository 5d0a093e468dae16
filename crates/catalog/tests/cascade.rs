// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Refresh of tables, schemas and the whole datasource.

use std::{sync::Arc, thread};

use dbnav_catalog::{
	EngineVersion, Monitor, Population, Query, RefreshTarget, Result,
	test_utils::{MemorySource, fixture, schema_row},
};

fn app(query: fn(String, Option<String>) -> Query, table: Option<&str>) -> Query {
	query("APP".to_string(), table.map(str::to_string))
}

fn indexes(schema: String, table: Option<String>) -> Query {
	Query::Indexes {
		schema,
		table,
	}
}

fn tables(schema: String, name: Option<String>) -> Query {
	Query::Tables {
		schema,
		name,
	}
}

fn orders() -> RefreshTarget {
	RefreshTarget::Table {
		schema: "APP".to_string(),
		table: "ORDERS".to_string(),
	}
}

#[test]
fn test_table_refresh_clears_only_that_table() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;

	let before = schema.all_tables(&monitor)?;
	let orders_before = schema.table(&monitor, "ORDERS")?.unwrap();
	orders_before.columns(&monitor)?;
	assert_eq!(schema.table_indexes(&monitor, "ORDERS")?.len(), 2);
	assert_eq!(schema.table_indexes(&monitor, "CUSTOMERS")?.len(), 1);

	ds.refresh(&monitor, &orders())?;

	// the old instance is emptied, the entry is stale, nothing was fetched yet
	assert_eq!(orders_before.column_population(), Population::Unpopulated);
	assert_eq!(source.fetch_count(&app(tables, Some("ORDERS"))), 0);

	let after = schema.all_tables(&monitor)?;
	assert_eq!(source.fetch_count(&app(tables, Some("ORDERS"))), 1);
	assert_eq!(source.fetch_count(&app(tables, None)), 1);
	// the refreshed entry keeps its position, siblings keep their instances
	let names: Vec<_> = after.iter().map(|t| t.info().base.name.clone()).collect();
	assert_eq!(names, ["CUSTOMERS", "ORDERS", "ORDER_TOTALS"]);
	assert!(Arc::ptr_eq(&before[0], &after[0]));
	assert!(!Arc::ptr_eq(&before[1], &after[1]));

	// siblings' indexes still cached, the refreshed table's are fetched on their own
	assert_eq!(schema.table_indexes(&monitor, "CUSTOMERS")?.len(), 1);
	assert_eq!(source.fetch_count(&app(indexes, Some("ORDERS"))), 0);
	assert_eq!(schema.table_indexes(&monitor, "ORDERS")?.len(), 2);
	assert_eq!(source.fetch_count(&app(indexes, Some("ORDERS"))), 1);
	assert_eq!(source.fetch_count(&app(indexes, None)), 1);
	Ok(())
}

#[test]
fn test_refresh_never_populates() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let fetches = source.total_fetches();

	ds.refresh(&monitor, &orders())?;
	ds.refresh(&monitor, &RefreshTarget::Schema("APP".to_string()))?;
	assert_eq!(source.total_fetches(), fetches);

	let schema = ds.require_schema(&monitor, "APP")?;
	let fetches = source.total_fetches();
	ds.refresh(&monitor, &orders())?;
	assert_eq!(source.total_fetches(), fetches);
	assert_eq!(schema.all_tables(&monitor)?.len(), 3);
	Ok(())
}

#[test]
fn test_schema_refresh() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let old = ds.require_schema(&monitor, "APP")?;
	let sales = ds.require_schema(&monitor, "SALES")?;
	old.all_tables(&monitor)?;
	old.sequences(&monitor)?;

	ds.refresh(&monitor, &RefreshTarget::Schema("APP".to_string()))?;
	assert!(old.sequences(&monitor).is_ok());
	assert_eq!(
		source.fetch_count(&Query::Sequences {
			schema: "APP".to_string(),
		}),
		2
	);

	let new = ds.require_schema(&monitor, "APP")?;
	assert!(!Arc::ptr_eq(&old, &new));
	assert!(Arc::ptr_eq(&sales, &ds.require_schema(&monitor, "SALES")?));
	assert_eq!(
		source.fetch_count(&Query::Schemas {
			name: Some("APP".to_string()),
		}),
		1
	);
	Ok(())
}

#[test]
fn test_datasource_refresh_rereads_version() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let old = ds.require_schema(&monitor, "APP")?;
	assert_eq!(ds.version(), EngineVersion::V10_5);

	source.set_version(Some(EngineVersion::V9_7));
	ds.refresh(&monitor, &RefreshTarget::DataSource)?;

	assert_eq!(ds.version(), EngineVersion::V9_7);
	let new = ds.require_schema(&monitor, "APP")?;
	assert!(!Arc::ptr_eq(&old, &new));
	assert_eq!(
		source.fetch_count(&Query::Schemas {
			name: None,
		}),
		2
	);
	// the type probe ran again, with the 9.7 query shape
	assert_eq!(
		source.fetch_count(&Query::DataTypes {
			schema: None,
			exclude_module_types: true,
		}),
		2
	);
	Ok(())
}

#[test]
fn test_datasource_refresh_drops_schemas_loaded_under_old_version() -> Result<()> {
	let source = MemorySource::with_app_schema().with(
		Query::Schemas {
			name: None,
		},
		vec![schema_row("APP").with("DATACAPTURE", "Y")],
	);
	source.set_version(Some(EngineVersion::V9_7));
	let (source, ds) = fixture(source);
	let monitor = Monitor::new();
	let pause = source.pause_version();
	source.set_version(Some(EngineVersion::V10_5));

	let during = thread::scope(|scope| {
		let refresh = scope.spawn(|| ds.refresh(&Monitor::new(), &RefreshTarget::DataSource));
		pause.started.recv().unwrap();
		// loaded while the bootstrap is still reading the new version
		let during = ds.require_schema(&monitor, "APP");
		pause.release.send(()).unwrap();
		refresh.join().unwrap()?;
		during
	})?;
	assert_eq!(during.info().data_capture, None);

	assert_eq!(ds.version(), EngineVersion::V10_5);
	let after = ds.require_schema(&monitor, "APP")?;
	assert!(!Arc::ptr_eq(&during, &after));
	assert_eq!(after.info().data_capture, Some(true));
	Ok(())
}

#[test]
fn test_failed_datasource_refresh_keeps_caches() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let before = ds.require_schema(&monitor, "APP")?;

	let cancelled = Monitor::new();
	cancelled.cancel();
	assert!(ds.refresh(&cancelled, &RefreshTarget::DataSource).is_err());
	assert!(Arc::ptr_eq(&before, &ds.require_schema(&monitor, "APP")?));
	assert_eq!(
		source.fetch_count(&Query::Schemas {
			name: None,
		}),
		1
	);
	Ok(())
}
