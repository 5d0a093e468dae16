// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Population of shared caches under concurrent access, failure and cancellation.

use std::{sync::Arc, thread, time::Duration};

use dbnav_catalog::{
	Error, Monitor, Population, Query, RefreshTarget, Result,
	test_utils::{MemorySource, fixture},
};

fn app_tables() -> Query {
	Query::Tables {
		schema: "APP".to_string(),
		name: None,
	}
}

#[test]
fn test_concurrent_callers_share_one_fetch() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	let pause = source.pause(app_tables());

	let results = thread::scope(|scope| {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let schema = &schema;
				scope.spawn(move || schema.all_tables(&Monitor::new()))
			})
			.collect();

		pause.started.recv().unwrap();
		// let the other callers reach the wait
		thread::sleep(Duration::from_millis(50));
		pause.release.send(()).unwrap();

		handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
	});

	assert_eq!(source.fetch_count(&app_tables()), 1);
	let first = results[0].as_ref().unwrap();
	assert_eq!(first.len(), 3);
	for result in &results {
		let tables = result.as_ref().unwrap();
		for (a, b) in first.iter().zip(tables) {
			assert!(Arc::ptr_eq(a, b));
		}
	}
	Ok(())
}

#[test]
fn test_populated_cache_returns_same_instances() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;

	let first = schema.all_tables(&monitor)?;
	let second = schema.all_tables(&monitor)?;
	assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));

	// populated and absent answers without another fetch
	assert!(schema.table(&monitor, "NO_SUCH_TABLE")?.is_none());
	assert_eq!(source.fetch_count(&app_tables()), 1);
	Ok(())
}

#[test]
fn test_failed_fetch_is_retried() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	source.fail_next(app_tables(), 1);

	let err = schema.all_tables(&monitor).unwrap_err();
	assert!(err.is_transient());
	assert!(schema.views(&monitor).is_ok());
	assert_eq!(schema.views(&monitor)?.len(), 1);
	assert_eq!(source.fetch_count(&app_tables()), 2);
	Ok(())
}

#[test]
fn test_cancelled_population_leaves_cache_unpopulated() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let schema = ds.require_schema(&Monitor::new(), "APP")?;

	let monitor = Monitor::new();
	monitor.cancel();
	assert_eq!(schema.all_tables(&monitor).unwrap_err(), Error::Cancelled);
	assert_eq!(source.fetch_count(&app_tables()), 0);

	assert_eq!(schema.all_tables(&Monitor::new())?.len(), 3);
	Ok(())
}

#[test]
fn test_clear_during_population_discards_result() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	let pause = source.pause(app_tables());

	let tables = thread::scope(|scope| {
		let handle = scope.spawn(|| schema.all_tables(&Monitor::new()));
		pause.started.recv().unwrap();
		ds.refresh(&monitor, &RefreshTarget::Schema("APP".to_string())).unwrap();
		pause.release.send(()).unwrap();
		handle.join().unwrap()
	})?;

	// the caller still gets what it fetched, but nothing was installed
	assert_eq!(tables.len(), 3);
	let table = schema.table(&monitor, "ORDERS")?.unwrap();
	assert!(!Arc::ptr_eq(&table, &tables[1]));
	assert_eq!(source.fetch_count(&app_tables()), 2);
	Ok(())
}

#[test]
fn test_columns_populate_once_per_table() -> Result<()> {
	let (source, ds) = fixture(MemorySource::with_app_schema());
	let monitor = Monitor::new();
	let table = ds.require_table(&monitor, "APP", "ORDERS")?;
	assert_eq!(table.column_population(), Population::Unpopulated);

	let columns = table.columns(&monitor)?;
	assert_eq!(columns.iter().map(|c| c.base.name.as_str()).collect::<Vec<_>>(), ["ID", "CUSTOMER_ID", "TOTAL"]);
	assert!(table.column(&monitor, "TOTAL")?.is_some());
	assert_eq!(table.column_population(), Population::Populated);

	let query = Query::Columns {
		schema: "APP".to_string(),
		table: Some("ORDERS".to_string()),
	};
	assert_eq!(source.fetch_count(&query), 1);
	Ok(())
}
