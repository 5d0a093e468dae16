// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Size annotation of cached tables and schemas.

use dbnav_catalog::{
	EngineVersion, Monitor, ObjectStatistics, Population, Query, Result,
	test_utils::{MemorySource, fixture, size_row},
};

fn table_sizes(total_only: bool) -> Query {
	Query::TableSizes {
		schema: "APP".to_string(),
		total_only,
	}
}

fn scripted() -> MemorySource {
	MemorySource::with_app_schema()
		.with(table_sizes(false), vec![size_row("TABNAME", "ORDERS", 8192), size_row("TABNAME", "UNKNOWN", 1)])
		.with(
			Query::SchemaSizes {
				total_only: true,
			},
			vec![size_row("SCHEMANAME", "APP", 65536)],
		)
}

#[test]
fn test_collects_once_unless_forced() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	let tables = schema.all_tables(&monitor)?;

	assert!(schema.collect_statistics(&monitor, false, false)?);
	assert!(!schema.collect_statistics(&monitor, false, false)?);
	assert_eq!(source.fetch_count(&table_sizes(false)), 1);

	let orders = &tables[1];
	assert_eq!(orders.statistics().unwrap().total_size, 8192);
	assert_eq!(orders.statistics().unwrap().index_size, Some(0));
	// cached tables missing from the result are annotated with zero
	assert_eq!(tables[0].statistics(), Some(ObjectStatistics::zero(false)));

	assert!(schema.collect_statistics(&monitor, false, true)?);
	assert_eq!(source.fetch_count(&table_sizes(false)), 2);
	Ok(())
}

#[test]
fn test_never_populates_tables() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;

	assert!(schema.collect_statistics(&monitor, false, false)?);
	assert_eq!(
		source.fetch_count(&Query::Tables {
			schema: "APP".to_string(),
			name: None,
		}),
		0
	);

	// tables loaded afterwards carry no annotation until the next forced run
	let tables = schema.all_tables(&monitor)?;
	assert!(tables.iter().all(|t| t.statistics().is_none()));
	assert!(schema.collect_statistics(&monitor, false, true)?);
	assert!(tables.iter().all(|t| t.statistics().is_some()));
	Ok(())
}

#[test]
fn test_failure_allows_retry() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	schema.all_tables(&monitor)?;
	source.fail_next(table_sizes(false), 1);

	assert!(schema.collect_statistics(&monitor, false, false).is_err());
	assert!(!schema.statistics_collected());
	assert!(schema.collect_statistics(&monitor, false, false)?);
	assert!(schema.statistics_collected());
	Ok(())
}

#[test]
fn test_old_engine_annotates_zero_without_query() -> Result<()> {
	let source = scripted();
	source.set_version(Some(EngineVersion::V9_5));
	let (source, ds) = fixture(source);
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	let tables = schema.all_tables(&monitor)?;

	assert!(schema.collect_statistics(&monitor, true, false)?);
	assert_eq!(source.fetch_count(&table_sizes(true)), 0);
	assert!(tables.iter().all(|t| t.statistics() == Some(ObjectStatistics::zero(true))));
	Ok(())
}

#[test]
fn test_schema_sizes() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let app = ds.require_schema(&monitor, "APP")?;
	let sales = ds.require_schema(&monitor, "SALES")?;

	assert!(ds.collect_statistics(&monitor, true, false)?);
	assert_eq!(app.size().unwrap().total_size, 65536);
	assert_eq!(app.size().unwrap().data_size, None);
	assert_eq!(sales.size().unwrap().total_size, 0);
	assert!(!ds.collect_statistics(&monitor, true, false)?);
	assert_eq!(
		source.fetch_count(&Query::SchemaSizes {
			total_only: true,
		}),
		1
	);
	// annotation never loads children
	assert_eq!(app.all_tables(&monitor)?.len(), 3);
	assert_eq!(app.all_tables(&monitor)?[0].column_population(), Population::Unpopulated);
	Ok(())
}

#[test]
fn test_schema_refresh_resets_statistics() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	schema.all_tables(&monitor)?;
	schema.collect_statistics(&monitor, false, false)?;

	ds.refresh(&monitor, &dbnav_catalog::RefreshTarget::Schema("APP".to_string()))?;
	assert!(!schema.statistics_collected());

	let schema = ds.require_schema(&monitor, "APP")?;
	schema.all_tables(&monitor)?;
	assert!(schema.collect_statistics(&monitor, false, false)?);
	assert_eq!(source.fetch_count(&table_sizes(false)), 2);
	Ok(())
}

#[test]
fn test_table_refresh_requires_new_collection() -> Result<()> {
	let (source, ds) = fixture(scripted());
	let monitor = Monitor::new();
	let schema = ds.require_schema(&monitor, "APP")?;
	schema.all_tables(&monitor)?;
	assert!(schema.collect_statistics(&monitor, false, false)?);

	ds.refresh(
		&monitor,
		&dbnav_catalog::RefreshTarget::Table {
			schema: "APP".to_string(),
			table: "ORDERS".to_string(),
		},
	)?;
	assert!(!schema.statistics_collected());

	let tables = schema.all_tables(&monitor)?;
	assert!(tables[1].statistics().is_none());
	assert!(schema.collect_statistics(&monitor, false, false)?);
	assert_eq!(source.fetch_count(&table_sizes(false)), 2);
	assert!(tables.iter().all(|t| t.statistics().is_some()));
	assert_eq!(tables[1].statistics().unwrap().total_size, 8192);
	Ok(())
}
