// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, IdentityKey, Monitor, NameCase, Record};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::{DataSource, ObjectStatistics, Query, Result, Schema};

/// Size queries need the admin table functions introduced in 9.7.
const STATISTICS_SINCE: EngineVersion = EngineVersion::V9_7;

/// Collected flag of one container. Collections are serialized by the flag's mutex.
#[derive(Debug, Default)]
pub(crate) struct StatisticsState {
	collected: Mutex<bool>,
}

impl StatisticsState {
	/// Runs `collect` unless a collection already happened and `force` is not set. Returns
	/// whether it ran. A failure leaves the state uncollected.
	pub(crate) fn run(&self, force: bool, collect: impl FnOnce() -> Result<()>) -> Result<bool> {
		let mut collected = self.collected.lock();
		if *collected && !force {
			return Ok(false);
		}
		*collected = false;
		collect()?;
		*collected = true;
		Ok(true)
	}

	pub(crate) fn reset(&self) {
		*self.collected.lock() = false;
	}

	pub(crate) fn is_collected(&self) -> bool {
		*self.collected.lock()
	}
}

fn sizes_by_name(
	records: &[Record],
	name_field: &str,
	case: NameCase,
	total_only: bool,
) -> HashMap<IdentityKey, ObjectStatistics> {
	records
		.iter()
		.map(|r| (IdentityKey::new(&r.trimmed(name_field), None, case), ObjectStatistics::from_record(r, total_only)))
		.collect()
}

impl Schema {
	/// Annotates the cached tables of this schema with their sizes. Tables not cached yet are
	/// left alone.
	#[instrument(name = "catalog::statistics::tables", level = "debug", skip_all, fields(schema = %self.name(), force = force))]
	pub fn collect_statistics(&self, monitor: &Monitor, total_only: bool, force: bool) -> Result<bool> {
		self.statistics.run(force, || {
			let ctx = self.context();
			let tables = self.cached_tables();
			if !ctx.gate().supports(STATISTICS_SINCE) {
				debug!(version = %ctx.gate().version(), "table sizes not available, annotating zero");
				for table in &tables {
					table.set_statistics(ObjectStatistics::zero(total_only));
				}
				return Ok(());
			}

			let records = ctx.fetch(
				monitor,
				&Query::TableSizes {
					schema: self.name().to_string(),
					total_only,
				},
			)?;
			let case = ctx.case();
			let mut sizes = sizes_by_name(&records, "TABNAME", case, total_only);
			for table in &tables {
				let size = sizes
					.remove(&IdentityKey::new(table.name(), None, case))
					.unwrap_or_else(|| ObjectStatistics::zero(total_only));
				table.set_statistics(size);
			}
			Ok(())
		})
	}
}

impl DataSource {
	/// Annotates the cached schemas with their total sizes.
	#[instrument(name = "catalog::statistics::schemas", level = "debug", skip_all, fields(force = force))]
	pub fn collect_statistics(&self, monitor: &Monitor, total_only: bool, force: bool) -> Result<bool> {
		self.statistics.run(force, || {
			let ctx = self.context();
			let schemas = self.cached_schemas();
			if !ctx.gate().supports(STATISTICS_SINCE) {
				debug!(version = %ctx.gate().version(), "schema sizes not available, annotating zero");
				for schema in &schemas {
					schema.set_size(ObjectStatistics::zero(total_only));
				}
				return Ok(());
			}

			let records = ctx.fetch(
				monitor,
				&Query::SchemaSizes {
					total_only,
				},
			)?;
			let case = ctx.case();
			let mut sizes = sizes_by_name(&records, "SCHEMANAME", case, total_only);
			for schema in &schemas {
				let size = sizes
					.remove(&IdentityKey::new(schema.name(), None, case))
					.unwrap_or_else(|| ObjectStatistics::zero(total_only));
				schema.set_size(size);
			}
			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	use dbnav_core::Error;

	use super::*;

	#[test]
	fn test_run_once_unless_forced() {
		let state = StatisticsState::default();
		let mut runs = 0;
		assert!(state.run(false, || {
			runs += 1;
			Ok(())
		})
		.unwrap());
		assert!(!state.run(false, || {
			runs += 1;
			Ok(())
		})
		.unwrap());
		assert!(state.run(true, || {
			runs += 1;
			Ok(())
		})
		.unwrap());
		assert_eq!(runs, 2);
	}

	#[test]
	fn test_failure_leaves_uncollected() {
		let state = StatisticsState::default();
		let err = state.run(false, || Err(Error::fetch("table sizes", "timeout"))).unwrap_err();
		assert!(err.is_transient());
		assert!(!state.is_collected());
		assert!(state.run(false, || Ok(())).unwrap());
		assert!(state.is_collected());
	}

	#[test]
	fn test_reset() {
		let state = StatisticsState::default();
		state.run(false, || Ok(())).unwrap();
		state.reset();
		assert!(!state.is_collected());
	}
}
