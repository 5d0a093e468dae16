// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use dbnav_core::{Identity, Monitor};
use tracing::{debug, instrument};

use crate::{DataSource, Result};

/// What a refresh invalidates. Each target drops its own caches and marks its entry stale
/// in the owning cache, so only that entry is re-fetched on next access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshTarget {
	DataSource,
	Schema(String),
	Table {
		schema: String,
		table: String,
	},
}

impl Display for RefreshTarget {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			RefreshTarget::DataSource => f.write_str("datasource"),
			RefreshTarget::Schema(schema) => write!(f, "schema {schema}"),
			RefreshTarget::Table {
				schema,
				table,
			} => write!(f, "table {schema}.{table}"),
		}
	}
}

impl DataSource {
	/// Invalidates `target` and everything below it. Only caches that are already loaded are
	/// touched; nothing is populated, except that a datasource refresh re-runs the bootstrap.
	#[instrument(name = "catalog::refresh", level = "debug", skip_all, fields(target = %target))]
	pub fn refresh(&self, monitor: &Monitor, target: &RefreshTarget) -> Result<()> {
		match target {
			RefreshTarget::Table {
				schema,
				table,
			} => {
				let Some(schema) = self.cached_schema(schema) else {
					debug!("schema not cached, nothing to refresh");
					return Ok(());
				};
				if let Some(cached) = schema.cached_table(table) {
					cached.clear();
				}
				schema.clear_table_children(table);
				schema.refresh_table_entry(table);
				// the refreshed table lost its size, the next collection has to run
				schema.statistics.reset();
				Ok(())
			}
			RefreshTarget::Schema(name) => {
				if let Some(schema) = self.cached_schema(name) {
					schema.clear();
				}
				self.schemas.refresh_entry(&Identity::new(name.as_str()));
				Ok(())
			}
			RefreshTarget::DataSource => self.reconnect(monitor),
		}
	}
}
