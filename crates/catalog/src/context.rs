// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dbnav_core::{EngineVersion, Monitor, NameCase, Record};
use tracing::trace;

use crate::{CatalogConfig, CatalogSource, Query, Result, VersionGate};

/// Connection-scoped state shared by every container: the source, the version gate and the
/// configuration. Rebuilt when the data source is refreshed.
pub struct Context {
	source: Arc<dyn CatalogSource>,
	gate: VersionGate,
	config: Arc<CatalogConfig>,
}

impl Context {
	pub fn new(source: Arc<dyn CatalogSource>, version: EngineVersion, config: Arc<CatalogConfig>) -> Self {
		Self {
			source,
			gate: VersionGate::new(version),
			config,
		}
	}

	pub fn gate(&self) -> &VersionGate {
		&self.gate
	}

	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	pub fn case(&self) -> NameCase {
		self.config.name_case
	}

	pub fn fetch(&self, monitor: &Monitor, query: &Query) -> Result<Vec<Record>> {
		monitor.check()?;
		trace!(query = %query, "catalog fetch");
		self.source.fetch(monitor, query)
	}
}
