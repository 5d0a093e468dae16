// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::{ChildLoader, Entity, Loader};
use dbnav_core::{EngineVersion, Identity, IdentityKey, Monitor, ObjectFilter, Record};
use tracing::{debug, trace, warn};

use crate::{Context, Query, Result};

/// Builds entities from the rows of one catalog query.
///
/// A row the builder rejects is logged and skipped; the rest of the result still populates.
pub(crate) struct RecordLoader<'a, E, B> {
	ctx: &'a Context,
	query: Query,
	since: Option<EngineVersion>,
	filter: Option<&'a ObjectFilter>,
	build: B,
	_entity: std::marker::PhantomData<fn() -> E>,
}

impl<'a, E, B> RecordLoader<'a, E, B>
where
	E: Entity,
	B: Fn(&Record) -> Option<E>,
{
	pub(crate) fn new(ctx: &'a Context, query: Query, build: B) -> Self {
		Self {
			ctx,
			query,
			since: None,
			filter: None,
			build,
			_entity: std::marker::PhantomData,
		}
	}

	/// Engines older than `version` cannot answer the query; the cache stays empty.
	pub(crate) fn since(mut self, version: EngineVersion) -> Self {
		self.since = Some(version);
		self
	}

	pub(crate) fn filtered(mut self, filter: &'a ObjectFilter) -> Self {
		if !filter.is_empty() {
			self.filter = Some(filter);
		}
		self
	}

	fn supported(&self) -> bool {
		match self.since {
			Some(version) if !self.ctx.gate().supports(version) => {
				debug!(query = %self.query, since = %version, "query not supported by engine version");
				false
			}
			_ => true,
		}
	}

	fn build_all(&self, monitor: &Monitor, records: &[Record]) -> Result<Vec<E>> {
		let mut result = Vec::with_capacity(records.len());
		for record in records {
			monitor.check()?;
			match (self.build)(record) {
				Some(entity) => {
					if let Some(filter) = self.filter {
						if !filter.matches(entity.name()) {
							trace!(name = entity.name(), "filtered out");
							continue;
						}
					}
					result.push(entity);
				}
				None => warn!(query = %self.query, "skipping malformed catalog row"),
			}
		}
		Ok(result)
	}
}

impl<E, B> Loader<E> for RecordLoader<'_, E, B>
where
	E: Entity,
	B: Fn(&Record) -> Option<E>,
{
	fn load_all(&self, monitor: &Monitor) -> Result<Vec<E>> {
		if !self.supported() {
			return Ok(Vec::new());
		}
		let records = self.ctx.fetch(monitor, &self.query)?;
		self.build_all(monitor, &records)
	}

	fn load_one(&self, monitor: &Monitor, identity: &Identity) -> Result<Option<E>> {
		if !self.supported() {
			return Ok(None);
		}
		let case = self.ctx.case();
		let wanted = identity.key(case);
		let records = match self.query.narrowed(&identity.name) {
			Some(query) => self.ctx.fetch(monitor, &query)?,
			None => self.ctx.fetch(monitor, &self.query)?,
		};
		Ok(self
			.build_all(monitor, &records)?
			.into_iter()
			.find(|e| IdentityKey::new(e.name(), identity.kind.and(e.kind()), case) == wanted))
	}
}

/// Loads children addressed per parent, for composite caches.
pub(crate) struct ChildRecordLoader<'a, E, P, Q, B> {
	ctx: &'a Context,
	parents: P,
	query: Q,
	parent_field: &'static str,
	parent_filter: Option<&'a ObjectFilter>,
	build: B,
	_entity: std::marker::PhantomData<fn() -> E>,
}

impl<'a, E, P, Q, B> ChildRecordLoader<'a, E, P, Q, B>
where
	E: Entity,
	P: Fn(&Monitor) -> Result<Vec<String>>,
	Q: Fn(Option<&str>) -> Query,
	B: Fn(&Record) -> Option<E>,
{
	pub(crate) fn new(ctx: &'a Context, parents: P, query: Q, parent_field: &'static str, build: B) -> Self {
		Self {
			ctx,
			parents,
			query,
			parent_field,
			parent_filter: None,
			build,
			_entity: std::marker::PhantomData,
		}
	}

	/// Drops rows whose parent name the filter rejects.
	pub(crate) fn parents_filtered(mut self, filter: &'a ObjectFilter) -> Self {
		if !filter.is_empty() {
			self.parent_filter = Some(filter);
		}
		self
	}
}

impl<E, P, Q, B> ChildLoader<E> for ChildRecordLoader<'_, E, P, Q, B>
where
	E: Entity,
	P: Fn(&Monitor) -> Result<Vec<String>>,
	Q: Fn(Option<&str>) -> Query,
	B: Fn(&Record) -> Option<E>,
{
	fn parents(&self, monitor: &Monitor) -> Result<Vec<String>> {
		(self.parents)(monitor)
	}

	fn load(&self, monitor: &Monitor, parent: Option<&str>) -> Result<Vec<(String, E)>> {
		let query = (self.query)(parent);
		let records = self.ctx.fetch(monitor, &query)?;
		let mut result = Vec::with_capacity(records.len());
		for record in &records {
			monitor.check()?;
			let parent = record.trimmed(self.parent_field);
			if let Some(filter) = self.parent_filter {
				if !filter.matches(&parent) {
					trace!(parent = %parent, "parent filtered out");
					continue;
				}
			}
			let Some(entity) = (self.build)(record) else {
				warn!(query = %query, "skipping malformed catalog row");
				continue;
			};
			result.push((parent, entity));
		}
		Ok(result)
	}
}
