// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{marker::PhantomData, sync::Arc};

use dbnav_core::{Error, Identity, IdentityKey, Monitor, NameCase, Result};
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use crate::{
	Entity, Population, entity_key,
	flight::{Flight, Slot},
};

/// Fetches the members of one cache from the backing store.
pub trait Loader<E: Entity> {
	fn load_all(&self, monitor: &Monitor) -> Result<Vec<E>>;

	/// Re-fetches a single member. `Ok(None)` means the object no longer exists.
	fn load_one(&self, monitor: &Monitor, identity: &Identity) -> Result<Option<E>> {
		Ok(self.load_all(monitor)?
			.into_iter()
			.find(|e| e.name() == identity.name && (identity.kind.is_none() || e.kind() == identity.kind)))
	}
}

pub struct FnLoader<E, F> {
	f: F,
	_entity: PhantomData<fn() -> E>,
}

/// Wraps a closure as a [`Loader`] whose single-entry reload falls back to a full fetch.
pub fn from_fn<E, F>(f: F) -> FnLoader<E, F>
where
	E: Entity,
	F: Fn(&Monitor) -> Result<Vec<E>>,
{
	FnLoader {
		f,
		_entity: PhantomData,
	}
}

impl<E, F> Loader<E> for FnLoader<E, F>
where
	E: Entity,
	F: Fn(&Monitor) -> Result<Vec<E>>,
{
	fn load_all(&self, monitor: &Monitor) -> Result<Vec<E>> {
		(self.f)(monitor)
	}
}

struct State<E> {
	entries: IndexMap<IdentityKey, Arc<E>>,
	populated: bool,
	stale: IndexMap<IdentityKey, Identity>,
	flight: Flight,
}

/// Lazily populated, ordered set of entities owned by one container.
pub struct ObjectCache<E> {
	name: String,
	case: NameCase,
	state: Mutex<State<E>>,
	ready: Condvar,
}

impl<E: Entity> ObjectCache<E> {
	pub fn new(name: impl Into<String>, case: NameCase) -> Self {
		Self {
			name: name.into(),
			case,
			state: Mutex::new(State {
				entries: IndexMap::new(),
				populated: false,
				stale: IndexMap::new(),
				flight: Flight::default(),
			}),
			ready: Condvar::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn case(&self) -> NameCase {
		self.case
	}

	#[instrument(name = "cache::object::get_all", level = "trace", skip_all, fields(cache = %self.name))]
	pub fn get_all(&self, monitor: &Monitor, loader: &dyn Loader<E>) -> Result<Vec<Arc<E>>> {
		let mut state = self.state.lock();
		if let Some(discarded) = self.ensure(&mut state, monitor, loader, None)? {
			return Ok(discarded);
		}
		Ok(state.entries.values().cloned().collect())
	}

	#[instrument(name = "cache::object::get", level = "trace", skip_all, fields(cache = %self.name, name = %identity.name))]
	pub fn get(&self, monitor: &Monitor, identity: &Identity, loader: &dyn Loader<E>) -> Result<Option<Arc<E>>> {
		let key = identity.key(self.case);
		let mut state = self.state.lock();
		if let Some(discarded) = self.ensure(&mut state, monitor, loader, Some(&key))? {
			return Ok(discarded.into_iter().find(|e| entity_key(e.as_ref(), self.case) == key));
		}
		Ok(state.entries.get(&key).cloned())
	}

	pub fn cached(&self, identity: &Identity) -> Option<Arc<E>> {
		self.state.lock().entries.get(&identity.key(self.case)).cloned()
	}

	/// Entries currently held, without loading. Empty when unpopulated.
	pub fn cached_all(&self) -> Vec<Arc<E>> {
		self.state.lock().entries.values().cloned().collect()
	}

	pub fn population(&self) -> Population {
		let state = self.state.lock();
		if !state.populated {
			Population::Unpopulated
		} else if state.stale.is_empty() {
			Population::Populated
		} else {
			Population::Stale
		}
	}

	pub fn is_populated(&self) -> bool {
		self.state.lock().populated
	}

	pub fn clear(&self) {
		let mut state = self.state.lock();
		state.entries.clear();
		state.stale.clear();
		state.populated = false;
		state.flight.invalidate();
		self.ready.notify_all();
		debug!(cache = %self.name, "cache cleared");
	}

	/// Drops one entry without scheduling a re-fetch.
	pub fn invalidate(&self, identity: &Identity) -> Option<Arc<E>> {
		let key = identity.key(self.case);
		let mut state = self.state.lock();
		state.stale.shift_remove(&key);
		state.entries.shift_remove(&key)
	}

	/// Schedules one cached entry for an individual re-fetch on next access. Returns false when
	/// the entry is not cached, in which case there is nothing to refresh.
	pub fn refresh_entry(&self, identity: &Identity) -> bool {
		let key = identity.key(self.case);
		let mut state = self.state.lock();
		if !state.populated || !state.entries.contains_key(&key) {
			return false;
		}
		state.stale.insert(key, identity.clone());
		true
	}

	/// Installs a result directly, replacing whatever was cached.
	pub fn set_all(&self, entities: Vec<E>) {
		let mut state = self.state.lock();
		state.flight.invalidate();
		self.install(&mut state, entities);
		self.ready.notify_all();
	}

	fn install(&self, state: &mut State<E>, entities: Vec<E>) {
		state.entries = self.collect(entities);
		state.stale.clear();
		state.populated = true;
	}

	fn collect(&self, entities: Vec<E>) -> IndexMap<IdentityKey, Arc<E>> {
		let mut entries = IndexMap::with_capacity(entities.len());
		for entity in entities {
			let key = entity_key(&entity, self.case);
			if entries.contains_key(&key) {
				warn!(cache = %self.name, key = %key, "duplicate identity in fetch result, keeping the first");
				continue;
			}
			entries.insert(key, Arc::new(entity));
		}
		entries
	}

	/// Brings the cache to a state where `key` (or every entry, when `None`) can be served.
	///
	/// Returns `Some` with the freshly fetched entities when the population was invalidated
	/// while it ran; the caller gets that result but the cache stays untouched.
	fn ensure(
		&self,
		state: &mut MutexGuard<'_, State<E>>,
		monitor: &Monitor,
		loader: &dyn Loader<E>,
		key: Option<&IdentityKey>,
	) -> Result<Option<Vec<Arc<E>>>> {
		loop {
			let needs_reload = match key {
				Some(key) => state.stale.contains_key(key),
				None => !state.stale.is_empty(),
			};
			if state.populated && !needs_reload {
				return Ok(None);
			}

			match state.flight.slot() {
				Slot::Free => {}
				Slot::Busy => {
					self.ready.wait(state);
					continue;
				}
				Slot::Reentrant => {
					return Err(Error::PopulationCycle {
						cache: self.name.clone(),
					});
				}
			}

			let ticket = state.flight.start();

			if state.populated {
				let stale: Vec<(IdentityKey, Identity)> =
					state.stale.iter().map(|(k, i)| (k.clone(), i.clone())).collect();
				let result = MutexGuard::unlocked(state, || reload(monitor, loader, &stale));
				let current = state.flight.finish(ticket);
				self.ready.notify_all();

				let reloaded = result?;
				if !current {
					debug!(cache = %self.name, "cache invalidated during entry reload, result discarded");
					continue;
				}
				for (key, entity) in reloaded {
					state.stale.shift_remove(&key);
					match entity {
						Some(entity) => {
							// an existing key keeps its position
							state.entries.insert(key, Arc::new(entity));
						}
						None => {
							debug!(cache = %self.name, key = %key, "object vanished on reload");
							state.entries.shift_remove(&key);
						}
					}
				}
				continue;
			}

			let result = MutexGuard::unlocked(state, || {
				monitor.check()?;
				loader.load_all(monitor)
			});
			let current = state.flight.finish(ticket);
			self.ready.notify_all();

			let loaded = result?;
			if current {
				self.install(state, loaded);
				return Ok(None);
			}

			debug!(cache = %self.name, "cache cleared during population, result discarded");
			return Ok(Some(self.collect(loaded).into_values().collect()));
		}
	}
}

fn reload<E: Entity>(
	monitor: &Monitor,
	loader: &dyn Loader<E>,
	stale: &[(IdentityKey, Identity)],
) -> Result<Vec<(IdentityKey, Option<E>)>> {
	let mut result = Vec::with_capacity(stale.len());
	for (key, identity) in stale {
		monitor.check()?;
		result.push((key.clone(), loader.load_one(monitor, identity)?));
	}
	Ok(result)
}
