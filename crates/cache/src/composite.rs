// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use dbnav_core::{Error, Identity, IdentityKey, Monitor, NameCase, Result};
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use crate::{
	Entity, Population, entity_key,
	flight::{Flight, Slot},
};

/// Fetches children that are owned by a container but addressed per parent, e.g. the
/// indexes of a schema addressed per table.
pub trait ChildLoader<E: Entity> {
	/// Names of every parent that may own children. Parents missing from this list are
	/// treated as unknown and their rows are dropped.
	fn parents(&self, monitor: &Monitor) -> Result<Vec<String>>;

	/// Loads `(parent name, child)` pairs for the whole owner, or for one parent only.
	fn load(&self, monitor: &Monitor, parent: Option<&str>) -> Result<Vec<(String, E)>>;
}

struct Group<E> {
	parent: String,
	entries: IndexMap<IdentityKey, Arc<E>>,
}

impl<E> Group<E> {
	fn new(parent: String) -> Self {
		Self {
			parent,
			entries: IndexMap::new(),
		}
	}
}

struct State<E> {
	owner_loaded: bool,
	groups: IndexMap<IdentityKey, Group<E>>,
	/// Parents cleared individually after the owner-level load; each needs a parent-scoped fetch.
	pending: IndexMap<IdentityKey, String>,
	flight: Flight,
}

#[derive(Clone, Copy)]
enum Scope<'a> {
	Owner,
	Parent(&'a IdentityKey),
	Everything,
}

enum Fetched<E> {
	Owner {
		parents: Vec<String>,
		rows: Vec<(String, E)>,
	},
	Parent {
		key: IdentityKey,
		parent: String,
		rows: Vec<(String, E)>,
	},
}

/// Two-level cache keyed by (parent, child).
pub struct CompositeCache<E> {
	name: String,
	case: NameCase,
	state: Mutex<State<E>>,
	ready: Condvar,
}

impl<E: Entity> CompositeCache<E> {
	pub fn new(name: impl Into<String>, case: NameCase) -> Self {
		Self {
			name: name.into(),
			case,
			state: Mutex::new(State {
				owner_loaded: false,
				groups: IndexMap::new(),
				pending: IndexMap::new(),
				flight: Flight::default(),
			}),
			ready: Condvar::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	fn parent_key(&self, parent: &str) -> IdentityKey {
		IdentityKey::new(parent, None, self.case)
	}

	/// Runs the owner-level bulk fetch if it never happened.
	#[instrument(name = "cache::composite::load_children", level = "trace", skip_all, fields(cache = %self.name))]
	pub fn load_children(&self, monitor: &Monitor, loader: &dyn ChildLoader<E>) -> Result<()> {
		let mut state = self.state.lock();
		self.ensure(&mut state, monitor, loader, Scope::Owner)
	}

	#[instrument(name = "cache::composite::children", level = "trace", skip_all, fields(cache = %self.name, parent = %parent))]
	pub fn children(&self, monitor: &Monitor, parent: &str, loader: &dyn ChildLoader<E>) -> Result<Vec<Arc<E>>> {
		let key = self.parent_key(parent);
		let mut state = self.state.lock();
		self.ensure(&mut state, monitor, loader, Scope::Parent(&key))?;
		Ok(state.groups.get(&key).map(|g| g.entries.values().cloned().collect()).unwrap_or_default())
	}

	/// Every child of every parent, grouped by parent in parent order.
	pub fn all(&self, monitor: &Monitor, loader: &dyn ChildLoader<E>) -> Result<Vec<Arc<E>>> {
		let mut state = self.state.lock();
		self.ensure(&mut state, monitor, loader, Scope::Everything)?;
		Ok(state.groups.values().flat_map(|g| g.entries.values().cloned()).collect())
	}

	pub fn get(
		&self,
		monitor: &Monitor,
		parent: &str,
		identity: &Identity,
		loader: &dyn ChildLoader<E>,
	) -> Result<Option<Arc<E>>> {
		let key = self.parent_key(parent);
		let child = identity.key(self.case);
		let mut state = self.state.lock();
		self.ensure(&mut state, monitor, loader, Scope::Parent(&key))?;
		Ok(state.groups.get(&key).and_then(|g| g.entries.get(&child).cloned()))
	}

	/// Looks a child up by identity across all parents; returns the parent name with it.
	pub fn find(
		&self,
		monitor: &Monitor,
		identity: &Identity,
		loader: &dyn ChildLoader<E>,
	) -> Result<Option<(String, Arc<E>)>> {
		let child = identity.key(self.case);
		let mut state = self.state.lock();
		self.ensure(&mut state, monitor, loader, Scope::Everything)?;
		Ok(state
			.groups
			.values()
			.find_map(|g| g.entries.get(&child).map(|e| (g.parent.clone(), e.clone()))))
	}

	/// Children of `parent` if they are loaded, without fetching.
	pub fn cached_children(&self, parent: &str) -> Option<Vec<Arc<E>>> {
		let key = self.parent_key(parent);
		let state = self.state.lock();
		if !state.owner_loaded || state.pending.contains_key(&key) {
			return None;
		}
		Some(state.groups.get(&key).map(|g| g.entries.values().cloned().collect()).unwrap_or_default())
	}

	pub fn population(&self) -> Population {
		let state = self.state.lock();
		if !state.owner_loaded {
			Population::Unpopulated
		} else if state.pending.is_empty() {
			Population::Populated
		} else {
			Population::Stale
		}
	}

	pub fn clear(&self) {
		let mut state = self.state.lock();
		state.owner_loaded = false;
		state.groups.clear();
		state.pending.clear();
		state.flight.invalidate();
		self.ready.notify_all();
		debug!(cache = %self.name, "composite cache cleared");
	}

	/// Drops one parent's children. When the owner-level load already happened, the parent
	/// is re-fetched on its own on next access; otherwise the next access loads everything.
	pub fn clear_parent(&self, parent: &str) {
		let key = self.parent_key(parent);
		let mut state = self.state.lock();
		state.groups.shift_remove(&key);
		if state.owner_loaded {
			state.pending.insert(key, parent.to_string());
		}
		state.flight.invalidate();
		self.ready.notify_all();
	}

	pub fn invalidate(&self, parent: &str, identity: &Identity) -> Option<Arc<E>> {
		let key = self.parent_key(parent);
		let child = identity.key(self.case);
		let mut state = self.state.lock();
		state.groups.get_mut(&key).and_then(|g| g.entries.shift_remove(&child))
	}

	fn ensure(
		&self,
		state: &mut MutexGuard<'_, State<E>>,
		monitor: &Monitor,
		loader: &dyn ChildLoader<E>,
		scope: Scope<'_>,
	) -> Result<()> {
		loop {
			let target = if !state.owner_loaded {
				None
			} else {
				let next = match scope {
					Scope::Owner => None,
					Scope::Parent(key) => state.pending.get_key_value(key),
					Scope::Everything => state.pending.first(),
				};
				match next {
					None => return Ok(()),
					Some((key, parent)) => Some((key.clone(), parent.clone())),
				}
			};

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
			let result = MutexGuard::unlocked(state, || -> Result<Fetched<E>> {
				monitor.check()?;
				match target {
					None => {
						let parents = loader.parents(monitor)?;
						let rows = loader.load(monitor, None)?;
						Ok(Fetched::Owner {
							parents,
							rows,
						})
					}
					Some((key, parent)) => {
						let rows = loader.load(monitor, Some(&parent))?;
						Ok(Fetched::Parent {
							key,
							parent,
							rows,
						})
					}
				}
			});
			let current = state.flight.finish(ticket);
			self.ready.notify_all();

			let fetched = result?;
			if !current {
				debug!(cache = %self.name, "composite cache invalidated during load, result discarded");
				continue;
			}

			match fetched {
				Fetched::Owner {
					parents,
					rows,
				} => {
					let mut groups: IndexMap<IdentityKey, Group<E>> = parents
						.into_iter()
						.map(|parent| (self.parent_key(&parent), Group::new(parent)))
						.collect();
					for (parent, child) in rows {
						match groups.get_mut(&self.parent_key(&parent)) {
							Some(group) => self.file(group, child),
							None => {
								warn!(cache = %self.name, parent = %parent, child = %child.name(), "child of unknown parent dropped");
							}
						}
					}
					state.groups = groups;
					state.pending.clear();
					state.owner_loaded = true;
				}
				Fetched::Parent {
					key,
					parent,
					rows,
				} => {
					let mut group = Group::new(parent);
					for (row_parent, child) in rows {
						if self.parent_key(&row_parent) != key {
							warn!(cache = %self.name, parent = %row_parent, child = %child.name(), "child outside the requested parent dropped");
							continue;
						}
						self.file(&mut group, child);
					}
					state.pending.shift_remove(&key);
					state.groups.insert(key, group);
				}
			}
		}
	}

	fn file(&self, group: &mut Group<E>, child: E) {
		let key = entity_key(&child, self.case);
		if group.entries.contains_key(&key) {
			warn!(cache = %self.name, parent = %group.parent, key = %key, "duplicate child identity, keeping the first");
			return;
		}
		group.entries.insert(key, Arc::new(child));
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	#[derive(Debug)]
	struct Idx {
		name: String,
	}

	impl Entity for Idx {
		fn name(&self) -> &str {
			&self.name
		}
	}

	struct Indexes {
		parents: Vec<&'static str>,
		rows: Vec<(&'static str, &'static str)>,
		owner_loads: AtomicUsize,
		parent_loads: AtomicUsize,
	}

	impl Indexes {
		fn new(parents: &[&'static str], rows: &[(&'static str, &'static str)]) -> Self {
			Self {
				parents: parents.to_vec(),
				rows: rows.to_vec(),
				owner_loads: AtomicUsize::new(0),
				parent_loads: AtomicUsize::new(0),
			}
		}
	}

	impl ChildLoader<Idx> for Indexes {
		fn parents(&self, _monitor: &Monitor) -> Result<Vec<String>> {
			Ok(self.parents.iter().map(|p| p.to_string()).collect())
		}

		fn load(&self, _monitor: &Monitor, parent: Option<&str>) -> Result<Vec<(String, Idx)>> {
			match parent {
				None => self.owner_loads.fetch_add(1, Ordering::SeqCst),
				Some(_) => self.parent_loads.fetch_add(1, Ordering::SeqCst),
			};
			Ok(self
				.rows
				.iter()
				.filter(|(p, _)| parent.is_none_or(|wanted| wanted == *p))
				.map(|(p, n)| {
					(p.to_string(), Idx {
						name: n.to_string(),
					})
				})
				.collect())
		}
	}

	fn names(items: &[Arc<Idx>]) -> Vec<&str> {
		items.iter().map(|i| i.name.as_str()).collect()
	}

	#[test]
	fn test_owner_load_files_children_per_parent() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1", "T2"], &[("T1", "I1"), ("T1", "I2"), ("T1", "I3")]);
		let monitor = Monitor::new();

		cache.load_children(&monitor, &loader).unwrap();
		assert_eq!(names(&cache.children(&monitor, "T1", &loader).unwrap()), vec!["I1", "I2", "I3"]);
		assert!(cache.children(&monitor, "T2", &loader).unwrap().is_empty());
		assert!(cache.children(&monitor, "T2", &loader).unwrap().is_empty());

		assert_eq!(loader.owner_loads.load(Ordering::SeqCst), 1);
		assert_eq!(loader.parent_loads.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_children_triggers_owner_load() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1"], &[("T1", "I1")]);
		let monitor = Monitor::new();

		assert_eq!(cache.population(), Population::Unpopulated);
		assert_eq!(cache.children(&monitor, "T1", &loader).unwrap().len(), 1);
		assert_eq!(cache.population(), Population::Populated);
		assert_eq!(loader.owner_loads.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_unknown_parent_is_dropped() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1"], &[("T1", "I1"), ("GHOST", "I9")]);
		let monitor = Monitor::new();

		let all = cache.all(&monitor, &loader).unwrap();
		assert_eq!(names(&all), vec!["I1"]);
		assert!(cache.find(&monitor, &Identity::new("I9"), &loader).unwrap().is_none());
	}

	#[test]
	fn test_find_across_parents() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1", "T2"], &[("T1", "I1"), ("T2", "I2")]);
		let monitor = Monitor::new();

		let (parent, found) = cache.find(&monitor, &Identity::new("I2"), &loader).unwrap().unwrap();
		assert_eq!(parent, "T2");
		assert_eq!(found.name, "I2");
		assert!(cache.get(&monitor, "T1", &Identity::new("I2"), &loader).unwrap().is_none());
	}

	#[test]
	fn test_clear_parent_refetches_only_that_parent() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1", "T2"], &[("T1", "I1"), ("T2", "I2")]);
		let monitor = Monitor::new();

		cache.load_children(&monitor, &loader).unwrap();
		let t2_before = cache.children(&monitor, "T2", &loader).unwrap();

		cache.clear_parent("T1");
		assert_eq!(cache.population(), Population::Stale);
		assert!(cache.cached_children("T1").is_none());

		let t2_after = cache.children(&monitor, "T2", &loader).unwrap();
		assert!(Arc::ptr_eq(&t2_before[0], &t2_after[0]));
		assert_eq!(loader.parent_loads.load(Ordering::SeqCst), 0);

		assert_eq!(names(&cache.children(&monitor, "T1", &loader).unwrap()), vec!["I1"]);
		assert_eq!(loader.owner_loads.load(Ordering::SeqCst), 1);
		assert_eq!(loader.parent_loads.load(Ordering::SeqCst), 1);
		assert_eq!(cache.population(), Population::Populated);
	}

	#[test]
	fn test_clear_parent_before_owner_load() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1"], &[("T1", "I1")]);
		cache.clear_parent("T1");
		assert_eq!(cache.population(), Population::Unpopulated);

		cache.children(&Monitor::new(), "T1", &loader).unwrap();
		assert_eq!(loader.owner_loads.load(Ordering::SeqCst), 1);
		assert_eq!(loader.parent_loads.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_clear_resets() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1"], &[("T1", "I1")]);
		let monitor = Monitor::new();

		cache.all(&monitor, &loader).unwrap();
		cache.clear();
		assert!(cache.cached_children("T1").is_none());
		cache.all(&monitor, &loader).unwrap();
		assert_eq!(loader.owner_loads.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn test_invalidate_single_child() {
		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Indexes::new(&["T1"], &[("T1", "I1"), ("T1", "I2")]);
		let monitor = Monitor::new();

		cache.load_children(&monitor, &loader).unwrap();
		assert!(cache.invalidate("T1", &Identity::new("I1")).is_some());
		assert_eq!(names(&cache.children(&monitor, "T1", &loader).unwrap()), vec!["I2"]);
	}

	#[test]
	fn test_failed_owner_load_retries() {
		struct Flaky {
			attempts: AtomicUsize,
		}

		impl ChildLoader<Idx> for Flaky {
			fn parents(&self, _monitor: &Monitor) -> Result<Vec<String>> {
				Ok(vec!["T1".to_string()])
			}

			fn load(&self, _monitor: &Monitor, _parent: Option<&str>) -> Result<Vec<(String, Idx)>> {
				if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
					return Err(Error::fetch("indexes", "timeout"));
				}
				Ok(vec![("T1".to_string(), Idx {
					name: "I1".to_string(),
				})])
			}
		}

		let cache = CompositeCache::new("indexes", NameCase::Exact);
		let loader = Flaky {
			attempts: AtomicUsize::new(0),
		};
		let monitor = Monitor::new();

		assert!(cache.children(&monitor, "T1", &loader).is_err());
		assert_eq!(cache.population(), Population::Unpopulated);
		assert_eq!(cache.children(&monitor, "T1", &loader).unwrap().len(), 1);
	}
}
