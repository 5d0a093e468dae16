// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::thread::{self, ThreadId};

/// Single-flight slot guarding one cache.
///
/// A population claims the slot, releases the cache mutex while it fetches, and installs
/// its result only if the generation it started under is still current.
#[derive(Debug, Default)]
pub(crate) struct Flight {
	generation: u64,
	owner: Option<ThreadId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
	Free,
	Busy,
	/// The calling thread already holds the slot.
	Reentrant,
}

#[derive(Debug, Clone, Copy)]
#[must_use]
pub(crate) struct Ticket {
	generation: u64,
}

impl Flight {
	pub(crate) fn slot(&self) -> Slot {
		match self.owner {
			None => Slot::Free,
			Some(owner) if owner == thread::current().id() => Slot::Reentrant,
			Some(_) => Slot::Busy,
		}
	}

	pub(crate) fn start(&mut self) -> Ticket {
		self.owner = Some(thread::current().id());
		Ticket {
			generation: self.generation,
		}
	}

	/// Releases the slot. Returns false when the cache was invalidated meanwhile, in which
	/// case the slot already belongs to nobody (or to a newer population) and the result
	/// must be discarded.
	pub(crate) fn finish(&mut self, ticket: Ticket) -> bool {
		if ticket.generation != self.generation {
			return false;
		}
		self.owner = None;
		true
	}

	pub(crate) fn invalidate(&mut self) {
		self.generation = self.generation.wrapping_add(1);
		self.owner = None;
	}
}
