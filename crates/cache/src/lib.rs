// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]
#![cfg_attr(not(debug_assertions), deny(clippy::unwrap_used))]
#![cfg_attr(not(debug_assertions), deny(clippy::expect_used))]

use dbnav_core::{Identity, IdentityKey, NameCase, ObjectKind};

pub use composite::{ChildLoader, CompositeCache};
pub use object::{FnLoader, Loader, ObjectCache, from_fn};

mod composite;
mod flight;
mod object;

/// Anything that can be stored in a cache.
pub trait Entity: Send + Sync {
	fn name(&self) -> &str;

	/// Discriminates objects of different kinds that share a name within one cache.
	fn kind(&self) -> Option<ObjectKind> {
		None
	}

	fn identity(&self) -> Identity {
		Identity {
			name: self.name().to_string(),
			kind: self.kind(),
		}
	}
}

pub(crate) fn entity_key<E: Entity>(entity: &E, case: NameCase) -> IdentityKey {
	IdentityKey::new(entity.name(), entity.kind(), case)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
	Unpopulated,
	Populated,
	/// Populated, with one or more entries scheduled for an individual re-fetch.
	Stale,
}
