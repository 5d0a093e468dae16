// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::kind::ObjectKind;

/// How object names are folded before they are used as cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
	#[default]
	Exact,
	Upper,
	Lower,
}

impl NameCase {
	pub fn fold(&self, name: &str) -> String {
		match self {
			NameCase::Exact => name.to_string(),
			NameCase::Upper => name.to_uppercase(),
			NameCase::Lower => name.to_lowercase(),
		}
	}
}

/// Name plus an optional kind discriminator. Two objects of different kinds may share a
/// name inside one cache (e.g. a procedure and a function).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
	pub name: String,
	pub kind: Option<ObjectKind>,
}

impl Identity {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: None,
		}
	}

	pub fn with_kind(name: impl Into<String>, kind: ObjectKind) -> Self {
		Self {
			name: name.into(),
			kind: Some(kind),
		}
	}

	pub fn key(&self, case: NameCase) -> IdentityKey {
		IdentityKey::new(&self.name, self.kind, case)
	}
}

impl From<&str> for Identity {
	fn from(name: &str) -> Self {
		Identity::new(name)
	}
}

impl From<String> for Identity {
	fn from(name: String) -> Self {
		Identity::new(name)
	}
}

impl Display for Identity {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			Some(kind) => write!(f, "{} {}", kind, self.name),
			None => f.write_str(&self.name),
		}
	}
}

/// Folded form of an [`Identity`], used as the map key inside caches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
	pub fn new(name: &str, kind: Option<ObjectKind>, case: NameCase) -> Self {
		let folded = case.fold(name);
		match kind {
			Some(kind) => IdentityKey(format!("{folded}\u{0}{}", kind.code())),
			None => IdentityKey(folded),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for IdentityKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0.replace('\u{0}', "#"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exact_case_keeps_names_apart() {
		let a = Identity::new("Orders").key(NameCase::Exact);
		let b = Identity::new("ORDERS").key(NameCase::Exact);
		assert_ne!(a, b);
	}

	#[test]
	fn test_upper_case_folds() {
		let a = Identity::new("Orders").key(NameCase::Upper);
		let b = Identity::new("ORDERS").key(NameCase::Upper);
		assert_eq!(a, b);
	}

	#[test]
	fn test_kind_discriminates() {
		let proc = Identity::with_kind("CALC", ObjectKind::Procedure).key(NameCase::Exact);
		let func = Identity::with_kind("CALC", ObjectKind::Function).key(NameCase::Exact);
		let bare = Identity::new("CALC").key(NameCase::Exact);
		assert_ne!(proc, func);
		assert_ne!(proc, bare);
	}

	#[test]
	fn test_display() {
		assert_eq!(Identity::with_kind("T1", ObjectKind::Table).to_string(), "TABLE T1");
		assert_eq!(Identity::new("T1").to_string(), "T1");
	}
}
