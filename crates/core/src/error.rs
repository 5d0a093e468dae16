// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::kind::ObjectKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The backing store could not answer a catalog query.
	#[error("catalog fetch of {what} failed: {message}")]
	Fetch {
		what: String,
		message: String,
	},

	#[error("catalog operation was cancelled")]
	Cancelled,

	/// A cache population was re-entered by the thread that is currently populating it.
	#[error("population of {cache} re-entered while already in progress on this thread")]
	PopulationCycle {
		cache: String,
	},

	/// A container was asked for a kind of child it can never own.
	#[error("{container} cannot contain objects of kind {kind}")]
	Structural {
		container: String,
		kind: ObjectKind,
	},

	#[error("{kind} '{name}' not found")]
	NotFound {
		kind: ObjectKind,
		name: String,
	},

	#[error("invalid catalog configuration: {0}")]
	Config(String),
}

impl Error {
	pub fn fetch(what: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Fetch {
			what: what.into(),
			message: message.into(),
		}
	}

	pub fn not_found(kind: ObjectKind, name: impl Into<String>) -> Self {
		Error::NotFound {
			kind,
			name: name.into(),
		}
	}

	/// Transient errors leave caches unpopulated; retrying the same call may succeed.
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::Fetch { .. } | Error::Cancelled)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transient_classification() {
		assert!(Error::fetch("tables", "connection reset").is_transient());
		assert!(Error::Cancelled.is_transient());
		assert!(!Error::PopulationCycle {
			cache: "tables".to_string()
		}
		.is_transient());
		assert!(!Error::Structural {
			container: "TABLE T1".to_string(),
			kind: ObjectKind::Schema,
		}
		.is_transient());
	}

	#[test]
	fn test_display() {
		let err = Error::not_found(ObjectKind::Table, "ORDERS");
		assert_eq!(err.to_string(), "TABLE 'ORDERS' not found");
	}
}
