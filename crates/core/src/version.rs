// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Engine release, totally ordered by (major, minor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngineVersion {
	pub major: u16,
	pub minor: u16,
}

impl EngineVersion {
	pub const V9_1: EngineVersion = EngineVersion::new(9, 1);
	pub const V9_5: EngineVersion = EngineVersion::new(9, 5);
	pub const V9_7: EngineVersion = EngineVersion::new(9, 7);
	pub const V10_1: EngineVersion = EngineVersion::new(10, 1);
	pub const V10_5: EngineVersion = EngineVersion::new(10, 5);
	pub const V11_1: EngineVersion = EngineVersion::new(11, 1);

	pub const fn new(major: u16, minor: u16) -> Self {
		Self {
			major,
			minor,
		}
	}

	pub fn is_at_least(&self, other: EngineVersion) -> bool {
		*self >= other
	}

	/// Parses `"10.5"`, `"10.5.0.7"` or a product string such as `"SQL10057"`.
	pub fn parse(text: &str) -> Option<Self> {
		let text = text.trim();
		if let Some(digits) = text.strip_prefix("SQL") {
			if digits.len() < 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
				return None;
			}
			let major = digits.get(0..2)?.parse().ok()?;
			let minor = digits.get(2..4)?.parse::<u16>().ok()?;
			return Some(EngineVersion::new(major, minor));
		}

		let mut parts = text.split('.');
		let major = parts.next()?.trim().parse().ok()?;
		let minor = match parts.next() {
			Some(minor) => minor.trim().parse().ok()?,
			None => 0,
		};
		Some(EngineVersion::new(major, minor))
	}
}

impl Display for EngineVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ordering() {
		assert!(EngineVersion::V9_7 > EngineVersion::V9_5);
		assert!(EngineVersion::V10_1 > EngineVersion::V9_7);
		assert!(EngineVersion::new(10, 5).is_at_least(EngineVersion::V10_5));
		assert!(!EngineVersion::new(9, 5).is_at_least(EngineVersion::V9_7));
	}

	#[test]
	fn test_parse() {
		assert_eq!(EngineVersion::parse("10.5"), Some(EngineVersion::V10_5));
		assert_eq!(EngineVersion::parse("9.7.0.11"), Some(EngineVersion::V9_7));
		assert_eq!(EngineVersion::parse("11"), Some(EngineVersion::new(11, 0)));
		assert_eq!(EngineVersion::parse("SQL10057"), Some(EngineVersion::V10_5));
		assert_eq!(EngineVersion::parse("garbage"), None);
	}

	#[test]
	fn test_display() {
		assert_eq!(EngineVersion::V9_7.to_string(), "9.7");
	}
}
