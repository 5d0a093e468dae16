// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

/// Include/exclude name masks applied to schema and table listings.
///
/// Masks use `%` or `*` for any run of characters and `_` or `?` for a single character.
/// An empty include list admits everything; exclusions always win.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFilter {
	pub include: Vec<String>,
	pub exclude: Vec<String>,
}

impl ObjectFilter {
	pub fn is_empty(&self) -> bool {
		self.include.is_empty() && self.exclude.is_empty()
	}

	pub fn matches(&self, name: &str) -> bool {
		if self.exclude.iter().any(|mask| mask_matches(mask, name)) {
			return false;
		}
		self.include.is_empty() || self.include.iter().any(|mask| mask_matches(mask, name))
	}
}

fn mask_matches(mask: &str, name: &str) -> bool {
	let mask: Vec<char> = mask.chars().collect();
	let name: Vec<char> = name.chars().collect();

	let (mut m, mut n) = (0usize, 0usize);
	let mut backtrack: Option<(usize, usize)> = None;

	while n < name.len() {
		match mask.get(m) {
			Some('%') | Some('*') => {
				backtrack = Some((m, n));
				m += 1;
			}
			Some('_') | Some('?') => {
				m += 1;
				n += 1;
			}
			Some(c) if c.eq_ignore_ascii_case(&name[n]) => {
				m += 1;
				n += 1;
			}
			_ => match backtrack {
				Some((bm, bn)) => {
					backtrack = Some((bm, bn + 1));
					m = bm + 1;
					n = bn + 1;
				}
				None => return false,
			},
		}
	}

	mask[m..].iter().all(|c| *c == '%' || *c == '*')
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filter(include: &[&str], exclude: &[&str]) -> ObjectFilter {
		ObjectFilter {
			include: include.iter().map(|s| s.to_string()).collect(),
			exclude: exclude.iter().map(|s| s.to_string()).collect(),
		}
	}

	#[test]
	fn test_empty_matches_everything() {
		assert!(ObjectFilter::default().matches("ANYTHING"));
	}

	#[test]
	fn test_wildcards() {
		assert!(mask_matches("SYS%", "SYSIBM"));
		assert!(mask_matches("SYS*", "SYSCAT"));
		assert!(mask_matches("T_", "T1"));
		assert!(mask_matches("T?", "T2"));
		assert!(!mask_matches("T_", "T12"));
		assert!(mask_matches("%ORD%", "CUSTOMER_ORDERS"));
		assert!(mask_matches("a%c", "ABBBC"));
		assert!(!mask_matches("A%C", "ABBBD"));
	}

	#[test]
	fn test_exclude_wins() {
		let f = filter(&["SYS%"], &["SYSTOOLS"]);
		assert!(f.matches("SYSIBM"));
		assert!(!f.matches("SYSTOOLS"));
		assert!(!f.matches("APP"));
	}
}
