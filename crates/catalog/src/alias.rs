// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{ObjectKind, Record};

use crate::{ObjectBase, ObjectRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
	Table,
	Sequence,
	Module,
}

/// Alternative name for a table, sequence or module. The target may itself be an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
	pub base: ObjectBase,
	pub schema: String,
	pub kind: AliasKind,
	pub target: ObjectRef,
}

impl Alias {
	pub fn from_record(record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "ALIASNAME", None);
		let target_name = record.trimmed("BASE_NAME");
		if base.name.is_empty() || target_name.is_empty() {
			return None;
		}
		let kind = match record.trimmed("TYPE").as_str() {
			"T" | "" => AliasKind::Table,
			"S" => AliasKind::Sequence,
			"M" => AliasKind::Module,
			_ => return None,
		};
		let schema = record.trimmed("ALIASSCHEMA");
		let target_schema = record.trimmed_opt("BASE_SCHEMA").unwrap_or_else(|| schema.clone());
		// table and sequence aliases may chain through other aliases, so their target kind stays open
		let target_kind = match kind {
			AliasKind::Module => Some(ObjectKind::Module),
			_ => None,
		};
		Some(Alias {
			base,
			schema,
			kind,
			target: ObjectRef::new(target_schema, target_name, target_kind),
		})
	}

	pub fn qualified_name(&self) -> String {
		format!("{}.{}", self.schema, self.base.name)
	}
}

impl Entity for Alias {
	fn name(&self) -> &str {
		&self.base.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::alias_row;

	#[test]
	fn test_from_record() {
		let alias = Alias::from_record(&alias_row("APP", "ORD", "SALES", "ORDERS", "T")).unwrap();
		assert_eq!(alias.kind, AliasKind::Table);
		assert_eq!(alias.target.schema, "SALES");
		assert_eq!(alias.target.name, "ORDERS");
		assert_eq!(alias.target.kind, None);
		assert_eq!(alias.qualified_name(), "APP.ORD");
	}

	#[test]
	fn test_target_schema_defaults_to_own() {
		let record = alias_row("APP", "ORD", "", "ORDERS", "S");
		let alias = Alias::from_record(&record).unwrap();
		assert_eq!(alias.target.schema, "APP");
		assert_eq!(alias.kind, AliasKind::Sequence);
	}
}
