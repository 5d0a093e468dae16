// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{ObjectKind, Record};
use tracing::debug;

use crate::{ObjectBase, ObjectRef};

/// An object a view or materialized query table depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
	pub base: ObjectBase,
	qualified: String,
	pub schema: String,
	pub table: String,
	pub target_schema: String,
	pub target_kind: Option<ObjectKind>,
}

impl Dependency {
	pub fn from_record(record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "BNAME", None);
		if base.name.is_empty() {
			return None;
		}
		let target_schema = record.trimmed("BSCHEMA");
		let code = record.trimmed("BTYPE");
		let target_kind = kind_from_code(&code);
		if target_kind.is_none() {
			debug!(btype = %code, name = %base.name, "dependency of unknown kind");
		}
		Some(Dependency {
			qualified: format!("{}.{}", target_schema, base.name),
			base,
			schema: record.trimmed("TABSCHEMA"),
			table: record.trimmed("TABNAME"),
			target_schema,
			target_kind,
		})
	}

	pub fn target_ref(&self) -> ObjectRef {
		ObjectRef::new(self.target_schema.clone(), self.base.name.clone(), self.target_kind)
	}
}

impl Entity for Dependency {
	/// Schema-qualified, since a view may depend on same-named objects in several schemas.
	fn name(&self) -> &str {
		&self.qualified
	}
}

fn kind_from_code(code: &str) -> Option<ObjectKind> {
	let kind = match code {
		"T" | "U" | "G" => ObjectKind::Table,
		"V" | "W" => ObjectKind::View,
		"S" => ObjectKind::MaterializedQueryTable,
		"N" => ObjectKind::Nickname,
		"A" => ObjectKind::Alias,
		"F" => ObjectKind::Function,
		"I" => ObjectKind::Index,
		"B" => ObjectKind::Trigger,
		"Q" => ObjectKind::Sequence,
		"R" => ObjectKind::DataType,
		"m" => ObjectKind::Module,
		"v" => ObjectKind::Variable,
		"X" => ObjectKind::XmlSchema,
		_ => return None,
	};
	Some(kind)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::dependency_row;

	#[test]
	fn test_codes() {
		assert_eq!(kind_from_code("S"), Some(ObjectKind::MaterializedQueryTable));
		assert_eq!(kind_from_code("F"), Some(ObjectKind::Function));
		assert_eq!(kind_from_code("v"), Some(ObjectKind::Variable));
		assert_eq!(kind_from_code("?"), None);
	}

	#[test]
	fn test_qualified_identity() {
		let a = Dependency::from_record(&dependency_row("APP", "V1", "APP", "ORDERS", "T")).unwrap();
		let b = Dependency::from_record(&dependency_row("APP", "V1", "SALES", "ORDERS", "T")).unwrap();
		assert_ne!(a.name(), b.name());
		assert_eq!(b.target_ref().schema, "SALES");
		assert_eq!(b.target_ref().kind, Some(ObjectKind::Table));
	}
}
