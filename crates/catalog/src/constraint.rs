// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{ObjectKind, Record};
use smallvec::SmallVec;

use crate::{ObjectBase, ObjectRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
	NoAction,
	Restrict,
	Cascade,
	SetNull,
}

impl ReferentialAction {
	fn from_code(code: &str) -> Self {
		match code.trim() {
			"R" => ReferentialAction::Restrict,
			"C" => ReferentialAction::Cascade,
			"N" => ReferentialAction::SetNull,
			_ => ReferentialAction::NoAction,
		}
	}
}

/// Primary, unique, foreign key or check constraint of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
	pub base: ObjectBase,
	pub kind: ObjectKind,
	pub schema: String,
	pub table: String,
	pub enforced: bool,
	pub columns: SmallVec<[String; 4]>,
	/// Condition text of a check constraint.
	pub text: Option<String>,
	/// Referenced table of a foreign key, recorded verbatim and resolved on demand.
	pub referenced: Option<ObjectRef>,
	/// Unique key of the referenced table that a foreign key points at.
	pub referenced_key: Option<ObjectRef>,
	pub delete_rule: Option<ReferentialAction>,
	pub update_rule: Option<ReferentialAction>,
}

impl Constraint {
	/// Rows of the unique key and check queries, typed by `TYPE` (`P`, `U` or `K`).
	pub fn from_record(record: &Record) -> Option<Self> {
		let kind = match record.trimmed("TYPE").as_str() {
			"P" => ObjectKind::PrimaryKey,
			"U" => ObjectKind::UniqueKey,
			"K" => ObjectKind::CheckConstraint,
			"F" => return Self::foreign_key(record),
			_ => return None,
		};
		let base = ObjectBase::from_record(record, "CONSTNAME", None);
		if base.name.is_empty() {
			return None;
		}
		Some(Constraint {
			base,
			kind,
			schema: record.trimmed("TABSCHEMA"),
			table: record.trimmed("TABNAME"),
			enforced: !record.flag("ENFORCED", "N"),
			columns: split_columns(&record.str("COLNAMES")),
			text: record.string_opt("TEXT"),
			referenced: None,
			referenced_key: None,
			delete_rule: None,
			update_rule: None,
		})
	}

	/// Rows of the foreign key and reference queries.
	pub fn foreign_key(record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "CONSTNAME", None);
		let ref_table = record.trimmed("REFTABNAME");
		if base.name.is_empty() || ref_table.is_empty() {
			return None;
		}
		let ref_schema = record.trimmed("REFTABSCHEMA");
		let referenced_key = record.trimmed_opt("REFKEYNAME").map(|key| ObjectRef {
			schema: ref_schema.clone(),
			name: key,
			kind: Some(ObjectKind::UniqueKey),
			parent: Some(ref_table.clone()),
		});
		Some(Constraint {
			base,
			kind: ObjectKind::ForeignKey,
			schema: record.trimmed("TABSCHEMA"),
			table: record.trimmed("TABNAME"),
			enforced: !record.flag("ENFORCED", "N"),
			columns: split_columns(&record.str("FK_COLNAMES")),
			text: None,
			referenced: Some(ObjectRef::new(ref_schema, ref_table, Some(ObjectKind::Table))),
			referenced_key,
			delete_rule: Some(ReferentialAction::from_code(&record.str("DELETERULE"))),
			update_rule: Some(ReferentialAction::from_code(&record.str("UPDATERULE"))),
		})
	}

	pub fn is_primary(&self) -> bool {
		self.kind == ObjectKind::PrimaryKey
	}
}

impl Entity for Constraint {
	fn name(&self) -> &str {
		&self.base.name
	}
}

fn split_columns(text: &str) -> SmallVec<[String; 4]> {
	text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::{check_row, foreign_key_row, unique_key_row};

	#[test]
	fn test_primary_key() {
		let pk = Constraint::from_record(&unique_key_row("APP", "ORDERS", "PK_ORDERS", "P", "ID")).unwrap();
		assert!(pk.is_primary());
		assert_eq!(pk.columns.as_slice(), ["ID".to_string()]);
		assert!(pk.referenced.is_none());
	}

	#[test]
	fn test_foreign_key() {
		let fk = Constraint::foreign_key(&foreign_key_row(
			"APP",
			"LINES",
			"FK_ORDER",
			"APP",
			"ORDERS",
			"PK_ORDERS",
			"ORDER_ID",
		))
		.unwrap();
		assert_eq!(fk.kind, ObjectKind::ForeignKey);
		let referenced = fk.referenced.as_ref().unwrap();
		assert_eq!(referenced.name, "ORDERS");
		assert_eq!(fk.referenced_key.as_ref().unwrap().parent.as_deref(), Some("ORDERS"));
		assert_eq!(fk.delete_rule, Some(ReferentialAction::Restrict));
	}

	#[test]
	fn test_check() {
		let check = Constraint::from_record(&check_row("APP", "ORDERS", "CK_QTY", "QTY > 0")).unwrap();
		assert_eq!(check.kind, ObjectKind::CheckConstraint);
		assert_eq!(check.text.as_deref(), Some("QTY > 0"));
	}

	#[test]
	fn test_unknown_type_rejected() {
		let record = unique_key_row("APP", "ORDERS", "X", "Z", "ID");
		assert!(Constraint::from_record(&record).is_none());
	}
}
