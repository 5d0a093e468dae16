// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, Record};
use smallvec::SmallVec;

use crate::{ObjectBase, Tier, VersionGate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUniqueness {
	Duplicates,
	Unique,
	Primary,
}

impl IndexUniqueness {
	fn from_code(code: &str) -> Self {
		match code.trim() {
			"P" => IndexUniqueness::Primary,
			"U" => IndexUniqueness::Unique,
			_ => IndexUniqueness::Duplicates,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
	Ascending,
	Descending,
	/// Carried in the index leaf pages but not part of the key.
	Include,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
	pub name: String,
	pub order: ColumnOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
	pub base: ObjectBase,
	pub schema: String,
	pub table_schema: String,
	pub table: String,
	pub uniqueness: IndexUniqueness,
	pub index_type: Option<String>,
	pub columns: SmallVec<[IndexColumn; 4]>,
	pub compression: Option<bool>,
	pub null_keys: Option<bool>,
}

const TIERS: &[Tier<Index>] = &[
	Tier {
		since: EngineVersion::V9_7,
		apply: |i, r| i.compression = Some(r.flag("COMPRESSION", "Y")),
	},
	Tier {
		since: EngineVersion::V10_1,
		apply: |i, r| i.null_keys = Some(r.flag("NULLKEYS", "Y")),
	},
];

impl Index {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "INDNAME", Some("IID"));
		let table = record.trimmed("TABNAME");
		if base.name.is_empty() || table.is_empty() {
			return None;
		}
		let table_schema = record.trimmed("TABSCHEMA");
		let mut index = Index {
			base,
			schema: record.trimmed_opt("INDSCHEMA").unwrap_or_else(|| table_schema.clone()),
			table_schema,
			table,
			uniqueness: IndexUniqueness::from_code(&record.str("UNIQUERULE")),
			index_type: record.trimmed_opt("INDEXTYPE"),
			columns: parse_columns(&record.str("COLNAMES")),
			compression: None,
			null_keys: None,
		};
		gate.apply(&mut index, record, TIERS);
		Some(index)
	}

	pub fn is_unique(&self) -> bool {
		self.uniqueness != IndexUniqueness::Duplicates
	}
}

impl Entity for Index {
	fn name(&self) -> &str {
		&self.base.name
	}
}

/// Parses the `+A-B*C` column list form: `+` ascending, `-` descending, `*` include.
fn parse_columns(text: &str) -> SmallVec<[IndexColumn; 4]> {
	let mut columns = SmallVec::new();
	let mut order = None;
	let mut name = String::new();

	let mut flush = |order: Option<ColumnOrder>, name: &mut String| {
		if let Some(order) = order {
			if !name.trim().is_empty() {
				columns.push(IndexColumn {
					name: name.trim().to_string(),
					order,
				});
			}
		}
		name.clear();
	};

	for c in text.chars() {
		let next = match c {
			'+' => Some(ColumnOrder::Ascending),
			'-' => Some(ColumnOrder::Descending),
			'*' => Some(ColumnOrder::Include),
			_ => None,
		};
		match next {
			Some(next) => {
				flush(order, &mut name);
				order = Some(next);
			}
			None => name.push(c),
		}
	}
	flush(order, &mut name);
	columns
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::index_row;

	#[test]
	fn test_parse_columns() {
		let columns = parse_columns("+ID-CREATED*NOTE");
		assert_eq!(columns.len(), 3);
		assert_eq!(columns[0], IndexColumn {
			name: "ID".to_string(),
			order: ColumnOrder::Ascending
		});
		assert_eq!(columns[1].order, ColumnOrder::Descending);
		assert_eq!(columns[2].name, "NOTE");
		assert_eq!(columns[2].order, ColumnOrder::Include);
	}

	#[test]
	fn test_parse_empty() {
		assert!(parse_columns("").is_empty());
		assert!(parse_columns("+").is_empty());
	}

	#[test]
	fn test_from_record() {
		let record = index_row("APP", "ORDERS", "PK_ORDERS", "+ID", "P");
		let index = Index::from_record(&VersionGate::new(EngineVersion::V9_1), &record).unwrap();
		assert_eq!(index.table, "ORDERS");
		assert_eq!(index.schema, "APP");
		assert!(index.is_unique());
		assert_eq!(index.uniqueness, IndexUniqueness::Primary);
		assert_eq!(index.compression, None);
	}

	#[test]
	fn test_gated_attributes() {
		let record = index_row("APP", "ORDERS", "IX1", "+A", "D").with("COMPRESSION", "Y").with("NULLKEYS", "N");
		let index = Index::from_record(&VersionGate::new(EngineVersion::V10_1), &record).unwrap();
		assert_eq!(index.compression, Some(true));
		assert_eq!(index.null_keys, Some(false));
		assert!(!index.is_unique());
	}
}
