// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, Record};

use crate::{ObjectBase, Tier, VersionGate};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
	pub base: ObjectBase,
	pub schema: String,
	pub table: String,
	pub type_schema: String,
	pub type_name: String,
	pub length: i64,
	pub scale: i64,
	pub nullable: bool,
	pub default: Option<String>,
	pub key_seq: Option<i64>,
	pub identity: bool,
	pub generated: Option<String>,
	pub hidden: Option<String>,
	pub compress: Option<String>,
	pub inline_length: Option<i64>,
	pub row_begin: Option<bool>,
	pub row_end: Option<bool>,
	pub random_distribution: Option<bool>,
}

const TIERS: &[Tier<Column>] = &[
	Tier {
		since: EngineVersion::V9_5,
		apply: |c, r| c.compress = r.trimmed_opt("COMPRESS"),
	},
	Tier {
		since: EngineVersion::V9_7,
		apply: |c, r| c.inline_length = r.int_opt("INLINE_LENGTH"),
	},
	Tier {
		since: EngineVersion::V10_1,
		apply: |c, r| {
			c.row_begin = Some(r.flag("ROWBEGIN", "Y"));
			c.row_end = Some(r.flag("ROWEND", "Y"));
		},
	},
	Tier {
		since: EngineVersion::V10_5,
		apply: |c, r| c.random_distribution = Some(r.flag("RANDDISTKEY", "Y")),
	},
];

impl Column {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "COLNAME", Some("COLNO"));
		if base.name.is_empty() {
			return None;
		}
		let mut column = Column {
			base,
			schema: record.trimmed("TABSCHEMA"),
			table: record.trimmed("TABNAME"),
			type_schema: record.trimmed("TYPESCHEMA"),
			type_name: record.trimmed("TYPENAME"),
			length: record.int("LENGTH"),
			scale: record.int("SCALE"),
			nullable: record.flag("NULLS", "Y"),
			default: record.string_opt("DEFAULT"),
			key_seq: record.int_opt("KEYSEQ"),
			identity: record.flag("IDENTITY", "Y"),
			generated: record.trimmed_opt("GENERATED"),
			hidden: record.trimmed_opt("HIDDEN"),
			compress: None,
			inline_length: None,
			row_begin: None,
			row_end: None,
			random_distribution: None,
		};
		gate.apply(&mut column, record, TIERS);
		Some(column)
	}

	pub fn position(&self) -> Option<i64> {
		self.base.id
	}
}

impl Entity for Column {
	fn name(&self) -> &str {
		&self.base.name
	}
}
