// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;
use dbnav_cache::Entity;
use dbnav_core::Record;

use crate::ObjectBase;

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
	pub base: ObjectBase,
	pub schema: String,
	pub owner: Option<String>,
	pub start: i64,
	pub increment: i64,
	pub min_value: i64,
	pub max_value: i64,
	pub cycle: bool,
	pub cache: i64,
	pub ordered: bool,
	pub next_cache_first_value: Option<i64>,
	pub create_time: Option<NaiveDateTime>,
}

impl Sequence {
	pub fn from_record(record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "SEQNAME", Some("SEQID"));
		if base.name.is_empty() {
			return None;
		}
		Some(Sequence {
			base,
			schema: record.trimmed("SEQSCHEMA"),
			owner: record.trimmed_opt("OWNER"),
			start: record.int("START"),
			increment: record.int("INCREMENT"),
			min_value: record.int("MINVALUE"),
			max_value: record.int("MAXVALUE"),
			cycle: record.flag("CYCLE", "Y"),
			cache: record.int("CACHE"),
			ordered: record.flag("ORDER", "Y"),
			next_cache_first_value: record.int_opt("NEXTCACHEFIRSTVALUE"),
			create_time: record.timestamp("CREATE_TIME"),
		})
	}
}

impl Entity for Sequence {
	fn name(&self) -> &str {
		&self.base.name
	}
}
