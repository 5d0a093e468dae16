// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;
use dbnav_cache::Entity;
use dbnav_core::Record;

use crate::ObjectBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTime {
	Before,
	After,
	InsteadOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
	Insert,
	Update,
	Delete,
	Multiple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
	pub base: ObjectBase,
	pub schema: String,
	pub table_schema: String,
	pub table: String,
	pub time: TriggerTime,
	pub event: TriggerEvent,
	pub for_each_row: bool,
	pub valid: bool,
	pub text: Option<String>,
	pub create_time: Option<NaiveDateTime>,
}

impl Trigger {
	pub fn from_record(record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "TRIGNAME", None);
		let table = record.trimmed("TABNAME");
		if base.name.is_empty() || table.is_empty() {
			return None;
		}
		let time = match record.trimmed("TRIGTIME").as_str() {
			"B" => TriggerTime::Before,
			"A" => TriggerTime::After,
			"I" => TriggerTime::InsteadOf,
			_ => return None,
		};
		let event = match record.trimmed("TRIGEVENT").as_str() {
			"I" => TriggerEvent::Insert,
			"U" => TriggerEvent::Update,
			"D" => TriggerEvent::Delete,
			"M" => TriggerEvent::Multiple,
			_ => return None,
		};
		let table_schema = record.trimmed("TABSCHEMA");
		Some(Trigger {
			base,
			schema: record.trimmed_opt("TRIGSCHEMA").unwrap_or_else(|| table_schema.clone()),
			table_schema,
			table,
			time,
			event,
			for_each_row: record.flag("GRANULARITY", "R"),
			valid: record.flag("VALID", "Y"),
			text: record.string_opt("TEXT"),
			create_time: record.timestamp("CREATE_TIME"),
		})
	}
}

impl Entity for Trigger {
	fn name(&self) -> &str {
		&self.base.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::trigger_row;

	#[test]
	fn test_from_record() {
		let trigger = Trigger::from_record(&trigger_row("APP", "ORDERS", "TRG_AUDIT")).unwrap();
		assert_eq!(trigger.table, "ORDERS");
		assert_eq!(trigger.time, TriggerTime::After);
		assert_eq!(trigger.event, TriggerEvent::Insert);
		assert!(trigger.for_each_row);
	}

	#[test]
	fn test_unknown_time_rejected() {
		let record = trigger_row("APP", "ORDERS", "TRG").with("TRIGTIME", "X");
		assert!(Trigger::from_record(&record).is_none());
	}
}
