// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;
use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, ObjectKind, Record};

use crate::{ObjectBase, Tier, VersionGate};

/// Procedure, function or method, keyed by its specific name.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
	pub base: ObjectBase,
	pub routine_name: String,
	pub schema: String,
	pub kind: ObjectKind,
	pub language: Option<String>,
	pub origin: Option<String>,
	pub parm_count: i64,
	pub deterministic: bool,
	pub text: Option<String>,
	pub create_time: Option<NaiveDateTime>,
	pub module: Option<String>,
	pub secure: Option<bool>,
}

const TIERS: &[Tier<Routine>] = &[
	Tier {
		since: EngineVersion::V9_7,
		apply: |rt, r| rt.module = r.trimmed_opt("ROUTINEMODULENAME"),
	},
	Tier {
		since: EngineVersion::V10_1,
		apply: |rt, r| rt.secure = Some(r.flag("SECURE", "Y")),
	},
];

impl Routine {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let kind = match record.trimmed("ROUTINETYPE").as_str() {
			"P" => ObjectKind::Procedure,
			"F" => ObjectKind::Function,
			"M" => ObjectKind::Method,
			_ => return None,
		};
		let mut base = ObjectBase::from_record(record, "SPECIFICNAME", Some("ROUTINEID"));
		let routine_name = record.trimmed("ROUTINENAME");
		if base.name.is_empty() {
			base.name = routine_name.clone();
		}
		if base.name.is_empty() {
			return None;
		}
		let mut routine = Routine {
			base,
			routine_name,
			schema: record.trimmed("ROUTINESCHEMA"),
			kind,
			language: record.trimmed_opt("LANGUAGE"),
			origin: record.trimmed_opt("ORIGIN"),
			parm_count: record.int("PARM_COUNT"),
			deterministic: record.flag("DETERMINISTIC", "Y"),
			text: record.string_opt("TEXT"),
			create_time: record.timestamp("CREATE_TIME"),
			module: None,
			secure: None,
		};
		gate.apply(&mut routine, record, TIERS);
		Some(routine)
	}

	pub fn specific_name(&self) -> &str {
		&self.base.name
	}
}

impl Entity for Routine {
	fn name(&self) -> &str {
		&self.base.name
	}

	fn kind(&self) -> Option<ObjectKind> {
		Some(self.kind)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::routine_row;

	#[test]
	fn test_kind_from_type() {
		let gate = VersionGate::new(EngineVersion::V9_1);
		let proc = Routine::from_record(&gate, &routine_row("APP", "SQL1", "CALC", "P")).unwrap();
		let func = Routine::from_record(&gate, &routine_row("APP", "SQL2", "CALC", "F")).unwrap();
		assert_eq!(proc.kind, ObjectKind::Procedure);
		assert_eq!(func.kind, ObjectKind::Function);
		assert_eq!(proc.specific_name(), "SQL1");
		assert_eq!(func.routine_name, "CALC");
	}

	#[test]
	fn test_module_needs_9_7() {
		let record = routine_row("APP", "SQL1", "CALC", "P").with("ROUTINEMODULENAME", "PAYROLL");
		let low = Routine::from_record(&VersionGate::new(EngineVersion::V9_5), &record).unwrap();
		let high = Routine::from_record(&VersionGate::new(EngineVersion::V9_7), &record).unwrap();
		assert_eq!(low.module, None);
		assert_eq!(high.module.as_deref(), Some("PAYROLL"));
	}

	#[test]
	fn test_unknown_type_rejected() {
		let record = routine_row("APP", "SQL1", "CALC", "Q");
		assert!(Routine::from_record(&VersionGate::new(EngineVersion::V9_1), &record).is_none());
	}
}
