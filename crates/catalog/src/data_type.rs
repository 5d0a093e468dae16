// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, Record};
use tracing::{debug, warn};

use crate::{ObjectBase, Tier, VersionGate};

/// Schema holding the built-in types.
pub(crate) const SYSTEM_TYPE_SCHEMA: &str = "SYSIBM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
	Boolean,
	Numeric,
	String,
	DateTime,
	Binary,
	Content,
	Struct,
	Array,
	Reference,
	Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaType {
	System,
	Distinct,
	Structured,
	Array,
	Cursor,
	Row,
	Other,
}

impl MetaType {
	fn from_code(code: &str) -> Self {
		match code.trim() {
			"S" => MetaType::System,
			"T" => MetaType::Distinct,
			"R" => MetaType::Structured,
			"A" | "L" => MetaType::Array,
			"C" => MetaType::Cursor,
			"F" => MetaType::Row,
			_ => MetaType::Other,
		}
	}
}

/// Built-in type table: name, kind, maximum precision.
const PREDEFINED: &[(&str, DataKind, Option<i64>)] = &[
	("ARRAY", DataKind::Array, None),
	("BIGINT", DataKind::Numeric, Some(20)),
	("BINARY", DataKind::Binary, Some(254)),
	("BLOB", DataKind::Content, Some(2_147_483_647)),
	("BOOLEAN", DataKind::Boolean, None),
	("CHARACTER", DataKind::String, Some(254)),
	("CLOB", DataKind::Content, Some(2_147_483_647)),
	("CURSOR", DataKind::Unknown, None),
	("DATE", DataKind::DateTime, Some(10)),
	("DBCLOB", DataKind::Content, Some(1_073_741_823)),
	("DECFLOAT", DataKind::Numeric, Some(34)),
	("DECIMAL", DataKind::Numeric, Some(31)),
	("DOUBLE", DataKind::Numeric, Some(53)),
	("GRAPHIC", DataKind::String, Some(127)),
	("INTEGER", DataKind::Numeric, Some(10)),
	("LONG VARCHAR", DataKind::String, Some(32_700)),
	("LONG VARGRAPHIC", DataKind::String, Some(16_350)),
	("REAL", DataKind::Numeric, Some(24)),
	("REFERENCE", DataKind::Reference, None),
	("ROW", DataKind::Struct, None),
	("SMALLINT", DataKind::Numeric, Some(5)),
	("TIME", DataKind::DateTime, Some(8)),
	("TIMESTAMP", DataKind::DateTime, Some(32)),
	("VARBINARY", DataKind::Binary, Some(32_762)),
	("VARCHAR", DataKind::String, Some(4_000)),
	("VARGRAPHIC", DataKind::String, Some(16_336)),
	("XML", DataKind::Content, None),
];

fn predefined(name: &str) -> Option<(DataKind, Option<i64>)> {
	PREDEFINED.iter().find(|(n, _, _)| *n == name).map(|(_, kind, precision)| (*kind, *precision))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
	pub base: ObjectBase,
	pub schema: String,
	pub meta_type: MetaType,
	pub source_schema: Option<String>,
	pub source_name: Option<String>,
	pub length: i64,
	pub scale: i64,
	pub data_kind: DataKind,
	pub max_precision: Option<i64>,
	pub module: Option<String>,
}

const TIERS: &[Tier<DataType>] = &[Tier {
	since: EngineVersion::V9_7,
	apply: |t, r| t.module = r.trimmed_opt("TYPEMODULENAME"),
}];

impl DataType {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "TYPENAME", Some("TYPEID"));
		if base.name.is_empty() {
			return None;
		}
		let schema = record.trimmed("TYPESCHEMA");
		let meta_type = MetaType::from_code(&record.str("METATYPE"));
		let source_schema = record.trimmed_opt("SOURCESCHEMA");
		let source_name = record.trimmed_opt("SOURCENAME");

		let (data_kind, max_precision) =
			derive_kind(&schema, &base.name, meta_type, source_schema.as_deref(), source_name.as_deref());

		let mut data_type = DataType {
			base,
			schema,
			meta_type,
			source_schema,
			source_name,
			length: record.int("LENGTH"),
			scale: record.int("SCALE"),
			data_kind,
			max_precision,
			module: None,
		};
		gate.apply(&mut data_type, record, TIERS);
		Some(data_type)
	}

	pub fn is_system(&self) -> bool {
		self.schema == SYSTEM_TYPE_SCHEMA
	}

	/// Built-in types are addressed by their bare name, user types by `SCHEMA.NAME`.
	pub fn qualified_name(&self) -> String {
		if self.is_system() {
			return self.base.name.clone();
		}
		format!("{}.{}", self.schema, self.base.name)
	}
}

impl Entity for DataType {
	fn name(&self) -> &str {
		&self.base.name
	}
}

fn derive_kind(
	schema: &str,
	name: &str,
	meta_type: MetaType,
	source_schema: Option<&str>,
	source_name: Option<&str>,
) -> (DataKind, Option<i64>) {
	if schema == SYSTEM_TYPE_SCHEMA {
		if let Some(found) = predefined(name) {
			return found;
		}
	}

	match meta_type {
		MetaType::Structured | MetaType::Row => (DataKind::Struct, None),
		MetaType::Array => (DataKind::Array, None),
		MetaType::System => {
			warn!(schema, name, "built-in type missing from the predefined type table");
			(DataKind::Unknown, None)
		}
		_ => match (source_schema, source_name) {
			(Some(SYSTEM_TYPE_SCHEMA), Some(source)) => predefined(source).unwrap_or_else(|| {
				warn!(schema, name, source, "user type based on an unknown built-in type");
				(DataKind::Unknown, None)
			}),
			_ => {
				// following a chain of user types here would mean loading other schemas mid-construction
				debug!(schema, name, "user type based on another user type");
				(DataKind::Unknown, None)
			}
		},
	}
}
