// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;
use dbnav_cache::Entity;
use dbnav_core::{ObjectKind, Record, Value};

use crate::ObjectBase;

/// Catalog object with no navigation of its own (bufferpools, roles, packages, ...). The full
/// row is kept as an attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericObject {
	pub base: ObjectBase,
	pub kind: ObjectKind,
	pub schema: Option<String>,
	pub owner: Option<String>,
	pub create_time: Option<NaiveDateTime>,
	attributes: Record,
}

/// Where the name, id and schema of each kind live in its catalog view.
struct Layout {
	name: &'static str,
	id: Option<&'static str>,
	schema: Option<&'static str>,
}

fn layout(kind: ObjectKind) -> Option<Layout> {
	let (name, id, schema) = match kind {
		ObjectKind::Bufferpool => ("BPNAME", Some("BUFFERPOOLID"), None),
		ObjectKind::StorageGroup => ("SGNAME", Some("SGID"), None),
		ObjectKind::Role => ("ROLENAME", Some("ROLEID"), None),
		ObjectKind::Variable => ("VARNAME", Some("VARID"), Some("VARSCHEMA")),
		ObjectKind::RemoteServer => ("SERVERNAME", None, None),
		ObjectKind::Wrapper => ("WRAPNAME", None, None),
		ObjectKind::Package => ("PKGNAME", None, Some("PKGSCHEMA")),
		ObjectKind::Module => ("MODULENAME", Some("MODULEID"), Some("MODULESCHEMA")),
		ObjectKind::XmlSchema => ("OBJECTNAME", Some("OBJECTID"), Some("OBJECTSCHEMA")),
		_ => return None,
	};
	Some(Layout {
		name,
		id,
		schema,
	})
}

impl GenericObject {
	pub fn from_record(kind: ObjectKind, record: &Record) -> Option<Self> {
		let layout = layout(kind)?;
		let base = ObjectBase::from_record(record, layout.name, layout.id);
		if base.name.is_empty() {
			return None;
		}
		Some(GenericObject {
			base,
			kind,
			schema: layout.schema.and_then(|f| record.trimmed_opt(f)),
			owner: record.trimmed_opt("OWNER"),
			create_time: record.timestamp("CREATE_TIME"),
			attributes: record.clone(),
		})
	}

	pub fn attribute(&self, field: &str) -> &Value {
		self.attributes.value(field)
	}

	pub fn attributes(&self) -> &Record {
		&self.attributes
	}
}

impl Entity for GenericObject {
	fn name(&self) -> &str {
		&self.base.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bufferpool() {
		let record = Record::new().with("BPNAME", "IBMDEFAULTBP").with("BUFFERPOOLID", 1).with("PAGESIZE", 4096);
		let bp = GenericObject::from_record(ObjectKind::Bufferpool, &record).unwrap();
		assert_eq!(bp.base.name, "IBMDEFAULTBP");
		assert_eq!(bp.base.id, Some(1));
		assert_eq!(bp.attribute("PAGESIZE"), &Value::Int(4096));
		assert_eq!(bp.attribute("MISSING"), &Value::Null);
	}

	#[test]
	fn test_module_schema() {
		let record = Record::new().with("MODULENAME", "PAYROLL").with("MODULESCHEMA", "APP ");
		let module = GenericObject::from_record(ObjectKind::Module, &record).unwrap();
		assert_eq!(module.schema.as_deref(), Some("APP"));
	}

	#[test]
	fn test_unsupported_kind() {
		let record = Record::new().with("TABNAME", "T1");
		assert!(GenericObject::from_record(ObjectKind::Table, &record).is_none());
	}
}
