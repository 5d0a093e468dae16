// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;

/// A single field value returned by the backing store.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Text(String),
	Timestamp(NaiveDateTime),
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => Ok(()),
			Value::Bool(b) => write!(f, "{b}"),
			Value::Int(i) => write!(f, "{i}"),
			Value::Text(s) => f.write_str(s),
			Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(v as i64)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<NaiveDateTime> for Value {
	fn from(v: NaiveDateTime) -> Self {
		Value::Timestamp(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(v) => v.into(),
			None => Value::Null,
		}
	}
}

/// One catalog row: named fields in column order.
///
/// Accessors never fail. A missing or mistyped field reads as zero, empty or `None`, which
/// matches how catalog views report optional attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
	fields: Vec<(String, Value)>,
}

impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
		self.set(field, value);
		self
	}

	pub fn set(&mut self, field: &str, value: impl Into<Value>) {
		let value = value.into();
		match self.fields.iter_mut().find(|(name, _)| name.eq_ignore_ascii_case(field)) {
			Some((_, existing)) => *existing = value,
			None => self.fields.push((field.to_uppercase(), value)),
		}
	}

	pub fn value(&self, field: &str) -> &Value {
		static NULL: Value = Value::Null;
		self.fields.iter().find(|(name, _)| name.eq_ignore_ascii_case(field)).map(|(_, v)| v).unwrap_or(&NULL)
	}

	pub fn contains(&self, field: &str) -> bool {
		!self.value(field).is_null()
	}

	pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.fields.iter().map(|(name, value)| (name.as_str(), value))
	}

	pub fn string_opt(&self, field: &str) -> Option<String> {
		match self.value(field) {
			Value::Null => None,
			Value::Text(s) => Some(s.clone()),
			other => Some(other.to_string()),
		}
	}

	pub fn str(&self, field: &str) -> String {
		self.string_opt(field).unwrap_or_default()
	}

	/// Catalog views pad fixed-width names with blanks.
	pub fn trimmed(&self, field: &str) -> String {
		self.str(field).trim().to_string()
	}

	pub fn trimmed_opt(&self, field: &str) -> Option<String> {
		self.string_opt(field).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
	}

	pub fn int_opt(&self, field: &str) -> Option<i64> {
		match self.value(field) {
			Value::Int(i) => Some(*i),
			Value::Bool(b) => Some(*b as i64),
			Value::Text(s) => s.trim().parse().ok(),
			_ => None,
		}
	}

	pub fn int(&self, field: &str) -> i64 {
		self.int_opt(field).unwrap_or(0)
	}

	pub fn bool(&self, field: &str) -> bool {
		match self.value(field) {
			Value::Bool(b) => *b,
			Value::Int(i) => *i != 0,
			Value::Text(s) => matches!(s.trim(), "Y" | "y" | "YES" | "true" | "TRUE" | "1"),
			_ => false,
		}
	}

	/// True when the field holds the given single-letter code, e.g. `flag("NULLS", "Y")`.
	pub fn flag(&self, field: &str, yes: &str) -> bool {
		self.trimmed(field).eq_ignore_ascii_case(yes)
	}

	pub fn timestamp(&self, field: &str) -> Option<NaiveDateTime> {
		match self.value(field) {
			Value::Timestamp(ts) => Some(*ts),
			Value::Text(s) => {
				let s = s.trim();
				NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
					.or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d-%H.%M.%S%.f"))
					.ok()
			}
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	#[test]
	fn test_missing_fields_read_empty() {
		let record = Record::new();
		assert_eq!(record.str("TABNAME"), "");
		assert_eq!(record.int("CARD"), 0);
		assert!(!record.bool("NULLS"));
		assert_eq!(record.timestamp("CREATE_TIME"), None);
		assert_eq!(record.trimmed_opt("REMARKS"), None);
	}

	#[test]
	fn test_field_names_are_case_insensitive() {
		let record = Record::new().with("tabname", "T1");
		assert_eq!(record.str("TABNAME"), "T1");
	}

	#[test]
	fn test_set_replaces() {
		let mut record = Record::new().with("CARD", 1);
		record.set("card", 7);
		assert_eq!(record.int("CARD"), 7);
		assert_eq!(record.fields().count(), 1);
	}

	#[test]
	fn test_trimmed() {
		let record = Record::new().with("SCHEMANAME", "DB2INST1   ");
		assert_eq!(record.trimmed("SCHEMANAME"), "DB2INST1");
	}

	#[test]
	fn test_int_from_text() {
		let record = Record::new().with("TBSPACEID", " 4 ");
		assert_eq!(record.int_opt("TBSPACEID"), Some(4));
	}

	#[test]
	fn test_flag() {
		let record = Record::new().with("NULLS", "Y");
		assert!(record.flag("NULLS", "Y"));
		assert!(!record.flag("NULLS", "N"));
	}

	#[test]
	fn test_timestamp_from_db_text() {
		let record = Record::new().with("CREATE_TIME", "2024-03-01-10.15.30.000000");
		let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 15, 30).unwrap();
		assert_eq!(record.timestamp("CREATE_TIME"), Some(expected));
	}
}
