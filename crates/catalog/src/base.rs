// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_core::Record;

/// Attributes every catalog object carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBase {
	pub name: String,
	pub id: Option<i64>,
	/// False for objects that exist only client side.
	pub persisted: bool,
	pub remarks: Option<String>,
}

impl ObjectBase {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			id: None,
			persisted: true,
			remarks: None,
		}
	}

	pub fn from_record(record: &Record, name_field: &str, id_field: Option<&str>) -> Self {
		Self {
			name: record.trimmed(name_field),
			id: id_field.and_then(|f| record.int_opt(f)),
			persisted: true,
			remarks: record.trimmed_opt("REMARKS"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerType {
	System,
	User,
}

impl OwnerType {
	pub fn from_code(code: &str) -> Option<Self> {
		match code.trim() {
			"S" => Some(OwnerType::System),
			"U" => Some(OwnerType::User),
			_ => None,
		}
	}
}

/// Size annotation attached by the statistics collector, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectStatistics {
	pub total_size: i64,
	pub data_size: Option<i64>,
	pub index_size: Option<i64>,
	pub lob_size: Option<i64>,
}

impl ObjectStatistics {
	pub fn zero(total_only: bool) -> Self {
		if total_only {
			return Self::default();
		}
		Self {
			total_size: 0,
			data_size: Some(0),
			index_size: Some(0),
			lob_size: Some(0),
		}
	}

	pub fn from_record(record: &Record, total_only: bool) -> Self {
		if total_only {
			return Self {
				total_size: record.int("TOTAL_SIZE"),
				..Self::default()
			};
		}
		Self {
			total_size: record.int("TOTAL_SIZE"),
			data_size: Some(record.int("DATA_SIZE")),
			index_size: Some(record.int("INDEX_SIZE")),
			lob_size: Some(record.int("LOB_SIZE")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_base_from_record() {
		let record = Record::new().with("TABNAME", "ORDERS  ").with("TABLEID", 12).with("REMARKS", "  ");
		let base = ObjectBase::from_record(&record, "TABNAME", Some("TABLEID"));
		assert_eq!(base.name, "ORDERS");
		assert_eq!(base.id, Some(12));
		assert_eq!(base.remarks, None);
		assert!(base.persisted);
	}

	#[test]
	fn test_statistics_total_only() {
		let record = Record::new().with("TOTAL_SIZE", 4096).with("DATA_SIZE", 1024);
		let stats = ObjectStatistics::from_record(&record, true);
		assert_eq!(stats.total_size, 4096);
		assert_eq!(stats.data_size, None);

		let full = ObjectStatistics::from_record(&record, false);
		assert_eq!(full.data_size, Some(1024));
		assert_eq!(full.lob_size, Some(0));
	}
}
