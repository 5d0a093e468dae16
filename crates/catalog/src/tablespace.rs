// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::NaiveDateTime;
use dbnav_cache::Entity;
use dbnav_core::{EngineVersion, Record};

use crate::{ObjectBase, Tier, VersionGate};

#[derive(Debug, Clone, PartialEq)]
pub struct Tablespace {
	pub base: ObjectBase,
	pub owner: Option<String>,
	/// `S` system managed, `D` database managed.
	pub managed_by: Option<String>,
	pub data_type: Option<String>,
	pub page_size: i64,
	pub extent_size: i64,
	pub prefetch_size: i64,
	pub bufferpool_id: Option<i64>,
	pub create_time: Option<NaiveDateTime>,
	pub storage_group: Option<String>,
}

const TIERS: &[Tier<Tablespace>] = &[Tier {
	since: EngineVersion::V10_1,
	apply: |t, r| t.storage_group = r.trimmed_opt("SGNAME"),
}];

impl Tablespace {
	pub fn from_record(gate: &VersionGate, record: &Record) -> Option<Self> {
		let base = ObjectBase::from_record(record, "TBSPACE", Some("TBSPACEID"));
		if base.name.is_empty() {
			return None;
		}
		let mut tablespace = Tablespace {
			base,
			owner: record.trimmed_opt("OWNER"),
			managed_by: record.trimmed_opt("TBSPACETYPE"),
			data_type: record.trimmed_opt("DATATYPE"),
			page_size: record.int("PAGESIZE"),
			extent_size: record.int("EXTENTSIZE"),
			prefetch_size: record.int("PREFETCHSIZE"),
			bufferpool_id: record.int_opt("BUFFERPOOLID"),
			create_time: record.timestamp("CREATE_TIME"),
			storage_group: None,
		};
		gate.apply(&mut tablespace, record, TIERS);
		Some(tablespace)
	}
}

impl Entity for Tablespace {
	fn name(&self) -> &str {
		&self.base.name
	}
}
