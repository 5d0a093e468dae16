// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_core::{EngineVersion, Error, NameCase, ObjectFilter};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
	/// Folding applied to names before they are used as cache keys.
	pub name_case: NameCase,
	pub show_system_schemas: bool,
	pub schema_filter: ObjectFilter,
	pub table_filter: ObjectFilter,
	/// Assumed when the engine version cannot be read at connect time.
	pub fallback_version: EngineVersion,
	pub max_alias_depth: usize,
}

impl Default for CatalogConfig {
	fn default() -> Self {
		Self {
			name_case: NameCase::Exact,
			show_system_schemas: true,
			schema_filter: ObjectFilter::default(),
			table_filter: ObjectFilter::default(),
			fallback_version: EngineVersion::V9_1,
			max_alias_depth: 16,
		}
	}
}

impl CatalogConfig {
	pub fn from_json(text: &str) -> Result<Self> {
		let config: CatalogConfig = serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.max_alias_depth == 0 {
			return Err(Error::Config("max_alias_depth must be at least 1".to_string()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = CatalogConfig::default();
		assert!(config.show_system_schemas);
		assert_eq!(config.fallback_version, EngineVersion::V9_1);
		assert_eq!(config.name_case, NameCase::Exact);
	}

	#[test]
	fn test_partial_json_keeps_defaults() {
		let config = CatalogConfig::from_json(r#"{ "name_case": "upper", "show_system_schemas": false }"#).unwrap();
		assert_eq!(config.name_case, NameCase::Upper);
		assert!(!config.show_system_schemas);
		assert_eq!(config.max_alias_depth, 16);
	}

	#[test]
	fn test_json_filters_and_version() {
		let config = CatalogConfig::from_json(
			r#"{
				"schema_filter": { "include": ["APP%"], "exclude": ["APPTMP"] },
				"fallback_version": { "major": 10, "minor": 5 }
			}"#,
		)
		.unwrap();
		assert!(config.schema_filter.matches("APPDATA"));
		assert!(!config.schema_filter.matches("APPTMP"));
		assert_eq!(config.fallback_version, EngineVersion::V10_5);
	}

	#[test]
	fn test_invalid_json() {
		assert!(matches!(CatalogConfig::from_json("{ not json"), Err(Error::Config(_))));
		assert!(matches!(CatalogConfig::from_json(r#"{ "max_alias_depth": 0 }"#), Err(Error::Config(_))));
	}
}
