// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use dbnav_core::{EngineVersion, Monitor, Record};

use crate::Result;

/// Backing store of catalog metadata. Implementations translate a [`Query`] into whatever
/// the engine understands and return rows named after the engine's catalog views.
pub trait CatalogSource: Send + Sync {
	fn fetch(&self, monitor: &Monitor, query: &Query) -> Result<Vec<Record>>;

	fn server_version(&self, monitor: &Monitor) -> Result<EngineVersion>;

	/// Schema the session resolves unqualified names against, if the engine reports one.
	fn current_schema(&self, _monitor: &Monitor) -> Result<Option<String>> {
		Ok(None)
	}
}

/// One catalog query. `Option` scopes narrow a bulk query to a single parent or object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
	Schemas {
		name: Option<String>,
	},
	/// System data types when `schema` is `None`, user-defined types of one schema otherwise.
	DataTypes {
		schema: Option<String>,
		exclude_module_types: bool,
	},
	Tablespaces,
	Bufferpools,
	StorageGroups,
	Roles,
	Variables,
	RemoteServers,
	Wrappers,
	Tables {
		schema: String,
		name: Option<String>,
	},
	Columns {
		schema: String,
		table: Option<String>,
	},
	Indexes {
		schema: String,
		table: Option<String>,
	},
	UniqueKeys {
		schema: String,
		table: Option<String>,
	},
	ForeignKeys {
		schema: String,
		table: Option<String>,
	},
	/// Foreign keys of any table that point at `table`.
	References {
		schema: String,
		table: Option<String>,
	},
	Checks {
		schema: String,
		table: Option<String>,
	},
	Triggers {
		schema: String,
		table: Option<String>,
	},
	Dependencies {
		schema: String,
		table: String,
	},
	Routines {
		schema: String,
		name: Option<String>,
	},
	Sequences {
		schema: String,
	},
	Aliases {
		schema: String,
	},
	Packages {
		schema: String,
	},
	Modules {
		schema: String,
	},
	XmlSchemas {
		schema: String,
	},
	TableSizes {
		schema: String,
		total_only: bool,
	},
	SchemaSizes {
		total_only: bool,
	},
}

impl Query {
	/// The same query restricted to one object, when the query supports it.
	pub fn narrowed(&self, name: &str) -> Option<Query> {
		match self {
			Query::Schemas {
				..
			} => Some(Query::Schemas {
				name: Some(name.to_string()),
			}),
			Query::Tables {
				schema,
				..
			} => Some(Query::Tables {
				schema: schema.clone(),
				name: Some(name.to_string()),
			}),
			Query::Routines {
				schema,
				..
			} => Some(Query::Routines {
				schema: schema.clone(),
				name: Some(name.to_string()),
			}),
			_ => None,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Query::Schemas {
				..
			} => "schemas",
			Query::DataTypes {
				..
			} => "data types",
			Query::Tablespaces => "tablespaces",
			Query::Bufferpools => "bufferpools",
			Query::StorageGroups => "storage groups",
			Query::Roles => "roles",
			Query::Variables => "variables",
			Query::RemoteServers => "remote servers",
			Query::Wrappers => "wrappers",
			Query::Tables {
				..
			} => "tables",
			Query::Columns {
				..
			} => "columns",
			Query::Indexes {
				..
			} => "indexes",
			Query::UniqueKeys {
				..
			} => "unique keys",
			Query::ForeignKeys {
				..
			} => "foreign keys",
			Query::References {
				..
			} => "references",
			Query::Checks {
				..
			} => "check constraints",
			Query::Triggers {
				..
			} => "triggers",
			Query::Dependencies {
				..
			} => "dependencies",
			Query::Routines {
				..
			} => "routines",
			Query::Sequences {
				..
			} => "sequences",
			Query::Aliases {
				..
			} => "aliases",
			Query::Packages {
				..
			} => "packages",
			Query::Modules {
				..
			} => "modules",
			Query::XmlSchemas {
				..
			} => "xml schemas",
			Query::TableSizes {
				..
			} => "table sizes",
			Query::SchemaSizes {
				..
			} => "schema sizes",
		}
	}
}

impl Display for Query {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())?;
		match self {
			Query::Tables {
				schema,
				name: Some(name),
			}
			| Query::Routines {
				schema,
				name: Some(name),
			} => write!(f, " {schema}.{name}"),
			Query::Columns {
				schema,
				table: Some(table),
			}
			| Query::Indexes {
				schema,
				table: Some(table),
			}
			| Query::UniqueKeys {
				schema,
				table: Some(table),
			}
			| Query::ForeignKeys {
				schema,
				table: Some(table),
			}
			| Query::References {
				schema,
				table: Some(table),
			}
			| Query::Checks {
				schema,
				table: Some(table),
			}
			| Query::Triggers {
				schema,
				table: Some(table),
			}
			| Query::Dependencies {
				schema,
				table,
			} => write!(f, " of {schema}.{table}"),
			Query::Schemas {
				name: Some(name),
			} => write!(f, " {name}"),
			Query::DataTypes {
				schema: Some(schema),
				..
			}
			| Query::Tables {
				schema,
				..
			}
			| Query::Routines {
				schema,
				..
			}
			| Query::Columns {
				schema,
				..
			}
			| Query::Indexes {
				schema,
				..
			}
			| Query::UniqueKeys {
				schema,
				..
			}
			| Query::ForeignKeys {
				schema,
				..
			}
			| Query::References {
				schema,
				..
			}
			| Query::Checks {
				schema,
				..
			}
			| Query::Triggers {
				schema,
				..
			}
			| Query::Sequences {
				schema,
			}
			| Query::Aliases {
				schema,
			}
			| Query::Packages {
				schema,
			}
			| Query::Modules {
				schema,
			}
			| Query::XmlSchemas {
				schema,
			}
			| Query::TableSizes {
				schema,
				..
			} => write!(f, " in {schema}"),
			_ => Ok(()),
		}
	}
}
