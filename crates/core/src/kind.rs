// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
	Schema,
	Table,
	View,
	MaterializedQueryTable,
	Nickname,
	Column,
	Index,
	PrimaryKey,
	UniqueKey,
	ForeignKey,
	CheckConstraint,
	Trigger,
	Procedure,
	Function,
	Method,
	Sequence,
	Alias,
	Package,
	Module,
	XmlSchema,
	DataType,
	Tablespace,
	Bufferpool,
	StorageGroup,
	Role,
	Variable,
	RemoteServer,
	Wrapper,
}

impl ObjectKind {
	/// Short stable code used inside cache keys.
	pub fn code(&self) -> u8 {
		*self as u8
	}

	pub fn is_table_like(&self) -> bool {
		matches!(
			self,
			ObjectKind::Table | ObjectKind::View | ObjectKind::MaterializedQueryTable | ObjectKind::Nickname
		)
	}

	pub fn is_routine(&self) -> bool {
		matches!(self, ObjectKind::Procedure | ObjectKind::Function | ObjectKind::Method)
	}

	pub fn is_constraint(&self) -> bool {
		matches!(
			self,
			ObjectKind::PrimaryKey
				| ObjectKind::UniqueKey | ObjectKind::ForeignKey
				| ObjectKind::CheckConstraint
		)
	}

	/// Kinds owned directly by the data source rather than by a schema.
	pub fn is_top_level(&self) -> bool {
		matches!(
			self,
			ObjectKind::Schema
				| ObjectKind::Tablespace | ObjectKind::Bufferpool
				| ObjectKind::StorageGroup | ObjectKind::Role
				| ObjectKind::Variable | ObjectKind::RemoteServer
				| ObjectKind::Wrapper
		)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ObjectKind::Schema => "SCHEMA",
			ObjectKind::Table => "TABLE",
			ObjectKind::View => "VIEW",
			ObjectKind::MaterializedQueryTable => "MATERIALIZED QUERY TABLE",
			ObjectKind::Nickname => "NICKNAME",
			ObjectKind::Column => "COLUMN",
			ObjectKind::Index => "INDEX",
			ObjectKind::PrimaryKey => "PRIMARY KEY",
			ObjectKind::UniqueKey => "UNIQUE KEY",
			ObjectKind::ForeignKey => "FOREIGN KEY",
			ObjectKind::CheckConstraint => "CHECK",
			ObjectKind::Trigger => "TRIGGER",
			ObjectKind::Procedure => "PROCEDURE",
			ObjectKind::Function => "FUNCTION",
			ObjectKind::Method => "METHOD",
			ObjectKind::Sequence => "SEQUENCE",
			ObjectKind::Alias => "ALIAS",
			ObjectKind::Package => "PACKAGE",
			ObjectKind::Module => "MODULE",
			ObjectKind::XmlSchema => "XML SCHEMA",
			ObjectKind::DataType => "DATA TYPE",
			ObjectKind::Tablespace => "TABLESPACE",
			ObjectKind::Bufferpool => "BUFFERPOOL",
			ObjectKind::StorageGroup => "STORAGE GROUP",
			ObjectKind::Role => "ROLE",
			ObjectKind::Variable => "VARIABLE",
			ObjectKind::RemoteServer => "REMOTE SERVER",
			ObjectKind::Wrapper => "WRAPPER",
		}
	}
}

impl Display for ObjectKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
