// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// #![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(not(debug_assertions), deny(warnings))]
#![cfg_attr(not(debug_assertions), deny(clippy::unwrap_used))]
#![cfg_attr(not(debug_assertions), deny(clippy::expect_used))]

pub use alias::{Alias, AliasKind};
pub use base::{ObjectBase, ObjectStatistics, OwnerType};
pub use column::Column;
pub use config::CatalogConfig;
pub use constraint::{Constraint, ReferentialAction};
pub use container::{CatalogObject, Container};
pub use context::Context;
pub use data_type::{DataKind, DataType, MetaType};
pub use datasource::DataSource;
pub use dbnav_cache::Population;
pub use dbnav_core::{EngineVersion, Error, Identity, Monitor, NameCase, ObjectFilter, ObjectKind, Record, Value};
pub use dependency::Dependency;
pub use gate::{Tier, VersionGate};
pub use generic::GenericObject;
pub use index::{ColumnOrder, Index, IndexColumn, IndexUniqueness};
pub use refresh::RefreshTarget;
pub use resolve::ObjectRef;
pub use routine::Routine;
pub use schema::{Schema, SchemaInfo, StructureScope};
pub use sequence::Sequence;
pub use source::{CatalogSource, Query};
pub use table::{Table, TableInfo};
pub use tablespace::Tablespace;
pub use trigger::{Trigger, TriggerEvent, TriggerTime};

mod alias;
mod base;
mod column;
mod config;
mod constraint;
mod container;
mod context;
mod data_type;
mod datasource;
mod dependency;
mod gate;
mod generic;
mod index;
mod load;
mod refresh;
mod resolve;
mod routine;
mod schema;
mod sequence;
mod source;
mod statistics;
mod table;
mod tablespace;
pub mod test_utils;
mod trigger;

pub type Result<T> = std::result::Result<T, Error>;
