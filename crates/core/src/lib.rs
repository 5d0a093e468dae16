// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

// #![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(not(debug_assertions), deny(warnings))]
#![cfg_attr(not(debug_assertions), deny(clippy::unwrap_used))]
#![cfg_attr(not(debug_assertions), deny(clippy::expect_used))]

pub use error::Error;
pub use filter::ObjectFilter;
pub use identity::{Identity, IdentityKey, NameCase};
pub use kind::ObjectKind;
pub use monitor::Monitor;
pub use value::{Record, Value};
pub use version::EngineVersion;

mod error;
mod filter;
mod identity;
mod kind;
mod monitor;
mod value;
mod version;

pub type Result<T> = std::result::Result<T, Error>;
