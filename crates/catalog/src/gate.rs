// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use dbnav_core::{EngineVersion, Record};

/// Version-gated attribute group: applied to an entity only when the engine is at least `since`.
pub struct Tier<T> {
	pub since: EngineVersion,
	pub apply: fn(&mut T, &Record),
}

/// Decides which attributes and queries the connected engine supports.
///
/// The version is read once at connect time, so every entity built through the same gate
/// sees the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
	version: EngineVersion,
}

impl VersionGate {
	pub fn new(version: EngineVersion) -> Self {
		Self {
			version,
		}
	}

	pub fn version(&self) -> EngineVersion {
		self.version
	}

	pub fn supports(&self, min: EngineVersion) -> bool {
		self.version.is_at_least(min)
	}

	/// Runs every supported tier in table order.
	pub fn apply<T>(&self, target: &mut T, record: &Record, tiers: &[Tier<T>]) {
		for tier in tiers {
			if self.supports(tier.since) {
				(tier.apply)(target, record);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default, Debug, PartialEq)]
	struct Probe {
		owner_type: Option<String>,
		audit_policy: Option<String>,
	}

	const TIERS: &[Tier<Probe>] = &[
		Tier {
			since: EngineVersion::V9_5,
			apply: |p, r| p.owner_type = r.trimmed_opt("OWNERTYPE"),
		},
		Tier {
			since: EngineVersion::V10_1,
			apply: |p, r| p.audit_policy = r.trimmed_opt("AUDITPOLICYNAME"),
		},
	];

	fn record() -> Record {
		Record::new().with("OWNERTYPE", "U").with("AUDITPOLICYNAME", "POL1")
	}

	#[test]
	fn test_supports() {
		let gate = VersionGate::new(EngineVersion::V9_7);
		assert!(gate.supports(EngineVersion::V9_5));
		assert!(gate.supports(EngineVersion::V9_7));
		assert!(!gate.supports(EngineVersion::V10_1));
	}

	#[test]
	fn test_lower_version_skips_tiers() {
		let mut probe = Probe::default();
		VersionGate::new(EngineVersion::V9_1).apply(&mut probe, &record(), TIERS);
		assert_eq!(probe, Probe::default());
	}

	#[test]
	fn test_tiers_are_cumulative() {
		let mut mid = Probe::default();
		VersionGate::new(EngineVersion::V9_7).apply(&mut mid, &record(), TIERS);
		assert_eq!(mid.owner_type.as_deref(), Some("U"));
		assert_eq!(mid.audit_policy, None);

		let mut high = Probe::default();
		VersionGate::new(EngineVersion::V11_1).apply(&mut high, &record(), TIERS);
		assert_eq!(high.owner_type.as_deref(), Some("U"));
		assert_eq!(high.audit_policy.as_deref(), Some("POL1"));
	}
}
