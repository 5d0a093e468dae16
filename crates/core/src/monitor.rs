// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use tracing::trace;

use crate::{Error, Result};

/// Cancellation context threaded through every loading call.
///
/// Clones share the same flag, so cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
	cancelled: Arc<AtomicBool>,
}

impl Monitor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::Release);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::Acquire)
	}

	pub fn check(&self) -> Result<()> {
		if self.is_cancelled() {
			return Err(Error::Cancelled);
		}
		Ok(())
	}

	pub fn subtask(&self, label: &str) {
		trace!(task = label, "monitor subtask");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clones_share_flag() {
		let monitor = Monitor::new();
		let other = monitor.clone();
		assert!(monitor.check().is_ok());
		other.cancel();
		assert!(monitor.is_cancelled());
		assert_eq!(monitor.check(), Err(Error::Cancelled));
	}
}
