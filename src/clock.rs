//! Time source used to salt product codes.

use chrono::Utc;

/// Source of the current instant, in milliseconds since the Unix epoch.
pub trait Clock {
	fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
	fn now_millis(&self) -> i64 {
		self.0
	}
}

impl<C: Clock + ?Sized> Clock for &C {
	fn now_millis(&self) -> i64 {
		(**self).now_millis()
	}
}
