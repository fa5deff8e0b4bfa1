//! Observability helpers for relay flows.
//!
//! Every relay request is wrapped in a structured span named `oauth_relay.flow` carrying
//! the `flow` (entry point) and `stage` (provider call) fields. Enable the `metrics`
//! feature to additionally increment the `oauth_relay_flow_total` counter for every
//! attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Relay entry points observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Browser-driven callback redirect handling.
	CallbackRelay,
	/// Client-driven direct code exchange.
	DirectExchange,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::CallbackRelay => "callback_relay",
			FlowKind::DirectExchange => "direct_exchange",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a relay flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure surfaced back to the caller as an error outcome.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
