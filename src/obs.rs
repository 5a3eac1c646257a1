//! Observability helpers for relay stages.
//!
//! # Feature Flags
//!
//! - Spans named `forma_relay.stage` carry the `stage` (upstream call) and `op` (call site) fields.
//! - Enable `metrics` to increment the `forma_relay_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Upstream calls made while relaying an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// APS client-credentials exchange.
	TokenExchange,
	/// Forma Integrate element creation.
	ElementCreate,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::TokenExchange => "token_exchange",
			Stage::ElementCreate => "element_create",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}

	/// Maps a stage result onto its outcome label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		match result {
			Ok(_) => Outcome::Success,
			Err(_) => Outcome::Failure,
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a stage span, recording attempt and outcome.
pub async fn observe<Fut, T>(stage: Stage, op: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = StageSpan::new(stage, op);

	record_stage_outcome(stage, Outcome::Attempt);

	let result = span.instrument(fut).await;

	record_stage_outcome(stage, Outcome::of(&result));

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[test]
	fn labels_are_stable() {
		assert_eq!(Stage::TokenExchange.to_string(), "token_exchange");
		assert_eq!(Stage::ElementCreate.to_string(), "element_create");
		assert_eq!(Outcome::of::<(), ()>(&Err(())), Outcome::Failure);
		assert_eq!(Outcome::of::<(), ()>(&Ok(())), Outcome::Success);
	}

	#[tokio::test]
	async fn observe_passes_results_through() {
		let value = observe(Stage::ElementCreate, "test", async { Ok(7) }).await;

		assert_eq!(value.expect("Successful futures should pass through."), 7);

		let err = observe::<_, ()>(Stage::TokenExchange, "test", async {
			Err(ConfigError::MissingCredentials.into())
		})
		.await
		.expect_err("Failing futures should pass through.");

		assert!(matches!(err, Error::Config(ConfigError::MissingCredentials)));
	}
}
