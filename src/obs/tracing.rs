// crates.io
use tracing::{Instrument, instrument::Instrumented};
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, obs::Stage};

/// A span builder used around upstream calls.
#[derive(Clone, Debug)]
pub struct StageSpan {
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage + call site.
	pub fn new(stage: Stage, op: &'static str) -> Self {
		Self { span: tracing::info_span!("forma_relay.stage", stage = stage.as_str(), op) }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

/// Installs the global `fmt` subscriber, filtered by `RUST_LOG` (defaults to `info`).
pub fn init_subscriber() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	// self
	use super::{Stage, StageSpan};

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(Stage::TokenExchange, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
