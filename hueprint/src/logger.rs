//! The logging capability handed to the analyzer

use std::fmt;

/// Target used for records sent through the [`log`] facade
pub const LOG_TARGET: &str = "hueprint";

/// Receives diagnostics from an analysis.
///
/// The analysis functions themselves are pure; only the [`VisualAnalyzer`](crate::VisualAnalyzer)
/// reports through the logger it was built with.
pub trait Logger {
	/// Progress details, like the number of distinct colors or k-means iterations
	fn debug(&self, args: fmt::Arguments<'_>);

	/// Problems that degrade the result without stopping the analysis
	fn warn(&self, args: fmt::Arguments<'_>);

	/// Problems that stop the analysis
	fn error(&self, args: fmt::Arguments<'_>);
}

/// Forwards to the [`log`] crate macros
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
	fn debug(&self, args: fmt::Arguments<'_>) {
		log::debug!(target: LOG_TARGET, "{args}");
	}

	fn warn(&self, args: fmt::Arguments<'_>) {
		log::warn!(target: LOG_TARGET, "{args}");
	}

	fn error(&self, args: fmt::Arguments<'_>) {
		log::error!(target: LOG_TARGET, "{args}");
	}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Logger for Silent {
	fn debug(&self, _: fmt::Arguments<'_>) {}

	fn warn(&self, _: fmt::Arguments<'_>) {}

	fn error(&self, _: fmt::Arguments<'_>) {}
}

impl<L: Logger + ?Sized> Logger for &L {
	fn debug(&self, args: fmt::Arguments<'_>) {
		(**self).debug(args);
	}

	fn warn(&self, args: fmt::Arguments<'_>) {
		(**self).warn(args);
	}

	fn error(&self, args: fmt::Arguments<'_>) {
		(**self).error(args);
	}
}
