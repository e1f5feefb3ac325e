//! Errors returned by the analyzer

use thiserror::Error;

/// Failures that prevent an analysis from running at all.
///
/// Recoverable problems, like a channel value that maps outside the histogram,
/// do not show up here. They are skipped, counted in [`AnalysisStats`](crate::AnalysisStats),
/// and reported as warnings through the analyzer's [`Logger`](crate::Logger).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
	/// The pixel buffer cannot be read as `width * height` RGBA pixels
	#[error("pixel context unavailable: {width}x{height} RGBA pixels need {expected} bytes, but the buffer has {actual}")]
	ContextUnavailable {
		/// Image width in pixels
		width: u32,
		/// Image height in pixels
		height: u32,
		/// Number of bytes a `width * height` RGBA buffer must have
		expected: u64,
		/// Number of bytes actually provided
		actual: usize,
	},
}
