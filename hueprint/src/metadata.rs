//! The visual fingerprint produced by the analyzer

use crate::Histogram;
use palette::Srgb;

/// Relative luminance statistics over all pixels, each in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Brightness {
	/// Mean luminance
	pub average: f64,
	/// Luminance of the darkest pixel
	pub min: f64,
	/// Luminance of the brightest pixel
	pub max: f64,
}

/// A per-channel variance summary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelVariance {
	/// Red channel variance
	pub r: f64,
	/// Green channel variance
	pub g: f64,
	/// Blue channel variance
	pub b: f64,
}

impl ChannelVariance {
	/// The mean variance over the three channels
	#[must_use]
	pub fn mean(&self) -> f64 {
		(self.r + self.g + self.b) / 3.0
	}
}

/// A compact description of how an image looks.
///
/// `dominant_colors` and `histogram` are always present in metadata produced by
/// [`VisualAnalyzer`](crate::VisualAnalyzer), but may be missing from metadata
/// stored by older or external producers. The [comparators](crate::compare)
/// fall back to `average_color` in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMetadata {
	/// The mean color of all pixels
	pub average_color: Srgb<u8>,
	/// k-means centroids, ranked by how many pixels they represent
	pub dominant_colors: Option<Vec<Srgb<u8>>>,
	/// Median cut palette, in box order
	pub representative_palette: Vec<Srgb<u8>>,
	/// Colors chosen from a larger median cut palette to be far apart
	pub distinct_palette: Vec<Srgb<u8>>,
	/// Per-channel histograms
	pub histogram: Option<Histogram>,
	/// Luminance statistics
	pub brightness: Brightness,
	/// High percentile of the per-block color variance
	pub color_variance: ChannelVariance,
}

impl VisualMetadata {
	/// Metadata for an image without pixels
	#[must_use]
	pub fn empty(histogram: Histogram) -> Self {
		Self {
			average_color: Srgb::new(0, 0, 0),
			dominant_colors: Some(Vec::new()),
			representative_palette: Vec::new(),
			distinct_palette: Vec::new(),
			histogram: Some(histogram),
			brightness: Brightness::default(),
			color_variance: ChannelVariance::default(),
		}
	}

	/// Metadata that only knows its average color
	#[must_use]
	pub fn from_average(average_color: Srgb<u8>) -> Self {
		let luminance = crate::color::color_luminance(average_color);
		Self {
			average_color,
			dominant_colors: None,
			representative_palette: Vec::new(),
			distinct_palette: Vec::new(),
			histogram: None,
			brightness: Brightness { average: luminance, min: luminance, max: luminance },
			color_variance: ChannelVariance::default(),
		}
	}
}
