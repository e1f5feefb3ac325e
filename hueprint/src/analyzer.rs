//! Runs every analysis step over one image to produce its [`VisualMetadata`]

use crate::{
	color, counts::CountsBuilder, diversity, histogram, kmeans, median_cut, variance, AnalysisError, Brightness,
	ColorCounts, Histogram, LogFacade, Logger, Pixels, VisualMetadata,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// Default number of dominant colors and palette colors
pub const DEFAULT_PALETTE_SIZE: usize = 5;

/// Default saturation boost used for palette extraction
pub const DEFAULT_SATURATION_BOOST: f64 = 1.0;

/// Parameters for [`VisualAnalyzer`].
///
/// Every field has a sensible default, so the usual way to build one is
/// `AnalyzerConfig::default().with_dominant_colors(8)` and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
	/// Number of histogram bins per channel, in `1..=256`
	pub histogram_bins: u16,
	/// Maximum number of dominant colors (k for k-means)
	pub dominant_colors: usize,
	/// Size of the representative and distinct palettes
	pub palette_size: usize,
	/// The distinct palette is picked from a median cut palette this many times larger
	pub candidate_factor: usize,
	/// How much saturated colors are favored when extracting palettes
	pub saturation_boost: f64,
	/// Maximum number of k-means iterations
	pub max_iterations: u32,
	/// k-means stops once no centroid moves this squared distance or more
	pub convergence: f64,
	/// Width and height of the blocks used for color variance
	pub block_size: u32,
	/// Percentile of the block variances to report, in `0.0..=1.0`
	pub variance_percentile: f64,
	/// Leave pixels with a zero channel out of the block variance
	pub exclude_zero_channels: bool,
	/// Seed for the random number generator used by k-means
	pub seed: u64,
}

impl Default for AnalyzerConfig {
	fn default() -> Self {
		Self {
			histogram_bins: histogram::DEFAULT_BINS,
			dominant_colors: DEFAULT_PALETTE_SIZE,
			palette_size: DEFAULT_PALETTE_SIZE,
			candidate_factor: diversity::DEFAULT_CANDIDATE_FACTOR,
			saturation_boost: DEFAULT_SATURATION_BOOST,
			max_iterations: kmeans::DEFAULT_MAX_ITERATIONS,
			convergence: kmeans::DEFAULT_CONVERGENCE,
			block_size: variance::DEFAULT_BLOCK_SIZE,
			variance_percentile: variance::DEFAULT_PERCENTILE,
			exclude_zero_channels: false,
			seed: 0,
		}
	}
}

impl AnalyzerConfig {
	/// Set the number of histogram bins, which should be in `1..=256`
	#[must_use]
	pub fn with_histogram_bins(mut self, bins: u16) -> Self {
		debug_assert!((1..=256).contains(&bins));
		self.histogram_bins = bins.clamp(1, 256);
		self
	}

	/// Set the maximum number of dominant colors
	#[must_use]
	pub const fn with_dominant_colors(mut self, k: usize) -> Self {
		self.dominant_colors = k;
		self
	}

	/// Set the size of the representative and distinct palettes
	#[must_use]
	pub const fn with_palette_size(mut self, size: usize) -> Self {
		self.palette_size = size;
		self
	}

	/// Set the candidate palette factor for the distinct palette, at least `1`
	#[must_use]
	pub fn with_candidate_factor(mut self, factor: usize) -> Self {
		self.candidate_factor = factor.max(1);
		self
	}

	/// Set the saturation boost, which should be `>= 0.0`
	#[must_use]
	pub fn with_saturation_boost(mut self, factor: f64) -> Self {
		debug_assert!(factor >= 0.0);
		self.saturation_boost = factor;
		self
	}

	/// Set the maximum number of k-means iterations
	#[must_use]
	pub const fn with_max_iterations(mut self, max_iter: u32) -> Self {
		self.max_iterations = max_iter;
		self
	}

	/// Set the k-means convergence threshold (squared distance in RGB)
	#[must_use]
	pub fn with_convergence(mut self, convergence: f64) -> Self {
		debug_assert!(convergence >= 0.0);
		self.convergence = convergence;
		self
	}

	/// Set the block size used for color variance, at least `1`
	#[must_use]
	pub fn with_block_size(mut self, size: u32) -> Self {
		self.block_size = size.max(1);
		self
	}

	/// Set the reported block variance percentile, which should be in `0.0..=1.0`
	#[must_use]
	pub fn with_variance_percentile(mut self, percentile: f64) -> Self {
		debug_assert!((0.0..=1.0).contains(&percentile));
		self.variance_percentile = percentile;
		self
	}

	/// Leave pixels with a zero channel out of the block variance
	#[must_use]
	pub const fn with_exclude_zero_channels(mut self, exclude: bool) -> Self {
		self.exclude_zero_channels = exclude;
		self
	}

	/// Set the random seed used by k-means
	#[must_use]
	pub const fn with_seed(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}
}

/// Numbers about a single analysis that are not part of the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisStats {
	/// Number of pixels analyzed
	pub pixels: u64,
	/// Number of distinct colors
	pub distinct_colors: usize,
	/// Number of channel values that could not be recorded in the histogram
	pub skipped_channels: u64,
	/// Number of k-means iterations run for the dominant colors
	pub kmeans_iterations: u32,
}

/// Everything gathered from the single pass over the pixels
struct Scan {
	/// Per-channel histograms
	histogram: Histogram,
	/// Channel sums for the average color
	sums: [u64; 3],
	/// Distinct colors and their counts
	counts: ColorCounts,
	/// Channel values the histogram could not record
	skipped: u64,
}

impl Scan {
	/// Visit every pixel once
	fn new(pixels: &Pixels, bins: u16) -> Self {
		let mut histogram = Histogram::new(bins);
		let mut sums = [0u64; 3];
		let mut builder = CountsBuilder::default();
		let mut skipped = 0;

		for pixel in pixels.as_slice() {
			let color = pixel.color;
			skipped += u64::from(histogram.record(color));
			sums[0] += u64::from(color.red);
			sums[1] += u64::from(color.green);
			sums[2] += u64::from(color.blue);
			builder.add(color, 1);
		}

		Self { histogram, sums, counts: builder.finish(), skipped }
	}

	/// The mean color, rounded
	#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn average_color(&self) -> Srgb<u8> {
		let total = self.histogram.total_pixels;
		if total == 0 {
			return Srgb::new(0, 0, 0);
		}
		let total = total as f64;
		color::to_srgb(self.sums.map(|sum| sum as f64 / total))
	}

	/// Luminance statistics.
	///
	/// Every pixel of a color has the same luminance,
	/// so this only needs to visit the distinct colors.
	fn brightness(&self) -> Brightness {
		let mut sum = 0.0;
		let mut min = f64::INFINITY;
		let mut max = f64::NEG_INFINITY;
		for (color, n) in self.counts.pairs() {
			let luminance = color::color_luminance(color);
			sum += f64::from(n) * luminance;
			min = min.min(luminance);
			max = max.max(luminance);
		}

		if self.counts.is_empty() {
			Brightness::default()
		} else {
			#[allow(clippy::cast_precision_loss)]
			let average = sum / self.histogram.total_pixels as f64;
			Brightness { average, min, max }
		}
	}
}

/// Produces [`VisualMetadata`] from pixels using a fixed configuration.
///
/// Analyses are independent, so one analyzer can be shared across threads
/// (given a `Sync` logger).
#[derive(Debug, Clone)]
pub struct VisualAnalyzer<L = LogFacade> {
	/// Analysis parameters
	config: AnalyzerConfig,
	/// Where diagnostics go
	logger: L,
}

impl VisualAnalyzer {
	/// Create an analyzer that logs through the [`log`] crate
	#[must_use]
	pub const fn new(config: AnalyzerConfig) -> Self {
		Self { config, logger: LogFacade }
	}
}

impl Default for VisualAnalyzer {
	fn default() -> Self {
		Self::new(AnalyzerConfig::default())
	}
}

impl<L: Logger> VisualAnalyzer<L> {
	/// Create an analyzer that reports to the given logger
	#[must_use]
	pub const fn with_logger(config: AnalyzerConfig, logger: L) -> Self {
		Self { config, logger }
	}

	/// The analysis parameters
	#[must_use]
	pub const fn config(&self) -> &AnalyzerConfig {
		&self.config
	}

	/// Analyze the given pixels, seeding k-means with the configured seed
	#[must_use]
	pub fn analyze(&self, pixels: &Pixels) -> VisualMetadata {
		self.analyze_with_stats(pixels).0
	}

	/// Analyze the given pixels, also returning statistics about the analysis
	#[must_use]
	pub fn analyze_with_stats(&self, pixels: &Pixels) -> (VisualMetadata, AnalysisStats) {
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(self.config.seed);
		self.analyze_with_rng(pixels, &mut rng)
	}

	/// Analyze an RGBA buffer of `width * height` pixels.
	///
	/// # Errors
	/// Returns [`AnalysisError::ContextUnavailable`] if the buffer does not hold
	/// exactly `width * height` RGBA pixels.
	pub fn analyze_bytes(&self, data: &[u8], width: u32, height: u32) -> Result<VisualMetadata, AnalysisError> {
		match Pixels::new(data, width, height) {
			Ok(pixels) => Ok(self.analyze(&pixels)),
			Err(e) => {
				self.logger.error(format_args!("{e}"));
				Err(e)
			},
		}
	}

	/// Analyze a decoded RGBA image
	#[must_use]
	pub fn analyze_image(&self, image: &image::RgbaImage) -> VisualMetadata {
		self.analyze(&Pixels::from_image(image))
	}

	/// Analyze the given pixels using the given random number generator for k-means
	#[must_use]
	pub fn analyze_with_rng(&self, pixels: &Pixels, rng: &mut impl Rng) -> (VisualMetadata, AnalysisStats) {
		let config = &self.config;
		let scan = Scan::new(pixels, config.histogram_bins);

		let mut stats = AnalysisStats {
			pixels: scan.histogram.total_pixels,
			distinct_colors: scan.counts.num_colors(),
			skipped_channels: scan.skipped,
			kmeans_iterations: 0,
		};

		if scan.skipped > 0 {
			self.logger.warn(format_args!(
				"skipped {} channel values that fell outside the {} histogram bins",
				scan.skipped, config.histogram_bins,
			));
		}

		if scan.counts.is_empty() {
			self.logger.debug(format_args!("no pixels to analyze"));
			return (VisualMetadata::empty(scan.histogram), stats);
		}

		self.logger.debug(format_args!(
			"reduced {} pixels to {} distinct colors",
			stats.pixels, stats.distinct_colors,
		));

		let dominant = kmeans::run(
			&scan.counts,
			config.dominant_colors,
			config.max_iterations,
			config.convergence,
			rng,
		);
		stats.kmeans_iterations = dominant.iterations;
		self.logger.debug(format_args!(
			"k-means found {} dominant colors in {} iterations",
			dominant.centroids.len(),
			dominant.iterations,
		));

		let weights = scan.counts.boosted_weights(config.saturation_boost);
		let representative = median_cut::quantize(scan.counts.colors(), &weights, config.palette_size);

		let candidates = median_cut::quantize(
			scan.counts.colors(),
			&weights,
			config.palette_size.saturating_mul(config.candidate_factor),
		);
		let distinct = diversity::select_distinct(&candidates, config.palette_size);
		self.logger.debug(format_args!(
			"picked {} distinct colors from {} candidates",
			distinct.len(),
			candidates.len(),
		));

		let color_variance = variance::color_variance(
			pixels,
			config.block_size,
			config.variance_percentile,
			config.exclude_zero_channels,
		);

		let metadata = VisualMetadata {
			average_color: scan.average_color(),
			dominant_colors: Some(dominant.centroids),
			representative_palette: representative,
			distinct_palette: distinct,
			brightness: scan.brightness(),
			histogram: Some(scan.histogram),
			color_variance,
		};

		(metadata, stats)
	}
}

impl<L: Logger + Sync> VisualAnalyzer<L> {
	/// Analyze many images, each independently with the configured seed
	#[cfg(feature = "threads")]
	#[must_use]
	pub fn analyze_batch(&self, images: &[Pixels]) -> Vec<VisualMetadata> {
		use rayon::prelude::*;
		images.par_iter().map(|pixels| self.analyze(pixels)).collect()
	}

	/// Analyze many images, each independently with the configured seed
	#[cfg(not(feature = "threads"))]
	#[must_use]
	pub fn analyze_batch(&self, images: &[Pixels]) -> Vec<VisualMetadata> {
		images.iter().map(|pixels| self.analyze(pixels)).collect()
	}
}
