//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use hueprint::{compare, AnalyzerConfig, VisualMetadata};
use std::{
	cmp::Ordering,
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the printed colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Orders to rank the images in
#[derive(Copy, Clone, ValueEnum)]
pub enum SortImages {
	/// Brightest dominant colors first
	Luminance,
	/// Ascending hue, grayscale images last
	Hue,
	/// Most saturated first, grayscale images last
	Saturation,
	/// Widest tonal range first
	Range,
	/// Darkest first
	Dark,
	/// Brightest first
	Bright,
	/// Most varied palette first
	Diversity,
	/// Warmest first
	Temperature,
}

impl SortImages {
	/// The comparator for this order
	///
	/// `grayscale_threshold` decides which colors have no hue when sorting by hue.
	pub fn comparator(self, grayscale_threshold: f64) -> Box<dyn Fn(&VisualMetadata, &VisualMetadata) -> Ordering> {
		match self {
			SortImages::Luminance => Box::new(compare::by_luminance),
			SortImages::Hue => Box::new(move |a: &VisualMetadata, b: &VisualMetadata| {
				compare::by_hue_with_threshold(a, b, grayscale_threshold)
			}),
			SortImages::Saturation => Box::new(compare::by_saturation),
			SortImages::Range => Box::new(compare::by_color_range),
			SortImages::Dark => Box::new(compare::by_dark_colors),
			SortImages::Bright => Box::new(compare::by_bright_colors),
			SortImages::Diversity => Box::new(compare::by_diversity),
			SortImages::Temperature => Box::new(compare::by_temperature),
		}
	}
}

/// Print the visual fingerprint of one or more images:
/// average color, dominant colors, palettes, brightness, and color variance.
///
/// With --sort, the images are printed ranked by the chosen visual property.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The paths to the input images
	#[arg(required = true)]
	pub images: Vec<PathBuf>,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// Rank the images by a visual property
	#[arg(short, long)]
	pub sort: Option<SortImages>,

	/// Reverse the printed order of the images
	#[arg(short, long)]
	pub reverse: bool,

	/// Print the per-channel histograms
	#[arg(long)]
	pub histogram: bool,

	/// The (maximum) number of dominant colors to find
	#[arg(short, default_value_t = hueprint::DEFAULT_PALETTE_SIZE)]
	pub k: usize,

	/// The number of colors in the representative and distinct palettes
	#[arg(short = 'n', long, default_value_t = hueprint::DEFAULT_PALETTE_SIZE)]
	pub palette_size: usize,

	/// How many times larger the candidate palette for the distinct palette is
	///
	/// The distinct palette picks colors that are far apart from a median cut palette of
	/// palette-size * candidate-factor colors. A factor of 1 just reorders the representative palette.
	#[arg(long, default_value_t = hueprint::diversity::DEFAULT_CANDIDATE_FACTOR, value_parser = parse_at_least_one)]
	pub candidate_factor: usize,

	/// How much saturated colors are favored when building palettes
	///
	/// Each color is weighted by count * (1 + boost * saturation). A value of 0.0 uses plain pixel counts.
	#[arg(short = 'b', long, default_value_t = hueprint::DEFAULT_SATURATION_BOOST, value_parser = parse_non_negative)]
	pub saturation_boost: f64,

	/// Colors whose channels all differ by less than this fraction of 255 are considered gray
	///
	/// Only used by --sort hue. Gray colors carry no hue and images without any other color sort last.
	#[arg(long, default_value_t = hueprint::color::DEFAULT_GRAYSCALE_THRESHOLD, value_parser = parse_unit_interval)]
	pub grayscale_threshold: f64,

	/// The maximum number of k-means iterations
	///
	/// You can use the --verbose option to see how many iterations k-means took.
	#[arg(short = 'i', long, default_value_t = hueprint::kmeans::DEFAULT_MAX_ITERATIONS)]
	pub max_iter: u32,

	/// k-means stops once no centroid moves at least this squared distance in RGB
	#[arg(short = 'e', long, default_value_t = hueprint::kmeans::DEFAULT_CONVERGENCE, value_parser = parse_non_negative)]
	pub convergence_threshold: f64,

	/// The number of histogram bins per channel
	#[arg(long, default_value_t = hueprint::histogram::DEFAULT_BINS, value_parser = clap::value_parser!(u16).range(1..=256))]
	pub bins: u16,

	/// The width and height of the blocks used to measure color variance
	#[arg(long, default_value_t = hueprint::variance::DEFAULT_BLOCK_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
	pub block_size: u32,

	/// The percentile of the block variances to report, in [0.0, 1.0]
	#[arg(long, default_value_t = hueprint::variance::DEFAULT_PERCENTILE, value_parser = parse_unit_interval)]
	pub variance_percentile: f64,

	/// Leave pixels with a zero channel out of the color variance
	#[arg(long)]
	pub exclude_zero_channels: bool,

	/// The maximum image size, in number of pixels, before a thumbnail is created
	///
	/// Thumbnails speed up large images at the cost of some color accuracy,
	/// as multiple pixels in the original image are interpolated to form a pixel in the thumbnail.
	#[arg(short = 'p', long, default_value_t = u32::MAX)]
	pub max_pixels: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// The number of threads used to analyze images
	///
	/// A value of 0 uses as many threads as there are logical cores.
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Print additional information, such as timings and the number of k-means iterations
	#[arg(long)]
	pub verbose: bool,
}

impl Options {
	/// The analyzer configuration described by these options
	pub fn config(&self) -> AnalyzerConfig {
		AnalyzerConfig::default()
			.with_histogram_bins(self.bins)
			.with_dominant_colors(self.k)
			.with_palette_size(self.palette_size)
			.with_candidate_factor(self.candidate_factor)
			.with_saturation_boost(self.saturation_boost)
			.with_max_iterations(self.max_iter)
			.with_convergence(self.convergence_threshold)
			.with_block_size(self.block_size)
			.with_variance_percentile(self.variance_percentile)
			.with_exclude_zero_channels(self.exclude_zero_channels)
			.with_seed(self.seed)
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse a float and ensure it is >= `0.0`
fn parse_non_negative(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..)
}

/// Parse a float and ensure it is in `0.0..=1.0`
fn parse_unit_interval(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..=1.0)
}

/// Parse a count and ensure it is at least `1`
fn parse_at_least_one(s: &str) -> Result<usize, String> {
	let value: usize = s.parse().map_err(|e| format!("{e}"))?;
	if value >= 1 {
		Ok(value)
	} else {
		Err("must be at least 1".to_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn float_ranges() {
		assert_eq!(parse_unit_interval("0.5"), Ok(0.5));
		assert!(parse_unit_interval("1.5").is_err());
		assert!(parse_non_negative("-0.1").is_err());
		assert!(parse_non_negative("abc").is_err());
	}

	#[test]
	fn candidate_factor_is_positive() {
		assert_eq!(parse_at_least_one("3"), Ok(3));
		assert!(parse_at_least_one("0").is_err());
	}

	#[test]
	fn options_map_onto_config() {
		let options = Options::parse_from(["hueprint", "a.png", "-k", "8", "-n", "6", "--seed", "3", "--bins", "16"]);
		let config = options.config();
		assert_eq!(config.dominant_colors, 8);
		assert_eq!(config.palette_size, 6);
		assert_eq!(config.seed, 3);
		assert_eq!(config.histogram_bins, 16);
		assert_eq!(options.images, vec![PathBuf::from("a.png")]);
	}

	#[test]
	fn defaults_match_library() {
		let options = Options::parse_from(["hueprint", "a.png"]);
		assert_eq!(options.config(), AnalyzerConfig::default());
	}

	#[test]
	#[allow(clippy::unwrap_used)]
	fn hue_sort_uses_grayscale_threshold() {
		let analyzer = hueprint::VisualAnalyzer::with_logger(AnalyzerConfig::default(), hueprint::Silent);
		let faint = analyzer.analyze_bytes(&[130u8, 120, 120, 255].repeat(4), 2, 2).unwrap();
		let blue = analyzer.analyze_bytes(&[0u8, 0, 255, 255].repeat(4), 2, 2).unwrap();

		let options = Options::parse_from(["hueprint", "a.png", "--sort", "hue"]);
		let compare = options.sort.unwrap().comparator(options.grayscale_threshold);
		assert_eq!(compare(&faint, &blue), Ordering::Greater);

		let options = Options::parse_from(["hueprint", "a.png", "--sort", "hue", "--grayscale-threshold", "0.02"]);
		let compare = options.sort.unwrap().comparator(options.grayscale_threshold);
		assert_eq!(compare(&faint, &blue), Ordering::Less);
	}

	#[test]
	fn cli_is_well_formed() {
		use clap::CommandFactory;
		Options::command().debug_assert();
	}
}
