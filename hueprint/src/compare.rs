//! Ranking functions over [`VisualMetadata`].
//!
//! Every comparator returns an [`Ordering`] where [`Ordering::Less`] means `a` sorts first,
//! so they can be passed straight to [`slice::sort_by`]:
//!
//! ```
//! # use hueprint::{compare, Srgb, VisualMetadata};
//! let mut images = vec![
//! 	VisualMetadata::from_average(Srgb::new(0, 0, 0)),
//! 	VisualMetadata::from_average(Srgb::new(255, 255, 255)),
//! ];
//! images.sort_by(compare::by_luminance);
//! assert_eq!(images[0].average_color, Srgb::new(255, 255, 255));
//! ```
//!
//! None of these look at pixels. Metadata without dominant colors is scored by its average color,
//! and metadata without a histogram falls back to its palettes.

use crate::{
	color::{self, DEFAULT_GRAYSCALE_THRESHOLD},
	Histogram, HistogramBin, VisualMetadata,
};
use palette::Srgb;
use std::{cmp::Ordering, f64::consts::TAU};

/// Luma weights used to combine per-channel histogram scores
const LUMA: [f64; 3] = [0.299, 0.587, 0.114];

/// A bin needs at least this fraction of the pixels to count towards the color range
const RANGE_MIN_FRACTION: f64 = 0.005;

/// Darkness weight of each quarter of the channel range
const DARK_QUARTILE_WEIGHTS: [f64; 4] = [1.0, 0.5, 0.25, 0.0];

/// Brightness weight of each quarter of the channel range
const BRIGHT_QUARTILE_WEIGHTS: [f64; 4] = [0.0, 0.25, 0.5, 1.0];

/// A color needs a normalized weight above this to make an image count as colorful
const COLORFUL_MIN_WEIGHT: f64 = 0.2;

/// A color needs a channel spread of at least this to make an image count as colorful
const COLORFUL_MIN_SPREAD: f64 = 8.0 / 255.0;

/// The colors an image is scored by: its dominant colors, or its average color if it has none
#[must_use]
pub fn scoring_colors(metadata: &VisualMetadata) -> &[Srgb<u8>] {
	match &metadata.dominant_colors {
		Some(colors) if !colors.is_empty() => colors,
		_ => std::slice::from_ref(&metadata.average_color),
	}
}

/// Weight of the color at the given rank
#[allow(clippy::cast_precision_loss)]
fn rank_weight(rank: usize) -> f64 {
	1.0 / (rank as f64 + 1.0)
}

/// Mean of `score` over `colors`, weighting earlier colors more
fn weighted_mean(colors: &[Srgb<u8>], score: impl Fn(Srgb<u8>) -> f64) -> f64 {
	let (sum, total) = colors
		.iter()
		.enumerate()
		.fold((0.0, 0.0), |(sum, total), (rank, &color)| {
			let weight = rank_weight(rank);
			(sum + weight * score(color), total + weight)
		});

	if total > 0.0 {
		sum / total
	} else {
		0.0
	}
}

/// Combine a per-channel histogram score with luma weights
fn luma_weighted(histogram: &Histogram, score: impl Fn(&[HistogramBin]) -> f64) -> f64 {
	histogram
		.channels()
		.into_iter()
		.zip(LUMA)
		.map(|(bins, weight)| weight * score(bins))
		.sum()
}

/// The histogram, if it holds any pixels
fn histogram_of(metadata: &VisualMetadata) -> Option<&Histogram> {
	metadata.histogram.as_ref().filter(|histogram| histogram.total_pixels > 0)
}

/// Weighted relative luminance of the scoring colors
#[must_use]
pub fn luminance_score(metadata: &VisualMetadata) -> f64 {
	weighted_mean(scoring_colors(metadata), color::color_luminance)
}

/// Brightest images first
#[must_use]
pub fn by_luminance(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	luminance_score(b).total_cmp(&luminance_score(a))
}

/// Weighted circular mean hue in `0.0..1.0` of the non-gray scoring colors,
/// or `None` if every scoring color is gray.
///
/// Colors are gray according to [`color::is_grayscale`] with `grayscale_threshold`.
#[must_use]
pub fn hue_score_with_threshold(metadata: &VisualMetadata, grayscale_threshold: f64) -> Option<f64> {
	let mut x = 0.0;
	let mut y = 0.0;
	let mut total = 0.0;
	for (rank, &color) in scoring_colors(metadata).iter().enumerate() {
		if color::is_grayscale(color, grayscale_threshold) {
			continue;
		}
		let hsl = color::to_hsl(color);
		let weight = rank_weight(rank) * hsl.s;
		let angle = hsl.h * TAU;
		x += weight * angle.cos();
		y += weight * angle.sin();
		total += weight;
	}

	if total > 0.0 {
		let hue = (y.atan2(x) / TAU).rem_euclid(1.0);
		// rem_euclid can round up to exactly 1.0
		Some(if hue < 1.0 { hue } else { 0.0 })
	} else {
		None
	}
}

/// [`hue_score_with_threshold`] with [`DEFAULT_GRAYSCALE_THRESHOLD`]
#[must_use]
pub fn hue_score(metadata: &VisualMetadata) -> Option<f64> {
	hue_score_with_threshold(metadata, DEFAULT_GRAYSCALE_THRESHOLD)
}

/// Ascending hue, with gray images last and sorted among themselves by [`by_luminance`].
///
/// See [`hue_score_with_threshold`] for how `grayscale_threshold` is used.
#[must_use]
pub fn by_hue_with_threshold(a: &VisualMetadata, b: &VisualMetadata, grayscale_threshold: f64) -> Ordering {
	match (
		hue_score_with_threshold(a, grayscale_threshold),
		hue_score_with_threshold(b, grayscale_threshold),
	) {
		(Some(x), Some(y)) => x.total_cmp(&y),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => by_luminance(a, b),
	}
}

/// [`by_hue_with_threshold`] with [`DEFAULT_GRAYSCALE_THRESHOLD`]
#[must_use]
pub fn by_hue(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	by_hue_with_threshold(a, b, DEFAULT_GRAYSCALE_THRESHOLD)
}

/// Whether no significant scoring color has a visible channel spread
#[must_use]
pub fn is_grayscale_image(metadata: &VisualMetadata) -> bool {
	let colors = scoring_colors(metadata);
	let total = (0..colors.len()).map(rank_weight).sum::<f64>();
	!colors.iter().enumerate().any(|(rank, &color)| {
		rank_weight(rank) / total > COLORFUL_MIN_WEIGHT && color::channel_spread(color) >= COLORFUL_MIN_SPREAD
	})
}

/// Weighted HSL saturation of the scoring colors
#[must_use]
pub fn saturation_score(metadata: &VisualMetadata) -> f64 {
	weighted_mean(scoring_colors(metadata), |color| color::to_hsl(color).s)
}

/// Most saturated images first, with grayscale images last.
/// Ties are broken by [`by_luminance`].
#[must_use]
pub fn by_saturation(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	is_grayscale_image(a)
		.cmp(&is_grayscale_image(b))
		.then_with(|| saturation_score(b).total_cmp(&saturation_score(a)))
		.then_with(|| by_luminance(a, b))
}

/// Span between the lowest and highest bin holding enough pixels, in `0.0..=1.0`
fn channel_range(bins: &[HistogramBin], total_pixels: u64) -> f64 {
	#[allow(clippy::cast_precision_loss)]
	let min_count = (total_pixels as f64 * RANGE_MIN_FRACTION).max(1.0);
	#[allow(clippy::cast_precision_loss)]
	let occupied = |bin: &&HistogramBin| bin.count as f64 >= min_count;

	match (bins.iter().find(occupied), bins.iter().rev().find(occupied)) {
		(Some(lo), Some(hi)) => f64::from(hi.value.saturating_sub(lo.value)) / 255.0,
		_ => 0.0,
	}
}

/// Spread between the darkest and brightest color
fn luminance_spread(colors: &[Srgb<u8>]) -> f64 {
	let (min, max) = colors
		.iter()
		.map(|&color| color::color_luminance(color))
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), l| (min.min(l), max.max(l)));

	if colors.is_empty() {
		0.0
	} else {
		max - min
	}
}

/// How much of the tonal range an image covers, in `0.0..=1.0`.
///
/// Uses the histogram if present, otherwise the luminance spread of the distinct palette
/// (or the scoring colors if that is empty).
#[must_use]
pub fn color_range_score(metadata: &VisualMetadata) -> f64 {
	if let Some(histogram) = histogram_of(metadata) {
		luma_weighted(histogram, |bins| channel_range(bins, histogram.total_pixels))
	} else if metadata.distinct_palette.is_empty() {
		luminance_spread(scoring_colors(metadata))
	} else {
		luminance_spread(&metadata.distinct_palette)
	}
}

/// Widest tonal range first
#[must_use]
pub fn by_color_range(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	color_range_score(b).total_cmp(&color_range_score(a))
}

/// Fraction of a channel's pixels weighted by the quarter of the range they fall in
fn quartile_score(bins: &[HistogramBin], total_pixels: u64, weights: [f64; 4]) -> f64 {
	#[allow(clippy::cast_precision_loss)]
	let sum = bins
		.iter()
		.map(|bin| weights[usize::from(bin.value / 64)] * bin.count as f64)
		.sum::<f64>();

	#[allow(clippy::cast_precision_loss)]
	let total = total_pixels as f64;

	sum / total
}

/// A lightness-first score of a color in `0.0..=1.0`
fn color_score(color: Srgb<u8>) -> f64 {
	let hsl = color::to_hsl(color);
	(2.0 * hsl.l + 0.5 * hsl.s + 0.5 * hsl.h) / 3.0
}

/// How dark an image is, in `0.0..=1.0`
#[must_use]
pub fn dark_score(metadata: &VisualMetadata) -> f64 {
	if let Some(histogram) = histogram_of(metadata) {
		luma_weighted(histogram, |bins| {
			quartile_score(bins, histogram.total_pixels, DARK_QUARTILE_WEIGHTS)
		})
	} else {
		1.0 - weighted_mean(scoring_colors(metadata), color_score)
	}
}

/// Darkest images first
#[must_use]
pub fn by_dark_colors(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	dark_score(b).total_cmp(&dark_score(a))
}

/// How bright an image is, in `0.0..=1.0`
#[must_use]
pub fn bright_score(metadata: &VisualMetadata) -> f64 {
	if let Some(histogram) = histogram_of(metadata) {
		luma_weighted(histogram, |bins| {
			quartile_score(bins, histogram.total_pixels, BRIGHT_QUARTILE_WEIGHTS)
		})
	} else {
		weighted_mean(scoring_colors(metadata), color_score)
	}
}

/// Brightest images first
#[must_use]
pub fn by_bright_colors(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	bright_score(b).total_cmp(&bright_score(a))
}

/// Mean pairwise perceptual difference of the distinct palette.
///
/// Falls back to the representative palette and then the scoring colors.
/// Fewer than two colors give `0.0`.
#[must_use]
pub fn diversity_score(metadata: &VisualMetadata) -> f64 {
	let colors = if !metadata.distinct_palette.is_empty() {
		metadata.distinct_palette.as_slice()
	} else if !metadata.representative_palette.is_empty() {
		metadata.representative_palette.as_slice()
	} else {
		scoring_colors(metadata)
	};

	let mut sum = 0.0;
	let mut pairs = 0u32;
	for (i, &x) in colors.iter().enumerate() {
		for &y in &colors[i + 1..] {
			sum += color::perceptual_difference(x, y);
			pairs += 1;
		}
	}

	if pairs == 0 {
		0.0
	} else {
		sum / f64::from(pairs)
	}
}

/// Most varied palettes first
#[must_use]
pub fn by_diversity(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	diversity_score(b).total_cmp(&diversity_score(a))
}

/// Weighted warmth of the scoring colors: `(red - blue) / 255`, in `-1.0..=1.0`
#[must_use]
pub fn temperature_score(metadata: &VisualMetadata) -> f64 {
	weighted_mean(scoring_colors(metadata), |color| {
		(f64::from(color.red) - f64::from(color.blue)) / 255.0
	})
}

/// Warmest images first
#[must_use]
pub fn by_temperature(a: &VisualMetadata, b: &VisualMetadata) -> Ordering {
	temperature_score(b).total_cmp(&temperature_score(a))
}
