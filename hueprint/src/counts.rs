//! Deduplicated colors with their pixel frequencies

use crate::{color, Pixels};
use palette::Srgb;
use std::collections::HashMap;

/// Distinct sRGB colors from an image and the number of pixels of each color.
///
/// Colors are stored in the order they were first seen, so two passes over
/// the same pixels always give the same `ColorCounts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorCounts {
	/// Distinct colors
	pub(crate) colors: Vec<Srgb<u8>>,
	/// The number of pixels for each color
	pub(crate) counts: Vec<u32>,
}

impl ColorCounts {
	/// Create an empty `ColorCounts`
	#[must_use]
	pub const fn new() -> Self {
		Self { colors: Vec::new(), counts: Vec::new() }
	}

	/// Build from colors and their counts.
	///
	/// Entries with a count of zero are dropped and repeated colors are merged.
	#[must_use]
	pub fn from_pairs(pairs: impl IntoIterator<Item = (Srgb<u8>, u32)>) -> Self {
		let mut builder = CountsBuilder::default();
		for (color, n) in pairs {
			if n > 0 {
				builder.add(color, n);
			}
		}
		builder.finish()
	}

	/// Count the distinct colors of the given pixels, ignoring alpha
	#[must_use]
	pub fn from_pixels(pixels: &Pixels) -> Self {
		let mut builder = CountsBuilder::default();
		for pixel in pixels.as_slice() {
			builder.add(pixel.color, 1);
		}
		builder.finish()
	}

	/// The distinct colors
	#[must_use]
	pub fn colors(&self) -> &[Srgb<u8>] {
		&self.colors
	}

	/// The pixel count of each color
	#[must_use]
	pub fn counts(&self) -> &[u32] {
		&self.counts
	}

	/// Number of distinct colors
	#[must_use]
	pub fn num_colors(&self) -> usize {
		self.colors.len()
	}

	/// Whether there are no colors
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Iterate over each color and its count
	pub fn pairs(&self) -> impl Iterator<Item = (Srgb<u8>, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}

	/// The counts as float weights
	#[must_use]
	pub fn weights(&self) -> Vec<f64> {
		self.counts.iter().map(|&n| f64::from(n)).collect()
	}

	/// The counts boosted by saturation: `count * (1 + factor * saturation)`.
	///
	/// This keeps small but striking accent colors from being merged away by the quantizer.
	/// A factor of `0.0` gives the plain counts.
	#[must_use]
	pub fn boosted_weights(&self, factor: f64) -> Vec<f64> {
		self.pairs()
			.map(|(color, n)| f64::from(n) * (1.0 + factor * color::saturation_of(color)))
			.collect()
	}
}

/// Accumulates a [`ColorCounts`], merging duplicate colors
#[derive(Default)]
pub(crate) struct CountsBuilder {
	/// The counts being built
	data: ColorCounts,
	/// Packed sRGB -> data index
	memo: HashMap<u32, u32>,
}

impl CountsBuilder {
	/// Add `n` pixels of `color`
	pub(crate) fn add(&mut self, color: Srgb<u8>, n: u32) {
		let key = color.into_u32::<palette::rgb::channels::Rgba>();
		let data = &mut self.data;
		let index = *self.memo.entry(key).or_insert_with(|| {
			// data.len() < u32::MAX because there are only (2^8)^3 < u32::MAX possible sRGB colors
			#[allow(clippy::cast_possible_truncation)]
			let index = data.colors.len() as u32;

			data.colors.push(color);
			data.counts.push(0);
			index
		});

		let count = &mut data.counts[index as usize];
		*count = count.saturating_add(n);
	}

	/// Finish building
	pub(crate) fn finish(self) -> ColorCounts {
		self.data
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn from_pixels_merges_duplicates_in_first_seen_order() {
		#[rustfmt::skip]
		let data = [
			255, 0, 0, 255,
			0, 255, 0, 255,
			255, 0, 0, 10,
			0, 0, 255, 255,
		];
		let pixels = Pixels::new(&data, 2, 2).unwrap();
		let counts = ColorCounts::from_pixels(&pixels);

		assert_eq!(
			counts.colors(),
			&[Srgb::new(255, 0, 0), Srgb::new(0, 255, 0), Srgb::new(0, 0, 255)]
		);
		assert_eq!(counts.counts(), &[2, 1, 1]);
	}

	#[test]
	fn from_pairs_skips_zero_counts() {
		let counts = ColorCounts::from_pairs([
			(Srgb::new(1, 2, 3), 0),
			(Srgb::new(4, 5, 6), 3),
			(Srgb::new(4, 5, 6), 2),
		]);
		assert_eq!(counts.num_colors(), 1);
		assert_eq!(counts.counts(), &[5]);
	}

	#[test]
	fn boosted_weights_favor_saturated_colors() {
		let counts = ColorCounts::from_pairs([(Srgb::new(128, 128, 128), 4), (Srgb::new(255, 0, 0), 4)]);
		let weights = counts.boosted_weights(1.0);
		assert_relative_eq!(weights[0], 4.0);
		assert_relative_eq!(weights[1], 8.0);
		assert_eq!(counts.boosted_weights(0.0), counts.weights());
	}
}
