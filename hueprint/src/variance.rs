//! Block-based color variance, a robust signal of visual detail

use crate::{ChannelVariance, Pixels};

/// Default block width and height in pixels
pub const DEFAULT_BLOCK_SIZE: u32 = 16;

/// Default percentile of the sorted block variances to report
pub const DEFAULT_PERCENTILE: f64 = 0.75;

/// Per-channel population variance of one block, or `None` if no pixel was counted
fn block_variance(
	pixels: &Pixels,
	x: u32,
	y: u32,
	block_size: u32,
	exclude_zero_channels: bool,
) -> Option<[f64; 3]> {
	let x_end = x.saturating_add(block_size).min(pixels.width()) as usize;
	let y_end = y.saturating_add(block_size).min(pixels.height());
	let x = x as usize;

	let block = (y..y_end)
		.flat_map(|row| &pixels.row(row)[x..x_end])
		.map(|p| p.color)
		.filter(|c| !exclude_zero_channels || (c.red != 0 && c.green != 0 && c.blue != 0))
		.collect::<Vec<_>>();

	if block.is_empty() {
		return None;
	}

	let mut sum = [0.0; 3];
	for c in &block {
		sum[0] += f64::from(c.red);
		sum[1] += f64::from(c.green);
		sum[2] += f64::from(c.blue);
	}

	// a block holds at most block_size^2 pixels
	#[allow(clippy::cast_precision_loss)]
	let n = block.len() as f64;
	let mean = [sum[0] / n, sum[1] / n, sum[2] / n];

	let mut squares = [0.0; 3];
	for c in &block {
		let dr = f64::from(c.red) - mean[0];
		let dg = f64::from(c.green) - mean[1];
		let db = f64::from(c.blue) - mean[2];
		squares[0] += dr * dr;
		squares[1] += dg * dg;
		squares[2] += db * db;
	}

	Some([squares[0] / n, squares[1] / n, squares[2] / n])
}

/// The value at index `floor(n * percentile)` of the ascending values
fn percentile_of(mut values: Vec<f64>, percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}
	values.sort_by(f64::total_cmp);

	#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let index = ((values.len() as f64) * percentile.clamp(0.0, 1.0)).floor() as usize;

	values[index.min(values.len() - 1)]
}

/// Estimate how much detail an image has from the variance of its blocks.
///
/// The image is tiled into `block_size` x `block_size` blocks (truncated at the edges).
/// For each block and channel the population variance is computed, and the value
/// at `percentile` of each channel's sorted variances is reported.
///
/// With `exclude_zero_channels`, pixels with a zero in any channel are left out
/// of both the mean and the variance of their block.
/// Blocks without any counted pixel are ignored, and zero variance is returned if
/// no block counted a pixel.
#[must_use]
pub fn color_variance(
	pixels: &Pixels,
	block_size: u32,
	percentile: f64,
	exclude_zero_channels: bool,
) -> ChannelVariance {
	let block_size = block_size.max(1);

	let mut variances = [Vec::new(), Vec::new(), Vec::new()];
	for y in (0..pixels.height()).step_by(block_size as usize) {
		for x in (0..pixels.width()).step_by(block_size as usize) {
			if let Some(block) = block_variance(pixels, x, y, block_size, exclude_zero_channels) {
				for (channel, variance) in variances.iter_mut().zip(block) {
					channel.push(variance);
				}
			}
		}
	}

	let [r, g, b] = variances.map(|channel| percentile_of(channel, percentile));
	ChannelVariance { r, g, b }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	fn rgba(colors: &[[u8; 3]]) -> Vec<u8> {
		colors.iter().flat_map(|&[r, g, b]| [r, g, b, 255]).collect()
	}

	#[test]
	fn uniform_image_has_no_variance() {
		let data = rgba(&[[40, 50, 60]; 64]);
		let pixels = Pixels::new(&data, 8, 8).unwrap();
		let variance = color_variance(&pixels, 4, DEFAULT_PERCENTILE, false);
		assert_eq!(variance, ChannelVariance::default());
	}

	#[test]
	fn empty_image_has_no_variance() {
		let pixels = Pixels::new(&[], 0, 0).unwrap();
		assert_eq!(color_variance(&pixels, 16, 0.75, false), ChannelVariance::default());
	}

	#[test]
	fn population_variance_of_one_block() {
		let data = rgba(&[[0, 10, 100], [10, 10, 100], [20, 10, 100], [30, 10, 100]]);
		let pixels = Pixels::new(&data, 2, 2).unwrap();
		let variance = color_variance(&pixels, 16, DEFAULT_PERCENTILE, false);
		// mean 15, squared deviations 225 + 25 + 25 + 225
		assert_relative_eq!(variance.r, 125.0);
		assert_relative_eq!(variance.g, 0.0);
		assert_relative_eq!(variance.b, 0.0);
	}

	#[test]
	fn zero_channel_pixels_can_be_excluded() {
		let data = rgba(&[[0, 10, 100], [10, 10, 100], [20, 10, 100], [30, 10, 100]]);
		let pixels = Pixels::new(&data, 2, 2).unwrap();
		let variance = color_variance(&pixels, 16, DEFAULT_PERCENTILE, true);
		// only 10, 20, 30 remain: mean 20, squared deviations 100 + 0 + 100
		assert_relative_eq!(variance.r, 200.0 / 3.0);
	}

	#[test]
	fn edge_blocks_are_truncated() {
		// 3x1 image with 2 pixel blocks: [a, b] and [c]
		let data = rgba(&[[0, 0, 0], [100, 0, 0], [255, 255, 255]]);
		let pixels = Pixels::new(&data, 3, 1).unwrap();
		let variance = color_variance(&pixels, 2, 0.75, false);
		// block variances for red: 2500 and 0, index floor(2 * 0.75) = 1
		assert_relative_eq!(variance.r, 2500.0);
	}

	#[test]
	fn percentile_index() {
		let values = vec![5.0, 1.0, 4.0, 2.0, 3.0, 0.0, 7.0, 6.0];
		// floor(8 * 0.75) = 6
		assert_relative_eq!(percentile_of(values.clone(), 0.75), 6.0);
		assert_relative_eq!(percentile_of(values.clone(), 0.0), 0.0);
		assert_relative_eq!(percentile_of(values, 1.0), 7.0);
		assert_relative_eq!(percentile_of(Vec::new(), 0.75), 0.0);
	}
}
