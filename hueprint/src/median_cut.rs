//! Median cut quantization for palette extraction

use crate::color::{components, to_srgb};
use palette::Srgb;

/// A box of weighted colors along with the bounds of its colors
#[derive(Debug, Clone)]
struct ColorBox {
	/// The colors in this box and their weights
	points: Vec<(Srgb<u8>, f64)>,
	/// Minimum of each channel over `points`
	min: [u8; 3],
	/// Maximum of each channel over `points`
	max: [u8; 3],
}

/// The channels of a color as an array
fn channels(color: Srgb<u8>) -> [u8; 3] {
	[color.red, color.green, color.blue]
}

impl ColorBox {
	/// Create a box tightly bounding the given points
	fn new(points: Vec<(Srgb<u8>, f64)>) -> Self {
		let mut min = [u8::MAX; 3];
		let mut max = [u8::MIN; 3];
		for &(color, _) in &points {
			for (c, value) in channels(color).into_iter().enumerate() {
				min[c] = min[c].min(value);
				max[c] = max[c].max(value);
			}
		}
		Self { points, min, max }
	}

	/// The range of each channel
	fn ranges(&self) -> [u8; 3] {
		[
			self.max[0].saturating_sub(self.min[0]),
			self.max[1].saturating_sub(self.min[1]),
			self.max[2].saturating_sub(self.min[2]),
		]
	}

	/// The channel with the largest range and that range, the earliest channel winning ties
	fn longest_channel(&self) -> (usize, u8) {
		let ranges = self.ranges();
		let mut best = 0;
		for c in 1..3 {
			if ranges[c] > ranges[best] {
				best = c;
			}
		}
		(best, ranges[best])
	}

	/// Whether this box holds enough points to be split
	fn can_split(&self) -> bool {
		self.points.len() > 1
	}

	/// Split along the longest channel at the weighted median
	fn split(mut self) -> (Self, Self) {
		let (channel, _) = self.longest_channel();
		self.points.sort_by_key(|&(color, _)| channels(color)[channel]);

		let total = self.points.iter().map(|&(_, w)| w).sum::<f64>();
		let half = total / 2.0;

		let mut cumulative = 0.0;
		let mut median = self.points.len() - 1;
		for (i, &(_, w)) in self.points.iter().enumerate() {
			cumulative += w;
			if cumulative >= half {
				median = i;
				break;
			}
		}

		// neither half may be empty
		let median = median.max(1);

		let upper = self.points.split_off(median);
		(Self::new(self.points), Self::new(upper))
	}

	/// The weighted mean color of this box
	fn average(&self) -> Srgb<u8> {
		let mut sum = [0.0; 3];
		let mut total = 0.0;
		for &(color, w) in &self.points {
			let point = components(color);
			sum[0] += w * point[0];
			sum[1] += w * point[1];
			sum[2] += w * point[2];
			total += w;
		}

		if total > 0.0 {
			to_srgb([sum[0] / total, sum[1] / total, sum[2] / total])
		} else {
			// only zero weights, fall back to an unweighted mean
			let n = self.points.len();
			#[allow(clippy::cast_precision_loss)]
			let n = n as f64;
			let mut sum = [0.0; 3];
			for &(color, _) in &self.points {
				let point = components(color);
				sum[0] += point[0];
				sum[1] += point[1];
				sum[2] += point[2];
			}
			to_srgb([sum[0] / n, sum[1] / n, sum[2] / n])
		}
	}
}

/// Index of the splittable box with the largest channel range, the first box winning ties
fn box_to_split(boxes: &[ColorBox]) -> Option<usize> {
	let mut best: Option<(usize, u8)> = None;
	for (i, color_box) in boxes.iter().enumerate() {
		if !color_box.can_split() {
			continue;
		}
		let (_, range) = color_box.longest_channel();
		if best.map_or(true, |(_, best_range)| range > best_range) {
			best = Some((i, range));
		}
	}
	best.map(|(i, _)| i)
}

/// Quantize weighted colors into a palette of at most `palette_size` colors.
///
/// Starting with one box spanning all colors, the box with the largest channel range
/// is repeatedly split at the weighted median of that channel until there are
/// `palette_size` boxes or no box holds more than one color.
/// The lower half of a split takes the place of the split box and the upper half
/// is appended. The palette is the weighted mean of each box, in box order.
///
/// `colors` and `weights` must have the same length.
/// An empty palette is returned if there are no colors or `palette_size` = 0.
#[must_use]
pub fn quantize(colors: &[Srgb<u8>], weights: &[f64], palette_size: usize) -> Vec<Srgb<u8>> {
	debug_assert_eq!(colors.len(), weights.len());
	if colors.is_empty() || palette_size == 0 {
		return Vec::new();
	}

	let points = colors.iter().copied().zip(weights.iter().copied()).collect();
	let mut boxes = vec![ColorBox::new(points)];

	while boxes.len() < palette_size {
		let Some(i) = box_to_split(&boxes) else { break };
		let (lower, upper) = boxes.remove(i).split();
		boxes.insert(i, lower);
		boxes.push(upper);
	}

	boxes.iter().map(ColorBox::average).collect()
}
