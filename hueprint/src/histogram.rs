//! Fixed-bin per-channel histograms

use palette::Srgb;

/// Default number of bins per channel
pub const DEFAULT_BINS: u16 = 32;

/// A single histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramBin {
	/// The lowest channel value that falls into this bin
	pub value: u8,
	/// The number of pixels whose channel value falls into this bin
	pub count: u64,
}

/// Per-channel histograms with bin boundaries shared across all images.
///
/// For each channel, the sum of the bin counts equals `total_pixels`
/// unless some channel values were skipped (see [`Histogram::skipped`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
	/// Red channel bins
	pub r: Vec<HistogramBin>,
	/// Green channel bins
	pub g: Vec<HistogramBin>,
	/// Blue channel bins
	pub b: Vec<HistogramBin>,
	/// Number of pixels recorded
	pub total_pixels: u64,
}

/// The lower bound of each bin for the given number of bins
fn empty_bins(bins: u16) -> Vec<HistogramBin> {
	let bins = u32::from(bins);
	(0..bins)
		.map(|i| {
			// i < bins <= 256, so the lower bound is < 256
			#[allow(clippy::cast_possible_truncation)]
			let value = (i * 256 / bins) as u8;
			HistogramBin { value, count: 0 }
		})
		.collect()
}

impl Histogram {
	/// Create a histogram with `bins` bins per channel, clamped to `1..=256`
	#[must_use]
	pub fn new(bins: u16) -> Self {
		debug_assert!((1..=256).contains(&bins));
		let bins = bins.clamp(1, 256);
		Self {
			r: empty_bins(bins),
			g: empty_bins(bins),
			b: empty_bins(bins),
			total_pixels: 0,
		}
	}

	/// Number of bins per channel
	#[must_use]
	pub fn num_bins(&self) -> usize {
		self.r.len()
	}

	/// The bins of each channel in r, g, b order
	#[must_use]
	pub fn channels(&self) -> [&[HistogramBin]; 3] {
		[&self.r, &self.g, &self.b]
	}

	/// The sum of the bin counts of one channel
	#[must_use]
	pub fn channel_total(bins: &[HistogramBin]) -> u64 {
		bins.iter().map(|bin| bin.count).sum()
	}

	/// The number of channel values that were recorded in no bin
	#[must_use]
	pub fn skipped(&self) -> u64 {
		self.channels()
			.into_iter()
			.map(|bins| self.total_pixels.saturating_sub(Self::channel_total(bins)))
			.sum()
	}

	/// Record one pixel.
	///
	/// Returns the number of channels that mapped outside the bins and were skipped.
	pub fn record(&mut self, color: Srgb<u8>) -> u32 {
		self.total_pixels += 1;
		let bins = self.num_bins();
		u32::from(!record_channel(&mut self.r, bins, color.red))
			+ u32::from(!record_channel(&mut self.g, bins, color.green))
			+ u32::from(!record_channel(&mut self.b, bins, color.blue))
	}
}

/// Increment the bin for `value`, returning `false` if no such bin exists
fn record_channel(channel: &mut [HistogramBin], bins: usize, value: u8) -> bool {
	let index = usize::from(value) * bins / 256;
	if let Some(bin) = channel.get_mut(index) {
		bin.count += 1;
		true
	} else {
		false
	}
}
