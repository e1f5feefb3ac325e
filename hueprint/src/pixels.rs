//! A validated view over a raw RGBA pixel buffer

use crate::AnalysisError;
use palette::Srgba;

/// Borrowed, row-major RGBA pixels with 8 bits per channel.
///
/// The only way to build one is through [`Pixels::new`] or [`Pixels::from_image`],
/// so the buffer length always matches the dimensions.
#[derive(Debug, Clone, Copy)]
pub struct Pixels<'a> {
	/// The pixels, row by row
	pixels: &'a [Srgba<u8>],
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
}

impl<'a> Pixels<'a> {
	/// Wrap a byte buffer holding `width * height` RGBA pixels.
	///
	/// # Errors
	/// Returns [`AnalysisError::ContextUnavailable`] if the buffer length
	/// is not exactly `width * height * 4`.
	pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self, AnalysisError> {
		let expected = u64::from(width) * u64::from(height) * 4;
		if u64::try_from(data.len()).map_or(true, |len| len != expected) {
			return Err(AnalysisError::ContextUnavailable { width, height, expected, actual: data.len() });
		}

		Ok(Self {
			pixels: palette::cast::from_component_slice(data),
			width,
			height,
		})
	}

	/// Borrow the pixels of a decoded RGBA image
	#[must_use]
	pub fn from_image(image: &'a image::RgbaImage) -> Self {
		Self {
			pixels: palette::cast::from_component_slice(image.as_raw()),
			width: image.width(),
			height: image.height(),
		}
	}

	/// Image width in pixels
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Image height in pixels
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// Number of pixels
	#[must_use]
	pub fn len(&self) -> usize {
		self.pixels.len()
	}

	/// Whether there are no pixels at all
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}

	/// All pixels, row by row
	#[must_use]
	pub const fn as_slice(&self) -> &'a [Srgba<u8>] {
		self.pixels
	}

	/// The pixels of row `y`
	pub(crate) fn row(&self, y: u32) -> &'a [Srgba<u8>] {
		let width = self.width as usize;
		let start = y as usize * width;
		&self.pixels[start..(start + width)]
	}
}
