//! Color space conversions and color difference shared by every analysis step

use palette::{FromColor, Lab, Srgb};

/// Channel value below which the sRGB transfer function is linear
const SRGB_LINEAR_THRESHOLD: f64 = 0.03928;

/// Relative luminance weights for the red, green, and blue channels (ITU-R BT.709)
const LUMINANCE_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Weight of the lightness delta in [`perceptual_difference`]
const LIGHTNESS_WEIGHT: f64 = 1.0;
/// Weight of the squared chroma delta in [`perceptual_difference`]
const CHROMA_WEIGHT: f64 = 1.2;
/// Weight of the approximate hue delta in [`perceptual_difference`]
const HUE_WEIGHT: f64 = 0.8;

/// Default threshold for [`is_grayscale`], as a fraction of the full channel range
pub const DEFAULT_GRAYSCALE_THRESHOLD: f64 = 0.05;

/// A color in the HSL color space with all components in `0.0..=1.0`
///
/// `h` is a fraction of a full turn and is always less than `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
	/// Hue
	pub h: f64,
	/// Saturation
	pub s: f64,
	/// Lightness
	pub l: f64,
}

/// Convert an 8-bit sRGB channel to linear light
fn linearize(channel: u8) -> f64 {
	let c = f64::from(channel) / 255.0;
	if c <= SRGB_LINEAR_THRESHOLD {
		c / 12.92
	} else {
		((c + 0.055) / 1.055).powf(2.4)
	}
}

/// Relative luminance of an sRGB color in `0.0..=1.0`
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
	let [wr, wg, wb] = LUMINANCE_WEIGHTS;
	wr * linearize(r) + wg * linearize(g) + wb * linearize(b)
}

/// Relative luminance of an sRGB color in `0.0..=1.0`
#[must_use]
pub fn color_luminance(color: Srgb<u8>) -> f64 {
	luminance(color.red, color.green, color.blue)
}

/// Convert an sRGB color to HSL. Grays have a hue of `0.0`.
#[must_use]
#[allow(clippy::many_single_char_names, clippy::float_cmp)]
pub fn to_hsl(color: Srgb<u8>) -> Hsl {
	let r = f64::from(color.red) / 255.0;
	let g = f64::from(color.green) / 255.0;
	let b = f64::from(color.blue) / 255.0;

	let max = r.max(g).max(b);
	let min = r.min(g).min(b);
	let l = (max + min) / 2.0;

	if max == min {
		return Hsl { h: 0.0, s: 0.0, l };
	}

	let d = max - min;
	let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

	let h = if max == r {
		(g - b) / d + if g < b { 6.0 } else { 0.0 }
	} else if max == g {
		(b - r) / d + 2.0
	} else {
		(r - g) / d + 4.0
	};

	Hsl { h: (h / 6.0).rem_euclid(1.0), s, l }
}

/// Convert an sRGB color to CIE L\*a\*b\* under the D65 white point
#[must_use]
pub fn to_lab(color: Srgb<u8>) -> Lab {
	Lab::from_color(color.into_format::<f32>().into_linear())
}

/// A cheap perceptual color difference in Lab space.
///
/// This is not CIE Delta E. It combines the lightness delta, the squared chroma delta,
/// and the remaining hue delta with weights 1.0, 1.2, and 0.8 respectively.
#[must_use]
pub fn perceptual_difference(x: Srgb<u8>, y: Srgb<u8>) -> f64 {
	let x = to_lab(x);
	let y = to_lab(y);

	let dl = f64::from(x.l - y.l);
	let da = f64::from(x.a - y.a);
	let db = f64::from(x.b - y.b);

	let cx = f64::from(x.a).hypot(f64::from(x.b));
	let cy = f64::from(y.a).hypot(f64::from(y.b));
	let dc = cx - cy;

	// whatever is left of the a/b delta after removing the chroma delta is hue
	let dh_squared = (da * da + db * db - dc * dc).max(0.0);

	(LIGHTNESS_WEIGHT * dl * dl + CHROMA_WEIGHT * dc * dc + HUE_WEIGHT * dh_squared).sqrt()
}

/// Whether every pairwise channel difference is below `threshold * 255`
#[must_use]
pub fn is_grayscale(color: Srgb<u8>, threshold: f64) -> bool {
	let max_diff = threshold * 255.0;
	let (r, g, b) = (color.red, color.green, color.blue);
	[r.abs_diff(g), g.abs_diff(b), r.abs_diff(b)]
		.into_iter()
		.all(|diff| f64::from(diff) < max_diff)
}

/// HSV style saturation: `(max - min) / max` over the channels, `0.0` for black
#[must_use]
pub fn saturation_of(color: Srgb<u8>) -> f64 {
	let max = color.red.max(color.green).max(color.blue);
	let min = color.red.min(color.green).min(color.blue);
	if max == 0 {
		0.0
	} else {
		f64::from(max - min) / f64::from(max)
	}
}

/// The difference between the largest and smallest channel, in `0.0..=1.0`
#[must_use]
pub fn channel_spread(color: Srgb<u8>) -> f64 {
	let max = color.red.max(color.green).max(color.blue);
	let min = color.red.min(color.green).min(color.blue);
	f64::from(max - min) / 255.0
}

/// The channels of a color as floats
#[must_use]
pub(crate) fn components(color: Srgb<u8>) -> [f64; 3] {
	[f64::from(color.red), f64::from(color.green), f64::from(color.blue)]
}

/// Squared Euclidean distance in RGB space between two float points
#[must_use]
pub(crate) fn squared_distance(x: [f64; 3], y: [f64; 3]) -> f64 {
	let dr = x[0] - y[0];
	let dg = x[1] - y[1];
	let db = x[2] - y[2];
	dr * dr + dg * dg + db * db
}

/// Euclidean distance in RGB space
#[must_use]
pub fn distance(x: Srgb<u8>, y: Srgb<u8>) -> f64 {
	squared_distance(components(x), components(y)).sqrt()
}

/// Round and clamp a float point back to an 8-bit color
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_srgb(point: [f64; 3]) -> Srgb<u8> {
	let channel = |x: f64| x.round().clamp(0.0, 255.0) as u8;
	Srgb::new(channel(point[0]), channel(point[1]), channel(point[2]))
}
