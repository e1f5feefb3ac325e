//! Compute a compact visual fingerprint of an image and rank images by it.
//!
//! A [`VisualAnalyzer`] reduces an RGBA pixel buffer to [`VisualMetadata`]:
//! the average color, dominant colors found by weighted k-means,
//! a representative and a distinct palette found by median cut,
//! per-channel histograms, brightness statistics, and block-based color variance.
//! The functions in [`compare`] then rank images by that metadata alone.
//!
//! # Examples
//!
//! ## Analyze an image file
//!
//! ```no_run
//! use hueprint::{AnalyzerConfig, VisualAnalyzer};
//!
//! let image = image::open("some image").unwrap().into_rgba8();
//! let analyzer = VisualAnalyzer::new(AnalyzerConfig::default().with_dominant_colors(8));
//! let metadata = analyzer.analyze_image(&image);
//! println!("{:?}", metadata.dominant_colors);
//! ```
//!
//! ## Analyze a raw buffer and sort by hue
//!
//! ```
//! use hueprint::{compare, AnalyzerConfig, VisualAnalyzer};
//!
//! let red = [255u8, 0, 0, 255].repeat(4);
//! let blue = [0u8, 0, 255, 255].repeat(4);
//!
//! let analyzer = VisualAnalyzer::new(AnalyzerConfig::default());
//! let mut images = vec![
//! 	analyzer.analyze_bytes(&blue, 2, 2).unwrap(),
//! 	analyzer.analyze_bytes(&red, 2, 2).unwrap(),
//! ];
//! images.sort_by(compare::by_hue);
//! assert_eq!(images[0].average_color, hueprint::Srgb::new(255, 0, 0));
//! ```
//!
//! # Configuration
//!
//! See [`AnalyzerConfig`] for all parameters. Some notes on the less obvious ones:
//!
//! ## Saturation Boost
//!
//! Median cut weighs each color by `count * (1 + boost * saturation)`.
//! Higher values keep small but vivid accents from being averaged away.
//! A boost of `0.0` uses the plain pixel counts.
//!
//! ## Candidate Factor
//!
//! The distinct palette is chosen from a median cut palette `candidate_factor` times
//! the palette size, picking colors that are as far apart as possible.
//! A factor of `1` makes the distinct palette a reordering of the representative one.
//!
//! ## Variance
//!
//! The image is split into `block_size` square blocks, the per-channel variance of each block
//! is computed, and the `variance_percentile` of those is reported.
//! High values mean lots of local detail, low values mean flat regions.
//!
//! # Randomness
//!
//! k-means++ seeding is random. Every analysis uses a generator seeded from
//! [`AnalyzerConfig::seed`], so the same input and configuration always give the same output.
//! Use [`VisualAnalyzer::analyze_with_rng`] to provide your own generator.
//!
//! # Logging
//!
//! The analyzer reports progress and skipped data through a [`Logger`].
//! By default this is [`LogFacade`], which forwards to the [`log`] crate.
//! Use [`Silent`] or your own implementation with [`VisualAnalyzer::with_logger`].

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

mod analyzer;
pub mod color;
pub mod compare;
mod counts;
pub mod diversity;
mod error;
pub mod histogram;
pub mod kmeans;
mod logger;
pub mod median_cut;
mod metadata;
mod pixels;
pub mod variance;

pub use analyzer::{AnalysisStats, AnalyzerConfig, VisualAnalyzer, DEFAULT_PALETTE_SIZE, DEFAULT_SATURATION_BOOST};
pub use counts::ColorCounts;
pub use error::AnalysisError;
pub use histogram::{Histogram, HistogramBin};
pub use kmeans::KmeansResult;
pub use logger::{LogFacade, Logger, Silent, LOG_TARGET};
pub use metadata::{Brightness, ChannelVariance, VisualMetadata};
pub use palette::Srgb;
pub use pixels::Pixels;
