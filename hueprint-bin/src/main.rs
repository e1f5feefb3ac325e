//! Print the visual fingerprint of images and rank them by color, brightness, and detail.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use hueprint::{AnalysisStats, HistogramBin, Srgb, VisualAnalyzer, VisualMetadata};
use image::{DynamicImage, GenericImageView};

/// Record the running time of a function and log the elapsed time
macro_rules! time {
    ($name: literal, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        log::debug!("{} took {}ms", $name, start.elapsed().as_millis());
        result
    }};
}

/// Writes log records to stderr
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// The global logger
static LOGGER: StderrLogger = StderrLogger;

/// Install the stderr logger, showing debug records only when `verbose`
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Error cases for loading and decoding an image
#[derive(Debug)]
enum ImageLoadError {
    /// Failed to read or decode the image file
    ImageLoad(PathBuf, image::ImageError),
    /// Failed to read the avif file
    #[cfg(feature = "avif")]
    AvifRead(PathBuf, std::io::Error),
    /// Failed to decode the avif file
    #[cfg(feature = "avif")]
    AvifDecode(PathBuf, libavif_image::Error),
}

impl Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageLoadError::ImageLoad(path, e) => {
                write!(f, "Failed to load the image file {}: {e}", path.display())
            }
            #[cfg(feature = "avif")]
            ImageLoadError::AvifRead(path, e) => {
                write!(f, "Failed to read the avif file {}: {e}", path.display())
            }
            #[cfg(feature = "avif")]
            ImageLoadError::AvifDecode(path, e) => {
                write!(f, "Failed to decode the avif file {}: {e}", path.display())
            }
        }
    }
}

/// An analyzed image
struct Analyzed<'a> {
    /// Where the image was loaded from
    path: &'a Path,
    /// Its fingerprint
    metadata: VisualMetadata,
}

fn main() -> ExitCode {
    let options = Options::parse();
    init_logger(options.verbose);

    let result = run_analyze_and_print(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a thread pool and then runs `analyze_and_print`
#[cfg(feature = "threads")]
fn run_analyze_and_print(options: &Options) -> Result<(), ImageLoadError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
        .expect("initialized thread pool");

    pool.install(|| analyze_and_print(options))
}

/// Runs `analyze_and_print` on a single thread
#[cfg(not(feature = "threads"))]
fn run_analyze_and_print(options: &Options) -> Result<(), ImageLoadError> {
    analyze_and_print(options)
}

/// Analyze every image, rank them if asked to, and print the results
fn analyze_and_print(options: &Options) -> Result<(), ImageLoadError> {
    let analyzer = VisualAnalyzer::new(options.config());

    let start = Instant::now();
    let mut images = analyze_all(&analyzer, options)?;
    log::debug!(
        "Analyzing {} images took {}ms in total",
        images.len(),
        start.elapsed().as_millis()
    );

    if let Some(sort) = options.sort {
        let compare = sort.comparator(options.grayscale_threshold);
        images.sort_by(|a, b| compare(&a.metadata, &b.metadata));
    }

    if options.reverse {
        images.reverse();
    }

    for (i, image) in images.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_metadata(image, options);
    }

    Ok(())
}

/// Analyze the images in parallel
#[cfg(feature = "threads")]
fn analyze_all<'a>(
    analyzer: &VisualAnalyzer,
    options: &'a Options,
) -> Result<Vec<Analyzed<'a>>, ImageLoadError> {
    use rayon::prelude::*;
    options
        .images
        .par_iter()
        .map(|path| analyze_one(analyzer, path, options))
        .collect()
}

/// Analyze the images one after another
#[cfg(not(feature = "threads"))]
fn analyze_all<'a>(
    analyzer: &VisualAnalyzer,
    options: &'a Options,
) -> Result<Vec<Analyzed<'a>>, ImageLoadError> {
    options
        .images
        .iter()
        .map(|path| analyze_one(analyzer, path, options))
        .collect()
}

/// Load, thumbnail, and analyze a single image
fn analyze_one<'a>(
    analyzer: &VisualAnalyzer,
    path: &'a Path,
    options: &Options,
) -> Result<Analyzed<'a>, ImageLoadError> {
    let image = time!("Image loading", load_image(path))?;
    let image = generate_thumbnail(image, options.max_pixels).into_rgba8();

    let (metadata, stats) = time!(
        "Analysis",
        analyzer.analyze_with_stats(&hueprint::Pixels::from_image(&image))
    );
    log_stats(path, &stats);

    Ok(Analyzed { path, metadata })
}

/// Log what the analysis went through
fn log_stats(path: &Path, stats: &AnalysisStats) {
    log::debug!(
        "{}: reduced {} pixels to {} distinct colors, k-means took {} iterations",
        path.display(),
        stats.pixels,
        stats.distinct_colors,
        stats.kmeans_iterations
    );
}

/// Load the image at the given path
#[cfg(feature = "avif")]
fn load_image(path: &Path) -> Result<DynamicImage, ImageLoadError> {
    if path.extension().map_or(false, |ext| ext == "avif") {
        let buf =
            std::fs::read(path).map_err(|e| ImageLoadError::AvifRead(path.to_path_buf(), e))?;
        libavif_image::read(&buf).map_err(|e| ImageLoadError::AvifDecode(path.to_path_buf(), e))
    } else {
        image::open(path).map_err(|e| ImageLoadError::ImageLoad(path.to_path_buf(), e))
    }
}

/// Load the image at the given path
#[cfg(not(feature = "avif"))]
fn load_image(path: &Path) -> Result<DynamicImage, ImageLoadError> {
    image::open(path).map_err(|e| ImageLoadError::ImageLoad(path.to_path_buf(), e))
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: DynamicImage, max_pixels: u32) -> DynamicImage {
    // The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
    let (width, height) = image.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels <= u64::from(max_pixels) {
        log::debug!("Skipping image thumbnail since pixels was below max pixels");
        image
    } else {
        // (u64 as f64) only gives innaccurate results for very large u64
        // I.e, only when pixels is in the order of quintillions
        #[allow(clippy::cast_precision_loss)]
        let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

        // multiplying by a positive factor < 1
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (thumb_width, thumb_height) = (
            (f64::from(width) * scale) as u32,
            (f64::from(height) * scale) as u32,
        );

        log::debug!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");

        time!("Image thumbnail", image.thumbnail(thumb_width, thumb_height))
    }
}

/// Print the fingerprint of one image
fn print_metadata(image: &Analyzed, options: &Options) {
    let metadata = &image.metadata;

    println!("{}", image.path.display().to_string().bold());
    print_colors("average", &[metadata.average_color], options);
    print_colors(
        "dominant",
        metadata.dominant_colors.as_deref().unwrap_or_default(),
        options,
    );
    print_colors("palette", &metadata.representative_palette, options);
    print_colors("distinct", &metadata.distinct_palette, options);

    let brightness = metadata.brightness;
    println!(
        "{:<10} {:.3} ({:.3} to {:.3})",
        "brightness", brightness.average, brightness.min, brightness.max
    );

    let variance = metadata.color_variance;
    println!(
        "{:<10} r {:.1} g {:.1} b {:.1}",
        "variance", variance.r, variance.g, variance.b
    );

    if options.histogram {
        if let Some(histogram) = &metadata.histogram {
            for (name, bins) in ["red", "green", "blue"].into_iter().zip(histogram.channels()) {
                println!("{name:<10} {}", format_bins(bins));
            }
        }
    }
}

/// Format the bin counts of a histogram channel, skipping empty bins
fn format_bins(bins: &[HistogramBin]) -> String {
    bins.iter()
        .filter(|bin| bin.count > 0)
        .map(|bin| format!("{}:{}", bin.value, bin.count))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print a labeled line of colors based off the provided options
fn print_colors(label: &str, colors: &[Srgb<u8>], options: &Options) {
    let delimiter = match options.output {
        FormatOutput::Swatch => "",
        FormatOutput::Hex | FormatOutput::Rgb => " ",
    };

    println!(
        "{label:<10} {}",
        colors
            .iter()
            .map(|&color| format_color(color, options))
            .collect::<Vec<_>>()
            .join(delimiter)
    );
}

/// Format and colorize the text for a color
fn format_color(color: Srgb<u8>, options: &Options) -> String {
    let text = match options.output {
        FormatOutput::Hex => format!("{color:X}"),
        FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
        FormatOutput::Swatch => {
            return "   "
                .on_truecolor(color.red, color.green, color.blue)
                .to_string()
        }
    };

    match options.colorize {
        Some(ColorizeOutput::Fg) => text
            .truecolor(color.red, color.green, color.blue)
            .to_string(),
        Some(ColorizeOutput::Bg) => text
            .on_truecolor(color.red, color.green, color.blue)
            .to_string(),
        None => text,
    }
}
