use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use hueprint::{median_cut, AnalyzerConfig, ColorCounts, Pixels, Silent, VisualAnalyzer};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::time::Duration;

const SIZES: [(u32, u32); 3] = [(64, 64), (480, 270), (1920, 1080)];

/// A smooth gradient with some noise, so that there are many but not all distinct colors
fn synthetic_image(width: u32, height: u32) -> Vec<u8> {
	let mut rng = Xoroshiro128PlusPlus::seed_from_u64(42);
	let mut data = Vec::with_capacity((width * height * 4) as usize);
	for y in 0..height {
		for x in 0..width {
			let r = (x * 255 / width.max(1)) as u8;
			let g = (y * 255 / height.max(1)) as u8;
			let b = rng.gen_range(0..64u8).wrapping_add(r / 2);
			data.extend_from_slice(&[r, g, b, 255]);
		}
	}
	data
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn preprocessing(c: &mut Criterion) {
	let mut group = create_group(c, "preprocessing");

	for (width, height) in SIZES {
		let data = synthetic_image(width, height);
		let pixels = Pixels::new(&data, width, height).expect("valid dimensions");
		group.bench_with_input(BenchmarkId::from_parameter(format!("{width}x{height}")), &pixels, |b, pixels| {
			b.iter(|| ColorCounts::from_pixels(black_box(pixels)));
		});
	}
}

fn kmeans(c: &mut Criterion) {
	let mut group = create_group(c, "kmeans");
	group.measurement_time(Duration::from_secs(2));

	let data = synthetic_image(480, 270);
	let pixels = Pixels::new(&data, 480, 270).expect("valid dimensions");
	let counts = ColorCounts::from_pixels(&pixels);

	for k in [4, 8, 16] {
		group.bench_with_input(BenchmarkId::new("k", k), &counts, |b, counts| {
			b.iter(|| {
				let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
				hueprint::kmeans::run(counts, black_box(k), black_box(10), black_box(1.0), &mut rng)
			});
		});
	}
}

fn median_cut(c: &mut Criterion) {
	let mut group = create_group(c, "median cut");

	let data = synthetic_image(480, 270);
	let pixels = Pixels::new(&data, 480, 270).expect("valid dimensions");
	let counts = ColorCounts::from_pixels(&pixels);
	let weights = counts.boosted_weights(1.0);

	for size in [5, 10, 32] {
		group.bench_with_input(BenchmarkId::new("palette size", size), &size, |b, &size| {
			b.iter(|| median_cut::quantize(counts.colors(), &weights, black_box(size)));
		});
	}
}

fn all_steps(c: &mut Criterion) {
	let mut group = create_group(c, "analyze");
	group.measurement_time(Duration::from_secs(4));

	let analyzer = VisualAnalyzer::with_logger(AnalyzerConfig::default(), Silent);
	for (width, height) in SIZES {
		let data = synthetic_image(width, height);
		let pixels = Pixels::new(&data, width, height).expect("valid dimensions");
		group.bench_with_input(BenchmarkId::from_parameter(format!("{width}x{height}")), &pixels, |b, pixels| {
			b.iter(|| analyzer.analyze(black_box(pixels)));
		});
	}
}

criterion_group!(benches, preprocessing, kmeans, median_cut, all_steps);
criterion_main!(benches);
