//! Weighted k-means for dominant color extraction

use crate::{
	color::{components, squared_distance, to_srgb},
	ColorCounts,
};
use palette::Srgb;
use rand::Rng;

/// Default maximum number of Lloyd iterations
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Default convergence threshold: every centroid must move less than this squared distance
pub const DEFAULT_CONVERGENCE: f64 = 1.0;

/// Bookkeeping for each k-means data point
struct PointData {
	/// Weight of each data point used to randomly select starting centroids in k-means++
	weight: Vec<f64>,
}

impl PointData {
	/// Create a [`PointData`] with the given number data points
	fn new(n: usize) -> Self {
		Self { weight: vec![f64::INFINITY; n] }
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point
	centroid: Vec<[f64; 3]>,
	/// Weighted vector sum of all data points in this center
	sum: Vec<[f64; 3]>,
	/// Total pixel count of all data points in this center
	count: Vec<u64>,
}

impl CenterData {
	/// Create a [`CenterData`] with room for the given number of centers
	fn new(k: usize) -> Self {
		Self {
			centroid: Vec::with_capacity(k),
			sum: Vec::new(),
			count: Vec::new(),
		}
	}

	/// Clear the sums and counts for the next assignment step
	fn reset_sums(&mut self) {
		let k = self.centroid.len();
		self.sum.clear();
		self.sum.resize(k, [0.0; 3]);
		self.count.clear();
		self.count.resize(k, 0);
	}
}

/// Result from running k-means
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
	/// Final centroid colors, ranked by descending pixel count
	pub centroids: Vec<Srgb<u8>>,
	/// Number of pixels in each centroid
	pub counts: Vec<u64>,
	/// Number of elapsed Lloyd iterations
	pub iterations: u32,
}

impl KmeansResult {
	/// Create an empty result, representing that k-means could not be run
	const fn empty() -> Self {
		Self {
			centroids: Vec::new(),
			counts: Vec::new(),
			iterations: 0,
		}
	}
}

/// Choose the starting centroids using the k-means++ algorithm weighted by color counts.
///
/// The first centroid is sampled proportional to count,
/// and each next one proportional to `count * squared distance` to its closest centroid.
/// Fewer than `k` centroids are chosen if every point already matches a centroid.
fn kmeans_plus_plus(
	k: usize,
	rng: &mut impl Rng,
	points: &[[f64; 3]],
	counts: &[u32],
	centroids: &mut Vec<[f64; 3]>,
	weights: &mut [f64],
) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	match WeightedIndex::new(counts) {
		Ok(sampler) => centroids.push(points[sampler.sample(rng)]),
		Err(AllWeightsZero | NoItem) => return,
		Err(InvalidWeight | TooMany) => unreachable!("counts are integers and points.len() is in 1..=2.pow(24)"),
	}

	for i in 1..k {
		let centroid = centroids[i - 1];
		for (weight, &point) in weights.iter_mut().zip(points) {
			*weight = f64::min(*weight, squared_distance(point, centroid));
		}

		let sampler = WeightedIndex::new(weights.iter().zip(counts).map(|(&dist, &n)| dist * f64::from(n)));

		match sampler {
			Ok(sampler) => centroids.push(points[sampler.sample(rng)]),
			Err(AllWeightsZero) => return, // all points exactly match a centroid
			Err(InvalidWeight | NoItem | TooMany) => {
				unreachable!("distances are finite and >= 0 and points.len() is in 1..=2.pow(24)")
			},
		}
	}
}

/// Index of the closest centroid, the first one winning ties
fn nearest(point: [f64; 3], centroids: &[[f64; 3]]) -> usize {
	let mut min_dist = f64::INFINITY;
	let mut min_center = 0;
	for (i, &centroid) in centroids.iter().enumerate() {
		let dist = squared_distance(point, centroid);
		if dist < min_dist {
			min_dist = dist;
			min_center = i;
		}
	}
	min_center
}

/// Assign every point to its closest center and accumulate the center sums
fn update_assignments(points: &[[f64; 3]], counts: &[u32], centers: &mut CenterData) {
	centers.reset_sums();
	for (&point, &n) in points.iter().zip(counts) {
		let ci = nearest(point, &centers.centroid);
		let nf = f64::from(n);
		let sum = &mut centers.sum[ci];
		sum[0] += nf * point[0];
		sum[1] += nf * point[1];
		sum[2] += nf * point[2];
		centers.count[ci] += u64::from(n);
	}
}

/// Move each centroid to the weighted mean of its points.
///
/// Empty centers are reseeded to a uniformly random point.
/// Returns whether every centroid moved less than `convergence` (squared distance)
/// and no center had to be reseeded.
fn update_centroids(
	rng: &mut impl Rng,
	points: &[[f64; 3]],
	centers: &mut CenterData,
	convergence: f64,
) -> bool {
	let mut converged = true;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		if n == 0 {
			*centroid = points[rng.gen_range(0..points.len())];
			converged = false;
		} else {
			// n is a pixel count, far below 2^52
			#[allow(clippy::cast_precision_loss)]
			let n = n as f64;
			let new_centroid = [sum[0] / n, sum[1] / n, sum[2] / n];
			if squared_distance(*centroid, new_centroid) >= convergence {
				converged = false;
			}
			*centroid = new_centroid;
		}
	}

	converged
}

/// The colors themselves, ranked by descending count
fn rank_colors(colors: &ColorCounts) -> KmeansResult {
	let mut pairs = colors.pairs().map(|(color, n)| (color, u64::from(n))).collect::<Vec<_>>();
	pairs.sort_by_key(|&(_, n)| std::cmp::Reverse(n));
	let (centroids, counts) = pairs.into_iter().unzip();
	KmeansResult { centroids, counts, iterations: 0 }
}

/// Run weighted k-means to find (at most) `k` dominant colors.
///
/// If there are no more distinct colors than `k`, the colors are returned as is.
/// Otherwise centroids are seeded with k-means++ and refined with at most `max_iter`
/// Lloyd iterations. The final centroids are ranked by descending pixel count and
/// centroids left without any pixels are dropped.
///
/// An empty result is returned if `colors` is empty or `k` = 0.
pub fn run(
	colors: &ColorCounts,
	k: usize,
	max_iter: u32,
	convergence: f64,
	rng: &mut impl Rng,
) -> KmeansResult {
	if k == 0 || colors.is_empty() {
		return KmeansResult::empty();
	}

	if colors.num_colors() <= k {
		return rank_colors(colors);
	}

	let points = colors.colors().iter().map(|&color| components(color)).collect::<Vec<_>>();
	let counts = colors.counts();

	let mut centers = CenterData::new(k);
	let mut data = PointData::new(points.len());

	kmeans_plus_plus(k, rng, &points, counts, &mut centers.centroid, &mut data.weight);

	let mut iterations = 0;
	let mut converged = false;
	while iterations < max_iter && !converged {
		update_assignments(&points, counts, &mut centers);
		converged = update_centroids(rng, &points, &mut centers, convergence);
		iterations += 1;
	}

	if iterations == 0 {
		// no Lloyd iterations were allowed, but the seeds still need their pixel counts
		update_assignments(&points, counts, &mut centers);
	}

	let mut ranked = centers
		.centroid
		.iter()
		.zip(&centers.count)
		.filter_map(|(&centroid, &n)| if n == 0 { None } else { Some((to_srgb(centroid), n)) })
		.collect::<Vec<_>>();

	ranked.sort_by_key(|&(_, n)| std::cmp::Reverse(n));

	let (centroids, counts) = ranked.into_iter().unzip();
	KmeansResult { centroids, counts, iterations }
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_xoshiro::Xoroshiro128PlusPlus;

	fn rng(seed: u64) -> Xoroshiro128PlusPlus {
		Xoroshiro128PlusPlus::seed_from_u64(seed)
	}

	fn test_data() -> ColorCounts {
		ColorCounts::from_pairs([
			(Srgb::new(250, 10, 10), 12),
			(Srgb::new(240, 20, 5), 11),
			(Srgb::new(10, 240, 20), 10),
			(Srgb::new(20, 230, 30), 9),
			(Srgb::new(5, 15, 245), 8),
			(Srgb::new(15, 5, 235), 7),
			(Srgb::new(128, 128, 128), 6),
			(Srgb::new(120, 130, 125), 5),
			(Srgb::new(255, 255, 255), 4),
			(Srgb::new(250, 245, 250), 3),
			(Srgb::new(0, 0, 0), 2),
			(Srgb::new(8, 4, 2), 1),
		])
	}

	fn kmeans_plus_plus_num_centroids(k: usize, n: usize) {
		let data = test_data();
		let points = data.colors()[..n].iter().map(|&c| components(c)).collect::<Vec<_>>();
		let mut centroids = Vec::new();
		let mut weights = vec![f64::INFINITY; n];

		kmeans_plus_plus(k, &mut rng(0), &points, &data.counts()[..n], &mut centroids, &mut weights);

		assert_eq!(centroids.len(), usize::min(k, n));
	}

	#[test]
	fn kmeans_plus_plus_k_greater_than_n() {
		kmeans_plus_plus_num_centroids(6, 2);
	}

	#[test]
	fn kmeans_plus_plus_k_equals_n() {
		kmeans_plus_plus_num_centroids(4, 4);
	}

	#[test]
	fn kmeans_plus_plus_k_less_than_n() {
		kmeans_plus_plus_num_centroids(2, 6);
	}

	#[test]
	fn kmeans_plus_plus_never_picks_a_chosen_point_twice() {
		let data = test_data();
		let points = data.colors().iter().map(|&c| components(c)).collect::<Vec<_>>();
		for seed in 0..16 {
			let mut centroids = Vec::new();
			let mut weights = vec![f64::INFINITY; points.len()];
			kmeans_plus_plus(points.len(), &mut rng(seed), &points, data.counts(), &mut centroids, &mut weights);

			for (i, x) in centroids.iter().enumerate() {
				assert!(centroids[(i + 1)..].iter().all(|y| x != y));
			}
		}
	}

	#[test]
	fn nearest_prefers_first_on_ties() {
		let centroids = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
		assert_eq!(nearest([1.0, 0.0, 0.0], &centroids), 0);
		assert_eq!(nearest([1.5, 0.0, 0.0], &centroids), 1);
	}

	#[test]
	fn update_assignments_preserves_total_count() {
		let data = test_data();
		let points = data.colors().iter().map(|&c| components(c)).collect::<Vec<_>>();
		let mut centers = CenterData::new(3);
		let mut point_data = PointData::new(points.len());
		kmeans_plus_plus(3, &mut rng(1), &points, data.counts(), &mut centers.centroid, &mut point_data.weight);

		update_assignments(&points, data.counts(), &mut centers);

		let total = data.counts().iter().map(|&n| u64::from(n)).sum::<u64>();
		assert_eq!(centers.count.iter().sum::<u64>(), total);

		for (&point, &n) in points.iter().zip(data.counts()) {
			let center = nearest(point, &centers.centroid);
			let sum = &mut centers.sum[center];
			for (s, p) in sum.iter_mut().zip(point) {
				*s -= f64::from(n) * p;
			}
		}

		for sum in &centers.sum {
			for &s in sum {
				assert!(s.abs() < 1e-6);
			}
		}
	}

	#[test]
	fn empty_center_is_reseeded_and_not_converged() {
		let points = vec![[0.0, 0.0, 0.0], [10.0, 10.0, 10.0]];
		let mut centers = CenterData::new(2);
		centers.centroid = vec![[0.0, 0.0, 0.0], [200.0, 200.0, 200.0]];
		centers.reset_sums();
		centers.sum[0] = [0.0, 0.0, 0.0];
		centers.count[0] = 1;

		let converged = update_centroids(&mut rng(0), &points, &mut centers, DEFAULT_CONVERGENCE);

		assert!(!converged);
		assert!(points.contains(&centers.centroid[1]));
	}

	#[test]
	fn few_colors_are_returned_directly() {
		let colors = ColorCounts::from_pairs([(Srgb::new(1, 2, 3), 1), (Srgb::new(9, 9, 9), 5)]);
		let result = run(&colors, 4, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(0));
		assert_eq!(result.centroids, vec![Srgb::new(9, 9, 9), Srgb::new(1, 2, 3)]);
		assert_eq!(result.counts, vec![5, 1]);
		assert_eq!(result.iterations, 0);
	}

	#[test]
	fn empty_input_or_zero_k() {
		let empty = ColorCounts::new();
		assert_eq!(run(&empty, 3, 10, 1.0, &mut rng(0)), KmeansResult::empty());
		assert_eq!(run(&test_data(), 0, 10, 1.0, &mut rng(0)), KmeansResult::empty());
	}

	#[test]
	fn result_is_ranked_and_bounded() {
		let data = test_data();
		for seed in 0..8 {
			let result = run(&data, 4, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(seed));
			assert!(result.centroids.len() <= 4);
			assert_eq!(result.centroids.len(), result.counts.len());
			assert!(result.counts.windows(2).all(|w| w[0] >= w[1]));
			assert_eq!(result.counts.iter().sum::<u64>(), 78);
			assert!(result.iterations <= DEFAULT_MAX_ITERATIONS);
		}
	}

	#[test]
	fn same_seed_same_result() {
		let data = test_data();
		let x = run(&data, 5, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(42));
		let y = run(&data, 5, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(42));
		assert_eq!(x, y);
	}

	#[test]
	fn heaviest_cluster_ranks_first() {
		// whichever two points are seeded, the reds end up alone and outweigh the greens
		let data = ColorCounts::from_pairs([
			(Srgb::new(255, 0, 0), 3),
			(Srgb::new(0, 255, 0), 1),
			(Srgb::new(0, 230, 20), 1),
		]);
		for seed in 0..16 {
			let result = run(&data, 2, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(seed));
			assert_eq!(result.centroids[0], Srgb::new(255, 0, 0));
			assert_eq!(result.counts, vec![3, 2]);
		}
	}

	#[test]
	fn separated_clusters_converge_early() {
		let data = ColorCounts::from_pairs([
			(Srgb::new(0, 0, 0), 5),
			(Srgb::new(2, 0, 0), 5),
			(Srgb::new(250, 250, 250), 5),
			(Srgb::new(252, 250, 250), 5),
		]);

		for seed in 0..8 {
			let result = run(&data, 2, DEFAULT_MAX_ITERATIONS, DEFAULT_CONVERGENCE, &mut rng(seed));
			assert!(result.iterations < DEFAULT_MAX_ITERATIONS);
			let mut centroids = result.centroids.clone();
			centroids.sort_by_key(|c| c.red);
			assert_eq!(centroids, vec![Srgb::new(1, 0, 0), Srgb::new(251, 250, 250)]);

			let exact = run(&data, 2, DEFAULT_MAX_ITERATIONS, 0.0, &mut rng(seed));
			assert!(exact.iterations >= result.iterations);
		}
	}

	#[test]
	fn max_iter_caps_iterations() {
		let data = test_data();
		let result = run(&data, 6, 1, 0.0, &mut rng(3));
		assert_eq!(result.iterations, 1);
	}
}
