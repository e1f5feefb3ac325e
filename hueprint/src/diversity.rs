//! Greedy max-min selection of mutually distinct colors

use crate::color::{distance, saturation_of};
use palette::Srgb;

/// Default ratio between the candidate palette size and the number of distinct colors
pub const DEFAULT_CANDIDATE_FACTOR: usize = 2;

/// Select up to `count` colors from `candidates` that are as far apart as possible.
///
/// Candidates are ordered by descending saturation (stable), and the most saturated
/// one seeds the selection. Then the candidate whose distance to its closest selected
/// color is the largest is added, the earliest candidate winning ties, until `count`
/// colors are selected.
///
/// If there are no more candidates than `count`, they are returned unchanged.
#[must_use]
pub fn select_distinct(candidates: &[Srgb<u8>], count: usize) -> Vec<Srgb<u8>> {
	if candidates.len() <= count {
		return candidates.to_vec();
	}

	if count == 0 {
		return Vec::new();
	}

	let mut remaining = candidates.to_vec();
	remaining.sort_by(|x, y| f64::total_cmp(&saturation_of(*y), &saturation_of(*x)));

	let mut selected = Vec::with_capacity(count);
	selected.push(remaining.remove(0));

	// distance from each remaining candidate to its closest selected color
	let mut min_dist = remaining.iter().map(|&c| distance(c, selected[0])).collect::<Vec<_>>();

	while selected.len() < count && !remaining.is_empty() {
		let mut best = 0;
		for i in 1..remaining.len() {
			if min_dist[i] > min_dist[best] {
				best = i;
			}
		}

		let color = remaining.remove(best);
		min_dist.remove(best);
		selected.push(color);

		for (dist, &other) in min_dist.iter_mut().zip(&remaining) {
			*dist = f64::min(*dist, distance(other, color));
		}
	}

	selected
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn few_candidates_are_unchanged() {
		let candidates = [Srgb::new(10, 10, 10), Srgb::new(255, 0, 0)];
		assert_eq!(select_distinct(&candidates, 2), candidates.to_vec());
		assert_eq!(select_distinct(&candidates, 5), candidates.to_vec());
		assert!(select_distinct(&[], 3).is_empty());
	}

	#[test]
	fn zero_count_selects_nothing() {
		assert!(select_distinct(&[Srgb::new(1, 2, 3)], 0).is_empty());
	}

	#[test]
	fn seeds_with_most_saturated() {
		let candidates = [Srgb::new(100, 100, 100), Srgb::new(0, 200, 0), Srgb::new(120, 100, 100)];
		let selected = select_distinct(&candidates, 1);
		assert_eq!(selected, vec![Srgb::new(0, 200, 0)]);
	}

	#[test]
	fn picks_farthest_from_selection() {
		let candidates = [
			Srgb::new(255, 0, 0),
			Srgb::new(250, 10, 10),
			Srgb::new(245, 5, 0),
			Srgb::new(0, 0, 0),
			Srgb::new(30, 30, 30),
			Srgb::new(255, 255, 255),
		];
		let selected = select_distinct(&candidates, 3);
		assert_eq!(
			selected,
			vec![Srgb::new(255, 0, 0), Srgb::new(255, 255, 255), Srgb::new(0, 0, 0)]
		);
	}

	#[test]
	fn greedy_min_distance_never_increases() {
		let candidates = (0..=255u8)
			.step_by(15)
			.map(|v| Srgb::new(v, v.wrapping_mul(7), 255 - v))
			.collect::<Vec<_>>();
		let selected = select_distinct(&candidates, 6);
		assert_eq!(selected.len(), 6);

		// each added color is at most as far from the earlier ones as the one before it
		let mut previous = f64::INFINITY;
		for i in 1..selected.len() {
			let dist = selected[..i]
				.iter()
				.map(|&c| distance(c, selected[i]))
				.fold(f64::INFINITY, f64::min);
			assert!(dist <= previous + 1e-9);
			previous = dist;
		}
	}

	#[test]
	fn deterministic_for_fixed_order() {
		let candidates = [
			Srgb::new(10, 200, 30),
			Srgb::new(200, 10, 30),
			Srgb::new(30, 10, 200),
			Srgb::new(128, 128, 0),
			Srgb::new(0, 128, 128),
		];
		assert_eq!(select_distinct(&candidates, 3), select_distinct(&candidates, 3));
	}
}
