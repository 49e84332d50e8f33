//! # Budgeted Layer Allocation
//!
//! The single algorithm behind preview, separate and clone.
//!
//! ## Algorithm
//!
//! 1. Enumerate every (row, column) location once and shuffle the list
//!    uniformly (Fisher-Yates via [`SliceRandom::shuffle`])
//! 2. Walk the shuffled locations while budget remains:
//!    - for R, G, B in that order draw `v` uniformly from `0..=current`,
//!      cap it at the remaining budget and write it into the layer
//!    - when the pool is [`Pool::Debited`], subtract `v` from the pool
//!    - stop as soon as the budget reaches zero, even mid-location; the
//!      unvisited channels stay zero in the layer and untouched in the pool
//! 3. Return the layer together with whatever budget was left unspent
//!    (non-zero only when the locations ran out first)
//!
//! The RNG is a parameter so callers can replay a generation exactly.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::common::pixels::PixelMatrix;

/// Where channel values are drawn from during one generation.
pub enum Pool<'a> {
    /// Values are read but never modified (preview, clone)
    Shared(&'a PixelMatrix),
    /// Every drawn value is subtracted from the matrix (separate)
    Debited(&'a mut PixelMatrix),
}

impl Pool<'_> {
    fn matrix(&self) -> &PixelMatrix {
        match self {
            Pool::Shared(matrix) => matrix,
            Pool::Debited(matrix) => matrix,
        }
    }
}

/// Output of one generation.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub layer: PixelMatrix,
    /// Budget left when the walk stopped
    pub remaining: u64,
}

/// Every location of a `width × height` grid, row by row.
fn locations(width: u32, height: u32) -> Vec<(u32, u32)> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .collect()
}

/// Generate one layer holding at most `budget` value-units drawn from `pool`.
pub fn allocate_layer<R: Rng>(rng: &mut R, mut pool: Pool<'_>, budget: u64) -> Allocation {
    let (width, height) = pool.matrix().dimensions();
    let mut layer = PixelMatrix::new(width, height);
    let mut remaining = budget;

    if remaining == 0 {
        return Allocation { layer, remaining };
    }

    let mut order = locations(width, height);
    order.shuffle(rng);

    let mut visited = 0usize;
    'walk: for (x, y) in order {
        visited += 1;
        for channel in 0..3 {
            if remaining == 0 {
                break 'walk;
            }

            let current = pool.matrix().get_pixel(x, y)[channel];
            let drawn = rng.gen_range(0..=current);
            let value = u64::from(drawn).min(remaining) as u8;

            layer.get_pixel_mut(x, y)[channel] = value;
            if let Pool::Debited(matrix) = &mut pool {
                matrix.get_pixel_mut(x, y)[channel] -= value;
            }
            remaining -= u64::from(value);
        }
    }

    debug!(
        "Allocated {} of {} units over {} locations",
        budget - remaining,
        budget,
        visited
    );

    Allocation { layer, remaining }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::pixels::channel_sum;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_locations_cover_grid_once() {
        let mut all = locations(3, 2);
        assert_eq!(all.len(), 6);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn test_zero_budget_gives_empty_layer() {
        let source = PixelMatrix::from_pixel(4, 4, Rgb([200, 100, 50]));
        let mut rng = StdRng::seed_from_u64(1);
        let allocation = allocate_layer(&mut rng, Pool::Shared(&source), 0);
        assert_eq!(channel_sum(&allocation.layer), 0);
        assert_eq!(allocation.remaining, 0);
    }

    #[test]
    fn test_spent_plus_remaining_is_budget() {
        let source = PixelMatrix::from_pixel(5, 5, Rgb([255, 255, 255]));
        for budget in [1, 17, 500, 10_000, 1_000_000] {
            let mut rng = StdRng::seed_from_u64(budget);
            let allocation = allocate_layer(&mut rng, Pool::Shared(&source), budget);
            assert_eq!(channel_sum(&allocation.layer) + allocation.remaining, budget);
        }
    }

    #[test]
    fn test_budget_larger_than_source_exhausts_domain() {
        let source = PixelMatrix::from_pixel(2, 2, Rgb([10, 10, 10]));
        let mut rng = StdRng::seed_from_u64(9);
        let allocation = allocate_layer(&mut rng, Pool::Shared(&source), 1_000);
        assert!(allocation.remaining >= 1_000 - 120);
    }

    #[test]
    fn test_debit_moves_values_out_of_pool() {
        let source = PixelMatrix::from_pixel(6, 6, Rgb([90, 180, 255]));
        let mut pool = source.clone();
        let mut rng = StdRng::seed_from_u64(3);
        let allocation = allocate_layer(&mut rng, Pool::Debited(&mut pool), 2_000);

        for ((layer, left), original) in allocation
            .layer
            .as_raw()
            .iter()
            .zip(pool.as_raw())
            .zip(source.as_raw())
        {
            assert_eq!(u16::from(*layer) + u16::from(*left), u16::from(*original));
        }
    }

    #[test]
    fn test_shared_pool_is_untouched() {
        let source = PixelMatrix::from_pixel(3, 3, Rgb([40, 50, 60]));
        let snapshot = source.clone();
        let mut rng = StdRng::seed_from_u64(5);
        let allocation = allocate_layer(&mut rng, Pool::Shared(&source), 300);
        assert_eq!(source, snapshot);
        for (value, limit) in allocation.layer.as_raw().iter().zip(source.as_raw()) {
            assert!(value <= limit);
        }
    }
}
