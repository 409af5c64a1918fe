use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::SplitData;

/// Number of items that go to the training split
pub fn train_len(len: usize, train_ratio: f64) -> usize {
    ((len as f64 * train_ratio).floor() as usize).min(len)
}

/// Shuffle `items` and split them into training and validation sets
pub fn split_dataset<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    train_ratio: f64,
    rng: &mut R,
) -> SplitData<T> {
    items.shuffle(rng);

    let split_at = train_len(items.len(), train_ratio);
    let val = items.split_off(split_at);

    SplitData { train: items, val }
}

/// Build the shuffling generator, seeded when a seed is given
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            info!("Shuffling with seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}
