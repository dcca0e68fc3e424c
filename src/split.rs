use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::types::{SourcedAnnotation, SplitData};

/// Partition the records into disjoint train/val subsets.
///
/// The shuffle is seeded, so membership is reproducible for a fixed seed and
/// a fixed input ordering. The train subset gets `ceil(n * train_ratio)`
/// records; with fewer than 2 records the val subset may be empty.
pub fn split_annotations(
    mut annotations: Vec<SourcedAnnotation>,
    train_ratio: f32,
    seed: u64,
) -> SplitData {
    let mut rng = StdRng::seed_from_u64(seed);
    annotations.shuffle(&mut rng);

    let total = annotations.len();
    let train_size = ((total as f32 * train_ratio).ceil() as usize).min(total);

    let val_annotations = annotations.split_off(train_size);
    let train_annotations = annotations;

    SplitData {
        train_annotations,
        val_annotations,
    }
}
