// Draft logic: the clan pool and the sub-draw selector.

pub mod pool;
pub mod selector;

use rand::Rng;

use crate::clan::Clan;

/// Unbiased random sub-draw: Fisher-Yates over a copy of `tags`, then the
/// first `min(count, len)` elements in permuted order. One uniform draw per
/// swap; the permuted prefix order becomes the display order.
pub(crate) fn shuffled_take(tags: &[Clan], count: usize, rng: &mut impl Rng) -> Vec<Clan> {
    let mut drawn: Vec<Clan> = tags.to_vec();
    for i in (1..drawn.len()).rev() {
        let j = rng.gen_range(0..=i);
        drawn.swap(i, j);
    }
    drawn.truncate(count.min(tags.len()));
    drawn
}
