//! Per-run sampling of resolvers and cities.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Picks uniform random subsets. Seeded runs are reproducible.
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Up to `count` distinct items, in their source order. Everything is
    /// returned when `count` covers the whole list.
    pub fn sample<T: Clone>(&mut self, items: &[T], count: usize) -> Vec<T> {
        if count >= items.len() {
            return items.to_vec();
        }
        let mut picked = index::sample(&mut self.rng, items.len(), count).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| items[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_keeps_source_order_and_is_distinct() {
        let items: Vec<u32> = (0..50).collect();
        let picked = Sampler::new(Some(7)).sample(&items, 10);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_seeded_sampling_is_deterministic() {
        let items: Vec<u32> = (0..50).collect();
        assert_eq!(
            Sampler::new(Some(42)).sample(&items, 5),
            Sampler::new(Some(42)).sample(&items, 5)
        );
    }

    #[test]
    fn test_count_is_clamped() {
        let items = vec!["a", "b", "c"];
        let mut sampler = Sampler::new(None);
        assert_eq!(sampler.sample(&items, 10), items);
        assert!(sampler.sample(&items, 0).is_empty());
    }
}
