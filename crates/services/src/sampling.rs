use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use quiz_core::model::TestNumber;

/// Source of randomness for drawing test subsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sampler {
    #[default]
    Entropy,
    Seeded(u64),
}

impl Sampler {
    /// Uniformly permute `items` for `test`.
    ///
    /// A seeded sampler gives each test its own stream, so two tests drawn
    /// under the same seed still differ.
    pub fn shuffle_for<T>(&self, test: TestNumber, items: &mut [T]) {
        match self {
            Self::Entropy => items.shuffle(&mut rand::rng()),
            Self::Seeded(seed) => {
                let stream = u64::from(test.value()).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let mut rng = StdRng::seed_from_u64(seed ^ stream);
                items.shuffle(&mut rng);
            }
        }
    }
}
