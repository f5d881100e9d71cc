use rand::Rng;
use std::ops::Range;

/// Produces the bar heights for a freshly generated array
#[cfg_attr(test, mockall::automock)]
pub trait ValueSource: Send + Sync {
    /// Return `len` values, each inside `range`
    fn fill(&self, len: usize, range: Range<u32>) -> Vec<u32>;
}

/// Independent uniform draws from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSource;

impl ValueSource for RandomSource {
    fn fill(&self, len: usize, range: Range<u32>) -> Vec<u32> {
        let mut rng = rand::thread_rng();
        (0..len).map(|_| rng.gen_range(range.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_source_respects_bounds() {
        for _ in 0..20 {
            let values = RandomSource.fill(80, 20..420);
            assert_eq!(values.len(), 80);
            assert!(values.iter().all(|v| (20..420).contains(v)));
        }
    }

    #[test]
    fn test_random_source_single_value_range() {
        let values = RandomSource.fill(5, 7..8);
        assert_eq!(values, vec![7; 5]);
    }

    #[test]
    fn test_random_source_empty() {
        assert!(RandomSource.fill(0, 20..420).is_empty());
    }
}
