//! Fisher-Yates shuffle used for the randomised target permutation
//! (spec §4.5: "the shuffle of a 3-element array using Fisher-Yates").

use rand::Rng;

pub fn fisher_yates<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items = [0, 1, 2];
        fisher_yates(&mut items, &mut rng);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2]);
    }

    #[test]
    fn shuffle_is_deterministic_for_a_fixed_seed() {
        let mut a = [0, 1, 2];
        let mut b = [0, 1, 2];
        fisher_yates(&mut a, &mut StdRng::seed_from_u64(42));
        fisher_yates(&mut b, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
