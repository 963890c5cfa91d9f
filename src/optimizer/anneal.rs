use crate::consts::ACCEPT_PROBABILITY_FLOOR;

/// Metropolis acceptance for a maximized score.
///
/// Improvements always pass. At zero temperature nothing else does. Otherwise
/// a worse score passes with probability `exp((new - current) / temperature)`,
/// except below the `ACCEPT_PROBABILITY_FLOOR` cutoff where it never does.
#[inline]
pub fn accept(new_score: i64, current_score: i64, temperature: f64, rng: &mut fastrand::Rng) -> bool {
    if new_score > current_score {
        return true;
    }
    if temperature == 0.0 {
        return false;
    }
    let ratio = (new_score - current_score) as f64 / temperature;
    if ratio <= ACCEPT_PROBABILITY_FLOOR.ln() {
        return false;
    }
    metropolis(ratio, rng.f64())
}

/// The acceptance test for a given `ratio` and uniform `draw` in `[0, 1)`.
#[inline]
pub fn metropolis(ratio: f64, draw: f64) -> bool {
    ratio > ACCEPT_PROBABILITY_FLOOR.ln() && ratio.exp() > draw
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_floor_rejects_regardless_of_draw() {
        let ratio = ACCEPT_PROBABILITY_FLOOR.ln() - 0.01;
        assert!(!metropolis(ratio, 0.0));
    }

    #[test]
    fn test_draw_decides_above_floor() {
        let ratio = -1.0; // exp = 0.3679
        assert!(metropolis(ratio, 0.2));
        assert!(!metropolis(ratio, 0.5));
    }

    #[test]
    fn test_equal_scores_pass_when_warm() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(accept(500, 500, 10.0, &mut rng));
    }

    proptest! {
        #[test]
        fn prop_improvements_always_accepted(
            current in -1_000_000i64..1_000_000,
            gain in 1i64..1_000_000,
            temperature in 0.0f64..1e7,
            seed in any::<u64>()
        ) {
            let mut rng = fastrand::Rng::with_seed(seed);
            prop_assert!(accept(current + gain, current, temperature, &mut rng));
        }

        #[test]
        fn prop_cold_rejects_non_improvements(
            current in -1_000_000i64..1_000_000,
            loss in 0i64..1_000_000,
            seed in any::<u64>()
        ) {
            let mut rng = fastrand::Rng::with_seed(seed);
            prop_assert!(!accept(current - loss, current, 0.0, &mut rng));
        }

        #[test]
        fn prop_same_seed_same_decision(
            loss in 0i64..50_000,
            temperature in 1.0f64..100_000.0,
            seed in any::<u64>()
        ) {
            let mut a = fastrand::Rng::with_seed(seed);
            let mut b = fastrand::Rng::with_seed(seed);
            prop_assert_eq!(
                accept(-loss, 0, temperature, &mut a),
                accept(-loss, 0, temperature, &mut b)
            );
        }
    }
}
