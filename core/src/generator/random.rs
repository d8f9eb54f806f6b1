use ndarray::Array2;
use smallvec::SmallVec;

use super::*;

/// Candidate ids for one repair pass; a 6x6 board fits without spilling.
type CandidateIds = SmallVec<[usize; 36]>;

/// Generation strategy that draws every square's validity independently at the
/// level's probability and then repairs the result so each board keeps at
/// least two valid and two invalid squares.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Board {
        use rand::prelude::*;

        let total = config.total_squares();
        let probability = config.valid_probability();
        let size = usize::from(config.columns);

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut valid_mask: Array2<bool> = Array2::default((size, size));
        let mut valid_count: SquareCount = 0;
        for is_valid in valid_mask.iter_mut() {
            if rng.random_bool(probability) {
                *is_valid = true;
                valid_count += 1;
            }
        }

        // Each repair iteration moves exactly one square toward the violated
        // bound, so both loops terminate.
        {
            let squares = valid_mask.as_slice_mut().expect("layout should be standard");
            while valid_count < Board::MIN_VALID && valid_count < total {
                let candidates: CandidateIds = invalid_ids(squares);
                squares[pick(&mut rng, &candidates)] = true;
                valid_count += 1;
            }
            while valid_count > total.saturating_sub(Board::MIN_INVALID) {
                let candidates: CandidateIds = valid_ids(squares);
                squares[pick(&mut rng, &candidates)] = false;
                valid_count -= 1;
            }
        }

        Board::from_valid_mask(valid_mask)
    }
}

fn invalid_ids(squares: &[bool]) -> CandidateIds {
    squares
        .iter()
        .enumerate()
        .filter(|&(_, &is_valid)| !is_valid)
        .map(|(id, _)| id)
        .collect()
}

fn valid_ids(squares: &[bool]) -> CandidateIds {
    squares
        .iter()
        .enumerate()
        .filter(|&(_, &is_valid)| is_valid)
        .map(|(id, _)| id)
        .collect()
}

fn pick(rng: &mut impl rand::Rng, candidates: &CandidateIds) -> usize {
    use rand::RngExt;
    candidates[rng.random_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boards_keep_the_minimum_valid_and_invalid_counts() {
        for columns in 3..=6 {
            for level in 1..=3 {
                let config = BoardConfig::new_unchecked(columns, level);
                for seed in 0..250 {
                    let board = RandomBoardGenerator::new(seed).generate(config);
                    assert_eq!(board.total_squares(), config.total_squares());
                    assert!(
                        board.valid_count() >= Board::MIN_VALID,
                        "columns {} level {} seed {}",
                        columns,
                        level,
                        seed
                    );
                    assert!(
                        board.invalid_count() >= Board::MIN_INVALID,
                        "columns {} level {} seed {}",
                        columns,
                        level,
                        seed
                    );
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let config = BoardConfig::new_unchecked(4, 2);
        let first = RandomBoardGenerator::new(77).generate(config);
        let second = RandomBoardGenerator::new(77).generate(config);
        assert_eq!(first, second);
    }

    #[test]
    fn squares_are_numbered_in_grid_order() {
        let board = RandomBoardGenerator::new(1).generate(BoardConfig::new_unchecked(5, 3));
        for (index, square) in board.iter().enumerate() {
            assert_eq!(usize::from(square.id), index);
            assert!(!square.is_clicked);
        }
    }

    #[test]
    fn round_derived_configs_stay_in_bounds_across_many_draws() {
        for round in 1..=12 {
            let config = BoardConfig::for_round(round);
            for seed in 0..100 {
                let board = RandomBoardGenerator::new(seed * 31 + u64::from(round)).generate(config);
                assert!(board.valid_count() >= Board::MIN_VALID);
                assert!(board.invalid_count() >= Board::MIN_INVALID);
            }
        }
    }
}
