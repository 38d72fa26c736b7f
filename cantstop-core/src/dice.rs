//! Four-dice rolls and the per-column hit table.

use crate::{Column, NUM_COLUMNS};

/// Four die faces, each 1-6.
pub type Dice = [u8; 4];

/// Number of distinct four-die outcomes (6^4).
pub const OUTCOMES: u32 = 1296;

/// For each column 2-12: outcomes out of 1296 in which at least one pairing
/// of the dice sums to that column.
pub const COMBINATIONS: [u32; NUM_COLUMNS] = [171, 302, 461, 580, 727, 834, 727, 580, 461, 302, 171];

/// Check that every face is 1-6.
#[inline]
pub fn is_valid(dice: &Dice) -> bool {
    dice.iter().all(|&d| (1..=6).contains(&d))
}

/// The three ways to split four dice into two pairs, as column sums, in the
/// order (01,23), (02,13), (03,12).
#[inline]
pub fn pairings(dice: &Dice) -> [(Column, Column); 3] {
    debug_assert!(is_valid(dice));
    let sum = |a: usize, b: usize| {
        Column::new(dice[a] + dice[b]).expect("two dice sum to 2..=12")
    };
    [
        (sum(0, 1), sum(2, 3)),
        (sum(0, 2), sum(1, 3)),
        (sum(0, 3), sum(1, 2)),
    ]
}

/// Iterate over all 1296 outcomes in lexicographic order.
pub fn all_rolls() -> impl Iterator<Item = Dice> {
    (0..OUTCOMES).map(|n| {
        [
            (n / 216 % 6) as u8 + 1,
            (n / 36 % 6) as u8 + 1,
            (n / 6 % 6) as u8 + 1,
            (n % 6) as u8 + 1,
        ]
    })
}

/// Hits for `column` out of [`OUTCOMES`].
#[inline]
pub fn combinations(column: Column) -> u32 {
    COMBINATIONS[column.index()]
}

/// Expected rolls needed for one step in `column`.
#[inline]
pub fn rolls_per_step(column: Column) -> f64 {
    OUTCOMES as f64 / combinations(column) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rolls_covers_every_outcome_once() {
        let rolls: Vec<Dice> = all_rolls().collect();
        assert_eq!(rolls.len(), 1296);
        assert_eq!(rolls[0], [1, 1, 1, 1]);
        assert_eq!(rolls[1295], [6, 6, 6, 6]);
        let mut sorted = rolls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 1296);
    }

    #[test]
    fn test_combinations_match_enumeration() {
        let mut hits = [0u32; NUM_COLUMNS];
        for roll in all_rolls() {
            for column in Column::all() {
                if pairings(&roll).iter().any(|&(a, b)| a == column || b == column) {
                    hits[column.index()] += 1;
                }
            }
        }
        assert_eq!(hits, COMBINATIONS);
    }

    #[test]
    fn test_pairings_order() {
        let p = pairings(&[1, 2, 3, 4]);
        let numbers: Vec<(u8, u8)> = p.iter().map(|(a, b)| (a.number(), b.number())).collect();
        assert_eq!(numbers, vec![(3, 7), (4, 6), (5, 5)]);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(&[1, 6, 3, 4]));
        assert!(!is_valid(&[0, 6, 3, 4]));
        assert!(!is_valid(&[1, 7, 3, 4]));
    }
}
