//! Fixed layout of a single-zero roulette wheel and table.

use super::entities::{Color, Number};

/// Smallest number on the wheel.
pub const MIN_NUMBER: Number = 0;

/// Largest number on the wheel.
pub const MAX_NUMBER: Number = 36;

/// Number of pockets on the wheel (0 through 36).
pub const POCKETS: u32 = 37;

/// Red pockets. Fixed by the table layout, not derivable from a formula.
pub const RED_NUMBERS: [Number; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Black pockets, the complement of [`RED_NUMBERS`] within 1..=36.
pub const BLACK_NUMBERS: [Number; 18] = [
    2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35,
];

/// Table columns, indexed from 0 (column 1 is `COLUMNS[0]`).
pub const COLUMNS: [[Number; 12]; 3] = [
    [1, 4, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34],
    [2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35],
    [3, 6, 9, 12, 15, 18, 21, 24, 27, 30, 33, 36],
];

/// Dozens, indexed from 0 (first dozen is `DOZENS[0]`).
pub const DOZENS: [[Number; 12]; 3] = [
    [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
    [13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24],
    [25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36],
];

/// European wheel order, clockwise from zero.
pub const WHEEL_ORDER: [Number; 37] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

/// Resolve the color of a pocket.
///
/// Zero is green, members of [`RED_NUMBERS`] are red and everything else is
/// black. Callers are expected to pass numbers in `0..=36`.
pub fn color_of(number: Number) -> Color {
    if number == 0 {
        Color::Green
    } else if RED_NUMBERS.contains(&number) {
        Color::Red
    } else {
        Color::Black
    }
}

/// Whether a number is a pocket on the wheel.
pub fn is_on_wheel(number: Number) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_zero_is_green() {
        assert_eq!(color_of(0), Color::Green);
    }

    #[test]
    fn test_red_and_black_partition_one_to_thirty_six() {
        let red: BTreeSet<_> = RED_NUMBERS.iter().copied().collect();
        let black: BTreeSet<_> = BLACK_NUMBERS.iter().copied().collect();

        assert_eq!(red.len(), 18);
        assert_eq!(black.len(), 18);
        assert!(red.is_disjoint(&black));

        let all: BTreeSet<_> = red.union(&black).copied().collect();
        let expected: BTreeSet<Number> = (1..=36).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_color_of_matches_tables() {
        for n in RED_NUMBERS {
            assert_eq!(color_of(n), Color::Red, "{n} should be red");
        }
        for n in BLACK_NUMBERS {
            assert_eq!(color_of(n), Color::Black, "{n} should be black");
        }
    }

    #[test]
    fn test_columns_follow_modulo_three() {
        for (idx, column) in COLUMNS.iter().enumerate() {
            for n in column {
                assert_eq!((n - 1) as usize % 3, idx, "{n} in wrong column");
            }
        }
        let unique: BTreeSet<_> = COLUMNS.iter().flatten().collect();
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn test_dozens_are_contiguous() {
        for (idx, dozen) in DOZENS.iter().enumerate() {
            let start = idx as Number * 12 + 1;
            let expected: Vec<Number> = (start..start + 12).collect();
            assert_eq!(dozen.to_vec(), expected);
        }
    }

    #[test]
    fn test_wheel_order_contains_every_pocket_once() {
        assert_eq!(WHEEL_ORDER.len() as u32, POCKETS);
        assert_eq!(WHEEL_ORDER[0], 0);

        let mut sorted = WHEEL_ORDER.to_vec();
        sorted.sort_unstable();
        let expected: Vec<Number> = (0..=36).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_is_on_wheel() {
        assert!(is_on_wheel(0));
        assert!(is_on_wheel(36));
        assert!(!is_on_wheel(37));
    }
}
