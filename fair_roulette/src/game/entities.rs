use crate::engine::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::wheel::{self, BLACK_NUMBERS, COLUMNS, DOZENS, MAX_NUMBER, RED_NUMBERS};

/// A pocket on the wheel, always in `0..=36` once validated.
pub type Number = u8;

/// Integer money units. Signed so that the legacy pipeline can expose an
/// overdrawn balance instead of wrapping.
pub type Amount = i64;

/// Largest stake accepted for a single bet (2^53 - 1).
///
/// Keeps every product `amount * (multiplier + 1)` and every batch total far
/// from `i64::MAX` and exactly representable for JSON clients.
pub const MAX_BET_AMOUNT: Amount = 9_007_199_254_740_991;

/// Color of a pocket.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bet categories. Categories only differ in payout multiplier; which
/// numbers a bet covers is carried by the bet itself.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    Straight,
    Split,
    Street,
    Corner,
    Line,
    Column,
    Dozen,
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

impl BetType {
    pub const ALL: [BetType; 13] = [
        Self::Straight,
        Self::Split,
        Self::Street,
        Self::Corner,
        Self::Line,
        Self::Column,
        Self::Dozen,
        Self::Red,
        Self::Black,
        Self::Odd,
        Self::Even,
        Self::Low,
        Self::High,
    ];

    /// Wire name of the category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Split => "split",
            Self::Street => "street",
            Self::Corner => "corner",
            Self::Line => "line",
            Self::Column => "column",
            Self::Dozen => "dozen",
            Self::Red => "red",
            Self::Black => "black",
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Low => "low",
            Self::High => "high",
        }
    }

    /// Whether the category pays 1:1.
    pub const fn is_even_money(&self) -> bool {
        matches!(
            self,
            Self::Red | Self::Black | Self::Odd | Self::Even | Self::Low | Self::High
        )
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bet_type| bet_type.as_str() == s)
            .ok_or_else(|| EngineError::InvalidBetType(s.to_string()))
    }
}

/// A single wager.
///
/// `numbers` may contain duplicates; win checks treat it as a set.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Bet {
    #[serde(rename = "type")]
    pub bet_type: BetType,
    pub numbers: Vec<Number>,
    pub amount: Amount,
}

fn ensure_amount(amount: Amount) -> EngineResult<()> {
    if amount <= 0 {
        return Err(EngineError::Validation(
            "Bet amount must be positive".to_string(),
        ));
    }
    if amount > MAX_BET_AMOUNT {
        return Err(EngineError::Validation(format!(
            "Bet amount must not exceed {MAX_BET_AMOUNT}"
        )));
    }
    Ok(())
}

fn ensure_index(what: &str, value: u8, max: u8) -> EngineResult<usize> {
    if value == 0 || value > max {
        return Err(EngineError::Validation(format!(
            "Invalid {what}: {value} (expected 1-{max})"
        )));
    }
    Ok(usize::from(value - 1))
}

/// Row (1-based) a non-zero number sits in on the table layout.
fn row_of(number: Number) -> u8 {
    (number - 1) / 3 + 1
}

fn street_numbers(row: u8) -> [Number; 3] {
    let last = row * 3;
    [last - 2, last - 1, last]
}

impl Bet {
    /// Build a bet from raw parts without checking category rules.
    ///
    /// Use [`crate::game::validation::validate_bet`] before settling bets
    /// built this way.
    pub fn new(bet_type: BetType, numbers: Vec<Number>, amount: Amount) -> Self {
        Self {
            bet_type,
            numbers,
            amount,
        }
    }

    /// Single number, including zero.
    pub fn straight(number: Number, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        if !wheel::is_on_wheel(number) {
            return Err(EngineError::Validation(format!(
                "Invalid number in bet: {number}"
            )));
        }
        Ok(Self::new(BetType::Straight, vec![number], amount))
    }

    /// Two numbers next to each other on the layout. Zero splits with 1, 2
    /// and 3.
    pub fn split(a: Number, b: Number, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let adjacent = match (low, high) {
            (_, h) if h > MAX_NUMBER => false,
            (0, h) => (1..=3).contains(&h),
            (l, h) if h - l == 3 => true,
            (l, h) => h - l == 1 && row_of(l) == row_of(h),
        };
        if !adjacent {
            return Err(EngineError::Validation(format!(
                "Numbers {a} and {b} are not adjacent"
            )));
        }
        Ok(Self::new(BetType::Split, vec![low, high], amount))
    }

    /// Three numbers of a table row, `row` in `1..=12`.
    pub fn street(row: u8, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        ensure_index("street", row, 12)?;
        Ok(Self::new(
            BetType::Street,
            street_numbers(row).to_vec(),
            amount,
        ))
    }

    /// Four numbers meeting at a corner, named by the top-left number.
    pub fn corner(top_left: Number, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        if top_left == 0 || top_left > 32 || top_left % 3 == 0 {
            return Err(EngineError::Validation(format!(
                "Invalid corner: {top_left}"
            )));
        }
        Ok(Self::new(
            BetType::Corner,
            vec![top_left, top_left + 1, top_left + 3, top_left + 4],
            amount,
        ))
    }

    /// Two consecutive rows, `first_row` in `1..=11`.
    pub fn line(first_row: u8, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        ensure_index("line", first_row, 11)?;
        let mut numbers = street_numbers(first_row).to_vec();
        numbers.extend(street_numbers(first_row + 1));
        Ok(Self::new(BetType::Line, numbers, amount))
    }

    /// One of the three columns, `column` in `1..=3`.
    pub fn column(column: u8, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        let idx = ensure_index("column", column, 3)?;
        Ok(Self::new(BetType::Column, COLUMNS[idx].to_vec(), amount))
    }

    /// One of the three dozens, `dozen` in `1..=3`.
    pub fn dozen(dozen: u8, amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        let idx = ensure_index("dozen", dozen, 3)?;
        Ok(Self::new(BetType::Dozen, DOZENS[idx].to_vec(), amount))
    }

    pub fn red(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(BetType::Red, RED_NUMBERS.to_vec(), amount))
    }

    pub fn black(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(BetType::Black, BLACK_NUMBERS.to_vec(), amount))
    }

    pub fn odd(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(
            BetType::Odd,
            (1..=MAX_NUMBER).filter(|n| n % 2 == 1).collect(),
            amount,
        ))
    }

    pub fn even(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(
            BetType::Even,
            (1..=MAX_NUMBER).filter(|n| n % 2 == 0).collect(),
            amount,
        ))
    }

    /// 1 through 18.
    pub fn low(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(BetType::Low, (1..=18).collect(), amount))
    }

    /// 19 through 36.
    pub fn high(amount: Amount) -> EngineResult<Self> {
        ensure_amount(amount)?;
        Ok(Self::new(BetType::High, (19..=MAX_NUMBER).collect(), amount))
    }

    /// Whether the bet covers `outcome`.
    pub fn covers(&self, outcome: Number) -> bool {
        self.numbers.contains(&outcome)
    }
}

/// A bet after settlement. `payout` is the total returned (stake included)
/// when the bet won, and zero otherwise.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BetResult {
    #[serde(flatten)]
    pub bet: Bet,
    pub won: bool,
    pub payout: Amount,
}
