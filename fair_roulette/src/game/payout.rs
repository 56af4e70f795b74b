//! Payout rules.

use crate::engine::errors::{EngineError, EngineResult};

use super::entities::{Amount, Bet, BetResult, BetType, Number};

/// Winnings paid per unit staked (the stake is returned on top).
pub const fn multiplier(bet_type: BetType) -> Amount {
    match bet_type {
        BetType::Straight => 35,
        BetType::Split => 17,
        BetType::Street => 11,
        BetType::Corner => 8,
        BetType::Line => 5,
        BetType::Column | BetType::Dozen => 2,
        BetType::Red
        | BetType::Black
        | BetType::Odd
        | BetType::Even
        | BetType::Low
        | BetType::High => 1,
    }
}

/// Multiplier lookup by wire name.
///
/// # Errors
///
/// Returns [`EngineError::InvalidBetType`] for an unknown category.
pub fn multiplier_for(name: &str) -> EngineResult<Amount> {
    Ok(multiplier(name.parse()?))
}

/// Total returned for a winning bet: `amount * (multiplier + 1)`.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if the product does not fit in an
/// [`Amount`]. Validated bets never get there.
pub fn payout(bet: &Bet) -> EngineResult<Amount> {
    bet.amount
        .checked_mul(multiplier(bet.bet_type) + 1)
        .ok_or_else(|| EngineError::Internal(format!("payout overflow for {}", bet.amount)))
}

/// Whether `bet` wins when the ball lands on `outcome`.
pub fn wins(bet: &Bet, outcome: Number) -> bool {
    bet.covers(outcome)
}

/// Settle every bet against `outcome`.
///
/// Returns the per-bet results and the total returned.
pub fn settle_bets(bets: &[Bet], outcome: Number) -> EngineResult<(Vec<BetResult>, Amount)> {
    let mut total: Amount = 0;
    let mut results = Vec::with_capacity(bets.len());

    for bet in bets {
        let won = wins(bet, outcome);
        let amount = if won { payout(bet)? } else { 0 };
        total = total
            .checked_add(amount)
            .ok_or_else(|| EngineError::Internal("total payout overflow".to_string()))?;
        results.push(BetResult {
            bet: bet.clone(),
            won,
            payout: amount,
        });
    }

    Ok((results, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_table_for_ten_unit_stakes() {
        let cases = [
            (Bet::straight(7, 10).unwrap(), 360),
            (Bet::split(7, 8, 10).unwrap(), 180),
            (Bet::street(3, 10).unwrap(), 120),
            (Bet::corner(7, 10).unwrap(), 90),
            (Bet::line(3, 10).unwrap(), 60),
            (Bet::column(1, 10).unwrap(), 30),
            (Bet::dozen(1, 10).unwrap(), 30),
            (Bet::red(10).unwrap(), 20),
            (Bet::black(10).unwrap(), 20),
            (Bet::odd(10).unwrap(), 20),
            (Bet::even(10).unwrap(), 20),
            (Bet::low(10).unwrap(), 20),
            (Bet::high(10).unwrap(), 20),
        ];

        for (bet, expected) in cases {
            assert_eq!(payout(&bet).unwrap(), expected, "{}", bet.bet_type);
        }
    }

    #[test]
    fn test_multiplier_for_names() {
        assert_eq!(multiplier_for("straight").unwrap(), 35);
        assert_eq!(multiplier_for("dozen").unwrap(), 2);
        assert!(matches!(
            multiplier_for("five-number"),
            Err(EngineError::InvalidBetType(_))
        ));
    }

    #[test]
    fn test_wins_treats_numbers_as_set() {
        let bet = Bet::new(BetType::Split, vec![4, 4, 5], 1);
        assert!(wins(&bet, 4));
        assert!(wins(&bet, 5));
        assert!(!wins(&bet, 0));
    }

    #[test]
    fn test_zero_loses_outside_bets() {
        for bet in [
            Bet::red(1).unwrap(),
            Bet::black(1).unwrap(),
            Bet::odd(1).unwrap(),
            Bet::even(1).unwrap(),
            Bet::low(1).unwrap(),
            Bet::high(1).unwrap(),
        ] {
            assert!(!wins(&bet, 0));
        }
    }

    #[test]
    fn test_settle_bets_sums_winning_payouts() {
        let bets = vec![
            Bet::straight(17, 10).unwrap(),
            Bet::black(5).unwrap(),
            Bet::red(5).unwrap(),
        ];

        let (results, total) = settle_bets(&bets, 17).unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].won);
        assert_eq!(results[0].payout, 360);
        assert!(results[1].won);
        assert_eq!(results[1].payout, 10);
        assert!(!results[2].won);
        assert_eq!(results[2].payout, 0);
        assert_eq!(total, 370);
    }

    #[test]
    fn test_payout_overflow_is_internal_error() {
        let bet = Bet::new(BetType::Straight, vec![1], Amount::MAX / 2);
        assert!(matches!(payout(&bet), Err(EngineError::Internal(_))));
    }
}
