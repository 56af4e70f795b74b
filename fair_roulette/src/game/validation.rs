//! Structural checks for bets, both typed and straight off the wire.
//!
//! The wire parser checks fields in a fixed order (object shape, amount,
//! type, numbers) so the first problem reported is stable for clients.

use crate::engine::errors::{EngineError, EngineResult};
use serde_json::Value;

use super::entities::{Amount, Bet, BetType, MAX_BET_AMOUNT, Number};
use super::wheel::{MAX_NUMBER, MIN_NUMBER};

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::Validation(message.into())
}

fn check_amount(amount: Amount) -> EngineResult<()> {
    if amount <= 0 {
        return Err(invalid("Bet amount must be positive"));
    }
    if amount > MAX_BET_AMOUNT {
        return Err(invalid(format!(
            "Bet amount must not exceed {MAX_BET_AMOUNT}"
        )));
    }
    Ok(())
}

/// Validate a single typed bet.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the amount is not positive or
/// too large, when `numbers` is empty, or when a number is off the wheel.
pub fn validate_bet(bet: &Bet) -> EngineResult<()> {
    check_amount(bet.amount)?;

    if bet.numbers.is_empty() {
        return Err(invalid("Bet must have at least one number"));
    }
    if let Some(number) = bet.numbers.iter().find(|n| **n > MAX_NUMBER) {
        return Err(invalid(format!("Invalid number in bet: {number}")));
    }

    Ok(())
}

/// Validate a batch, stopping at the first bad bet.
pub fn validate_bets(bets: &[Bet]) -> EngineResult<()> {
    if bets.is_empty() {
        return Err(invalid("At least one bet is required"));
    }
    bets.iter().try_for_each(validate_bet)
}

/// Sum of all stakes in a batch.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] if the total does not fit in an
/// [`Amount`].
pub fn total_stake(bets: &[Bet]) -> EngineResult<Amount> {
    bets.iter().try_fold(0 as Amount, |sum, bet| {
        sum.checked_add(bet.amount)
            .ok_or_else(|| invalid("Total bet amount is too large"))
    })
}

/// Render a JSON value the way it should appear in an error message.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn parse_amount(value: Option<&Value>) -> EngineResult<Amount> {
    let Some(Value::Number(n)) = value else {
        return Err(invalid("Bet amount must be a valid number"));
    };

    if let Some(amount) = n.as_i64() {
        check_amount(amount)?;
        return Ok(amount);
    }
    if n.is_u64() {
        // Positive but beyond i64.
        return Err(invalid(format!(
            "Bet amount must not exceed {MAX_BET_AMOUNT}"
        )));
    }

    let Some(f) = n.as_f64().filter(|f| f.is_finite()) else {
        return Err(invalid("Bet amount must be a valid number"));
    };
    if f <= 0.0 {
        return Err(invalid("Bet amount must be positive"));
    }
    if f.fract() != 0.0 {
        return Err(invalid("Bet amount must be a whole number of units"));
    }
    if f > MAX_BET_AMOUNT as f64 {
        return Err(invalid(format!(
            "Bet amount must not exceed {MAX_BET_AMOUNT}"
        )));
    }
    Ok(f as Amount)
}

fn parse_type(value: Option<&Value>) -> EngineResult<BetType> {
    match value {
        Some(Value::String(name)) if !name.is_empty() => name.parse(),
        // Falsy values (missing, null, false, "", 0) all read as "undefined".
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) => {
            Err(EngineError::InvalidBetType("undefined".to_string()))
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            Err(EngineError::InvalidBetType("undefined".to_string()))
        }
        Some(other) => Err(EngineError::InvalidBetType(render(other))),
    }
}

fn parse_number(value: &Value) -> EngineResult<Number> {
    let reject = || invalid(format!("Invalid number in bet: {}", render(value)));

    let Value::Number(n) = value else {
        return Err(reject());
    };

    let whole = match (n.as_u64(), n.as_f64()) {
        (Some(u), _) => u,
        (None, Some(f)) if f.fract() == 0.0 && (0.0..=f64::from(MAX_NUMBER)).contains(&f) => {
            f as u64
        }
        _ => return Err(reject()),
    };

    match Number::try_from(whole) {
        Ok(number) if (MIN_NUMBER..=MAX_NUMBER).contains(&number) => Ok(number),
        _ => Err(reject()),
    }
}

fn parse_numbers(value: Option<&Value>) -> EngineResult<Vec<Number>> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(invalid("Bet must have at least one number")),
    };
    items.iter().map(parse_number).collect()
}

/// Parse and validate one bet from untyped JSON.
///
/// # Errors
///
/// [`EngineError::Validation`] for shape, amount and number problems,
/// [`EngineError::InvalidBetType`] for a missing or unknown category.
pub fn parse_bet(value: &Value) -> EngineResult<Bet> {
    let Value::Object(fields) = value else {
        return Err(invalid("Bet must be an object"));
    };

    let amount = parse_amount(fields.get("amount"))?;
    let bet_type = parse_type(fields.get("type"))?;
    let numbers = parse_numbers(fields.get("numbers"))?;

    Ok(Bet::new(bet_type, numbers, amount))
}

/// Parse and validate a batch of bets from untyped JSON.
pub fn parse_bets(value: &Value) -> EngineResult<Vec<Bet>> {
    let Value::Array(items) = value else {
        return Err(invalid("Bets must be an array"));
    };
    if items.is_empty() {
        return Err(invalid("At least one bet is required"));
    }
    items.iter().map(parse_bet).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(result: EngineResult<impl std::fmt::Debug>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_accepts_well_formed_bet() {
        let bet = parse_bet(&json!({"type": "straight", "numbers": [17], "amount": 10})).unwrap();
        assert_eq!(bet, Bet::straight(17, 10).unwrap());
        assert!(validate_bet(&bet).is_ok());
    }

    #[test]
    fn test_rejects_non_object() {
        assert_eq!(message(parse_bet(&json!(5))), "Bet must be an object");
        assert_eq!(message(parse_bet(&Value::Null)), "Bet must be an object");
    }

    #[test]
    fn test_rejects_bad_amounts() {
        let cases = [
            (json!({"type": "red", "numbers": [1], "amount": 0}), "Bet amount must be positive"),
            (json!({"type": "red", "numbers": [1], "amount": -3}), "Bet amount must be positive"),
            (json!({"type": "red", "numbers": [1], "amount": -0.5}), "Bet amount must be positive"),
            (json!({"type": "red", "numbers": [1], "amount": "10"}), "Bet amount must be a valid number"),
            (json!({"type": "red", "numbers": [1]}), "Bet amount must be a valid number"),
            (json!({"type": "red", "numbers": [1], "amount": null}), "Bet amount must be a valid number"),
            (json!({"type": "red", "numbers": [1], "amount": 2.5}), "Bet amount must be a whole number of units"),
        ];

        for (bet, expected) in cases {
            assert_eq!(message(parse_bet(&bet)), expected, "{bet}");
        }
    }

    #[test]
    fn test_rejects_oversized_amounts() {
        let over = json!({"type": "red", "numbers": [1], "amount": MAX_BET_AMOUNT + 1});
        assert!(matches!(parse_bet(&over), Err(EngineError::Validation(_))));

        let huge = json!({"type": "red", "numbers": [1], "amount": u64::MAX});
        assert!(matches!(parse_bet(&huge), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_whole_float_amount_is_accepted() {
        let bet = parse_bet(&json!({"type": "red", "numbers": [1], "amount": 10.0})).unwrap();
        assert_eq!(bet.amount, 10);
    }

    #[test]
    fn test_amount_is_checked_before_type() {
        let err = parse_bet(&json!({"type": "bogus", "numbers": [1], "amount": 0})).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_rejects_unknown_or_missing_type() {
        let err = parse_bet(&json!({"type": "bogus", "numbers": [1], "amount": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown bet type: bogus");

        let err = parse_bet(&json!({"numbers": [1], "amount": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown bet type: undefined");

        let err = parse_bet(&json!({"type": 7, "numbers": [1], "amount": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown bet type: 7");
    }

    #[test]
    fn test_falsy_type_reads_as_undefined() {
        for falsy in [json!(0), json!(0.0), json!(false), json!(""), json!(null)] {
            let err =
                parse_bet(&json!({"type": falsy, "numbers": [1], "amount": 1})).unwrap_err();
            assert_eq!(err.to_string(), "Unknown bet type: undefined", "{falsy}");
        }

        let err = parse_bet(&json!({"type": true, "numbers": [1], "amount": 1})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown bet type: true");
    }

    #[test]
    fn test_type_is_checked_before_numbers() {
        let err = parse_bet(&json!({"type": "bogus", "numbers": [], "amount": 1})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidBetType(_)));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let cases = [
            (json!({"type": "split", "amount": 1}), "Bet must have at least one number"),
            (json!({"type": "split", "numbers": [], "amount": 1}), "Bet must have at least one number"),
            (json!({"type": "split", "numbers": 4, "amount": 1}), "Bet must have at least one number"),
            (json!({"type": "split", "numbers": [4, 37], "amount": 1}), "Invalid number in bet: 37"),
            (json!({"type": "split", "numbers": [-1], "amount": 1}), "Invalid number in bet: -1"),
            (json!({"type": "split", "numbers": [1.5], "amount": 1}), "Invalid number in bet: 1.5"),
            (json!({"type": "split", "numbers": ["4"], "amount": 1}), "Invalid number in bet: 4"),
            (json!({"type": "split", "numbers": [null], "amount": 1}), "Invalid number in bet: null"),
        ];

        for (bet, expected) in cases {
            assert_eq!(message(parse_bet(&bet)), expected, "{bet}");
        }
    }

    #[test]
    fn test_duplicate_numbers_are_tolerated() {
        let bet = parse_bet(&json!({"type": "split", "numbers": [4, 4], "amount": 1})).unwrap();
        assert_eq!(bet.numbers, vec![4, 4]);
    }

    #[test]
    fn test_parse_bets_batch_rules() {
        assert_eq!(message(parse_bets(&json!({"bets": []}))), "Bets must be an array");
        assert_eq!(message(parse_bets(&json!([]))), "At least one bet is required");

        let err = parse_bets(&json!([
            {"type": "red", "numbers": [1], "amount": 1},
            {"type": "nope", "numbers": [1], "amount": 1},
            {"type": "red", "numbers": [99], "amount": 1},
        ]))
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidBetType(_)));
    }

    #[test]
    fn test_validate_typed_bets() {
        assert!(validate_bets(&[]).is_err());
        assert!(validate_bets(&[Bet::new(BetType::Straight, vec![], 1)]).is_err());
        assert!(validate_bets(&[Bet::new(BetType::Straight, vec![40], 1)]).is_err());
        assert!(validate_bets(&[Bet::new(BetType::Straight, vec![3], 0)]).is_err());
        assert!(validate_bets(&[Bet::red(1).unwrap(), Bet::straight(0, 2).unwrap()]).is_ok());
    }

    #[test]
    fn test_total_stake() {
        let bets = [Bet::red(10).unwrap(), Bet::straight(3, 15).unwrap()];
        assert_eq!(total_stake(&bets).unwrap(), 25);

        let overflow = [
            Bet::new(BetType::Red, vec![1], Amount::MAX),
            Bet::new(BetType::Red, vec![1], 1),
        ];
        assert!(total_stake(&overflow).is_err());
    }
}
