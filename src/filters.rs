use askama::Result;
use rust_decimal::{Decimal, RoundingStrategy};

// Formats a price with two decimals, so `9.5` renders as `9.50`.
// Used as `|money` in the templates.
#[allow(clippy::unnecessary_wraps)]
pub fn money(value: &Decimal) -> Result<String> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("{rounded:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_two_decimals() {
        assert_eq!(money(&Decimal::new(95, 1)).unwrap(), "9.50");
        assert_eq!(money(&Decimal::new(12, 0)).unwrap(), "12.00");
        assert_eq!(money(&Decimal::new(19999, 3)).unwrap(), "20.00");
    }
}
