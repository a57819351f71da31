//! Unit tests for price and percentage arithmetic
//!
//! Tests cover tax computation, rounding to the persisted scale,
//! percentage bounds and serde handling.

use core_kernel::{Percentage, MoneyError, round_money, ensure_positive};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod percentage {
    use super::*;

    #[test]
    fn test_ten_percent_of_sale_price() {
        let pct = Percentage::new(dec!(10)).unwrap();
        assert_eq!(pct.of(dec!(100000)).unwrap(), dec!(10000));
    }

    #[test]
    fn test_zero_percent_yields_zero_tax() {
        assert_eq!(Percentage::ZERO.of(dec!(250000)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_fractional_percentage_rounds_to_cents() {
        let pct = Percentage::new(dec!(3.333)).unwrap();
        // 1234.56 * 0.03333 = 41.1478848
        assert_eq!(pct.of(dec!(1234.56)).unwrap(), dec!(41.15));
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(
            Percentage::new(dec!(101)),
            Err(MoneyError::PercentageOutOfRange(dec!(101)))
        );
    }

    #[test]
    fn test_deserialize_validates_range() {
        let ok: Percentage = serde_json::from_str("12.5").unwrap();
        assert_eq!(ok.value(), dec!(12.5));

        let err = serde_json::from_str::<Percentage>("150");
        assert!(err.is_err());
    }

    #[test]
    fn test_display() {
        let pct = Percentage::new(dec!(7.5)).unwrap();
        assert_eq!(pct.to_string(), "7.5%");
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_money_keeps_two_places() {
        assert_eq!(round_money(dec!(99.994)), dec!(99.99));
        assert_eq!(round_money(dec!(99.995)), dec!(100.00));
    }

    #[test]
    fn test_ensure_positive_message_names_the_field() {
        let err = ensure_positive(dec!(-5), "Sale price").unwrap_err();
        assert!(err.to_string().contains("Sale price must be greater than 0"));
    }
}

proptest! {
    #[test]
    fn prop_tax_never_exceeds_price(cents in 1i64..10_000_000_000i64, pct in 0u32..=100u32) {
        let price = Decimal::new(cents, 2);
        let tax = Percentage::new(Decimal::from(pct)).unwrap().of(price).unwrap();
        prop_assert!(tax >= Decimal::ZERO);
        prop_assert!(tax <= price);
    }

    #[test]
    fn prop_whole_percentages_of_whole_prices_are_exact(
        units in 1i64..1_000_000i64,
        pct in 0u32..=100u32,
    ) {
        let price = Decimal::from(units * 100);
        let tax = Percentage::new(Decimal::from(pct)).unwrap().of(price).unwrap();
        prop_assert_eq!(tax, Decimal::from(units * i64::from(pct)));
    }
}
