//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::OwnerId;
use domain_property::PropertyFilter;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for prices with two decimal places, up to ten million
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for strictly positive sale prices
pub fn sale_price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for tax rates in percent, 0 to 100 inclusive
pub fn tax_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for tax rates outside 0 to 100
pub fn invalid_tax_percentage_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..1_000_000i64).prop_map(|n| -Decimal::new(n, 2)),
        (10_001i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    ]
}

/// Strategy for construction years accepted by validation
pub fn year_strategy() -> impl Strategy<Value = i32> {
    1800i32..=2100i32
}

/// Strategy for internal property codes
pub fn property_code_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2}-[0-9]{3,6}".prop_map(|s| s)
}

/// Strategy for names
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10})?".prop_map(|s| s)
}

/// Strategy for listing filters, including raw out-of-range paging
pub fn property_filter_strategy() -> impl Strategy<Value = PropertyFilter> {
    (
        proptest::option::of("[a-zA-Z ]{0,12}"),
        proptest::option::of(price_strategy()),
        proptest::option::of(price_strategy()),
        proptest::option::of(year_strategy()),
        proptest::option::of(1i64..10i64),
        0u32..20u32,
        0u32..300u32,
    )
        .prop_map(|(name, min_price, max_price, year, owner, page_number, page_size)| PropertyFilter {
            name,
            min_price,
            max_price,
            year,
            owner_id: owner.map(OwnerId::new),
            page_number,
            page_size,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Percentage;
    use domain_property::ports::MAX_PAGE_SIZE;

    proptest! {
        #[test]
        fn tax_percentage_is_accepted(rate in tax_percentage_strategy()) {
            prop_assert!(Percentage::new(rate).is_ok());
        }

        #[test]
        fn invalid_tax_percentage_is_rejected(rate in invalid_tax_percentage_strategy()) {
            prop_assert!(Percentage::new(rate).is_err());
        }

        #[test]
        fn normalized_filter_has_valid_paging(filter in property_filter_strategy()) {
            let filter = filter.normalized();
            prop_assert!(filter.page_number >= 1);
            prop_assert!(filter.page_size >= 1 && filter.page_size <= MAX_PAGE_SIZE);
        }

        #[test]
        fn property_code_fits_column(code in property_code_strategy()) {
            prop_assert!(code.len() <= 50);
        }
    }
}
