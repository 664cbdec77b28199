//! Price comparison between two finalized purchases.
//!
//! Both sides are first rolled up with [`aggregate_items`](crate::aggregate_items);
//! products are then split into common / only-in-A / only-in-B and every
//! common product gets its average unit price on each side, the delta and the
//! relative change.
//!
//! All arithmetic is done on integer cents. Rounding is half-up with ties away
//! from zero, so `compare(b, a)` is the exact negation of `compare(a, b)` for
//! every delta.

use std::{collections::BTreeMap, fmt};

use crate::{MoneyCents, Product, ProductAggregate};

/// A percentage with two decimals, stored as hundredths of a percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(i64);

impl Percent {
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Value as a float, for JSON rendering only.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// One common product in a [`ComparisonReport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonRow {
    pub product: Product,
    pub avg_price_a: MoneyCents,
    pub avg_price_b: MoneyCents,
    /// `avg_price_b - avg_price_a`.
    pub delta: MoneyCents,
    /// `None` when `avg_price_a` is zero.
    pub percent: Option<Percent>,
    pub quantity_a: i64,
    pub quantity_b: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComparisonReport {
    pub purchase_a: i32,
    pub purchase_b: i32,
    pub common_count: usize,
    pub only_in_a: Vec<i32>,
    pub only_in_b: Vec<i32>,
    /// Sorted by ascending product id.
    pub items: Vec<ComparisonRow>,
}

/// Integer division rounding half away from zero.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}

/// Average unit price rounded to the cent; zero quantity yields zero.
pub fn average_price(total_spend: MoneyCents, total_quantity: i64) -> MoneyCents {
    if total_quantity <= 0 {
        return MoneyCents::ZERO;
    }
    let avg = div_round_half_up(
        i128::from(total_spend.cents()),
        i128::from(total_quantity),
    );
    // |avg| <= |total_spend| because total_quantity >= 1.
    MoneyCents::new(avg as i64)
}

/// Relative change from `from` to `to`, `None` unless `from` is positive.
pub fn percent_change(from: MoneyCents, to: MoneyCents) -> Option<Percent> {
    if !from.is_positive() {
        return None;
    }
    let diff = i128::from(to.cents()) - i128::from(from.cents());
    let hundredths = div_round_half_up(diff * 10_000, i128::from(from.cents()));
    i64::try_from(hundredths).ok().map(Percent)
}

/// Builds the comparison report of purchase `a` against purchase `b`.
///
/// Performs no authorization: callers pass aggregates of finalized purchases
/// owned by the requesting user.
pub fn compare(
    purchase_a: i32,
    aggregate_a: &BTreeMap<i32, ProductAggregate>,
    purchase_b: i32,
    aggregate_b: &BTreeMap<i32, ProductAggregate>,
) -> ComparisonReport {
    let only_in_a: Vec<i32> = aggregate_a
        .keys()
        .filter(|id| !aggregate_b.contains_key(id))
        .copied()
        .collect();
    let only_in_b: Vec<i32> = aggregate_b
        .keys()
        .filter(|id| !aggregate_a.contains_key(id))
        .copied()
        .collect();

    let items: Vec<ComparisonRow> = aggregate_a
        .iter()
        .filter_map(|(id, a)| aggregate_b.get(id).map(|b| (a, b)))
        .map(|(a, b)| {
            let avg_price_a = average_price(a.total_spend, a.total_quantity);
            let avg_price_b = average_price(b.total_spend, b.total_quantity);
            ComparisonRow {
                product: a.product.clone(),
                avg_price_a,
                avg_price_b,
                delta: avg_price_b - avg_price_a,
                percent: percent_change(avg_price_a, avg_price_b),
                quantity_a: a.total_quantity,
                quantity_b: b.total_quantity,
            }
        })
        .collect();

    ComparisonReport {
        purchase_a,
        purchase_b,
        common_count: items.len(),
        only_in_a,
        only_in_b,
        items,
    }
}
