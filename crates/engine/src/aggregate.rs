//! Per-product rollup of a purchase's line items.

use std::collections::BTreeMap;

use crate::{LineItem, MoneyCents, Product};

/// Spend and quantity of one product within one purchase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductAggregate {
    /// `Σ unit_price × quantity` over the product's line items.
    pub total_spend: MoneyCents,
    pub total_quantity: i64,
    /// The product of the first line item seen for this id.
    pub product: Product,
}

/// Groups line items by product id, merging repeated products.
///
/// Input order does not matter; the map iterates in ascending product id.
pub fn aggregate_items<'a, I>(items: I) -> BTreeMap<i32, ProductAggregate>
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut acc: BTreeMap<i32, ProductAggregate> = BTreeMap::new();
    for item in items {
        let entry = acc
            .entry(item.product_id())
            .or_insert_with(|| ProductAggregate {
                total_spend: MoneyCents::ZERO,
                total_quantity: 0,
                product: item.product.clone(),
            });
        entry.total_spend += item.line_total();
        entry.total_quantity += i64::from(item.quantity);
    }
    acc
}
