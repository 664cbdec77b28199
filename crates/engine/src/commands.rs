//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use crate::MoneyCents;

/// Register a new account.
#[derive(Clone, Debug)]
pub struct RegisterCmd {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Create a catalogue product.
#[derive(Clone, Debug)]
pub struct NewProductCmd {
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
}

impl NewProductCmd {
    #[must_use]
    pub fn new(barcode: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            name: name.into(),
            brand: None,
        }
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }
}

/// Add a line item to an open purchase.
#[derive(Clone, Debug)]
pub struct AddPurchaseItemCmd {
    pub purchase_id: i32,
    pub product_id: i32,
    pub unit_price: MoneyCents,
    /// Must be >= 1.
    pub quantity: i64,
    pub user_id: i32,
}
