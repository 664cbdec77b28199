//! Listify engine: entities, purchase arithmetic and the domain operations
//! behind the HTTP API.
//!
//! Every public operation lives on [`Engine`] and runs inside one database
//! transaction, so a purchase's stored total can never be observed out of sync
//! with its line items.

pub use aggregate::{ProductAggregate, aggregate_items};
pub use auth::{
    AuthSession, Claims, DisabledIdentityVerifier, IdentityVerifier, TokenKeys, VerifiedIdentity,
};
pub use commands::{AddPurchaseItemCmd, NewProductCmd, RegisterCmd};
pub use comparison::{
    ComparisonReport, ComparisonRow, Percent, average_price, compare, percent_change,
};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use products::Product;
pub use purchase_items::LineItem;
pub use purchases::{Purchase, PurchaseStatus};
pub use shopping_lists::{ShoppingList, ShoppingListItem};
pub use users::User;

mod aggregate;
mod auth;
mod commands;
mod comparison;
mod error;
mod money;
mod ops;
mod products;
mod purchase_items;
mod purchases;
mod revoked_tokens;
mod shopping_list_items;
mod shopping_lists;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// A finalized purchase with its line items, as shown by history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub items: Vec<LineItem>,
}
