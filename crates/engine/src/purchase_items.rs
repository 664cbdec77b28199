//! Purchase line items: a product, the unit price actually paid and a
//! quantity.

use sea_orm::entity::prelude::*;

use crate::{EngineError, MoneyCents, Product, products};

/// A line item loaded together with its product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub id: i32,
    pub purchase_id: i32,
    pub product: Product,
    pub unit_price: MoneyCents,
    pub quantity: i32,
}

impl LineItem {
    pub fn product_id(&self) -> i32 {
        self.product.id
    }

    /// `unit_price × quantity`.
    ///
    /// Cannot overflow for stored rows: the purchase total, which is the sum
    /// of all non-negative line totals, was checked when the row was written.
    pub fn line_total(&self) -> MoneyCents {
        MoneyCents::new(self.unit_price.cents() * i64::from(self.quantity))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchase_id: i32,
    pub product_id: i32,
    pub unit_price_minor: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::purchases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Purchases,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Products,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, Option<products::Model>)> for LineItem {
    type Error = EngineError;

    fn try_from((model, product): (Model, Option<products::Model>)) -> Result<Self, Self::Error> {
        let product =
            product.ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;
        Ok(Self {
            id: model.id,
            purchase_id: model.purchase_id,
            product: product.into(),
            unit_price: MoneyCents::new(model.unit_price_minor),
            quantity: model.quantity,
        })
    }
}
