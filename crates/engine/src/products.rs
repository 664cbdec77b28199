//! The module contains `Product`, identified by its barcode.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A catalogue product. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: i32,
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_items::Entity")]
    PurchaseItems,
}

impl Related<super::purchase_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            barcode: model.barcode,
            name: model.name,
            brand: model.brand,
            created_at: model.created_at,
        }
    }
}
