//! The module contains `Purchase` and its lifecycle.
//!
//! A purchase starts `Open` and moves once to `Finalized`; there is no way
//! back. Line items can only change while it is open, and the stored total is
//! always the sum of the line totals (see `Engine::recalculate_total`).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseStatus {
    Open,
    Finalized,
}

/// A purchase session owned by one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchase {
    pub id: i32,
    pub user_id: i32,
    pub total: MoneyCents,
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn status(&self) -> PurchaseStatus {
        if self.finalized {
            PurchaseStatus::Finalized
        } else {
            PurchaseStatus::Open
        }
    }

    /// Fails unless line items may still be added or removed.
    pub fn ensure_open(&self) -> ResultEngine<()> {
        match self.status() {
            PurchaseStatus::Open => Ok(()),
            PurchaseStatus::Finalized => Err(EngineError::BusinessRule(
                "purchase is already finalized".to_string(),
            )),
        }
    }

    /// Fails unless the purchase can be read through history or compared.
    pub fn ensure_finalized(&self) -> ResultEngine<()> {
        match self.status() {
            PurchaseStatus::Finalized => Ok(()),
            PurchaseStatus::Open => Err(EngineError::BusinessRule(
                "purchase is not finalized".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub total_minor: i64,
    pub finalized: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_items::Entity")]
    Items,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::purchase_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Purchase {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total: MoneyCents::new(model.total_minor),
            finalized: model.finalized,
            created_at: model.created_at,
        }
    }
}

impl From<&Purchase> for ActiveModel {
    fn from(value: &Purchase) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(value.user_id),
            total_minor: ActiveValue::Set(value.total.cents()),
            finalized: ActiveValue::Set(value.finalized),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}
