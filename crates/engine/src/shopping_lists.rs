//! Shopping lists and their items.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::shopping_list_items;

/// A named shopping list with its items in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShoppingList {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ShoppingListItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub id: i32,
    pub list_id: i32,
    pub description: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shopping_list_items::Entity")]
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

impl Related<super::shopping_list_items::Entity> for Entity {
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

impl From<(Model, Vec<shopping_list_items::Model>)> for ShoppingList {
    fn from((model, items): (Model, Vec<shopping_list_items::Model>)) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            created_at: model.created_at,
            items: items.into_iter().map(ShoppingListItem::from).collect(),
        }
    }
}

impl From<shopping_list_items::Model> for ShoppingListItem {
    fn from(model: shopping_list_items::Model) -> Self {
        Self {
            id: model.id,
            list_id: model.list_id,
            description: model.description,
            completed: model.completed,
        }
    }
}
