use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, ShoppingList, ShoppingListItem, shopping_list_items, shopping_lists,
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Load an item whose list belongs to `user_id`.
    async fn require_list_item_owner(
        &self,
        db: &DatabaseTransaction,
        item_id: i32,
        user_id: i32,
    ) -> ResultEngine<shopping_list_items::Model> {
        let item = shopping_list_items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("shopping list item not exists".to_string()))?;
        self.require_list_owner(db, item.list_id, user_id).await?;
        Ok(item)
    }

    /// All lists of a user with their items, newest list first.
    async fn lists_for(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<Vec<ShoppingList>> {
        let lists = shopping_lists::Entity::find()
            .filter(shopping_lists::Column::UserId.eq(user_id))
            .order_by_desc(shopping_lists::Column::CreatedAt)
            .order_by_desc(shopping_lists::Column::Id)
            .all(db)
            .await?;
        let list_ids: Vec<i32> = lists.iter().map(|list| list.id).collect();

        let mut items_by_list: HashMap<i32, Vec<shopping_list_items::Model>> = HashMap::new();
        if !list_ids.is_empty() {
            let items = shopping_list_items::Entity::find()
                .filter(shopping_list_items::Column::ListId.is_in(list_ids))
                .order_by_asc(shopping_list_items::Column::Id)
                .all(db)
                .await?;
            for item in items {
                items_by_list.entry(item.list_id).or_default().push(item);
            }
        }

        Ok(lists
            .into_iter()
            .map(|list| {
                let items = items_by_list.remove(&list.id).unwrap_or_default();
                ShoppingList::from((list, items))
            })
            .collect())
    }

    /// Create an empty shopping list.
    pub async fn new_list(&self, user_id: i32, name: &str) -> ResultEngine<ShoppingList> {
        let name = normalize_required_text(name, "list name", 1)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = shopping_lists::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(ShoppingList::from((model, Vec::new())))
        })
    }

    /// Return every list of `user_id`, newest first, items in insertion order.
    pub async fn lists(&self, user_id: i32) -> ResultEngine<Vec<ShoppingList>> {
        with_tx!(self, |db_tx| self.lists_for(&db_tx, user_id).await)
    }

    pub async fn add_list_item(
        &self,
        user_id: i32,
        list_id: i32,
        description: &str,
    ) -> ResultEngine<ShoppingListItem> {
        let description = normalize_required_text(description, "item description", 1)?;
        with_tx!(self, |db_tx| {
            self.require_list_owner(&db_tx, list_id, user_id).await?;
            let model = shopping_list_items::ActiveModel {
                id: ActiveValue::NotSet,
                list_id: ActiveValue::Set(list_id),
                description: ActiveValue::Set(description),
                completed: ActiveValue::Set(false),
            }
            .insert(&db_tx)
            .await?;
            Ok(ShoppingListItem::from(model))
        })
    }

    /// Mark an item as done.
    pub async fn complete_list_item(
        &self,
        user_id: i32,
        item_id: i32,
    ) -> ResultEngine<ShoppingListItem> {
        self.update_list_item(user_id, item_id, true).await
    }

    /// Set an item's completed flag.
    pub async fn update_list_item(
        &self,
        user_id: i32,
        item_id: i32,
        completed: bool,
    ) -> ResultEngine<ShoppingListItem> {
        with_tx!(self, |db_tx| {
            let item = self
                .require_list_item_owner(&db_tx, item_id, user_id)
                .await?;
            let mut model: shopping_list_items::ActiveModel = item.into();
            model.completed = ActiveValue::Set(completed);
            let model = model.update(&db_tx).await?;
            Ok(ShoppingListItem::from(model))
        })
    }

    pub async fn delete_list_item(&self, user_id: i32, item_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let item = self
                .require_list_item_owner(&db_tx, item_id, user_id)
                .await?;
            shopping_list_items::Entity::delete_by_id(item.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Delete a list together with its items.
    pub async fn delete_list(&self, user_id: i32, list_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_list_owner(&db_tx, list_id, user_id).await?;
            shopping_list_items::Entity::delete_many()
                .filter(shopping_list_items::Column::ListId.eq(list_id))
                .exec(&db_tx)
                .await?;
            shopping_lists::Entity::delete_by_id(list_id)
                .exec(&db_tx)
                .await?;
            tracing::debug!(list_id, user_id, "deleted shopping list");
            Ok(())
        })
    }
}
