use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    AddPurchaseItemCmd, EngineError, LineItem, MoneyCents, Purchase, ResultEngine, products,
    purchase_items, purchases, util::validate_line_item,
};

use super::{Engine, with_tx};

impl Engine {
    /// Load a purchase's line items with their products, ordered by id.
    pub(super) async fn line_items_for(
        &self,
        db: &DatabaseTransaction,
        purchase_id: i32,
    ) -> ResultEngine<Vec<LineItem>> {
        purchase_items::Entity::find()
            .filter(purchase_items::Column::PurchaseId.eq(purchase_id))
            .order_by_asc(purchase_items::Column::Id)
            .find_also_related(products::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(LineItem::try_from)
            .collect()
    }

    /// Recompute and persist a purchase's total from its line items.
    ///
    /// Must run inside the transaction that changed the items.
    pub(crate) async fn recalculate_total(
        &self,
        db: &DatabaseTransaction,
        purchase_id: i32,
    ) -> ResultEngine<MoneyCents> {
        let rows = purchase_items::Entity::find()
            .filter(purchase_items::Column::PurchaseId.eq(purchase_id))
            .all(db)
            .await?;

        let mut total = MoneyCents::ZERO;
        for row in &rows {
            let line = MoneyCents::new(row.unit_price_minor)
                .checked_mul(i64::from(row.quantity))
                .ok_or_else(|| EngineError::InvalidAmount("line total too large".to_string()))?;
            total = total
                .checked_add(line)
                .ok_or_else(|| EngineError::InvalidAmount("purchase total too large".to_string()))?;
        }

        purchases::ActiveModel {
            id: ActiveValue::Unchanged(purchase_id),
            total_minor: ActiveValue::Set(total.cents()),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(total)
    }

    /// Open a new, empty purchase for `user_id`.
    pub async fn start_purchase(&self, user_id: i32) -> ResultEngine<Purchase> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let purchase = Purchase {
                id: 0,
                user_id,
                total: MoneyCents::ZERO,
                finalized: false,
                created_at: Utc::now(),
            };
            let model: purchases::ActiveModel = (&purchase).into();
            let model = model.insert(&db_tx).await?;
            tracing::debug!(purchase_id = model.id, user_id, "started purchase");
            Ok(Purchase::from(model))
        })
    }

    /// Add a line item to an open purchase.
    ///
    /// Returns the new item id and the recalculated total.
    pub async fn add_purchase_item(
        &self,
        cmd: AddPurchaseItemCmd,
    ) -> ResultEngine<(i32, MoneyCents)> {
        let quantity = validate_line_item(cmd.unit_price, cmd.quantity)?;

        with_tx!(self, |db_tx| {
            let purchase = Purchase::from(
                self.require_purchase_owner(&db_tx, cmd.purchase_id, cmd.user_id)
                    .await?,
            );
            purchase.ensure_open()?;

            products::Entity::find_by_id(cmd.product_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))?;

            let item = purchase_items::ActiveModel {
                id: ActiveValue::NotSet,
                purchase_id: ActiveValue::Set(purchase.id),
                product_id: ActiveValue::Set(cmd.product_id),
                unit_price_minor: ActiveValue::Set(cmd.unit_price.cents()),
                quantity: ActiveValue::Set(quantity),
            }
            .insert(&db_tx)
            .await?;

            let total = self.recalculate_total(&db_tx, purchase.id).await?;
            Ok((item.id, total))
        })
    }

    /// Remove a line item from an open purchase and return the new total.
    pub async fn remove_purchase_item(
        &self,
        user_id: i32,
        item_id: i32,
    ) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let item = purchase_items::Entity::find_by_id(item_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("purchase item not exists".to_string()))?;
            let purchase = Purchase::from(
                self.require_purchase_owner(&db_tx, item.purchase_id, user_id)
                    .await?,
            );
            purchase.ensure_open()?;

            purchase_items::Entity::delete_by_id(item.id)
                .exec(&db_tx)
                .await?;
            self.recalculate_total(&db_tx, purchase.id).await
        })
    }

    /// Finalize a purchase. It must be open and have at least one item.
    pub async fn finalize_purchase(
        &self,
        user_id: i32,
        purchase_id: i32,
    ) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let purchase = Purchase::from(
                self.require_purchase_owner(&db_tx, purchase_id, user_id)
                    .await?,
            );

            let item_count = purchase_items::Entity::find()
                .filter(purchase_items::Column::PurchaseId.eq(purchase.id))
                .count(&db_tx)
                .await?;
            if item_count == 0 {
                return Err(EngineError::BusinessRule(
                    "cannot finalize a purchase without items".to_string(),
                ));
            }
            purchase.ensure_open()?;

            let total = self.recalculate_total(&db_tx, purchase.id).await?;
            purchases::ActiveModel {
                id: ActiveValue::Unchanged(purchase.id),
                finalized: ActiveValue::Set(true),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            tracing::info!(purchase_id = purchase.id, user_id, total = %total, "finalized purchase");
            Ok(total)
        })
    }
}
