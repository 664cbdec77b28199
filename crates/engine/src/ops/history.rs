use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    ComparisonReport, EngineError, Purchase, PurchaseDetail, ResultEngine, aggregate_items,
    compare, purchases,
};

use super::{Engine, access::ensure_owner, with_tx};

impl Engine {
    async fn require_purchase(
        &self,
        db: &DatabaseTransaction,
        purchase_id: i32,
    ) -> ResultEngine<Purchase> {
        purchases::Entity::find_by_id(purchase_id)
            .one(db)
            .await?
            .map(Purchase::from)
            .ok_or_else(|| EngineError::KeyNotFound("purchase not exists".to_string()))
    }

    /// Owned, finalized purchase with its items.
    async fn finalized_detail(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
        purchase_id: i32,
    ) -> ResultEngine<PurchaseDetail> {
        let purchase = Purchase::from(
            self.require_purchase_owner(db, purchase_id, user_id)
                .await?,
        );
        purchase.ensure_finalized()?;
        let items = self.line_items_for(db, purchase.id).await?;
        Ok(PurchaseDetail { purchase, items })
    }

    /// Finalized purchases of `user_id`, newest first. Items are not loaded.
    pub async fn history(&self, user_id: i32) -> ResultEngine<Vec<Purchase>> {
        with_tx!(self, |db_tx| {
            let models = purchases::Entity::find()
                .filter(purchases::Column::UserId.eq(user_id))
                .filter(purchases::Column::Finalized.eq(true))
                .order_by_desc(purchases::Column::CreatedAt)
                .order_by_desc(purchases::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Purchase::from).collect())
        })
    }

    /// A finalized purchase with its line items and their products.
    pub async fn purchase_detail(
        &self,
        user_id: i32,
        purchase_id: i32,
    ) -> ResultEngine<PurchaseDetail> {
        with_tx!(self, |db_tx| {
            self.finalized_detail(&db_tx, user_id, purchase_id).await
        })
    }

    /// Compare average unit prices between two finalized purchases of the
    /// same user.
    pub async fn compare_purchases(
        &self,
        user_id: i32,
        purchase_a: i32,
        purchase_b: i32,
    ) -> ResultEngine<ComparisonReport> {
        if purchase_a == purchase_b {
            return Err(EngineError::BusinessRule(
                "cannot compare a purchase with itself".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            // Both must exist before ownership is checked, and both must be
            // owned before their status is.
            let a = self.require_purchase(&db_tx, purchase_a).await?;
            let b = self.require_purchase(&db_tx, purchase_b).await?;
            for purchase in [&a, &b] {
                ensure_owner(purchase.user_id, purchase.id, user_id, "purchase")?;
            }
            for purchase in [&a, &b] {
                purchase.ensure_finalized()?;
            }

            let items_a = self.line_items_for(&db_tx, a.id).await?;
            let items_b = self.line_items_for(&db_tx, b.id).await?;
            let report = compare(
                a.id,
                &aggregate_items(&items_a),
                b.id,
                &aggregate_items(&items_b),
            );
            tracing::debug!(
                purchase_a,
                purchase_b,
                common = report.common_count,
                "compared purchases"
            );
            Ok(report)
        })
    }
}
