use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewProductCmd, Product, ResultEngine, products,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Look a product up by its barcode.
    pub async fn product_by_barcode(&self, barcode: &str) -> ResultEngine<Product> {
        let barcode = normalize_required_text(barcode, "barcode", 1)?;
        with_tx!(self, |db_tx| {
            products::Entity::find()
                .filter(products::Column::Barcode.eq(barcode.as_str()))
                .one(&db_tx)
                .await?
                .map(Product::from)
                .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
        })
    }

    /// Add a product to the shared catalogue. Barcodes are unique.
    pub async fn new_product(&self, cmd: NewProductCmd) -> ResultEngine<Product> {
        let barcode = normalize_required_text(&cmd.barcode, "barcode", 1)?;
        let name = normalize_required_text(&cmd.name, "name", 1)?;
        let brand = normalize_optional_text(cmd.brand.as_deref());

        with_tx!(self, |db_tx| {
            let exists = products::Entity::find()
                .filter(products::Column::Barcode.eq(barcode.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(barcode));
            }

            let model = products::ActiveModel {
                id: ActiveValue::NotSet,
                barcode: ActiveValue::Set(barcode.clone()),
                name: ActiveValue::Set(name),
                brand: ActiveValue::Set(brand),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| EngineError::from_insert(err, &barcode))?;
            tracing::debug!(product_id = model.id, barcode = %model.barcode, "created product");
            Ok(Product::from(model))
        })
    }
}
