use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{EngineError, ResultEngine, purchases, shopping_lists, users};

use super::Engine;

/// Generates a `require_*_owner` method for a user-owned root entity.
///
/// Missing rows are `KeyNotFound`; rows owned by someone else are
/// `Forbidden`.
macro_rules! impl_require_owner {
    ($require_fn:ident, $entity:path, $model:ty, $label:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: i32,
            user_id: i32,
        ) -> ResultEngine<$model> {
            let model = <$entity>::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(concat!($label, " not exists").to_string())
                })?;
            ensure_owner(model.user_id, id, user_id, $label)?;
            Ok(model)
        }
    };
}

/// `Forbidden` unless `owner_id` is `user_id`.
pub(super) fn ensure_owner(
    owner_id: i32,
    id: i32,
    user_id: i32,
    label: &'static str,
) -> ResultEngine<()> {
    if owner_id != user_id {
        tracing::debug!(id, user_id, entity = label, "denied access to foreign entity");
        return Err(EngineError::Forbidden(format!("access to {label} denied")));
    }
    Ok(())
}

impl Engine {
    impl_require_owner!(
        require_purchase_owner,
        purchases::Entity,
        purchases::Model,
        "purchase"
    );

    impl_require_owner!(
        require_list_owner,
        shopping_lists::Entity,
        shopping_lists::Model,
        "shopping list"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
