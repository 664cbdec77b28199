mod common;

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use engine::{EngineError, MoneyCents, Percent};

use common::{engine_with_db, item, product, register};

async fn stored_total(db: &DatabaseConnection, purchase_id: i32) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT total_minor FROM purchases WHERE id = ?",
            vec![purchase_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "total_minor").unwrap()
}

async fn line_sum(db: &DatabaseConnection, purchase_id: i32) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(unit_price_minor * quantity), 0) AS total FROM purchase_items WHERE purchase_id = ?",
            vec![purchase_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "total").unwrap()
}

#[tokio::test]
async fn total_tracks_items_through_the_lifecycle() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;
    let bread = product(&engine, "789200", "Bread").await;

    let purchase = engine.start_purchase(user.id).await.unwrap();
    assert_eq!(purchase.total, MoneyCents::ZERO);
    assert!(!purchase.finalized);

    let (milk_item, total) = engine
        .add_purchase_item(item(user.id, purchase.id, milk, 499, 2))
        .await
        .unwrap();
    assert_eq!(total, MoneyCents::new(998));
    assert_eq!(stored_total(&db, purchase.id).await, line_sum(&db, purchase.id).await);

    let (_, total) = engine
        .add_purchase_item(item(user.id, purchase.id, bread, 350, 1))
        .await
        .unwrap();
    assert_eq!(total, MoneyCents::new(1348));
    assert_eq!(stored_total(&db, purchase.id).await, 1348);

    let total = engine
        .remove_purchase_item(user.id, milk_item)
        .await
        .unwrap();
    assert_eq!(total, MoneyCents::new(350));
    assert_eq!(stored_total(&db, purchase.id).await, line_sum(&db, purchase.id).await);

    let total = engine.finalize_purchase(user.id, purchase.id).await.unwrap();
    assert_eq!(total, MoneyCents::new(350));

    let detail = engine.purchase_detail(user.id, purchase.id).await.unwrap();
    assert!(detail.purchase.finalized);
    assert_eq!(detail.purchase.total, MoneyCents::new(350));
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].product.name, "Bread");
    assert_eq!(detail.items[0].line_total(), MoneyCents::new(350));
}

#[tokio::test]
async fn empty_purchase_cannot_be_finalized() {
    let (engine, db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;
    let purchase = engine.start_purchase(user.id).await.unwrap();

    let err = engine
        .finalize_purchase(user.id, purchase.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));

    let (item_id, _) = engine
        .add_purchase_item(item(user.id, purchase.id, milk, 100, 1))
        .await
        .unwrap();
    engine.remove_purchase_item(user.id, item_id).await.unwrap();
    assert_eq!(stored_total(&db, purchase.id).await, 0);

    let err = engine
        .finalize_purchase(user.id, purchase.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BusinessRule(_)));
    assert!(engine.history(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn finalized_purchase_rejects_changes() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;
    let purchase = engine.start_purchase(user.id).await.unwrap();
    let (item_id, _) = engine
        .add_purchase_item(item(user.id, purchase.id, milk, 100, 1))
        .await
        .unwrap();
    engine.finalize_purchase(user.id, purchase.id).await.unwrap();

    let finalized = EngineError::BusinessRule("purchase is already finalized".to_string());
    assert_eq!(
        engine
            .add_purchase_item(item(user.id, purchase.id, milk, 100, 1))
            .await
            .unwrap_err(),
        finalized
    );
    assert_eq!(
        engine.remove_purchase_item(user.id, item_id).await.unwrap_err(),
        finalized
    );
    assert_eq!(
        engine
            .finalize_purchase(user.id, purchase.id)
            .await
            .unwrap_err(),
        finalized
    );
}

#[tokio::test]
async fn invalid_line_items_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;
    let purchase = engine.start_purchase(user.id).await.unwrap();

    assert!(matches!(
        engine
            .add_purchase_item(item(user.id, purchase.id, milk, -1, 1))
            .await,
        Err(EngineError::InvalidAmount(_))
    ));
    assert!(matches!(
        engine
            .add_purchase_item(item(user.id, purchase.id, milk, 100, 0))
            .await,
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        engine
            .add_purchase_item(item(user.id, purchase.id, 9999, 100, 1))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .add_purchase_item(item(user.id, 9999, milk, 100, 1))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.remove_purchase_item(user.id, 9999).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn purchases_are_isolated_between_users() {
    let (engine, _db) = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let bob = register(&engine, "Bob", "bob@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;

    let purchase = engine.start_purchase(ana.id).await.unwrap();
    let (item_id, _) = engine
        .add_purchase_item(item(ana.id, purchase.id, milk, 100, 1))
        .await
        .unwrap();

    assert!(matches!(
        engine
            .add_purchase_item(item(bob.id, purchase.id, milk, 100, 1))
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.remove_purchase_item(bob.id, item_id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.finalize_purchase(bob.id, purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));

    engine.finalize_purchase(ana.id, purchase.id).await.unwrap();
    assert!(matches!(
        engine.purchase_detail(bob.id, purchase.id).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(engine.history(bob.id).await.unwrap().is_empty());
    assert_eq!(engine.history(ana.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn history_lists_finalized_purchases_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;

    let mut finalized = Vec::new();
    for _ in 0..2 {
        let purchase = engine.start_purchase(user.id).await.unwrap();
        engine
            .add_purchase_item(item(user.id, purchase.id, milk, 100, 1))
            .await
            .unwrap();
        engine.finalize_purchase(user.id, purchase.id).await.unwrap();
        finalized.push(purchase.id);
    }
    let open = engine.start_purchase(user.id).await.unwrap();

    let history = engine.history(user.id).await.unwrap();
    let ids: Vec<i32> = history.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![finalized[1], finalized[0]]);
    assert!(history.iter().all(|p| p.finalized));

    assert_eq!(
        engine.purchase_detail(user.id, open.id).await.unwrap_err(),
        EngineError::BusinessRule("purchase is not finalized".to_string())
    );
}

#[tokio::test]
async fn compare_reports_price_changes() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "Ana", "ana@example.com").await;
    let x = product(&engine, "1", "Product X").await;
    let y = product(&engine, "2", "Product Y").await;
    let z = product(&engine, "3", "Product Z").await;

    let a = engine.start_purchase(user.id).await.unwrap();
    engine
        .add_purchase_item(item(user.id, a.id, x, 100, 2))
        .await
        .unwrap();
    engine
        .add_purchase_item(item(user.id, a.id, y, 300, 1))
        .await
        .unwrap();
    engine.finalize_purchase(user.id, a.id).await.unwrap();

    let b = engine.start_purchase(user.id).await.unwrap();
    engine
        .add_purchase_item(item(user.id, b.id, x, 150, 2))
        .await
        .unwrap();
    engine
        .add_purchase_item(item(user.id, b.id, z, 50, 4))
        .await
        .unwrap();
    engine.finalize_purchase(user.id, b.id).await.unwrap();

    let report = engine.compare_purchases(user.id, a.id, b.id).await.unwrap();
    assert_eq!(report.purchase_a, a.id);
    assert_eq!(report.purchase_b, b.id);
    assert_eq!(report.common_count, 1);
    assert_eq!(report.only_in_a, vec![y]);
    assert_eq!(report.only_in_b, vec![z]);

    let row = &report.items[0];
    assert_eq!(row.product.id, x);
    assert_eq!(row.avg_price_a, MoneyCents::new(100));
    assert_eq!(row.avg_price_b, MoneyCents::new(150));
    assert_eq!(row.delta, MoneyCents::new(50));
    assert_eq!(row.percent, Some(Percent::from_hundredths(5000)));
    assert_eq!((row.quantity_a, row.quantity_b), (2, 2));

    let reversed = engine.compare_purchases(user.id, b.id, a.id).await.unwrap();
    assert_eq!(reversed.only_in_a, vec![z]);
    assert_eq!(reversed.only_in_b, vec![y]);
    assert_eq!(reversed.items[0].delta, MoneyCents::new(-50));
}

#[tokio::test]
async fn compare_rejects_invalid_pairs() {
    let (engine, _db) = engine_with_db().await;
    let ana = register(&engine, "Ana", "ana@example.com").await;
    let bob = register(&engine, "Bob", "bob@example.com").await;
    let milk = product(&engine, "789100", "Milk").await;

    let done = engine.start_purchase(ana.id).await.unwrap();
    engine
        .add_purchase_item(item(ana.id, done.id, milk, 100, 1))
        .await
        .unwrap();
    engine.finalize_purchase(ana.id, done.id).await.unwrap();
    let open = engine.start_purchase(ana.id).await.unwrap();

    let bobs = engine.start_purchase(bob.id).await.unwrap();
    engine
        .add_purchase_item(item(bob.id, bobs.id, milk, 100, 1))
        .await
        .unwrap();
    engine.finalize_purchase(bob.id, bobs.id).await.unwrap();

    assert!(matches!(
        engine.compare_purchases(ana.id, done.id, done.id).await,
        Err(EngineError::BusinessRule(_))
    ));
    assert!(matches!(
        engine.compare_purchases(ana.id, done.id, open.id).await,
        Err(EngineError::BusinessRule(_))
    ));
    assert!(matches!(
        engine.compare_purchases(ana.id, done.id, 9999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.compare_purchases(ana.id, done.id, bobs.id).await,
        Err(EngineError::Forbidden(_))
    ));

    // A missing purchase wins over problems with the other one.
    assert!(matches!(
        engine.compare_purchases(ana.id, open.id, 9999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.compare_purchases(ana.id, bobs.id, 9999).await,
        Err(EngineError::KeyNotFound(_))
    ));
    // A foreign purchase wins over an open one.
    assert!(matches!(
        engine.compare_purchases(ana.id, open.id, bobs.id).await,
        Err(EngineError::Forbidden(_))
    ));
}
