use chrono::{Days, Utc};
use sea_orm::Database;

use engine::{
    DEFAULT_LOW_STOCK_THRESHOLD, Engine, EngineError, MovementCmd, MovementFilter, MovementKind,
    ProductCmd, WarehouseCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .bcrypt_cost(4)
        .build()
        .await
        .unwrap()
}

fn warehouse(name: &str) -> WarehouseCmd {
    WarehouseCmd {
        name: name.to_string(),
        location: None,
    }
}

fn movement(product_id: i32, warehouse_id: i32, kind: MovementKind, quantity: i64) -> MovementCmd {
    MovementCmd {
        product_id,
        warehouse_id,
        kind,
        quantity,
        remarks: None,
    }
}

#[tokio::test]
async fn warehouse_crud_and_soft_delete() {
    let engine = engine_with_db().await;

    let main = engine
        .new_warehouse(WarehouseCmd {
            name: " Main ".to_string(),
            location: Some("Dock 4".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(main.name, "Main");
    assert_eq!(main.location.as_deref(), Some("Dock 4"));

    let err = engine.new_warehouse(warehouse("MAIN")).await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("MAIN".to_string()));
    let err = engine.new_warehouse(warehouse("  ")).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .new_warehouse(warehouse(&"w".repeat(101)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let renamed = engine
        .update_warehouse(main.id, warehouse("Central"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Central");
    assert_eq!(renamed.location, None);

    engine.delete_warehouse(main.id).await.unwrap();
    assert!(engine.warehouses(false).await.unwrap().is_empty());
    assert_eq!(engine.warehouses(true).await.unwrap().len(), 1);
    assert!(engine.warehouse(main.id).await.unwrap().deleted_at.is_some());

    assert!(matches!(
        engine.delete_warehouse(main.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine
            .update_warehouse(main.id, warehouse("Again"))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // the name is free again once its holder is deleted
    engine.new_warehouse(warehouse("Central")).await.unwrap();
}

#[tokio::test]
async fn product_validation() {
    let engine = engine_with_db().await;

    let cases = [
        ProductCmd::new("", "SKU-1", 100),
        ProductCmd::new("n".repeat(101), "SKU-1", 100),
        ProductCmd::new("Widget", "", 100),
        ProductCmd::new("Widget", "s".repeat(51), 100),
        ProductCmd::new("Widget", "SKU-1", 0),
        ProductCmd::new("Widget", "SKU-1", -5),
    ];
    for cmd in cases {
        let err = engine.new_product(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    let mut negative = ProductCmd::new("Widget", "SKU-1", 100);
    negative.quantity = Some(-1);
    assert!(matches!(
        engine.new_product(negative).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    let mut homeless = ProductCmd::new("Widget", "SKU-1", 100);
    homeless.quantity = Some(3);
    assert!(matches!(
        engine.new_product(homeless).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    let err = engine
        .new_product(ProductCmd::new("Widget", "SKU-1", 100).stock(42, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let closed = engine.new_warehouse(warehouse("Closed")).await.unwrap();
    engine.delete_warehouse(closed.id).await.unwrap();
    let err = engine
        .new_product(ProductCmd::new("Widget", "SKU-1", 100).stock(closed.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    assert!(engine.products(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn product_crud_and_soft_delete() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();

    let widget = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250).stock(main.id, 12))
        .await
        .unwrap();
    assert_eq!(widget.quantity, 12);
    assert_eq!(widget.warehouse_id, Some(main.id));

    let err = engine
        .new_product(ProductCmd::new("Other", "w-1", 100))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("w-1".to_string()));

    let history = engine.movements(MovementFilter::default()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, MovementKind::In);
    assert_eq!(history[0].quantity, 12);

    let mut cmd = ProductCmd::new("Widget XL", "W-1", 300);
    cmd.quantity = Some(5);
    let updated = engine.update_product(widget.id, cmd).await.unwrap();
    assert_eq!(updated.name, "Widget XL");
    assert_eq!(updated.warehouse_id, Some(main.id));
    assert_eq!(updated.quantity, 5);

    let history = engine.movements(MovementFilter::default()).await.unwrap();
    assert_eq!(history[0].kind, MovementKind::Adjust);
    assert_eq!(history[0].quantity, -7);

    // no quantity leaves stock alone
    let same = engine
        .update_product(widget.id, ProductCmd::new("Widget XL", "W-1", 300))
        .await
        .unwrap();
    assert_eq!(same.quantity, 5);

    engine.delete_product(widget.id).await.unwrap();
    assert!(engine.products(false).await.unwrap().is_empty());
    let listed = engine.products(true).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].deleted_at.is_some());
    assert_eq!(listed[0].quantity, 5);

    assert!(matches!(
        engine
            .update_product(widget.id, ProductCmd::new("Widget", "W-1", 250))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.delete_product(widget.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.product(99).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // SKUs stay reserved by deleted products
    let err = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn movements_change_stock_and_never_overdraw() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();
    let annex = engine.new_warehouse(warehouse("Annex")).await.unwrap();
    let widget = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250))
        .await
        .unwrap();

    engine
        .record_movement(movement(widget.id, main.id, MovementKind::In, 20))
        .await
        .unwrap();
    let out = engine
        .record_movement(MovementCmd {
            remarks: Some(" order 17 ".to_string()),
            ..movement(widget.id, main.id, MovementKind::Out, 8)
        })
        .await
        .unwrap();
    assert_eq!(out.quantity, -8);
    assert_eq!(out.remarks.as_deref(), Some("order 17"));
    engine
        .record_movement(movement(widget.id, annex.id, MovementKind::In, 3))
        .await
        .unwrap();

    let err = engine
        .record_movement(movement(widget.id, annex.id, MovementKind::Out, 4))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("insufficient stock: 3 available".to_string())
    );
    let err = engine
        .record_movement(movement(widget.id, main.id, MovementKind::Adjust, -13))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .record_movement(movement(widget.id, main.id, MovementKind::In, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .record_movement(movement(99, main.id, MovementKind::In, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let levels = engine.stock_levels(None, false).await.unwrap();
    let quantities: Vec<_> = levels
        .iter()
        .map(|level| (level.warehouse_name.as_str(), level.quantity))
        .collect();
    assert_eq!(quantities, vec![("Main", 12), ("Annex", 3)]);
    assert_eq!(engine.product(widget.id).await.unwrap().quantity, 15);

    let annex_only = engine.stock_levels(Some(annex.id), false).await.unwrap();
    assert_eq!(annex_only.len(), 1);
    assert_eq!(annex_only[0].sku, "W-1");

    assert_eq!(engine.movements(MovementFilter::default()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn low_stock_uses_threshold() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();
    let scarce = engine
        .new_product(ProductCmd::new("Scarce", "S-1", 100).stock(main.id, 2))
        .await
        .unwrap();
    let edge = engine
        .new_product(ProductCmd::new("Edge", "E-1", 100).stock(main.id, 10))
        .await
        .unwrap();
    engine
        .new_product(ProductCmd::new("Plenty", "P-1", 100).stock(main.id, 50))
        .await
        .unwrap();

    let low = engine
        .low_stock(DEFAULT_LOW_STOCK_THRESHOLD, None)
        .await
        .unwrap();
    let ids: Vec<_> = low.iter().map(|level| level.product_id).collect();
    assert_eq!(ids, vec![scarce.id, edge.id]);

    let low = engine.low_stock(5, Some(main.id)).await.unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].product_name, "Scarce");

    engine.delete_product(scarce.id).await.unwrap();
    assert_eq!(engine.low_stock(5, None).await.unwrap().len(), 0);

    assert!(matches!(
        engine.low_stock(-1, None).await.unwrap_err(),
        EngineError::Validation(_)
    ));
}

#[tokio::test]
async fn history_filters() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();
    let annex = engine.new_warehouse(warehouse("Annex")).await.unwrap();
    let widget = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250).stock(main.id, 5))
        .await
        .unwrap();
    let gadget = engine
        .new_product(ProductCmd::new("Gadget", "G-1", 900).stock(annex.id, 7))
        .await
        .unwrap();

    let by_product = engine
        .movements(MovementFilter {
            product_id: Some(gadget.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_product.len(), 1);
    assert_eq!(by_product[0].warehouse_id, annex.id);

    let by_warehouse = engine
        .movements(MovementFilter {
            warehouse_id: Some(main.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_warehouse.len(), 1);
    assert_eq!(by_warehouse[0].product_id, widget.id);

    let today = Utc::now().date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap();
    let same_day = engine
        .movements(MovementFilter {
            from: Some(today.to_string()),
            to: Some(today.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(same_day.len(), 2);
    let future = engine
        .movements(MovementFilter {
            from: Some(tomorrow.to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(future.is_empty());

    let err = engine
        .movements(MovementFilter {
            from: Some(tomorrow.to_string()),
            to: Some(today.to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    let err = engine
        .movements(MovementFilter {
            from: Some("yesterday".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn deleting_a_movement_reverts_stock() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();
    let widget = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250).stock(main.id, 10))
        .await
        .unwrap();
    let out = engine
        .record_movement(movement(widget.id, main.id, MovementKind::Out, 4))
        .await
        .unwrap();
    assert_eq!(engine.product(widget.id).await.unwrap().quantity, 6);

    engine.delete_movement(out.id).await.unwrap();
    assert_eq!(engine.product(widget.id).await.unwrap().quantity, 10);
    assert_eq!(engine.movements(MovementFilter::default()).await.unwrap().len(), 1);
    let all = engine
        .movements(MovementFilter {
            include_deleted: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|movement| movement.deleted_at.is_some()));

    assert!(matches!(
        engine.delete_movement(out.id).await.unwrap_err(),
        EngineError::Validation(_)
    ));
    assert!(matches!(
        engine.delete_movement(99).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // reverting the initial stock now would overdraw
    engine
        .record_movement(movement(widget.id, main.id, MovementKind::Out, 10))
        .await
        .unwrap();
    let initial = all.iter().find(|movement| movement.deleted_at.is_none()).unwrap();
    let err = engine.delete_movement(initial.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn warehouse_with_stock_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let main = engine.new_warehouse(warehouse("Main")).await.unwrap();
    let widget = engine
        .new_product(ProductCmd::new("Widget", "W-1", 250).stock(main.id, 3))
        .await
        .unwrap();

    let err = engine.delete_warehouse(main.id).await.unwrap_err();
    assert_eq!(err, EngineError::InUse("Main".to_string()));

    engine
        .record_movement(movement(widget.id, main.id, MovementKind::Out, 3))
        .await
        .unwrap();
    engine.delete_warehouse(main.id).await.unwrap();

    let err = engine
        .record_movement(movement(widget.id, main.id, MovementKind::In, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
