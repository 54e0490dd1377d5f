//! Database-backed tests for stock posting. They need a disposable Postgres:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -- --ignored
//! ```

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use stockroom::{
    database::{constraint_errors, run_migrations, Database},
    models::{
        Category, CreateUser, InventoryItem, MovementType, NewInventoryItem, NewProduct, NewStockMovement,
        NewSupplier, Product, ProductForm, StockMovement, Supplier, User,
    },
    stock::{post_movement, reverse_movement, StockError},
};

async fn database() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let db = PgPoolOptions::new().max_connections(10).connect(&url).await.unwrap();
    run_migrations(&db).await.unwrap();
    db
}

async fn product_with_stock(db: &Database, stock_quantity: i32) -> Product {
    let category = Category::create(db, "Test fixtures").await.unwrap();
    Product::create(
        db,
        &NewProduct {
            name: format!("Widget {}", uuid::Uuid::new_v4()),
            description: String::new(),
            category_id: category.id,
            price: Decimal::new(250, 2),
            stock_quantity,
            supplier_id: None,
        },
    )
    .await
    .unwrap()
}

fn movement(product: &Product, quantity: i32, movement_type: MovementType) -> NewStockMovement {
    NewStockMovement {
        product_id: product.id,
        quantity,
        movement_type,
        notes: String::new(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn posting_updates_stock_and_records_the_movement() {
    let db = database().await;
    let product = product_with_stock(&db, 10).await;

    let (updated, record) = post_movement(&db, &movement(&product, 4, MovementType::Out)).await.unwrap();
    assert_eq!(updated.stock_quantity, 6);
    assert_eq!(record.movement_type, MovementType::Out);

    let stored = Product::find(&db, product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 6);
    assert_eq!(StockMovement::for_product(&db, product.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn rejected_out_leaves_no_trace() {
    let db = database().await;
    let product = product_with_stock(&db, 3).await;

    let err = post_movement(&db, &movement(&product, 5, MovementType::Out)).await.unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { available: 3, requested: 5 }));

    let stored = Product::find(&db, product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 3);
    assert!(StockMovement::for_product(&db, product.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_outs_cannot_overdraw() {
    let db = database().await;
    let product = product_with_stock(&db, 5).await;

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let db = db.clone();
            let request = movement(&product, 2, MovementType::Out);
            tokio::spawn(async move { post_movement(&db, &request).await })
        })
        .collect();

    let mut posted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => posted += 1,
            Err(StockError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(posted, 2);
    let stored = Product::find(&db, product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 1);
    assert_eq!(StockMovement::for_product(&db, product.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn reversing_a_movement_restores_stock() {
    let db = database().await;
    let product = product_with_stock(&db, 2).await;

    let (_, incoming) = post_movement(&db, &movement(&product, 5, MovementType::In)).await.unwrap();
    post_movement(&db, &movement(&product, 6, MovementType::Out)).await.unwrap();

    // Only 1 unit left, so the 5 that came in can no longer be taken back.
    let err = reverse_movement(&db, incoming.id).await.unwrap_err();
    assert!(matches!(err, StockError::InsufficientStock { .. }));
    assert!(StockMovement::find(&db, incoming.id).await.unwrap().is_some());

    post_movement(&db, &movement(&product, 4, MovementType::In)).await.unwrap();
    let restored = reverse_movement(&db, incoming.id).await.unwrap();
    assert_eq!(restored.stock_quantity, 0);
    assert!(StockMovement::find(&db, incoming.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_product_removes_its_movements() {
    let db = database().await;
    let product = product_with_stock(&db, 0).await;
    post_movement(&db, &movement(&product, 3, MovementType::In)).await.unwrap();

    assert!(Product::delete(&db, product.id).await.unwrap());
    assert!(Product::find(&db, product.id).await.unwrap().is_none());
    assert!(StockMovement::for_product(&db, product.id).await.unwrap().is_empty());
    assert!(!Product::delete(&db, product.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn deleting_a_category_keeps_what_was_filed_under_it() {
    let db = database().await;
    let product = product_with_stock(&db, 1).await;
    let category_id = product.category_id.unwrap();

    let owner = User::create(
        &db,
        &CreateUser {
            username: format!("owner-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]),
            email: "owner@example.com".to_string(),
            password: String::new(),
        },
        "not-a-real-hash",
    )
    .await
    .unwrap();
    let item = InventoryItem::create(
        &db,
        owner.id,
        &NewInventoryItem {
            name: "Spare fuses".to_string(),
            quantity: 2,
            category_id: Some(category_id),
        },
    )
    .await
    .unwrap();

    assert!(Category::delete(&db, category_id).await.unwrap());

    let product = Product::find(&db, product.id).await.unwrap().unwrap();
    assert_eq!(product.category_id, None);
    let item = InventoryItem::find_owned(&db, item.id, owner.id).await.unwrap().unwrap();
    assert_eq!(item.category_id, None);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn editing_a_product_keeps_posted_movements() {
    let db = database().await;
    let product = product_with_stock(&db, 10).await;

    // The edit form is loaded while stock is still 10...
    let mut form = ProductForm::from(&product);
    form.name = format!("{} (renamed)", product.name);

    // ...then the whole lot ships before it is saved.
    post_movement(&db, &movement(&product, 10, MovementType::Out)).await.unwrap();

    let edited = Product::update(&db, product.id, &form.validate().unwrap()).await.unwrap().unwrap();
    assert_eq!(edited.name, form.name);
    assert_eq!(edited.stock_quantity, 0);

    let stored = Product::find(&db, product.id).await.unwrap().unwrap();
    assert_eq!(stored.stock_quantity, 0);
    assert_eq!(StockMovement::for_product(&db, product.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn supplier_email_and_phone_are_unique() {
    let db = database().await;
    let tag = uuid::Uuid::new_v4();
    let email = format!("{}@example.com", tag.simple());
    let phone = format!("{:010}", tag.as_u128() % 10_000_000_000);
    let supplier = |email: &str, phone: &str| NewSupplier {
        name: "Acme".to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: String::new(),
    };

    Supplier::create(&db, &supplier(&email, &phone)).await.unwrap();

    let other_phone = format!("{:010}", tag.as_u128().wrapping_add(1) % 10_000_000_000);
    let err = Supplier::create(&db, &supplier(&email, &other_phone)).await.unwrap_err();
    let errors = constraint_errors(&err, Supplier::UNIQUE_FIELDS).unwrap();
    assert!(errors.has("email"));
    assert_eq!(errors.message("email"), "Supplier with this Email already exists.");

    let other_email = format!("other-{}@example.com", tag.simple());
    let err = Supplier::create(&db, &supplier(&other_email, &phone)).await.unwrap_err();
    let errors = constraint_errors(&err, Supplier::UNIQUE_FIELDS).unwrap();
    assert!(errors.has("phone"));
    assert!(!errors.has("email"));

    let stored: Vec<_> = Supplier::all(&db)
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.email == email || s.email == other_email || s.phone == phone || s.phone == other_phone)
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email, email);
}
