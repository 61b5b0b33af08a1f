//! Integration tests for the PostgreSQL product repository
//!
//! These use a real PostgreSQL via testcontainers and need Docker:
//! `cargo test -p domain_products -- --ignored`

use domain_products::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn input(builder: &TestDataBuilder, suffix: &str, description: &str, quantity: i32) -> CreateProduct {
    CreateProduct {
        name: builder.name("product", suffix),
        description: description.to_string(),
        price: builder.price(quantity as u64),
        quantity,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_get_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let created = repo
        .create(input(&builder, "main", "Integration test product", 5))
        .await
        .unwrap();
    assert!(created.id > 0);

    let retrieved = repo.get_by_id(created.id).await.unwrap();
    let retrieved = assert_some(retrieved, "product should exist");

    assert_eq!(retrieved.name, created.name);
    assert_eq!(retrieved.description, "Integration test product");
    assert_eq!(retrieved.quantity, 5);
    assert_eq!(retrieved.price, created.price);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_all_is_ordered_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("list_ordered");

    for suffix in ["a", "b", "c"] {
        repo.create(input(&builder, suffix, "", 1)).await.unwrap();
    }

    let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids.len(), 3);
    assert_ascending_ids(&ids, "list_all");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_delete_missing_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let update = UpdateProduct {
        name: "Ghost".to_string(),
        description: String::new(),
        price: 1.0,
        quantity: 0,
    };

    let result = repo.update(9_999, update).await;
    assert!(matches!(result, Err(ProductError::NotFound(9_999))));
    assert!(!repo.delete(9_999).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_refreshes_fields() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("update_fields");

    let created = repo.create(input(&builder, "main", "old", 1)).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                name: builder.name("product", "renamed"),
                description: "new".to_string(),
                price: 42.0,
                quantity: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.description, "new");
    assert_eq!(updated.price, 42.0);
    assert!(updated.updated_at >= created.updated_at);
    assert!(!updated.is_in_stock());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_search_is_case_insensitive_and_literal() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("search");
    let token = builder.token();

    let in_name = repo
        .create(CreateProduct {
            name: format!("Widget {}", token.to_uppercase()),
            ..input(&builder, "unused", "", 1)
        })
        .await
        .unwrap();
    let in_description = repo
        .create(input(&builder, "desc", &format!("contains {} inside", token), 1))
        .await
        .unwrap();
    repo.create(input(&builder, "other", "50% off", 1)).await.unwrap();

    let found: Vec<i64> = repo.search(&token).await.unwrap().iter().map(|p| p.id).collect();
    assert_eq!(found, vec![in_name.id, in_description.id]);

    // `_` must not act as a single-character wildcard
    assert!(repo.search("5_%").await.unwrap().is_empty());
    assert_eq!(repo.search("50%").await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_in_stock() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("in_stock");

    repo.create(input(&builder, "empty", "", 0)).await.unwrap();
    let stocked = repo.create(input(&builder, "stocked", "", 4)).await.unwrap();

    let in_stock = repo.list_in_stock().await.unwrap();
    assert_eq!(in_stock.len(), 1);
    assert_eq!(in_stock[0].id, stocked.id);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_over_postgres_reports_not_found() {
    let db = TestDatabase::new().await;
    let service = ProductService::new(PgProductRepository::new(db.connection()));

    let result = service.delete_product(12_345).await;
    assert!(matches!(result, Err(ProductError::NotFound(12_345))));
}
