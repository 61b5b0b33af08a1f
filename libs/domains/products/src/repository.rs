use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, UpdateProduct};

/// Repository trait for Product persistence
///
/// Listings are ordered by id ascending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product and return it with its assigned id
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    /// List every product
    async fn list_all(&self) -> ProductResult<Vec<Product>>;

    /// Replace all mutable fields; `NotFound` when the id is absent
    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product>;

    /// Delete a product, returning whether it existed
    async fn delete(&self, id: i64) -> ProductResult<bool>;

    /// Case-insensitive substring search over name and description
    async fn search(&self, keyword: &str) -> ProductResult<Vec<Product>>;

    /// Products with a quantity above zero
    async fn list_in_stock(&self) -> ProductResult<Vec<Product>>;
}

#[derive(Debug, Default)]
struct Store {
    products: BTreeMap<i64, Product>,
    last_id: i64,
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Ids start at 1 and are never reused.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, predicate: impl Fn(&Product) -> bool) -> Vec<Product> {
        let store = self.store.read().await;
        store
            .products
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        store.last_id += 1;
        let now = chrono::Utc::now();
        let product = Product {
            id: store.last_id,
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            created_at: now,
            updated_at: now,
        };
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        Ok(self.filtered(|_| true).await)
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        let product = store
            .products
            .get_mut(&id)
            .ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);
        let updated = product.clone();

        tracing::info!(product_id = id, "Updated product");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn search(&self, keyword: &str) -> ProductResult<Vec<Product>> {
        Ok(self.filtered(|p| p.matches_keyword(keyword)).await)
    }

    async fn list_in_stock(&self) -> ProductResult<Vec<Product>> {
        Ok(self.filtered(Product::is_in_stock).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, quantity: i32) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            price: 10.0,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(input("Widget", 1)).await.unwrap();
        let second = repo.create(input("Gadget", 1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let fetched = repo.get_by_id(first.id).await.unwrap();
        assert_eq!(fetched, Some(first));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();

        let first = repo.create(input("Widget", 1)).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());
        assert!(!repo.delete(first.id).await.unwrap());

        let next = repo.create(input("Widget", 1)).await.unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let update = UpdateProduct {
            name: "Ghost".into(),
            description: String::new(),
            price: 1.0,
            quantity: 0,
        };

        let result = repo.update(42, update).await;
        assert!(matches!(result, Err(ProductError::NotFound(42))));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_in_stock_filters() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Blue Widget", 0)).await.unwrap();
        repo.create(input("Red Gadget", 3)).await.unwrap();
        repo.create(input("Green widget", 7)).await.unwrap();

        let widgets = repo.search("WIDGET").await.unwrap();
        assert_eq!(
            widgets.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 3]
        );

        assert!(repo.search("sprocket").await.unwrap().is_empty());
        assert_eq!(repo.search("").await.unwrap().len(), 3);

        let in_stock = repo.list_in_stock().await.unwrap();
        assert_eq!(in_stock.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3]);
    }
}
