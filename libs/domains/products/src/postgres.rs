use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{CreateProduct, Product, UpdateProduct},
    repository::ProductRepository,
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `%keyword%` with LIKE wildcards escaped so they match literally
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<Product> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let mut active_model = model.into_active_model();
        active_model.name = Set(input.name);
        active_model.description = Set(input.description);
        active_model.price = Set(input.price);
        active_model.quantity = Set(input.quantity);
        active_model.updated_at = Set(chrono::Utc::now().into());

        // Row deleted between the read and the write
        let updated = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ProductError::NotFound(id),
            other => other.into(),
        })?;

        tracing::info!(product_id = id, "Updated product");
        Ok(updated.into())
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn search(&self, keyword: &str) -> ProductResult<Vec<Product>> {
        let pattern = contains_pattern(keyword);

        let models = entity::Entity::find()
            .filter(
                Condition::any()
                    .add(Expr::col(entity::Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(entity::Column::Description).ilike(pattern)),
            )
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_in_stock(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Quantity.gt(0))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn row(id: i64) -> entity::Model {
        let now = chrono::Utc::now();
        entity::Model {
            id,
            name: "Widget".to_string(),
            description: String::new(),
            price: 9.99,
            quantity: 5,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn update_input() -> UpdateProduct {
        UpdateProduct {
            name: "Gadget".to_string(),
            description: "renamed".to_string(),
            price: 19.99,
            quantity: 0,
        }
    }

    #[tokio::test]
    async fn test_update_returns_updated_row() {
        let mut updated = row(1);
        updated.name = "Gadget".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1)], vec![updated]])
            .into_connection();

        let product = PgProductRepository::new(db)
            .update(1, update_input())
            .await
            .unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Gadget");
    }

    #[tokio::test]
    async fn test_update_of_row_deleted_concurrently_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1)], Vec::<entity::Model>::new()])
            .into_connection();

        let result = PgProductRepository::new(db).update(1, update_input()).await;
        assert!(matches!(result, Err(ProductError::NotFound(1))));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();

        let result = PgProductRepository::new(db).update(7, update_input()).await;
        assert!(matches!(result, Err(ProductError::NotFound(7))));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("widget"), "%widget%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(contains_pattern(""), "%%");
    }
}
