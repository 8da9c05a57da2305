use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::products::models::{
    derived_discount, CreateProductRequest, Product, UpdateProductRequest,
};

const PRODUCT_COLUMNS: &str = "id, name, mrp, price, discount, unit, description, images, \
     is_active, category_id, created_at, updated_at";

/// Repository for catalog product operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new ProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product; discount is derived from mrp and price
    pub async fn create(&self, request: CreateProductRequest) -> Result<Product, ApiError> {
        let discount = derived_discount(request.mrp, request.price);

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, mrp, price, discount, unit, description, images, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(request.mrp)
        .bind(request.price)
        .bind(discount)
        .bind(request.unit)
        .bind(&request.description)
        .bind(Json(&request.images))
        .bind(request.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// List products, newest first; the storefront sees active products only
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Product>, ApiError> {
        let query = if include_inactive {
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC")
        } else {
            format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = TRUE ORDER BY created_at DESC"
            )
        };

        let products = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find multiple products by IDs
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, ApiError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Partially update a product, keeping existing values for omitted fields.
    /// The derived discount is recomputed from the effective mrp/price pair.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "Product".to_string(),
            id: id.to_string(),
        })?;

        let mrp = request.mrp.unwrap_or(existing.mrp);
        let price = request.price.unwrap_or(existing.price);
        let discount = derived_discount(mrp, price);
        let images = request.images.map(Json).unwrap_or(existing.images);

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = $1,
                mrp = $2,
                price = $3,
                discount = $4,
                unit = $5,
                description = $6,
                images = $7,
                category_id = $8,
                is_active = $9,
                updated_at = NOW()
            WHERE id = $10
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(request.name.unwrap_or(existing.name))
        .bind(mrp)
        .bind(price)
        .bind(discount)
        .bind(request.unit.unwrap_or(existing.unit))
        .bind(request.description.unwrap_or(existing.description))
        .bind(images)
        .bind(request.category_id.or(existing.category_id))
        .bind(request.is_active.unwrap_or(existing.is_active))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Soft-delete: the product disappears from the storefront but existing
    /// order snapshots keep referencing it
    pub async fn deactivate(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "Product".to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}
