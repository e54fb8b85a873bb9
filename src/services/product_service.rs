use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::products::{
        CreateProductRequest, ProductList, UpdateProductRequest, UpdateProductStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthPrincipal, require_employee, require_manager},
    models::Product,
    response::{ApiResponse, Meta},
};

pub async fn create_product(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    require_employee(principal)?;
    if payload.price_cents < 0 {
        return Err(AppError::BadRequest("INVALID_PRICE".into()));
    }

    let product: Product = sqlx::query_as(
        "INSERT INTO products (id, name, description, image_url, price_cents, active) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.description)
    .bind(payload.image_url)
    .bind(payload.price_cents)
    .bind(payload.active.unwrap_or(false))
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "PRODUCT_CREATED_WITH_SUCCESS",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    pool: &DbPool,
    principal: &AuthPrincipal,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    require_employee(principal)?;
    let existing: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(existing) = existing else {
        return Err(AppError::NotFound("PRODUCT_NOT_FOUND"));
    };

    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.or(existing.description);
    let image_url = payload.image_url.or(existing.image_url);
    let price_cents = payload.price_cents.unwrap_or(existing.price_cents);
    if price_cents < 0 {
        return Err(AppError::BadRequest("INVALID_PRICE".into()));
    }

    let product: Product = sqlx::query_as(
        "UPDATE products \
         SET name = $2, description = $3, image_url = $4, price_cents = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(image_url)
    .bind(price_cents)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success(
        "PRODUCT_UPDATED",
        product,
        Some(Meta::empty()),
    ))
}

/// Orders snapshot their prices, so a product row may be removed without
/// touching history. Manager only.
pub async fn delete_product(
    pool: &DbPool,
    principal: &AuthPrincipal,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    require_manager(pool, principal).await?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("PRODUCT_NOT_FOUND"));
    }
    Ok(ApiResponse::success(
        "PRODUCT_DELETED",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn set_product_status(
    pool: &DbPool,
    principal: &AuthPrincipal,
    id: Uuid,
    payload: UpdateProductStatusRequest,
) -> AppResult<ApiResponse<Product>> {
    require_employee(principal)?;
    let product: Option<Product> =
        sqlx::query_as("UPDATE products SET active = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(payload.active)
            .fetch_optional(pool)
            .await?;
    match product {
        Some(p) => Ok(ApiResponse::success(
            "PRODUCT_STATUS_UPDATED",
            p,
            Some(Meta::empty()),
        )),
        None => Err(AppError::NotFound("PRODUCT_NOT_FOUND")),
    }
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match product {
        Some(p) => Ok(ApiResponse::success("OK", p, Some(Meta::empty()))),
        None => Err(AppError::NotFound("PRODUCT_NOT_FOUND")),
    }
}

pub async fn list_active_products(pool: &DbPool) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> =
        sqlx::query_as("SELECT * FROM products WHERE active = true ORDER BY name")
            .fetch_all(pool)
            .await?;
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("OK", ProductList { items }, Some(meta)))
}

pub async fn list_all_products(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<ProductList>> {
    require_employee(principal)?;
    let items: Vec<Product> = sqlx::query_as("SELECT * FROM products ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("OK", ProductList { items }, Some(meta)))
}
