use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{CreateOrderRequest, CreateOrderResponse, OrderItemView, OrderView, OrderViewList},
    error::{AppError, AppResult},
    lifecycle::{OrderEvent, OrderStatus},
    middleware::auth::{AuthPrincipal, require_customer},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    token::PrincipalKind,
};

/// Creates the order header, all line items and the aggregate price as one
/// transaction. A missing product rolls the whole order back; no partially
/// priced order is ever visible.
pub async fn create_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    require_customer(principal)?;

    if payload.items.is_empty() {
        return Err(AppError::BadRequest("ORDER_MUST_HAVE_ITEMS".into()));
    }
    if payload.items.iter().any(|item| item.quantity <= 0) {
        return Err(AppError::BadRequest("INVALID_ITEM_QUANTITY".into()));
    }

    let mut txn = pool.begin().await?;

    let order_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO orders (id, customer_id, status, finished, requisition_date) \
         VALUES ($1, $2, $3, false, $4)",
    )
    .bind(order_id)
    .bind(principal.id)
    .bind(OrderStatus::Submitted.code())
    .bind(Utc::now().date_naive())
    .execute(&mut *txn)
    .await?;

    let mut total_cents: i64 = 0;
    for item in &payload.items {
        // Unit price is read once, here; later catalog changes never touch
        // a placed order.
        let product: Option<(i64, bool)> =
            sqlx::query_as("SELECT price_cents, active FROM products WHERE id = $1")
                .bind(item.product_id)
                .fetch_optional(&mut *txn)
                .await?;
        let Some((unit_price_cents, active)) = product else {
            return Err(AppError::NotFound("PRODUCT_NOT_FOUND"));
        };
        if !active {
            return Err(AppError::BadRequest("PRODUCT_NOT_ACTIVE".into()));
        }

        // Checked arithmetic: price_cents is only constrained non-negative,
        // so an extreme catalog row must fail the request, not wrap.
        let line_cents = unit_price_cents
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(|| AppError::BadRequest("ORDER_PRICE_OVERFLOW".into()))?;
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price_cents) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(line_cents)
        .execute(&mut *txn)
        .await?;

        total_cents = total_cents
            .checked_add(line_cents)
            .ok_or_else(|| AppError::BadRequest("ORDER_PRICE_OVERFLOW".into()))?;
    }

    sqlx::query("UPDATE orders SET price_cents = $2 WHERE id = $1")
        .bind(order_id)
        .bind(total_cents)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    tracing::info!(order_id = %order_id, price_cents = total_cents, "order created");

    Ok(ApiResponse::success(
        "ORDER_CREATED_WITH_SUCCESS",
        CreateOrderResponse {
            id: order_id,
            price_cents: total_cents,
        },
        Some(Meta::empty()),
    ))
}

/// Guarded status change: the from-state check and the write are a single
/// compare-and-set statement, so concurrent transitions cannot both win.
/// `owner` additionally scopes customer-driven events to the owning customer.
pub(crate) async fn apply_transition(
    pool: &DbPool,
    order_id: Uuid,
    event: OrderEvent,
    owner: Option<Uuid>,
) -> AppResult<Order> {
    let from = event.source();
    let to = event.target();

    let updated: Option<Order> = match owner {
        Some(owner_id) => {
            sqlx::query_as(
                "UPDATE orders SET status = $2, finished = $3, updated_at = now() \
                 WHERE id = $1 AND status = $4 AND customer_id = $5 RETURNING *",
            )
            .bind(order_id)
            .bind(to.code())
            .bind(to.finished())
            .bind(from.code())
            .bind(owner_id)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "UPDATE orders SET status = $2, finished = $3, updated_at = now() \
                 WHERE id = $1 AND status = $4 RETURNING *",
            )
            .bind(order_id)
            .bind(to.code())
            .bind(to.finished())
            .bind(from.code())
            .fetch_optional(pool)
            .await?
        }
    };

    if let Some(order) = updated {
        tracing::info!(order_id = %order.id, status = order.status.code(), "order transitioned");
        return Ok(order);
    }

    // Nothing matched: missing order or wrong current state. Re-read to
    // report which, with the state machine naming the exact violation.
    let current: Option<Order> = match owner {
        Some(owner_id) => {
            sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND customer_id = $2")
                .bind(order_id)
                .bind(owner_id)
                .fetch_optional(pool)
                .await?
        }
        None => sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(pool)
            .await?,
    };

    match current {
        None => Err(AppError::NotFound("ORDER_NOT_FOUND")),
        Some(order) => match order.status.apply(event) {
            Err(err) => Err(err.into()),
            // The order raced into the required state after the CAS failed;
            // the caller may resubmit.
            Ok(_) => Err(AppError::Conflict("ORDER_NOT_IN_REQUIRED_STATE".into())),
        },
    }
}

pub async fn cancel_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    require_customer(principal)?;
    let order =
        apply_transition(pool, order_id, OrderEvent::CustomerCancel, Some(principal.id)).await?;
    let view = assemble_view(pool, order).await?;
    Ok(ApiResponse::success(
        "ORDER_CANCELED_WITH_SUCCESS",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    // Employees may inspect any order; customers only their own.
    let order: Option<Order> = match principal.kind {
        PrincipalKind::Employee => sqlx::query_as("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(pool)
            .await?,
        PrincipalKind::Customer => {
            sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND customer_id = $2")
                .bind(order_id)
                .bind(principal.id)
                .fetch_optional(pool)
                .await?
        }
    };
    let Some(order) = order else {
        return Err(AppError::NotFound("ORDER_NOT_FOUND"));
    };

    let view = assemble_view(pool, order).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn list_orders(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<OrderViewList>> {
    require_customer(principal)?;
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
    )
    .bind(principal.id)
    .fetch_all(pool)
    .await?;

    let orders = assemble_views(pool, orders).await?;
    let meta = Meta::total(orders.len() as i64);
    Ok(ApiResponse::success("OK", OrderViewList { orders }, Some(meta)))
}

pub async fn list_active_orders(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<OrderViewList>> {
    require_customer(principal)?;
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders \
         WHERE customer_id = $1 AND finished = false ORDER BY created_at DESC",
    )
    .bind(principal.id)
    .fetch_all(pool)
    .await?;

    let orders = assemble_views(pool, orders).await?;
    let meta = Meta::total(orders.len() as i64);
    Ok(ApiResponse::success("OK", OrderViewList { orders }, Some(meta)))
}

pub(crate) async fn assemble_view(pool: &DbPool, order: Order) -> AppResult<OrderView> {
    let mut views = assemble_views(pool, vec![order]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("order view vanished")))
}

/// One item query for the whole id set, grouped in memory. Items are always
/// appended per order so every line survives into the view.
pub(crate) async fn assemble_views(
    pool: &DbPool,
    orders: Vec<Order>,
) -> AppResult<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items: Vec<OrderItem> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = ANY($1)")
            .bind(&ids)
            .fetch_all(pool)
            .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(OrderItemView {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            price_cents: item.price_cents,
        });
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderView {
            items: by_order.remove(&order.id).unwrap_or_default(),
            id: order.id,
            status: order.status,
            price_cents: order.price_cents,
            requisition_date: order.requisition_date,
            finished: order.finished,
        })
        .collect())
}
