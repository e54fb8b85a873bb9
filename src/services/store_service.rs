//! Store-side order handling: the open queue and the employee-driven
//! transitions (accept, refuse, cancel, finish).

use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{OrderView, OrderViewList, ReviewOrderRequest},
    error::AppResult,
    lifecycle::{OrderEvent, OrderStatus},
    middleware::auth::{AuthPrincipal, require_employee},
    models::Order,
    response::{ApiResponse, Meta},
    services::order_service::{apply_transition, assemble_view, assemble_views},
};

pub async fn list_open_orders(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<OrderViewList>> {
    require_employee(principal)?;
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE status = $1 ORDER BY created_at",
    )
    .bind(OrderStatus::Submitted.code())
    .fetch_all(pool)
    .await?;

    let orders = assemble_views(pool, orders).await?;
    let meta = Meta::total(orders.len() as i64);
    Ok(ApiResponse::success("OK", OrderViewList { orders }, Some(meta)))
}

/// Accept or refuse a submitted order.
pub async fn review_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: ReviewOrderRequest,
) -> AppResult<ApiResponse<OrderView>> {
    require_employee(principal)?;
    let event = if payload.accepted {
        OrderEvent::Accept
    } else {
        OrderEvent::Refuse
    };
    let order = apply_transition(pool, payload.id, event, None).await?;
    let message = if payload.accepted {
        "ORDER_ACCEPTED_WITH_SUCCESS"
    } else {
        "ORDER_REFUSED_WITH_SUCCESS"
    };
    let view = assemble_view(pool, order).await?;
    Ok(ApiResponse::success(message, view, Some(Meta::empty())))
}

pub async fn cancel_accepted_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    require_employee(principal)?;
    let order = apply_transition(pool, order_id, OrderEvent::StoreCancel, None).await?;
    let view = assemble_view(pool, order).await?;
    Ok(ApiResponse::success(
        "ORDER_CANCELED_WITH_SUCCESS",
        view,
        Some(Meta::empty()),
    ))
}

pub async fn finish_accepted_order(
    pool: &DbPool,
    principal: &AuthPrincipal,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    require_employee(principal)?;
    let order = apply_transition(pool, order_id, OrderEvent::Finish, None).await?;
    let view = assemble_view(pool, order).await?;
    Ok(ApiResponse::success(
        "ORDER_FINISHED_WITH_SUCCESS",
        view,
        Some(Meta::empty()),
    ))
}
