use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, CreateOrderResponse, OrderView, OrderViewList},
    error::AppResult,
    middleware::auth::AuthPrincipal,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/active", get(list_active_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/cancel", patch(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Empty or invalid line items"),
        (status = 403, description = "Customers only"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreateOrderResponse>>)> {
    let resp = order_service::create_order(&state.pool, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All own orders", body = ApiResponse<OrderViewList>),
        (status = 403, description = "Customers only")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<OrderViewList>>> {
    let resp = order_service::list_orders(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/active",
    responses(
        (status = 200, description = "Own unfinished orders", body = ApiResponse<OrderViewList>),
        (status = 403, description = "Customers only")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_active_orders(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<OrderViewList>>> {
    let resp = order_service::list_active_orders(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderView>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::get_order(&state.pool, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order canceled", body = ApiResponse<OrderView>),
        (status = 403, description = "Customers only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order not cancellable in its current state")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = order_service::cancel_order(&state.pool, &principal, id).await?;
    Ok(Json(resp))
}
