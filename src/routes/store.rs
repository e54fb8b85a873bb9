use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderView, OrderViewList, ReviewOrderRequest},
    error::AppResult,
    middleware::auth::AuthPrincipal,
    response::ApiResponse,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_open_orders))
        .route("/orders/review", patch(review_order))
        .route("/orders/{id}/cancel", patch(cancel_accepted_order))
        .route("/orders/{id}/finish", patch(finish_accepted_order))
}

#[utoipa::path(
    get,
    path = "/api/store/orders",
    responses(
        (status = 200, description = "Submitted orders awaiting review", body = ApiResponse<OrderViewList>),
        (status = 403, description = "Employees only")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn list_open_orders(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<OrderViewList>>> {
    let resp = store_service::list_open_orders(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/store/orders/review",
    request_body = ReviewOrderRequest,
    responses(
        (status = 200, description = "Order accepted or refused", body = ApiResponse<OrderView>),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order not submitted")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn review_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<ReviewOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = store_service::review_order(&state.pool, &principal, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/store/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Accepted order canceled", body = ApiResponse<OrderView>),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order not accepted")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn cancel_accepted_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = store_service::cancel_accepted_order(&state.pool, &principal, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/store/orders/{id}/finish",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Accepted order finished", body = ApiResponse<OrderView>),
        (status = 403, description = "Employees only"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order not accepted")
    ),
    security(("bearer_auth" = [])),
    tag = "Store"
)]
pub async fn finish_accepted_order(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderView>>> {
    let resp = store_service::finish_accepted_order(&state.pool, &principal, id).await?;
    Ok(Json(resp))
}
