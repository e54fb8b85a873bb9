use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::lifecycle::OrderStatus;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<LineItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewOrderRequest {
    pub id: Uuid,
    pub accepted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    pub id: Uuid,
    pub status: OrderStatus,
    pub price_cents: Option<i64>,
    pub requisition_date: NaiveDate,
    pub finished: bool,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderViewList {
    pub orders: Vec<OrderView>,
}
