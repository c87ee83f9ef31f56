use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{OrderStatus, order_entity as orders, order_item_entity as order_items};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    /// 实付总额(分)
    pub amount: i64,
    pub delivery_fee: i64,
    pub tax: i64,
    pub discount: i64,
    pub delivery_address: String,
    pub delivery_partner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
}

impl From<orders::Model> for OrderResponse {
    fn from(m: orders::Model) -> Self {
        OrderResponse {
            id: m.id,
            customer_id: m.user_id,
            restaurant_id: m.restaurant_id,
            status: m.status,
            amount: m.amount,
            delivery_fee: m.delivery_fee,
            tax: m.tax,
            discount: m.discount,
            delivery_address: m.delivery_address,
            delivery_partner_id: m.delivery_partner_id,
            created_at: m.created_at,
            estimated_delivery_time: m.estimated_delivery_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub menu_item_id: i64,
    pub quantity: i32,
    /// 下单时单价(分)
    pub price: i64,
}

impl From<order_items::Model> for OrderItemResponse {
    fn from(m: order_items::Model) -> Self {
        OrderItemResponse {
            menu_item_id: m.menu_item_id,
            quantity: m.quantity,
            price: m.price,
        }
    }
}

/// 订单详情（含明细）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(example = "221B Baker Street")]
    pub delivery_address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// 仅餐厅管理员可同时指派配送员
    pub delivery_partner_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDeliveryPartnerRequest {
    pub delivery_partner_id: i64,
}
