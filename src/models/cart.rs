use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 购物车行（加入时的菜品快照）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub menu_item_id: i64,
    pub name: String,
    /// 单价(分)
    pub price: i64,
    pub quantity: i32,
    pub is_veg: bool,
    pub restaurant_id: i64,
}

/// 价格明细(分)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub tax: i64,
    pub discount: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub summary: PriceBreakdown,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub menu_item_id: i64,
    #[schema(example = 1)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// <= 0 表示移除
    pub quantity: i32,
}
