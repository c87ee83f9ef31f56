use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{menu_item_entity as menu_items, restaurant_entity as restaurants};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestaurantResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub cuisine_types: String,
    /// 两人均价(分)
    pub price_for_two: i64,
    pub rating: Option<f64>,
    /// 预计配送时长(分钟)
    pub delivery_time: i32,
    pub is_open: bool,
}

impl From<restaurants::Model> for RestaurantResponse {
    fn from(m: restaurants::Model) -> Self {
        RestaurantResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            address: m.address,
            phone: m.phone,
            cuisine_types: m.cuisine_types,
            price_for_two: m.price_for_two,
            rating: m.rating,
            delivery_time: m.delivery_time,
            is_open: m.is_open,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// 单价(分)
    pub price: i64,
    pub is_veg: bool,
}

impl From<menu_items::Model> for MenuItemResponse {
    fn from(m: menu_items::Model) -> Self {
        MenuItemResponse {
            id: m.id,
            restaurant_id: m.restaurant_id,
            name: m.name,
            description: m.description,
            price: m.price,
            is_veg: m.is_veg,
        }
    }
}
