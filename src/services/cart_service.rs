use crate::entities::{menu_item_entity as menu_items, restaurant_entity as restaurants};
use crate::error::{AppError, AppResult};
use crate::models::{CartItem, CartResponse};
use crate::services::pricing;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 单个菜品在购物车中的最大数量
pub const MAX_LINE_QUANTITY: i32 = 99;

/// 按用户保存的购物车（进程内）
///
/// 同一购物车内只允许一家餐厅的菜品; 下单时只交出不可变快照。
#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
    carts: Arc<Mutex<HashMap<i64, Vec<CartItem>>>>,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            pool,
            carts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get_cart(&self, user_id: i64) -> CartResponse {
        to_response(self.snapshot(user_id).await)
    }

    pub async fn snapshot(&self, user_id: i64) -> Vec<CartItem> {
        self.carts
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// 加入菜品, 已存在则合并数量; 单价取当前菜单价
    pub async fn add_item(
        &self,
        user_id: i64,
        menu_item_id: i64,
        quantity: i32,
    ) -> AppResult<CartResponse> {
        if quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be positive".into(),
            ));
        }
        check_line_quantity(quantity)?;

        let item = menu_items::Entity::find_by_id(menu_item_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Menu item {menu_item_id} not found")))?;

        let restaurant = restaurants::Entity::find_by_id(item.restaurant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Restaurant {} not found", item.restaurant_id))
            })?;

        if !restaurant.is_open {
            return Err(AppError::ValidationError(format!(
                "Restaurant {} is closed",
                restaurant.name
            )));
        }

        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();

        if let Some(first) = cart.first()
            && first.restaurant_id != item.restaurant_id
        {
            return Err(AppError::ValidationError(
                "Cart already contains items from another restaurant".into(),
            ));
        }

        match cart.iter_mut().find(|line| line.menu_item_id == menu_item_id) {
            Some(line) => {
                let merged = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::ValidationError("Quantity is too large".into()))?;
                check_line_quantity(merged)?;
                line.quantity = merged;
                line.price = item.price;
            }
            None => cart.push(CartItem {
                menu_item_id: item.id,
                name: item.name,
                price: item.price,
                quantity,
                is_veg: item.is_veg,
                restaurant_id: item.restaurant_id,
            }),
        }

        Ok(to_response(cart.clone()))
    }

    /// 数量 <= 0 等同于移除
    pub async fn update_item(
        &self,
        user_id: i64,
        menu_item_id: i64,
        quantity: i32,
    ) -> AppResult<CartResponse> {
        if quantity <= 0 {
            return self.remove_item(user_id, menu_item_id).await;
        }
        check_line_quantity(quantity)?;

        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();
        let line = cart
            .iter_mut()
            .find(|line| line.menu_item_id == menu_item_id)
            .ok_or_else(|| AppError::NotFound(format!("Menu item {menu_item_id} not in cart")))?;
        line.quantity = quantity;

        Ok(to_response(cart.clone()))
    }

    pub async fn remove_item(&self, user_id: i64, menu_item_id: i64) -> AppResult<CartResponse> {
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();
        let before = cart.len();
        cart.retain(|line| line.menu_item_id != menu_item_id);
        if cart.len() == before {
            return Err(AppError::NotFound(format!(
                "Menu item {menu_item_id} not in cart"
            )));
        }

        Ok(to_response(cart.clone()))
    }

    pub async fn clear(&self, user_id: i64) {
        self.carts.lock().await.remove(&user_id);
    }

    /// 结算时一次性取走购物车; 之后加入的菜品进入新的购物车
    pub async fn take(&self, user_id: i64) -> Vec<CartItem> {
        self.carts
            .lock()
            .await
            .remove(&user_id)
            .unwrap_or_default()
    }

    /// 下单失败时放回取走的菜品
    ///
    /// 期间新加入的同餐厅菜品合并数量; 若已换成其他餐厅则保留新购物车。
    pub async fn restore(&self, user_id: i64, items: Vec<CartItem>) {
        let Some(first) = items.first() else {
            return;
        };

        let mut carts = self.carts.lock().await;
        let cart = carts.entry(user_id).or_default();

        if let Some(current) = cart.first()
            && current.restaurant_id != first.restaurant_id
        {
            log::warn!(
                "Dropping restored cart of user {user_id}: restaurant {} replaced by {}",
                first.restaurant_id,
                current.restaurant_id
            );
            return;
        }

        let added = std::mem::replace(cart, items);
        for line in added {
            match cart.iter_mut().find(|l| l.menu_item_id == line.menu_item_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_LINE_QUANTITY);
                    existing.price = line.price;
                }
                None => cart.push(line),
            }
        }
    }
}

pub(crate) fn check_line_quantity(quantity: i32) -> AppResult<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::ValidationError(format!(
            "Quantity of a single item cannot exceed {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

fn to_response(items: Vec<CartItem>) -> CartResponse {
    let summary = pricing::calculate(&items);
    CartResponse { items, summary }
}
