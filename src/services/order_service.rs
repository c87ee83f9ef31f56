use crate::database::{conflict_on_stale, with_retry};
use crate::entities::{
    LoyaltyAction, OrderStatus, UserRole, menu_item_entity as menu_items,
    order_entity as orders, order_item_entity as order_items, restaurant_entity as restaurants,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{CartItem, OrderDetailResponse, OrderItemResponse, OrderResponse};
use crate::services::access_control::{self, Actor};
use crate::services::cart_service::check_line_quantity;
use crate::services::{CartService, LoyaltyService, pricing};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    cart_service: CartService,
    loyalty_service: LoyaltyService,
}

impl OrderService {
    pub fn new(
        pool: DatabaseConnection,
        cart_service: CartService,
        loyalty_service: LoyaltyService,
    ) -> Self {
        Self {
            pool,
            cart_service,
            loyalty_service,
        }
    }

    /// 以当前购物车下单
    ///
    /// 购物车在下单前整体取走, 同一用户并发提交时只有一次拿到菜品;
    /// 下单失败则放回。
    pub async fn place_order(
        &self,
        actor: &Actor,
        delivery_address: &str,
    ) -> AppResult<OrderDetailResponse> {
        let items = self.cart_service.take(actor.id).await;
        match self.create_order(actor, &items, delivery_address).await {
            Ok(order) => Ok(order),
            Err(e) => {
                self.cart_service.restore(actor.id, items).await;
                Err(e)
            }
        }
    }

    /// 创建订单
    ///
    /// 订单与明细在同一事务中写入; 提交后按 floor(金额 × 10) 发放下单积分。
    /// 积分发放失败只记录错误日志, 不影响订单。
    pub async fn create_order(
        &self,
        actor: &Actor,
        items: &[CartItem],
        delivery_address: &str,
    ) -> AppResult<OrderDetailResponse> {
        actor.require_role(UserRole::Customer)?;
        let restaurant_id = validate_cart(items)?;
        let delivery_address = delivery_address.trim();
        if delivery_address.is_empty() {
            return Err(AppError::ValidationError(
                "Delivery address is required".into(),
            ));
        }

        let (order, lines) = with_retry("create_order", || {
            self.try_create_order(actor.id, restaurant_id, items, delivery_address)
        })
        .await?;

        log::info!(
            "Order placed: order={} user={} restaurant={} amount={}",
            order.id,
            order.user_id,
            order.restaurant_id,
            order.amount
        );

        let points = pricing::order_points(order.amount);
        if points > 0
            && let Err(e) = self
                .loyalty_service
                .add_loyalty_points(
                    order.user_id,
                    LoyaltyAction::PlaceOrder,
                    points,
                    Some(format!("Points for order #{}", order.id)),
                    Some(order.id),
                )
                .await
        {
            log::error!(
                "Failed to award loyalty points: order={} user={} points={points}: {e}",
                order.id,
                order.user_id
            );
        }

        Ok(OrderDetailResponse {
            order: order.into(),
            items: lines.into_iter().map(Into::into).collect(),
        })
    }

    async fn try_create_order(
        &self,
        user_id: i64,
        restaurant_id: i64,
        items: &[CartItem],
        delivery_address: &str,
    ) -> AppResult<(orders::Model, Vec<order_items::Model>)> {
        let txn = self.pool.begin().await?;

        let restaurant = restaurants::Entity::find_by_id(restaurant_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Restaurant {restaurant_id} not found")))?;
        if !restaurant.is_open {
            return Err(AppError::ValidationError(format!(
                "Restaurant {} is closed",
                restaurant.name
            )));
        }
        ensure_menu_items(&txn, restaurant_id, items).await?;

        let summary = pricing::calculate(items);
        let now = Utc::now();

        let order = orders::ActiveModel {
            user_id: Set(user_id),
            restaurant_id: Set(restaurant_id),
            status: Set(OrderStatus::Placed),
            amount: Set(summary.total),
            delivery_fee: Set(summary.delivery_fee),
            tax: Set(summary.tax),
            discount: Set(summary.discount),
            delivery_address: Set(delivery_address.to_string()),
            delivery_partner_id: Set(None),
            created_at: Set(now),
            estimated_delivery_time: Set(Some(
                now + Duration::minutes(i64::from(restaurant.delivery_time)),
            )),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let line = order_items::ActiveModel {
                order_id: Set(order.id),
                menu_item_id: Set(item.menu_item_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            lines.push(line);
        }

        txn.commit().await?;

        Ok((order, lines))
    }

    /// 变更订单状态（可同时指派配送员）
    pub async fn update_status(
        &self,
        actor: &Actor,
        order_id: i64,
        target: OrderStatus,
        delivery_partner_id: Option<i64>,
    ) -> AppResult<OrderResponse> {
        let order = with_retry("update_order_status", || {
            self.try_update_status(actor, order_id, target, delivery_partner_id)
        })
        .await?;
        Ok(order.into())
    }

    async fn try_update_status(
        &self,
        actor: &Actor,
        order_id: i64,
        target: OrderStatus,
        delivery_partner_id: Option<i64>,
    ) -> AppResult<orders::Model> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        let owner_id = restaurant_owner(&txn, order.restaurant_id).await?;

        access_control::authorize_transition(actor, &order, owner_id, target)?;

        let mut am = orders::ActiveModel {
            id: Set(order.id),
            status: Set(target),
            ..Default::default()
        };
        if let Some(partner_id) = delivery_partner_id {
            if actor.role != UserRole::RestaurantAdmin {
                return Err(AppError::Forbidden(
                    "Only restaurant admins may assign delivery partners".into(),
                ));
            }
            if !target.accepts_delivery_partner() {
                return Err(AppError::ValidationError(format!(
                    "Cannot assign a delivery partner when moving an order to {target}"
                )));
            }
            ensure_delivery_partner(&txn, partner_id).await?;
            am.delivery_partner_id = Set(Some(partner_id));
        }

        // 以旧状态为条件, 并发变更时只有一个成功
        let updated = orders::Entity::update(am)
            .filter(orders::Column::Status.eq(order.status))
            .exec(&txn)
            .await
            .map_err(conflict_on_stale("order"))?;

        txn.commit().await?;

        log::info!(
            "Order status changed: order={order_id} {} -> {} by user={} ({})",
            order.status,
            updated.status,
            actor.id,
            actor.role
        );
        Ok(updated)
    }

    /// 指派配送员, 不改变订单状态
    pub async fn assign_delivery_partner(
        &self,
        actor: &Actor,
        order_id: i64,
        delivery_partner_id: i64,
    ) -> AppResult<OrderResponse> {
        actor.require_role(UserRole::RestaurantAdmin)?;
        let order = with_retry("assign_delivery_partner", || {
            self.try_assign_delivery_partner(actor, order_id, delivery_partner_id)
        })
        .await?;
        Ok(order.into())
    }

    async fn try_assign_delivery_partner(
        &self,
        actor: &Actor,
        order_id: i64,
        delivery_partner_id: i64,
    ) -> AppResult<orders::Model> {
        let txn = self.pool.begin().await?;

        let order = find_order_for_update(&txn, order_id).await?;
        let owner_id = restaurant_owner(&txn, order.restaurant_id).await?;
        if !access_control::is_restaurant_admin_of(actor, owner_id) {
            return Err(AppError::Forbidden(format!(
                "User {} does not manage the restaurant of order {order_id}",
                actor.id
            )));
        }

        if !order.status.accepts_delivery_partner() {
            return Err(AppError::ValidationError(format!(
                "Cannot assign a delivery partner to an order in status {}",
                order.status
            )));
        }
        ensure_delivery_partner(&txn, delivery_partner_id).await?;

        let am = orders::ActiveModel {
            id: Set(order.id),
            delivery_partner_id: Set(Some(delivery_partner_id)),
            ..Default::default()
        };
        let updated = orders::Entity::update(am)
            .filter(orders::Column::Status.eq(order.status))
            .exec(&txn)
            .await
            .map_err(conflict_on_stale("order"))?;

        txn.commit().await?;

        log::info!(
            "Delivery partner assigned: order={order_id} partner={delivery_partner_id} by user={}",
            actor.id
        );
        Ok(updated)
    }

    pub async fn get_order(&self, actor: &Actor, order_id: i64) -> AppResult<OrderDetailResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))?;
        let owner_id = restaurant_owner(&self.pool, order.restaurant_id).await?;

        if !access_control::can_view_order(actor, &order, owner_id) {
            return Err(AppError::Forbidden(format!(
                "User {} may not view order {order_id}",
                actor.id
            )));
        }

        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(order.id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(OrderDetailResponse {
            order: order.into(),
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        })
    }

    /// 按角色列出可见订单, 最新在前
    pub async fn list_orders(&self, actor: &Actor) -> AppResult<Vec<OrderResponse>> {
        let query = match actor.role {
            UserRole::Customer => orders::Entity::find().filter(orders::Column::UserId.eq(actor.id)),
            UserRole::DeliveryPartner => orders::Entity::find()
                .filter(orders::Column::DeliveryPartnerId.eq(actor.id)),
            UserRole::RestaurantAdmin => {
                let owned: Vec<i64> = restaurants::Entity::find()
                    .filter(restaurants::Column::OwnerId.eq(actor.id))
                    .all(&self.pool)
                    .await?
                    .into_iter()
                    .map(|r| r.id)
                    .collect();
                if owned.is_empty() {
                    return Ok(Vec::new());
                }
                orders::Entity::find().filter(orders::Column::RestaurantId.is_in(owned))
            }
        };

        let list = query
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

/// 购物车快照校验, 返回所属餐厅
fn validate_cart(items: &[CartItem]) -> AppResult<i64> {
    let first = items
        .first()
        .ok_or_else(|| AppError::ValidationError("Cart is empty".into()))?;

    if items.iter().any(|i| i.quantity <= 0) {
        return Err(AppError::ValidationError(
            "Item quantity must be positive".into(),
        ));
    }
    for item in items {
        check_line_quantity(item.quantity)?;
    }
    if items.iter().any(|i| i.restaurant_id != first.restaurant_id) {
        return Err(AppError::ValidationError(
            "All items must come from the same restaurant".into(),
        ));
    }

    Ok(first.restaurant_id)
}

async fn ensure_menu_items(
    txn: &DatabaseTransaction,
    restaurant_id: i64,
    items: &[CartItem],
) -> AppResult<()> {
    let ids: HashSet<i64> = items.iter().map(|i| i.menu_item_id).collect();
    let found: HashMap<i64, i64> = menu_items::Entity::find()
        .filter(menu_items::Column::Id.is_in(ids.iter().copied()))
        .all(txn)
        .await?
        .into_iter()
        .map(|m| (m.id, m.restaurant_id))
        .collect();

    for id in ids {
        if found.get(&id) != Some(&restaurant_id) {
            return Err(AppError::ValidationError(format!(
                "Menu item {id} is not available from restaurant {restaurant_id}"
            )));
        }
    }
    Ok(())
}

async fn find_order_for_update(txn: &DatabaseTransaction, order_id: i64) -> AppResult<orders::Model> {
    orders::Entity::find_by_id(order_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))
}

async fn restaurant_owner<C: ConnectionTrait>(db: &C, restaurant_id: i64) -> AppResult<Option<i64>> {
    Ok(restaurants::Entity::find_by_id(restaurant_id)
        .one(db)
        .await?
        .and_then(|r| r.owner_id))
}

async fn ensure_delivery_partner(txn: &DatabaseTransaction, user_id: i64) -> AppResult<()> {
    let user = users::Entity::find_by_id(user_id).one(txn).await?;
    match user {
        Some(u) if u.role == UserRole::DeliveryPartner => Ok(()),
        Some(_) => Err(AppError::ValidationError(format!(
            "User {user_id} is not a delivery partner"
        ))),
        None => Err(AppError::ValidationError(format!(
            "Delivery partner {user_id} does not exist"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RewardTier, loyalty_activity_entity as activities};
    use crate::services::RewardService;
    use crate::test_support::{
        create_menu_item, create_restaurant, create_reward, create_user, setup_db,
    };
    use sea_orm::PaginatorTrait;

    struct Fixture {
        db: DatabaseConnection,
        carts: CartService,
        orders: OrderService,
        customer: Actor,
        admin: Actor,
        partner: Actor,
        restaurant: restaurants::Model,
        dish: menu_items::Model,
    }

    async fn fixture() -> Fixture {
        let db = setup_db().await;
        let customer = create_user(&db, UserRole::Customer).await;
        let admin = create_user(&db, UserRole::RestaurantAdmin).await;
        let partner = create_user(&db, UserRole::DeliveryPartner).await;
        let restaurant = create_restaurant(&db, admin.id).await;
        let dish = create_menu_item(&db, restaurant.id, 5000).await;

        let carts = CartService::new(db.clone());
        let orders = OrderService::new(db.clone(), carts.clone(), LoyaltyService::new(db.clone()));
        Fixture {
            db,
            carts,
            orders,
            customer: Actor::new(customer.id, customer.role),
            admin: Actor::new(admin.id, admin.role),
            partner: Actor::new(partner.id, partner.role),
            restaurant,
            dish,
        }
    }

    impl Fixture {
        async fn order_of(&self, quantity: i32) -> OrderDetailResponse {
            self.carts
                .add_item(self.customer.id, self.dish.id, quantity)
                .await
                .unwrap();
            self.orders
                .place_order(&self.customer, "7 Lake View")
                .await
                .unwrap()
        }

        async fn user(&self, id: i64) -> users::Model {
            users::Entity::find_by_id(id).one(&self.db).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn test_order_to_redemption_end_to_end() {
        let f = fixture().await;

        let placed = f.order_of(3).await;
        assert_eq!(placed.order.status, OrderStatus::Placed);
        assert_eq!(placed.order.amount, 18750);
        assert_eq!(placed.order.tax, 750);
        assert_eq!(placed.order.delivery_fee, 3000);
        assert_eq!(placed.order.discount, 0);
        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].price, 5000);
        assert!(placed.order.estimated_delivery_time.unwrap() > placed.order.created_at);
        assert!(f.carts.snapshot(f.customer.id).await.is_empty());

        let user = f.user(f.customer.id).await;
        assert_eq!(user.loyalty_points, 1875);
        assert_eq!(user.reward_tier, RewardTier::Gold);
        assert_eq!(user.streak_count, 1);

        let award = activities::Entity::find()
            .filter(activities::Column::OrderId.eq(placed.order.id))
            .one(&f.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(award.action, LoyaltyAction::PlaceOrder);
        assert_eq!(award.points, 1875);

        let reward = create_reward(&f.db, 1000, RewardTier::Bronze, Some(30)).await;
        RewardService::new(f.db.clone())
            .redeem_reward(f.customer.id, reward.id)
            .await
            .unwrap();

        let user = f.user(f.customer.id).await;
        assert_eq!(user.loyalty_points, 875);
        assert_eq!(user.reward_tier, RewardTier::Silver);
    }

    #[tokio::test]
    async fn test_create_order_validation() {
        let f = fixture().await;
        let other = create_restaurant(&f.db, f.admin.id).await;
        let other_dish = create_menu_item(&f.db, other.id, 1000).await;

        let line = |dish: &menu_items::Model, quantity| CartItem {
            menu_item_id: dish.id,
            name: dish.name.clone(),
            price: dish.price,
            quantity,
            is_veg: dish.is_veg,
            restaurant_id: dish.restaurant_id,
        };

        let cases = [
            (vec![], "1 Road"),
            (vec![line(&f.dish, 1)], "   "),
            (vec![line(&f.dish, 0)], "1 Road"),
            (vec![line(&f.dish, 1), line(&other_dish, 1)], "1 Road"),
        ];
        for (items, address) in cases {
            let result = f.orders.create_order(&f.customer, &items, address).await;
            assert!(matches!(result, Err(AppError::ValidationError(_))), "{items:?}");
        }

        // 菜品与餐厅不匹配
        let mut forged = line(&other_dish, 1);
        forged.restaurant_id = f.restaurant.id;
        assert!(matches!(
            f.orders.create_order(&f.customer, &[forged], "1 Road").await,
            Err(AppError::ValidationError(_))
        ));

        assert!(matches!(
            f.orders.create_order(&f.admin, &[line(&f.dish, 1)], "1 Road").await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(orders::Entity::find().count(&f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_item_insert_leaves_no_order() {
        let f = fixture().await;
        f.carts.add_item(f.customer.id, f.dish.id, 2).await.unwrap();
        f.db.execute_unprepared("DROP TABLE order_items").await.unwrap();

        let result = f.orders.place_order(&f.customer, "7 Lake View").await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));

        assert_eq!(orders::Entity::find().count(&f.db).await.unwrap(), 0);
        assert_eq!(f.user(f.customer.id).await.loyalty_points, 0);
        // 失败时购物车保留
        assert_eq!(f.carts.snapshot(f.customer.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_loyalty_failure_does_not_fail_order() {
        let f = fixture().await;
        f.db.execute_unprepared("DROP TABLE loyalty_activities")
            .await
            .unwrap();

        let placed = f.order_of(1).await;
        assert!(orders::Entity::find_by_id(placed.order.id).one(&f.db).await.unwrap().is_some());
        assert_eq!(f.user(f.customer.id).await.loyalty_points, 0);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let f = fixture().await;
        let id = f.order_of(1).await.order.id;
        let o = &f.orders;

        o.update_status(&f.admin, id, OrderStatus::Confirmed, None).await.unwrap();
        o.update_status(&f.admin, id, OrderStatus::Preparing, None).await.unwrap();

        // 未指派前配送员无权操作
        assert!(matches!(
            o.update_status(&f.partner, id, OrderStatus::OutForDelivery, None).await,
            Err(AppError::Forbidden(_))
        ));

        let assigned = o.assign_delivery_partner(&f.admin, id, f.partner.id).await.unwrap();
        assert_eq!(assigned.status, OrderStatus::Preparing);
        assert_eq!(assigned.delivery_partner_id, Some(f.partner.id));

        o.update_status(&f.partner, id, OrderStatus::OutForDelivery, None).await.unwrap();
        let delivered = o.update_status(&f.partner, id, OrderStatus::Delivered, None).await.unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        assert!(matches!(
            o.update_status(&f.admin, id, OrderStatus::Cancelled, None).await,
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status_rejections() {
        let f = fixture().await;
        let id = f.order_of(1).await.order.id;
        let stranger = create_user(&f.db, UserRole::RestaurantAdmin).await;
        let stranger = Actor::new(stranger.id, stranger.role);
        let o = &f.orders;

        assert!(matches!(
            o.update_status(&f.admin, 9999, OrderStatus::Confirmed, None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            o.update_status(&f.customer, id, OrderStatus::Cancelled, None).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            o.update_status(&stranger, id, OrderStatus::Confirmed, None).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            o.update_status(&f.admin, id, OrderStatus::Delivered, None).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            o.update_status(&f.admin, id, OrderStatus::Preparing, None).await,
            Err(AppError::InvalidTransition(_))
        ));

        let unchanged = orders::Entity::find_by_id(id).one(&f.db).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Placed);

        // 确认时同时指派配送员
        let confirmed = o
            .update_status(&f.admin, id, OrderStatus::Confirmed, Some(f.partner.id))
            .await
            .unwrap();
        assert_eq!(confirmed.delivery_partner_id, Some(f.partner.id));
    }

    #[tokio::test]
    async fn test_cancel_rejects_delivery_partner() {
        let f = fixture().await;
        let id = f.order_of(1).await.order.id;
        let o = &f.orders;

        assert!(matches!(
            o.update_status(&f.admin, id, OrderStatus::Cancelled, Some(f.partner.id)).await,
            Err(AppError::ValidationError(_))
        ));
        let unchanged = orders::Entity::find_by_id(id).one(&f.db).await.unwrap().unwrap();
        assert_eq!(unchanged.status, OrderStatus::Placed);
        assert_eq!(unchanged.delivery_partner_id, None);

        let cancelled = o
            .update_status(&f.admin, id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(cancelled.delivery_partner_id, None);
        assert!(matches!(o.get_order(&f.partner, id).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_concurrent_checkout_places_one_order() {
        let f = fixture().await;
        f.carts.add_item(f.customer.id, f.dish.id, 1).await.unwrap();

        let (a, b) = tokio::join!(
            f.orders.place_order(&f.customer, "7 Lake View"),
            f.orders.place_order(&f.customer, "7 Lake View"),
        );
        let placed = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(placed, 1);
        assert!(matches!(
            if a.is_ok() { b } else { a },
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(orders::Entity::find().count(&f.db).await.unwrap(), 1);
        assert!(f.carts.snapshot(f.customer.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_items_added_during_checkout_stay_in_cart() {
        let f = fixture().await;
        let side = create_menu_item(&f.db, f.restaurant.id, 800).await;
        f.carts.add_item(f.customer.id, f.dish.id, 1).await.unwrap();

        let (placed, added) = tokio::join!(
            f.orders.place_order(&f.customer, "7 Lake View"),
            f.carts.add_item(f.customer.id, side.id, 2),
        );
        let placed = placed.unwrap();
        added.unwrap();

        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.items[0].menu_item_id, f.dish.id);
        let cart = f.carts.snapshot(f.customer.id).await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].menu_item_id, side.id);
        assert_eq!(cart[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_assign_delivery_partner_rules() {
        let f = fixture().await;
        let id = f.order_of(1).await.order.id;
        let o = &f.orders;

        // placed 状态不可指派
        assert!(matches!(
            o.assign_delivery_partner(&f.admin, id, f.partner.id).await,
            Err(AppError::ValidationError(_))
        ));

        o.update_status(&f.admin, id, OrderStatus::Confirmed, None).await.unwrap();

        assert!(matches!(
            o.assign_delivery_partner(&f.admin, id, f.customer.id).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            o.assign_delivery_partner(&f.admin, id, 8888).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            o.assign_delivery_partner(&f.customer, id, f.partner.id).await,
            Err(AppError::Forbidden(_))
        ));

        let other_admin = create_user(&f.db, UserRole::RestaurantAdmin).await;
        assert!(matches!(
            o.assign_delivery_partner(&Actor::new(other_admin.id, other_admin.role), id, f.partner.id)
                .await,
            Err(AppError::Forbidden(_))
        ));

        let assigned = o.assign_delivery_partner(&f.admin, id, f.partner.id).await.unwrap();
        assert_eq!(assigned.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_order_visibility() {
        let f = fixture().await;
        let id = f.order_of(1).await.order.id;
        let other_customer = create_user(&f.db, UserRole::Customer).await;
        let other_customer = Actor::new(other_customer.id, other_customer.role);
        let o = &f.orders;

        assert_eq!(o.get_order(&f.customer, id).await.unwrap().items.len(), 1);
        assert!(o.get_order(&f.admin, id).await.is_ok());
        assert!(matches!(o.get_order(&f.partner, id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(o.get_order(&other_customer, id).await, Err(AppError::Forbidden(_))));
        assert!(matches!(o.get_order(&f.customer, 31337).await, Err(AppError::NotFound(_))));

        o.update_status(&f.admin, id, OrderStatus::Confirmed, None).await.unwrap();
        o.assign_delivery_partner(&f.admin, id, f.partner.id).await.unwrap();
        assert!(o.get_order(&f.partner, id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_orders_by_role() {
        let f = fixture().await;
        let first = f.order_of(1).await.order.id;
        let second = f.order_of(2).await.order.id;
        let o = &f.orders;

        let ids = |list: Vec<OrderResponse>| list.into_iter().map(|x| x.id).collect::<Vec<_>>();

        assert_eq!(ids(o.list_orders(&f.customer).await.unwrap()), vec![second, first]);
        assert_eq!(ids(o.list_orders(&f.admin).await.unwrap()), vec![second, first]);
        assert!(o.list_orders(&f.partner).await.unwrap().is_empty());

        o.update_status(&f.admin, first, OrderStatus::Confirmed, Some(f.partner.id))
            .await
            .unwrap();
        assert_eq!(ids(o.list_orders(&f.partner).await.unwrap()), vec![first]);
    }
}
