//! 测试用内存 SQLite 库及数据构造

use crate::entities::{
    RewardTier, UserRole, challenge_entity as challenges, menu_item_entity as menu_items,
    restaurant_entity as restaurants, reward_entity as rewards, user_entity as users,
};
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::atomic::{AtomicU32, Ordering};

static SEQ: AtomicU32 = AtomicU32::new(1);

fn next_seq() -> u32 {
    SEQ.fetch_add(1, Ordering::Relaxed)
}

/// 单连接保证整个测试共享同一个内存库
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn create_user(db: &DatabaseConnection, role: UserRole) -> users::Model {
    let n = next_seq();
    users::ActiveModel {
        username: Set(format!("user{n}")),
        email: Set(format!("user{n}@fooddash.test")),
        full_name: Set(format!("Test User {n}")),
        role: Set(role),
        loyalty_points: Set(0),
        reward_tier: Set(RewardTier::Bronze),
        streak_count: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_restaurant(db: &DatabaseConnection, owner_id: i64) -> restaurants::Model {
    let n = next_seq();
    restaurants::ActiveModel {
        name: Set(format!("Kitchen {n}")),
        address: Set("12 Market Road".into()),
        phone: Set("5550100".into()),
        cuisine_types: Set("indian,chinese".into()),
        price_for_two: Set(40000),
        rating: Set(Some(4.2)),
        delivery_time: Set(35),
        is_open: Set(true),
        owner_id: Set(Some(owner_id)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    price: i64,
) -> menu_items::Model {
    let n = next_seq();
    menu_items::ActiveModel {
        name: Set(format!("Dish {n}")),
        price: Set(price),
        is_veg: Set(n % 2 == 0),
        restaurant_id: Set(restaurant_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_reward(
    db: &DatabaseConnection,
    points_cost: i64,
    minimum_tier: RewardTier,
    valid_for_days: Option<i32>,
) -> rewards::Model {
    let n = next_seq();
    rewards::ActiveModel {
        name: Set(format!("Reward {n}")),
        description: Set("100 off your next order".into()),
        points_cost: Set(points_cost),
        discount_amount: Set(Some(10000)),
        valid_for_days: Set(valid_for_days),
        minimum_tier: Set(minimum_tier),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// 当前时间窗口内、已启用的挑战
pub async fn create_challenge(
    db: &DatabaseConnection,
    points: i64,
    target_count: i32,
    minimum_tier: RewardTier,
) -> challenges::Model {
    let n = next_seq();
    let now = Utc::now();
    challenges::ActiveModel {
        name: Set(format!("Challenge {n}")),
        description: Set(format!("Order {target_count} times")),
        points: Set(points),
        target_count: Set(target_count),
        action_type: Set("place_order".into()),
        start_date: Set(now - Duration::days(1)),
        end_date: Set(now + Duration::days(7)),
        minimum_tier: Set(minimum_tier),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
