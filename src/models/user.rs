use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{RewardTier, UserRole, user_entity as users};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub address: Option<String>,
    pub loyalty_points: i64,
    pub reward_tier: RewardTier,
    pub streak_count: i32,
    pub last_order_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(m: users::Model) -> Self {
        UserResponse {
            id: m.id,
            username: m.username,
            email: m.email,
            full_name: m.full_name,
            phone: m.phone,
            role: m.role,
            address: m.address,
            loyalty_points: m.loyalty_points,
            reward_tier: m.reward_tier,
            streak_count: m.streak_count,
            last_order_date: m.last_order_date,
            created_at: m.created_at,
        }
    }
}
