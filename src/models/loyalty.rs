use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{LoyaltyAction, RewardTier, loyalty_activity_entity as activities};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyPointsResponse {
    pub points: i64,
    pub tier: RewardTier,
    pub streak_count: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyActivityResponse {
    pub id: i64,
    pub action: LoyaltyAction,
    /// 正数为获得, 负数为消费
    pub points: i64,
    pub description: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<activities::Model> for LoyaltyActivityResponse {
    fn from(m: activities::Model) -> Self {
        LoyaltyActivityResponse {
            id: m.id,
            action: m.action,
            points: m.points,
            description: m.description,
            order_id: m.order_id,
            created_at: m.created_at,
        }
    }
}
