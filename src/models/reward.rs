use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{RewardTier, reward_entity as rewards, user_reward_entity as user_rewards};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RewardResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub points_cost: i64,
    /// 固定优惠金额(分)
    pub discount_amount: Option<i64>,
    pub discount_percentage: Option<i32>,
    pub valid_for_days: Option<i32>,
    pub minimum_tier: RewardTier,
}

impl From<rewards::Model> for RewardResponse {
    fn from(m: rewards::Model) -> Self {
        RewardResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            points_cost: m.points_cost,
            discount_amount: m.discount_amount,
            discount_percentage: m.discount_percentage,
            valid_for_days: m.valid_for_days,
            minimum_tier: m.minimum_tier,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRewardResponse {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    pub redeemed: bool,
    #[schema(example = "K7Q2M9XA")]
    pub code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<user_rewards::Model> for UserRewardResponse {
    fn from(m: user_rewards::Model) -> Self {
        UserRewardResponse {
            id: m.id,
            user_id: m.user_id,
            reward_id: m.reward_id,
            redeemed: m.redeemed,
            code: m.code,
            expires_at: m.expires_at,
            redeemed_at: m.redeemed_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RewardCodeRequest {
    #[schema(example = "K7Q2M9XA")]
    pub code: String,
}
