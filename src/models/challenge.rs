use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{
    RewardTier, challenge_entity as challenges, user_challenge_entity as user_challenges,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChallengeResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub points: i64,
    pub target_count: i32,
    pub action_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub minimum_tier: RewardTier,
}

impl From<challenges::Model> for ChallengeResponse {
    fn from(m: challenges::Model) -> Self {
        ChallengeResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            points: m.points,
            target_count: m.target_count,
            action_type: m.action_type,
            start_date: m.start_date,
            end_date: m.end_date,
            minimum_tier: m.minimum_tier,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserChallengeResponse {
    pub id: i64,
    pub challenge_id: i64,
    pub current_count: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<user_challenges::Model> for UserChallengeResponse {
    fn from(m: user_challenges::Model) -> Self {
        UserChallengeResponse {
            id: m.id,
            challenge_id: m.challenge_id,
            current_count: m.current_count,
            completed: m.completed,
            completed_at: m.completed_at,
        }
    }
}

/// 进行中的挑战及进度
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveUserChallengeResponse {
    pub challenge: ChallengeResponse,
    pub progress: UserChallengeResponse,
}
