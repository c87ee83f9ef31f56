use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loyalty_action")]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyAction {
    #[sea_orm(string_value = "sign_up")]
    SignUp,
    #[sea_orm(string_value = "place_order")]
    PlaceOrder,
    #[sea_orm(string_value = "review")]
    Review,
    #[sea_orm(string_value = "referral")]
    Referral,
    #[sea_orm(string_value = "birthday")]
    Birthday,
    #[sea_orm(string_value = "streak")]
    Streak,
    #[sea_orm(string_value = "challenge_completed")]
    ChallengeCompleted,
    #[sea_orm(string_value = "reward_redeemed")]
    RewardRedeemed,
}

impl std::fmt::Display for LoyaltyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoyaltyAction::SignUp => write!(f, "sign_up"),
            LoyaltyAction::PlaceOrder => write!(f, "place_order"),
            LoyaltyAction::Review => write!(f, "review"),
            LoyaltyAction::Referral => write!(f, "referral"),
            LoyaltyAction::Birthday => write!(f, "birthday"),
            LoyaltyAction::Streak => write!(f, "streak"),
            LoyaltyAction::ChallengeCompleted => write!(f, "challenge_completed"),
            LoyaltyAction::RewardRedeemed => write!(f, "reward_redeemed"),
        }
    }
}

/// 积分流水（只追加, 不修改不删除）
/// 同一用户所有 points 之和 == users.loyalty_points
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "loyalty_activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub action: LoyaltyAction,
    pub points: i64,
    pub description: Option<String>,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
