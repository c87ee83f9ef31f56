use super::RewardTier;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 限时挑战定义, 例如 "本月下单 5 次"
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "challenges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    /// 完成后奖励积分
    pub points: i64,
    pub target_count: i32,
    pub action_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub minimum_tier: RewardTier,
    pub is_active: bool,
}

impl Model {
    /// start_date <= now <= end_date
    pub fn is_running_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
