use super::RewardTier;
use sea_orm::entity::prelude::*;

/// 奖励目录
/// - discount_amount(分) 与 discount_percentage 二选一
/// - valid_for_days: 兑换后有效天数, NULL 表示永不过期
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub points_cost: i64,
    pub discount_amount: Option<i64>,
    pub discount_percentage: Option<i32>,
    pub valid_for_days: Option<i32>,
    pub minimum_tier: RewardTier,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
