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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "restaurant_admin")]
    RestaurantAdmin,
    #[sea_orm(string_value = "delivery_partner")]
    DeliveryPartner,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Customer => write!(f, "customer"),
            UserRole::RestaurantAdmin => write!(f, "restaurant_admin"),
            UserRole::DeliveryPartner => write!(f, "delivery_partner"),
        }
    }
}

/// 会员等级, 由累计积分唯一决定
///
/// | 等级 | 最低积分 |
/// |---|---|
/// | bronze | 0 |
/// | silver | 500 |
/// | gold | 1500 |
/// | platinum | 5000 |
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reward_tier")]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
    #[sea_orm(string_value = "platinum")]
    Platinum,
}

impl RewardTier {
    /// 从低到高
    pub const ALL: [RewardTier; 4] = [
        RewardTier::Bronze,
        RewardTier::Silver,
        RewardTier::Gold,
        RewardTier::Platinum,
    ];

    /// 数值等级, 用于 "不高于用户等级" 的比较
    pub fn rank(self) -> u8 {
        match self {
            RewardTier::Bronze => 1,
            RewardTier::Silver => 2,
            RewardTier::Gold => 3,
            RewardTier::Platinum => 4,
        }
    }

    pub fn min_points(self) -> i64 {
        match self {
            RewardTier::Bronze => 0,
            RewardTier::Silver => 500,
            RewardTier::Gold => 1500,
            RewardTier::Platinum => 5000,
        }
    }

    /// 取门槛不超过积分的最高等级
    pub fn for_points(points: i64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|tier| points >= tier.min_points())
            .unwrap_or(RewardTier::Bronze)
    }

    /// 当前等级是否满足 `required` 的最低等级要求
    pub fn satisfies(self, required: RewardTier) -> bool {
        required.rank() <= self.rank()
    }
}

impl std::fmt::Display for RewardTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardTier::Bronze => write!(f, "bronze"),
            RewardTier::Silver => write!(f, "silver"),
            RewardTier::Gold => write!(f, "gold"),
            RewardTier::Platinum => write!(f, "platinum"),
        }
    }
}

/// loyalty_points / reward_tier 是积分流水的投影, 只能通过积分服务追加流水时一起更新
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(RewardTier::for_points(0), RewardTier::Bronze);
        assert_eq!(RewardTier::for_points(499), RewardTier::Bronze);
        assert_eq!(RewardTier::for_points(500), RewardTier::Silver);
        assert_eq!(RewardTier::for_points(1499), RewardTier::Silver);
        assert_eq!(RewardTier::for_points(1500), RewardTier::Gold);
        assert_eq!(RewardTier::for_points(4999), RewardTier::Gold);
        assert_eq!(RewardTier::for_points(5000), RewardTier::Platinum);
        assert_eq!(RewardTier::for_points(1_000_000), RewardTier::Platinum);
    }

    #[test]
    fn test_tier_is_monotonic_in_points() {
        let mut previous = RewardTier::for_points(0);
        for points in (0..6000).step_by(25) {
            let tier = RewardTier::for_points(points);
            assert!(tier.rank() >= previous.rank(), "tier dropped at {points}");
            previous = tier;
        }
    }

    #[test]
    fn test_satisfies_uses_rank_order() {
        assert!(RewardTier::Gold.satisfies(RewardTier::Bronze));
        assert!(RewardTier::Gold.satisfies(RewardTier::Gold));
        assert!(!RewardTier::Gold.satisfies(RewardTier::Platinum));
        assert!(!RewardTier::Bronze.satisfies(RewardTier::Silver));
    }
}
