use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

use super::m20250901_000001_create_accounts_and_catalog::{RewardTier, Users};
use super::m20250901_000002_create_orders::Orders;

#[derive(DeriveIden)]
enum LoyaltyAction {
    #[sea_orm(iden = "loyalty_action")]
    Enum,
    SignUp,
    PlaceOrder,
    Review,
    Referral,
    Birthday,
    Streak,
    ChallengeCompleted,
    RewardRedeemed,
}

/// 积分流水 (append-only)
#[derive(DeriveIden)]
enum LoyaltyActivities {
    Table,
    Id,
    UserId,
    Action,
    Points,
    Description,
    OrderId,
    CreatedAt,
}

/// 奖励目录
#[derive(DeriveIden)]
enum Rewards {
    Table,
    Id,
    Name,
    Description,
    PointsCost,
    DiscountAmount,
    DiscountPercentage,
    ValidForDays,
    MinimumTier,
    IsActive,
}

/// 用户兑换的奖励（含唯一兑换码）
#[derive(DeriveIden)]
enum UserRewards {
    Table,
    Id,
    UserId,
    RewardId,
    Redeemed,
    Code,
    ExpiresAt,
    RedeemedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Challenges {
    Table,
    Id,
    Name,
    Description,
    Points,
    TargetCount,
    ActionType,
    StartDate,
    EndDate,
    MinimumTier,
    IsActive,
}

#[derive(DeriveIden)]
enum UserChallenges {
    Table,
    Id,
    UserId,
    ChallengeId,
    CurrentCount,
    Completed,
    CompletedAt,
    CreatedAt,
}

fn tier_column(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .enumeration(
            RewardTier::Enum,
            [
                RewardTier::Bronze,
                RewardTier::Silver,
                RewardTier::Gold,
                RewardTier::Platinum,
            ],
        )
        .not_null()
        .to_owned()
}

fn id_column(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() == DatabaseBackend::Postgres {
            manager
                .create_type(
                    Type::create()
                        .as_enum(LoyaltyAction::Enum)
                        .values([
                            LoyaltyAction::SignUp,
                            LoyaltyAction::PlaceOrder,
                            LoyaltyAction::Review,
                            LoyaltyAction::Referral,
                            LoyaltyAction::Birthday,
                            LoyaltyAction::Streak,
                            LoyaltyAction::ChallengeCompleted,
                            LoyaltyAction::RewardRedeemed,
                        ])
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyActivities::Table)
                    .if_not_exists()
                    .col(&mut id_column(LoyaltyActivities::Id))
                    .col(
                        ColumnDef::new(LoyaltyActivities::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyActivities::Action)
                            .enumeration(
                                LoyaltyAction::Enum,
                                [
                                    LoyaltyAction::SignUp,
                                    LoyaltyAction::PlaceOrder,
                                    LoyaltyAction::Review,
                                    LoyaltyAction::Referral,
                                    LoyaltyAction::Birthday,
                                    LoyaltyAction::Streak,
                                    LoyaltyAction::ChallengeCompleted,
                                    LoyaltyAction::RewardRedeemed,
                                ],
                            )
                            .not_null(),
                    )
                    // 有符号: 正数为获得, 负数为消费
                    .col(
                        ColumnDef::new(LoyaltyActivities::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoyaltyActivities::Description).text().null())
                    .col(
                        ColumnDef::new(LoyaltyActivities::OrderId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyActivities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyalty_activities_user")
                            .from(LoyaltyActivities::Table, LoyaltyActivities::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyalty_activities_order")
                            .from(LoyaltyActivities::Table, LoyaltyActivities::OrderId)
                            .to(Orders::Table, Orders::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_loyalty_activities_user")
                    .table(LoyaltyActivities::Table)
                    .col(LoyaltyActivities::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(&mut id_column(Rewards::Id))
                    .col(ColumnDef::new(Rewards::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Rewards::Description).text().not_null())
                    .col(ColumnDef::new(Rewards::PointsCost).big_integer().not_null())
                    // 固定金额(分) 与 百分比二选一
                    .col(ColumnDef::new(Rewards::DiscountAmount).big_integer().null())
                    .col(ColumnDef::new(Rewards::DiscountPercentage).integer().null())
                    // 兑换后有效天数, NULL 表示永久有效
                    .col(ColumnDef::new(Rewards::ValidForDays).integer().null())
                    .col(&mut tier_column(Rewards::MinimumTier))
                    .col(
                        ColumnDef::new(Rewards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserRewards::Table)
                    .if_not_exists()
                    .col(&mut id_column(UserRewards::Id))
                    .col(ColumnDef::new(UserRewards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserRewards::RewardId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserRewards::Redeemed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(UserRewards::Code).string_len(16).not_null())
                    .col(
                        ColumnDef::new(UserRewards::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserRewards::RedeemedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserRewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_rewards_user")
                            .from(UserRewards::Table, UserRewards::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_rewards_reward")
                            .from(UserRewards::Table, UserRewards::RewardId)
                            .to(Rewards::Table, Rewards::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 兑换码全局唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_rewards_code_unique")
                    .table(UserRewards::Table)
                    .col(UserRewards::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_rewards_user")
                    .table(UserRewards::Table)
                    .col(UserRewards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Challenges::Table)
                    .if_not_exists()
                    .col(&mut id_column(Challenges::Id))
                    .col(ColumnDef::new(Challenges::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Challenges::Description).text().not_null())
                    .col(ColumnDef::new(Challenges::Points).big_integer().not_null())
                    .col(ColumnDef::new(Challenges::TargetCount).integer().not_null())
                    .col(
                        ColumnDef::new(Challenges::ActionType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Challenges::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Challenges::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(&mut tier_column(Challenges::MinimumTier))
                    .col(
                        ColumnDef::new(Challenges::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserChallenges::Table)
                    .if_not_exists()
                    .col(&mut id_column(UserChallenges::Id))
                    .col(
                        ColumnDef::new(UserChallenges::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserChallenges::ChallengeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserChallenges::CurrentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserChallenges::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserChallenges::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserChallenges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_challenges_user")
                            .from(UserChallenges::Table, UserChallenges::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_challenges_challenge")
                            .from(UserChallenges::Table, UserChallenges::ChallengeId)
                            .to(Challenges::Table, Challenges::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个用户每个挑战一条进度记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_challenges_user_challenge_unique")
                    .table(UserChallenges::Table)
                    .col(UserChallenges::UserId)
                    .col(UserChallenges::ChallengeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序: 进度 -> 挑战 -> 用户奖励 -> 奖励 -> 流水
        for table in [
            UserChallenges::Table.into_iden(),
            Challenges::Table.into_iden(),
            UserRewards::Table.into_iden(),
            Rewards::Table.into_iden(),
            LoyaltyActivities::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().if_exists().table(table).to_owned())
                .await?;
        }

        if manager.get_database_backend() == DatabaseBackend::Postgres {
            manager
                .drop_type(Type::drop().if_exists().name(LoyaltyAction::Enum).to_owned())
                .await?;
        }

        Ok(())
    }
}
