use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveIden)]
pub enum UserRole {
    #[sea_orm(iden = "user_role")]
    Enum,
    Customer,
    RestaurantAdmin,
    DeliveryPartner,
}

#[derive(DeriveIden)]
pub enum RewardTier {
    #[sea_orm(iden = "reward_tier")]
    Enum,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    Email,
    FullName,
    Phone,
    Role,
    Address,
    LoyaltyPoints,
    RewardTier,
    StreakCount,
    LastOrderDate,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Restaurants {
    Table,
    Id,
    Name,
    Description,
    Address,
    Phone,
    CuisineTypes,
    PriceForTwo,
    Rating,
    DeliveryTime,
    IsOpen,
    OwnerId,
}

#[derive(DeriveIden)]
pub enum MenuItems {
    Table,
    Id,
    Name,
    Description,
    Price,
    IsVeg,
    RestaurantId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 账户与餐厅目录
/// - users.loyalty_points 只由积分流水维护, 不加 CHECK 约束（应用层保证 >= 0）
/// - 金额统一使用分 (cents)
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Postgres 使用原生 ENUM 类型, 其它后端按文本存储
        if manager.get_database_backend() == DatabaseBackend::Postgres {
            manager
                .create_type(
                    Type::create()
                        .as_enum(UserRole::Enum)
                        .values([
                            UserRole::Customer,
                            UserRole::RestaurantAdmin,
                            UserRole::DeliveryPartner,
                        ])
                        .to_owned(),
                )
                .await?;

            manager
                .create_type(
                    Type::create()
                        .as_enum(RewardTier::Enum)
                        .values([
                            RewardTier::Bronze,
                            RewardTier::Silver,
                            RewardTier::Gold,
                            RewardTier::Platinum,
                        ])
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(32).null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .enumeration(
                                UserRole::Enum,
                                [
                                    UserRole::Customer,
                                    UserRole::RestaurantAdmin,
                                    UserRole::DeliveryPartner,
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::Address).text().null())
                    .col(
                        ColumnDef::new(Users::LoyaltyPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::RewardTier)
                            .enumeration(
                                RewardTier::Enum,
                                [
                                    RewardTier::Bronze,
                                    RewardTier::Silver,
                                    RewardTier::Gold,
                                    RewardTier::Platinum,
                                ],
                            )
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::StreakCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::LastOrderDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Restaurants::Description).text().null())
                    .col(ColumnDef::new(Restaurants::Address).text().not_null())
                    .col(ColumnDef::new(Restaurants::Phone).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Restaurants::CuisineTypes)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::PriceForTwo)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Restaurants::Rating).double().null())
                    // 预计配送时长（分钟）
                    .col(
                        ColumnDef::new(Restaurants::DeliveryTime)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::IsOpen)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Restaurants::OwnerId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_restaurants_owner")
                            .from(Restaurants::Table, Restaurants::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_restaurants_owner")
                    .table(Restaurants::Table)
                    .col(Restaurants::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuItems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().null())
                    .col(ColumnDef::new(MenuItems::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(MenuItems::IsVeg)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MenuItems::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_items_restaurant")
                            .from(MenuItems::Table, MenuItems::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_items_restaurant")
                    .table(MenuItems::Table)
                    .col(MenuItems::RestaurantId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(MenuItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Restaurants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;

        if manager.get_database_backend() == DatabaseBackend::Postgres {
            manager
                .drop_type(Type::drop().if_exists().name(RewardTier::Enum).to_owned())
                .await?;
            manager
                .drop_type(Type::drop().if_exists().name(UserRole::Enum).to_owned())
                .await?;
        }

        Ok(())
    }
}
