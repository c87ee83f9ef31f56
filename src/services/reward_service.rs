use crate::database::{conflict_on_stale, with_retry};
use crate::entities::{
    LoyaltyAction, RewardTier, reward_entity as rewards, user_entity as users,
    user_reward_entity as user_rewards,
};
use crate::error::{AppError, AppResult};
use crate::models::{RewardResponse, UserRewardResponse};
use crate::services::loyalty_service::append_activity;
use crate::utils::generate_redemption_code;
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 兑换码查重的最大尝试次数
const MAX_CODE_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct RewardService {
    pool: DatabaseConnection,
}

impl RewardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 启用中且最低等级不高于 `tier` 的奖励
    pub async fn get_rewards_by_tier(&self, tier: RewardTier) -> AppResult<Vec<RewardResponse>> {
        let mut list = rewards::Entity::find()
            .filter(rewards::Column::IsActive.eq(true))
            .order_by_asc(rewards::Column::PointsCost)
            .order_by_asc(rewards::Column::Id)
            .all(&self.pool)
            .await?;

        list.retain(|r| tier.satisfies(r.minimum_tier));

        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_rewards_for_user(&self, user_id: i64) -> AppResult<Vec<RewardResponse>> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
        self.get_rewards_by_tier(user.reward_tier).await
    }

    /// 兑换奖励
    ///
    /// 1. 校验用户 / 奖励存在、等级满足、积分足够
    /// 2. 生成唯一兑换码
    /// 3. 同一事务内写入 user_rewards 并追加负积分流水
    pub async fn redeem_reward(&self, user_id: i64, reward_id: i64) -> AppResult<UserRewardResponse> {
        let user_reward = with_retry("redeem_reward", || self.try_redeem_reward(user_id, reward_id))
            .await?;
        Ok(user_reward.into())
    }

    async fn try_redeem_reward(
        &self,
        user_id: i64,
        reward_id: i64,
    ) -> AppResult<user_rewards::Model> {
        let txn = self.pool.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        let reward = rewards::Entity::find_by_id(reward_id)
            .filter(rewards::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reward {reward_id} not found")))?;

        if !user.reward_tier.satisfies(reward.minimum_tier) {
            return Err(AppError::Forbidden(format!(
                "Reward {reward_id} requires tier {}",
                reward.minimum_tier
            )));
        }

        if user.loyalty_points < reward.points_cost {
            return Err(AppError::InsufficientPoints(format!(
                "Reward costs {} points, balance is {}",
                reward.points_cost, user.loyalty_points
            )));
        }

        let code = generate_unique_code(&txn).await?;
        let now = Utc::now();
        let expires_at = reward
            .valid_for_days
            .map(|days| now + Duration::days(i64::from(days)));

        let user_reward = user_rewards::ActiveModel {
            user_id: Set(user_id),
            reward_id: Set(reward.id),
            redeemed: Set(false),
            code: Set(code),
            expires_at: Set(expires_at),
            redeemed_at: Set(None),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        append_activity(
            &txn,
            user_id,
            LoyaltyAction::RewardRedeemed,
            -reward.points_cost,
            Some(format!("Redeemed reward: {}", reward.name)),
            None,
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "Reward redeemed: user={user_id} reward={reward_id} user_reward={}",
            user_reward.id
        );
        Ok(user_reward)
    }

    /// 校验兑换码: 未使用且未过期才返回; 不会标记为已使用
    pub async fn verify_reward_code(&self, code: &str) -> AppResult<Option<UserRewardResponse>> {
        let found = user_rewards::Entity::find()
            .filter(user_rewards::Column::Code.eq(code))
            .filter(user_rewards::Column::Redeemed.eq(false))
            .one(&self.pool)
            .await?;

        Ok(found
            .filter(|ur| ur.is_valid_at(Utc::now()))
            .map(Into::into))
    }

    /// 确认使用兑换码 (redeemed: false -> true 只发生一次)
    pub async fn use_reward_code(&self, user_id: i64, code: &str) -> AppResult<UserRewardResponse> {
        let used = with_retry("use_reward_code", || self.try_use_reward_code(user_id, code)).await?;
        Ok(used.into())
    }

    async fn try_use_reward_code(&self, user_id: i64, code: &str) -> AppResult<user_rewards::Model> {
        let txn = self.pool.begin().await?;

        let user_reward = user_rewards::Entity::find()
            .filter(user_rewards::Column::Code.eq(code))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Reward code not found".into()))?;

        if user_reward.user_id != user_id {
            return Err(AppError::Forbidden(
                "Reward code belongs to another user".into(),
            ));
        }
        if user_reward.redeemed {
            return Err(AppError::ValidationError(
                "Reward code has already been used".into(),
            ));
        }
        let now = Utc::now();
        if !user_reward.is_valid_at(now) {
            return Err(AppError::ValidationError("Reward code has expired".into()));
        }

        let am = user_rewards::ActiveModel {
            id: Set(user_reward.id),
            redeemed: Set(true),
            redeemed_at: Set(Some(now)),
            ..Default::default()
        };
        let updated = user_rewards::Entity::update(am)
            .filter(user_rewards::Column::Redeemed.eq(false))
            .exec(&txn)
            .await
            .map_err(conflict_on_stale("reward code"))?;

        txn.commit().await?;

        log::info!("Reward code used: user={user_id} user_reward={}", updated.id);
        Ok(updated)
    }

    /// 用户已兑换的奖励, 最新在前
    pub async fn list_user_rewards(&self, user_id: i64) -> AppResult<Vec<UserRewardResponse>> {
        let list = user_rewards::Entity::find()
            .filter(user_rewards::Column::UserId.eq(user_id))
            .order_by_desc(user_rewards::Column::CreatedAt)
            .order_by_desc(user_rewards::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

async fn generate_unique_code(txn: &DatabaseTransaction) -> AppResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_redemption_code();

        let exists = user_rewards::Entity::find()
            .filter(user_rewards::Column::Code.eq(code.as_str()))
            .count(txn)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
        log::warn!("Redemption code collision, regenerating");
    }

    Err(AppError::InternalError(
        "Failed to generate a unique redemption code".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{UserRole, loyalty_activity_entity as activities};
    use crate::services::LoyaltyService;
    use crate::test_support::{create_reward, create_user, setup_db};
    use crate::utils::is_redemption_code_format;

    async fn give_points(db: &DatabaseConnection, user_id: i64, points: i64) {
        LoyaltyService::new(db.clone())
            .add_loyalty_points(user_id, LoyaltyAction::Referral, points, None, None)
            .await
            .unwrap();
    }

    async fn balance(db: &DatabaseConnection, user_id: i64) -> users::Model {
        users::Entity::find_by_id(user_id).one(db).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_redeem_deducts_points_and_issues_code() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        give_points(&db, user.id, 1200).await;
        let reward = create_reward(&db, 1000, RewardTier::Bronze, Some(30)).await;
        let svc = RewardService::new(db.clone());

        let before = Utc::now();
        let issued = svc.redeem_reward(user.id, reward.id).await.unwrap();

        assert!(is_redemption_code_format(&issued.code));
        assert!(!issued.redeemed);
        let expires_at = issued.expires_at.unwrap();
        assert!(expires_at >= before + Duration::days(30));
        assert!(expires_at <= Utc::now() + Duration::days(30));

        let current = balance(&db, user.id).await;
        assert_eq!(current.loyalty_points, 200);
        assert_eq!(current.reward_tier, RewardTier::Bronze);

        let debit = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user.id))
            .filter(activities::Column::Action.eq(LoyaltyAction::RewardRedeemed))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(debit.points, -1000);
        assert_eq!(
            debit.description.as_deref(),
            Some(format!("Redeemed reward: {}", reward.name).as_str())
        );
    }

    #[tokio::test]
    async fn test_reward_without_validity_never_expires() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        give_points(&db, user.id, 100).await;
        let reward = create_reward(&db, 100, RewardTier::Bronze, None).await;
        let svc = RewardService::new(db.clone());

        let issued = svc.redeem_reward(user.id, reward.id).await.unwrap();
        assert!(issued.expires_at.is_none());
        assert_eq!(balance(&db, user.id).await.loyalty_points, 0);
    }

    #[tokio::test]
    async fn test_insufficient_points_leaves_no_trace() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        give_points(&db, user.id, 999).await;
        let reward = create_reward(&db, 1000, RewardTier::Bronze, Some(7)).await;
        let svc = RewardService::new(db.clone());

        let result = svc.redeem_reward(user.id, reward.id).await;
        assert!(matches!(result, Err(AppError::InsufficientPoints(_))));

        assert_eq!(balance(&db, user.id).await.loyalty_points, 999);
        assert_eq!(user_rewards::Entity::find().count(&db).await.unwrap(), 0);
        let entries = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_redeem_checks_existence_and_tier() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        give_points(&db, user.id, 400).await;
        let gold_only = create_reward(&db, 100, RewardTier::Gold, None).await;
        let svc = RewardService::new(db.clone());

        assert!(matches!(
            svc.redeem_reward(user.id, 9999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.redeem_reward(9999, gold_only.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.redeem_reward(user.id, gold_only.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(balance(&db, user.id).await.loyalty_points, 400);
    }

    #[tokio::test]
    async fn test_verify_then_use_code() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let other = create_user(&db, UserRole::Customer).await;
        give_points(&db, user.id, 500).await;
        let reward = create_reward(&db, 300, RewardTier::Bronze, Some(1)).await;
        let svc = RewardService::new(db.clone());

        let issued = svc.redeem_reward(user.id, reward.id).await.unwrap();

        // 校验不会消耗兑换码
        for _ in 0..2 {
            let verified = svc.verify_reward_code(&issued.code).await.unwrap();
            assert_eq!(verified.map(|v| v.id), Some(issued.id));
        }

        assert!(matches!(
            svc.use_reward_code(other.id, &issued.code).await,
            Err(AppError::Forbidden(_))
        ));

        let used = svc.use_reward_code(user.id, &issued.code).await.unwrap();
        assert!(used.redeemed);
        assert!(used.redeemed_at.is_some());

        assert!(svc.verify_reward_code(&issued.code).await.unwrap().is_none());
        assert!(matches!(
            svc.use_reward_code(user.id, &issued.code).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_and_unknown_codes_do_not_verify() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let reward = create_reward(&db, 300, RewardTier::Bronze, Some(1)).await;
        let svc = RewardService::new(db.clone());

        user_rewards::ActiveModel {
            user_id: Set(user.id),
            reward_id: Set(reward.id),
            redeemed: Set(false),
            code: Set("EXPIRED1".into()),
            expires_at: Set(Some(Utc::now() - Duration::hours(1))),
            created_at: Set(Utc::now() - Duration::days(2)),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(svc.verify_reward_code("EXPIRED1").await.unwrap().is_none());
        assert!(svc.verify_reward_code("NOSUCH00").await.unwrap().is_none());
        assert!(matches!(
            svc.use_reward_code(user.id, "EXPIRED1").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_rewards_filtered_by_tier_rank() {
        let db = setup_db().await;
        let bronze = create_reward(&db, 100, RewardTier::Bronze, None).await;
        let silver = create_reward(&db, 200, RewardTier::Silver, None).await;
        let gold = create_reward(&db, 300, RewardTier::Gold, None).await;
        let platinum = create_reward(&db, 400, RewardTier::Platinum, None).await;
        let retired = create_reward(&db, 50, RewardTier::Bronze, None).await;
        let mut am: rewards::ActiveModel = retired.into();
        am.is_active = Set(false);
        am.update(&db).await.unwrap();

        let svc = RewardService::new(db.clone());
        let ids = |list: Vec<RewardResponse>| list.into_iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(svc.get_rewards_by_tier(RewardTier::Bronze).await.unwrap()), vec![bronze.id]);
        assert_eq!(
            ids(svc.get_rewards_by_tier(RewardTier::Gold).await.unwrap()),
            vec![bronze.id, silver.id, gold.id]
        );
        assert_eq!(
            ids(svc.get_rewards_by_tier(RewardTier::Platinum).await.unwrap()),
            vec![bronze.id, silver.id, gold.id, platinum.id]
        );
    }
}
