use crate::database::{conflict_on_stale, with_retry};
use crate::entities::{
    LoyaltyAction, RewardTier, loyalty_activity_entity as activities, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{LoyaltyActivityResponse, LoyaltyPointsResponse};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 追加一条积分流水并同步 users 上的积分 / 等级投影
///
/// 必须在调用方的事务中执行; 余额与等级只允许经由这里修改。
/// 结果余额为负属于程序错误, 直接返回 InternalError。
pub async fn append_activity(
    txn: &DatabaseTransaction,
    user_id: i64,
    action: LoyaltyAction,
    points: i64,
    description: Option<String>,
    order_id: Option<i64>,
) -> AppResult<activities::Model> {
    let user = users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let new_balance = user.loyalty_points + points;
    if new_balance < 0 {
        log::error!(
            "Loyalty balance would go negative: user={user_id} balance={} delta={points} action={action}",
            user.loyalty_points
        );
        return Err(AppError::InternalError(format!(
            "Loyalty balance of user {user_id} would become negative"
        )));
    }

    let now = Utc::now();
    let activity = activities::ActiveModel {
        user_id: Set(user_id),
        action: Set(action),
        points: Set(points),
        description: Set(description),
        order_id: Set(order_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let mut am = users::ActiveModel {
        id: Set(user.id),
        loyalty_points: Set(new_balance),
        reward_tier: Set(RewardTier::for_points(new_balance)),
        ..Default::default()
    };
    if action == LoyaltyAction::PlaceOrder {
        am.streak_count = Set(next_streak(user.last_order_date, user.streak_count, now));
        am.last_order_date = Set(Some(now));
    }

    // 以旧余额为条件, 防止并发追加覆盖
    users::Entity::update(am)
        .filter(users::Column::LoyaltyPoints.eq(user.loyalty_points))
        .exec(txn)
        .await
        .map_err(conflict_on_stale("user balance"))?;

    Ok(activity)
}

/// 按自然日 (UTC) 计算连续下单天数
pub fn next_streak(last_order: Option<DateTime<Utc>>, current: i32, now: DateTime<Utc>) -> i32 {
    let gap = last_order.map(|last| (now.date_naive() - last.date_naive()).num_days());
    match gap {
        Some(0) => current.max(1),
        Some(1) => current + 1,
        _ => 1,
    }
}

#[derive(Clone)]
pub struct LoyaltyService {
    pool: DatabaseConnection,
}

impl LoyaltyService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 单独事务中追加积分（挑战奖励、下单奖励等）
    pub async fn add_loyalty_points(
        &self,
        user_id: i64,
        action: LoyaltyAction,
        points: i64,
        description: Option<String>,
        order_id: Option<i64>,
    ) -> AppResult<LoyaltyActivityResponse> {
        let activity = with_retry("add_loyalty_points", || {
            self.try_add_loyalty_points(user_id, action, points, description.clone(), order_id)
        })
        .await?;
        Ok(activity.into())
    }

    async fn try_add_loyalty_points(
        &self,
        user_id: i64,
        action: LoyaltyAction,
        points: i64,
        description: Option<String>,
        order_id: Option<i64>,
    ) -> AppResult<activities::Model> {
        let txn = self.pool.begin().await?;
        let activity =
            append_activity(&txn, user_id, action, points, description, order_id).await?;
        txn.commit().await?;
        Ok(activity)
    }

    pub async fn get_points(&self, user_id: i64) -> AppResult<LoyaltyPointsResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        Ok(LoyaltyPointsResponse {
            points: user.loyalty_points,
            tier: user.reward_tier,
            streak_count: user.streak_count,
        })
    }

    /// 积分流水, 最新在前
    pub async fn list_activities(&self, user_id: i64) -> AppResult<Vec<LoyaltyActivityResponse>> {
        let list = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user_id))
            .order_by_desc(activities::Column::CreatedAt)
            .order_by_desc(activities::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_support::{create_user, setup_db};
    use chrono::{Duration, TimeZone};
    use sea_orm::PaginatorTrait;

    async fn ledger_sum(db: &DatabaseConnection, user_id: i64) -> i64 {
        activities::Entity::find()
            .filter(activities::Column::UserId.eq(user_id))
            .all(db)
            .await
            .unwrap()
            .iter()
            .map(|a| a.points)
            .sum()
    }

    async fn reload(db: &DatabaseConnection, user_id: i64) -> users::Model {
        users::Entity::find_by_id(user_id).one(db).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_ledger_sum_matches_balance() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let svc = LoyaltyService::new(db.clone());

        let steps = [
            (LoyaltyAction::SignUp, 100),
            (LoyaltyAction::PlaceOrder, 450),
            (LoyaltyAction::Review, 25),
            (LoyaltyAction::RewardRedeemed, -300),
            (LoyaltyAction::Referral, 1300),
        ];
        for (action, points) in steps {
            svc.add_loyalty_points(user.id, action, points, None, None)
                .await
                .unwrap();
            let current = reload(&db, user.id).await;
            assert_eq!(ledger_sum(&db, user.id).await, current.loyalty_points);
            assert_eq!(current.reward_tier, RewardTier::for_points(current.loyalty_points));
        }

        let current = reload(&db, user.id).await;
        assert_eq!(current.loyalty_points, 1575);
        assert_eq!(current.reward_tier, RewardTier::Gold);
    }

    #[tokio::test]
    async fn test_tier_drops_when_points_spent() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let svc = LoyaltyService::new(db.clone());

        svc.add_loyalty_points(user.id, LoyaltyAction::Referral, 1600, None, None)
            .await
            .unwrap();
        assert_eq!(reload(&db, user.id).await.reward_tier, RewardTier::Gold);

        svc.add_loyalty_points(user.id, LoyaltyAction::RewardRedeemed, -1200, None, None)
            .await
            .unwrap();
        let current = reload(&db, user.id).await;
        assert_eq!(current.loyalty_points, 400);
        assert_eq!(current.reward_tier, RewardTier::Bronze);
    }

    #[tokio::test]
    async fn test_negative_balance_leaves_no_trace() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let svc = LoyaltyService::new(db.clone());

        svc.add_loyalty_points(user.id, LoyaltyAction::SignUp, 50, None, None)
            .await
            .unwrap();
        let result = svc
            .add_loyalty_points(user.id, LoyaltyAction::RewardRedeemed, -80, None, None)
            .await;
        assert!(matches!(result, Err(AppError::InternalError(_))));

        let count = activities::Entity::find()
            .filter(activities::Column::UserId.eq(user.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(reload(&db, user.id).await.loyalty_points, 50);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = setup_db().await;
        let svc = LoyaltyService::new(db.clone());
        let result = svc
            .add_loyalty_points(4242, LoyaltyAction::SignUp, 10, None, None)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_place_order_updates_streak() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let svc = LoyaltyService::new(db.clone());

        svc.add_loyalty_points(user.id, LoyaltyAction::PlaceOrder, 10, None, None)
            .await
            .unwrap();
        let current = reload(&db, user.id).await;
        assert_eq!(current.streak_count, 1);
        assert!(current.last_order_date.is_some());

        // 非下单动作不影响连续天数
        svc.add_loyalty_points(user.id, LoyaltyAction::Review, 5, None, None)
            .await
            .unwrap();
        assert_eq!(reload(&db, user.id).await.streak_count, 1);
    }

    #[tokio::test]
    async fn test_activities_newest_first() {
        let db = setup_db().await;
        let user = create_user(&db, UserRole::Customer).await;
        let svc = LoyaltyService::new(db.clone());

        for points in [10, 20, 30] {
            svc.add_loyalty_points(user.id, LoyaltyAction::Review, points, None, None)
                .await
                .unwrap();
        }
        let list = svc.list_activities(user.id).await.unwrap();
        let points: Vec<i64> = list.iter().map(|a| a.points).collect();
        assert_eq!(points, vec![30, 20, 10]);

        let summary = svc.get_points(user.id).await.unwrap();
        assert_eq!(summary.points, 60);
        assert_eq!(summary.tier, RewardTier::Bronze);
    }

    #[test]
    fn test_next_streak() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(next_streak(None, 0, now), 1);
        assert_eq!(next_streak(Some(now - Duration::hours(2)), 3, now), 3);
        assert_eq!(next_streak(Some(now - Duration::days(1)), 3, now), 4);
        assert_eq!(next_streak(Some(now - Duration::days(3)), 7, now), 1);
        // 跨越午夜即算新的一天
        let late = Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 0).unwrap();
        assert_eq!(next_streak(Some(late), 2, now), 3);
    }
}
