use crate::database::{conflict_on_stale, with_retry};
use crate::entities::{
    LoyaltyAction, RewardTier, challenge_entity as challenges, user_challenge_entity as user_challenges,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{ActiveUserChallengeResponse, ChallengeResponse, UserChallengeResponse};
use crate::services::loyalty_service::append_activity;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ChallengeService {
    pool: DatabaseConnection,
}

impl ChallengeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 启用中、处于时间窗口内且等级满足的挑战
    pub async fn get_available_challenges(
        &self,
        tier: RewardTier,
    ) -> AppResult<Vec<ChallengeResponse>> {
        let now = Utc::now();
        let mut list = challenges::Entity::find()
            .filter(challenges::Column::IsActive.eq(true))
            .order_by_asc(challenges::Column::EndDate)
            .order_by_asc(challenges::Column::Id)
            .all(&self.pool)
            .await?;

        list.retain(|c| c.is_running_at(now) && tier.satisfies(c.minimum_tier));

        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_challenges_for_user(&self, user_id: i64) -> AppResult<Vec<ChallengeResponse>> {
        let user = find_user(&self.pool, user_id).await?;
        self.get_available_challenges(user.reward_tier).await
    }

    /// 报名挑战; 已报名则返回原记录
    pub async fn join_challenge(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<UserChallengeResponse> {
        let user = find_user(&self.pool, user_id).await?;

        let challenge = challenges::Entity::find_by_id(challenge_id)
            .filter(challenges::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge {challenge_id} not found")))?;

        if let Some(existing) = self.find_enrollment(user_id, challenge_id).await? {
            return Ok(existing.into());
        }

        if !challenge.is_running_at(Utc::now()) {
            return Err(AppError::ValidationError(format!(
                "Challenge {challenge_id} is not running"
            )));
        }
        if !user.reward_tier.satisfies(challenge.minimum_tier) {
            return Err(AppError::Forbidden(format!(
                "Challenge {challenge_id} requires tier {}",
                challenge.minimum_tier
            )));
        }

        let inserted = user_challenges::ActiveModel {
            user_id: Set(user_id),
            challenge_id: Set(challenge_id),
            current_count: Set(0),
            completed: Set(false),
            completed_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(model) => Ok(model.into()),
            // 并发报名撞上 (user_id, challenge_id) 唯一索引
            Err(e) => match self.find_enrollment(user_id, challenge_id).await? {
                Some(existing) => Ok(existing.into()),
                None => Err(e.into()),
            },
        }
    }

    /// 推进挑战进度
    ///
    /// - 已完成: 原样返回, 不再计数也不再发积分
    /// - 计数达到目标: 标记完成并在同一事务内发放积分
    pub async fn update_user_challenge_progress(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<UserChallengeResponse> {
        let progress = with_retry("update_user_challenge_progress", || {
            self.try_update_progress(user_id, challenge_id)
        })
        .await?;
        Ok(progress.into())
    }

    async fn try_update_progress(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<user_challenges::Model> {
        let txn = self.pool.begin().await?;

        let challenge = challenges::Entity::find_by_id(challenge_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge {challenge_id} not found")))?;

        let enrollment = user_challenges::Entity::find()
            .filter(user_challenges::Column::UserId.eq(user_id))
            .filter(user_challenges::Column::ChallengeId.eq(challenge_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "User {user_id} is not enrolled in challenge {challenge_id}"
                ))
            })?;

        if enrollment.completed {
            return Ok(enrollment);
        }

        let next_count = enrollment.current_count + 1;
        let completed = next_count >= challenge.target_count;
        let now = Utc::now();

        let mut am = user_challenges::ActiveModel {
            id: Set(enrollment.id),
            current_count: Set(next_count),
            ..Default::default()
        };
        if completed {
            am.completed = Set(true);
            am.completed_at = Set(Some(now));
        }

        // 以旧计数且未完成为条件, 保证只完成一次
        let updated = user_challenges::Entity::update(am)
            .filter(user_challenges::Column::CurrentCount.eq(enrollment.current_count))
            .filter(user_challenges::Column::Completed.eq(false))
            .exec(&txn)
            .await
            .map_err(conflict_on_stale("challenge progress"))?;

        if completed {
            append_activity(
                &txn,
                user_id,
                LoyaltyAction::ChallengeCompleted,
                challenge.points,
                Some(format!("Completed challenge: {}", challenge.name)),
                None,
            )
            .await?;
        }

        txn.commit().await?;

        if completed {
            log::info!(
                "Challenge completed: user={user_id} challenge={challenge_id} points={}",
                challenge.points
            );
        }
        Ok(updated)
    }

    /// 已报名、未完成且仍启用的挑战及进度
    pub async fn list_active_user_challenges(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<ActiveUserChallengeResponse>> {
        let enrollments = user_challenges::Entity::find()
            .filter(user_challenges::Column::UserId.eq(user_id))
            .filter(user_challenges::Column::Completed.eq(false))
            .order_by_asc(user_challenges::Column::Id)
            .all(&self.pool)
            .await?;

        if enrollments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = enrollments.iter().map(|e| e.challenge_id).collect();
        let active: HashMap<i64, challenges::Model> = challenges::Entity::find()
            .filter(challenges::Column::Id.is_in(ids))
            .filter(challenges::Column::IsActive.eq(true))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(enrollments
            .into_iter()
            .filter_map(|progress| {
                active
                    .get(&progress.challenge_id)
                    .map(|challenge| ActiveUserChallengeResponse {
                        challenge: challenge.clone().into(),
                        progress: progress.into(),
                    })
            })
            .collect())
    }

    async fn find_enrollment(
        &self,
        user_id: i64,
        challenge_id: i64,
    ) -> AppResult<Option<user_challenges::Model>> {
        Ok(user_challenges::Entity::find()
            .filter(user_challenges::Column::UserId.eq(user_id))
            .filter(user_challenges::Column::ChallengeId.eq(challenge_id))
            .one(&self.pool)
            .await?)
    }
}

async fn find_user(pool: &DatabaseConnection, user_id: i64) -> AppResult<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}
