use super::current_actor;
use crate::error::AppError;
use crate::models::*;
use crate::services::RewardService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/rewards",
    tag = "reward",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前等级可兑换的奖励", body = [RewardResponse]),
        (status = 401, description = "未授权", body = ApiError)
    )
)]
pub async fn list_rewards(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.get_rewards_for_user(actor.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/{id}/redeem",
    tag = "reward",
    params(
        ("id" = i64, Path, description = "奖励ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "兑换成功, 返回兑换码", body = UserRewardResponse),
        (status = 400, description = "积分不足", body = ApiError),
        (status = 403, description = "等级不足", body = ApiError),
        (status = 404, description = "奖励不存在", body = ApiError)
    )
)]
pub async fn redeem_reward(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.redeem_reward(actor.id, path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/verify",
    tag = "reward",
    request_body = RewardCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "兑换码有效（不会被消耗）", body = UserRewardResponse),
        (status = 404, description = "兑换码不存在 / 已使用 / 已过期", body = ApiError)
    )
)]
pub async fn verify_reward_code(
    reward_service: web::Data<RewardService>,
    request: web::Json<RewardCodeRequest>,
) -> Result<HttpResponse> {
    match reward_service.verify_reward_code(&request.code).await {
        Ok(Some(data)) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Ok(None) => Ok(AppError::NotFound("Reward code not found or expired".into()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/use",
    tag = "reward",
    request_body = RewardCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "兑换码已使用", body = UserRewardResponse),
        (status = 400, description = "已使用或已过期", body = ApiError),
        (status = 403, description = "不是自己的兑换码", body = ApiError),
        (status = 404, description = "兑换码不存在", body = ApiError)
    )
)]
pub async fn use_reward_code(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
    request: web::Json<RewardCodeRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.use_reward_code(actor.id, &request.code).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-rewards",
    tag = "reward",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已兑换的奖励（倒序）", body = [UserRewardResponse]),
        (status = 401, description = "未授权", body = ApiError)
    )
)]
pub async fn list_user_rewards(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match reward_service.list_user_rewards(actor.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reward_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rewards")
            .route("", web::get().to(list_rewards))
            .route("/verify", web::post().to(verify_reward_code))
            .route("/use", web::post().to(use_reward_code))
            .route("/{id}/redeem", web::post().to(redeem_reward)),
    )
    .route("/user-rewards", web::get().to(list_user_rewards));
}
