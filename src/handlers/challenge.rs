use super::current_actor;
use crate::services::ChallengeService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/challenges",
    tag = "challenge",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "进行中且等级满足的挑战", body = [crate::models::ChallengeResponse]),
        (status = 401, description = "未授权", body = crate::models::ApiError)
    )
)]
pub async fn list_challenges(
    challenge_service: web::Data<ChallengeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match challenge_service.get_challenges_for_user(actor.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/challenges/{id}/join",
    tag = "challenge",
    params(
        ("id" = i64, Path, description = "挑战ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "报名成功（重复报名返回原记录）", body = crate::models::UserChallengeResponse),
        (status = 400, description = "挑战未在进行中", body = crate::models::ApiError),
        (status = 403, description = "等级不足", body = crate::models::ApiError),
        (status = 404, description = "挑战不存在", body = crate::models::ApiError)
    )
)]
pub async fn join_challenge(
    challenge_service: web::Data<ChallengeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match challenge_service.join_challenge(actor.id, path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/challenges/{id}/progress",
    tag = "challenge",
    params(
        ("id" = i64, Path, description = "挑战ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "进度 +1, 达标时发放积分", body = crate::models::UserChallengeResponse),
        (status = 404, description = "挑战不存在或未报名", body = crate::models::ApiError),
        (status = 409, description = "并发冲突", body = crate::models::ApiError)
    )
)]
pub async fn update_progress(
    challenge_service: web::Data<ChallengeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match challenge_service
        .update_user_challenge_progress(actor.id, path.into_inner())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-challenges",
    tag = "challenge",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已报名且未完成的挑战", body = [crate::models::ActiveUserChallengeResponse]),
        (status = 401, description = "未授权", body = crate::models::ApiError)
    )
)]
pub async fn list_user_challenges(
    challenge_service: web::Data<ChallengeService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match challenge_service.list_active_user_challenges(actor.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn challenge_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/challenges")
            .route("", web::get().to(list_challenges))
            .route("/{id}/join", web::post().to(join_challenge))
            .route("/{id}/progress", web::post().to(update_progress)),
    )
    .route("/user-challenges", web::get().to(list_user_challenges));
}
