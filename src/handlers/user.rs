use super::current_actor;
use crate::services::CatalogService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取用户资料成功", body = crate::models::UserResponse),
        (status = 401, description = "未授权", body = crate::models::ApiError),
        (status = 404, description = "用户不存在", body = crate::models::ApiError)
    )
)]
pub async fn get_profile(catalog: web::Data<CatalogService>, req: HttpRequest) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog.get_profile(actor.id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": user }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/delivery-partners",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "配送员列表", body = [crate::models::UserResponse]),
        (status = 403, description = "仅餐厅管理员", body = crate::models::ApiError)
    )
)]
pub async fn list_delivery_partners(
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match catalog.list_delivery_partners(&actor).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/me", web::get().to(get_profile))
        .route("/delivery-partners", web::get().to(list_delivery_partners));
}
